//! Registration, login and middleware behavior

mod common;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use http::{Request, StatusCode, header};
use tower::ServiceExt;

use workdesk_server::api::auth::handler::{self, LoginRequest, RegisterRequest};
use workdesk_server::db::models::{Department, Role};
use workdesk_server::db::repository::UserRepository;
use workdesk_server::utils::AppError;

use common::{create_user, setup};

fn register_payload(username: &str, role: Option<Role>) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: "password123".to_string(),
        full_name: format!("{} Person", username),
        department: Department::Diary,
        role,
        position: None,
        phone: None,
    }
}

#[tokio::test]
async fn register_assigns_sequential_staff_ids() {
    let ctx = setup().await;

    let first = handler::register(State(ctx.state.clone()), Json(register_payload("alice", None)))
        .await
        .unwrap()
        .0
        .data
        .unwrap();
    assert_eq!(first.user.staff_id.as_deref(), Some("EMP0001"));
    assert_eq!(first.user.role, Role::Staff);

    let second =
        handler::register(State(ctx.state.clone()), Json(register_payload("bob", None)))
            .await
            .unwrap()
            .0
            .data
            .unwrap();
    assert_eq!(second.user.staff_id.as_deref(), Some("EMP0002"));

    // Admins never get a staff id
    let admin = handler::register(
        State(ctx.state.clone()),
        Json(register_payload("root", Some(Role::Admin))),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();
    assert!(admin.user.staff_id.is_none());

    // The issued token resolves back to the user
    let claims = ctx.state.jwt().validate_token(&first.token).unwrap();
    assert_eq!(claims.sub, first.user.id.as_ref().unwrap().to_string());
}

#[tokio::test]
async fn responses_never_carry_password_material() {
    let ctx = setup().await;
    let auth = handler::register(State(ctx.state.clone()), Json(register_payload("alice", None)))
        .await
        .unwrap()
        .0
        .data
        .unwrap();

    let json = serde_json::to_value(&auth.user).unwrap();
    assert!(json.get("password").is_none());
    assert!(json.get("passwordHash").is_none());
    assert!(json.get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let ctx = setup().await;
    handler::register(State(ctx.state.clone()), Json(register_payload("alice", None)))
        .await
        .unwrap();

    let mut dup = register_payload("alice2", None);
    dup.email = "alice@example.com".to_string();
    let err = handler::register(State(ctx.state.clone()), Json(dup))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let ctx = setup().await;
    let user = create_user(&ctx.state, "alice", Role::Staff, Department::Diary).await;

    // Wrong password
    let err = handler::login(
        State(ctx.state.clone()),
        Json(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "wrong-password".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

    // Unknown email
    let err = handler::login(
        State(ctx.state.clone()),
        Json(LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "password123".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

    // Deactivated account with correct credentials
    UserRepository::new(ctx.state.db())
        .toggle_status(&user.id.as_ref().unwrap().to_string())
        .await
        .unwrap();
    let err = handler::login(
        State(ctx.state.clone()),
        Json(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "password123".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn login_returns_a_working_token() {
    let ctx = setup().await;
    create_user(&ctx.state, "alice", Role::Staff, Department::Diary).await;

    let auth = handler::login(
        State(ctx.state.clone()),
        Json(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "password123".to_string(),
        }),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();

    assert!(auth.user.last_login.is_some());
    let claims = ctx.state.jwt().validate_token(&auth.token).unwrap();
    assert_eq!(claims.sub, auth.user.id.as_ref().unwrap().to_string());
}

#[tokio::test]
async fn middleware_enforces_auth_and_roles() {
    let ctx = setup().await;
    create_user(&ctx.state, "alice", Role::Staff, Department::Diary).await;
    let app = workdesk_server::api::build_app(&ctx.state);

    // Health is public
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Protected route without a token
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Staff token against an admin route
    let auth = handler::login(
        State(ctx.state.clone()),
        Json(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "password123".to_string(),
        }),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/dashboard")
                .header(header::AUTHORIZATION, format!("Bearer {}", auth.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Same token against a route the role allows
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/staff/dashboard")
                .header(header::AUTHORIZATION, format!("Bearer {}", auth.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Garbage token
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/staff/dashboard")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
