//! Notification visibility, read tracking and authoring

mod common;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use http::{Request, StatusCode, header};
use tower::ServiceExt;

use workdesk_server::api::auth::handler as auth;
use workdesk_server::api::notifications::handler as notifications;
use workdesk_server::db::models::{Department, NotificationType, Role};

use common::{create_user, current, id_of, setup};

fn notice(user: Option<String>, title: &str) -> notifications::CreateNotificationRequest {
    notifications::CreateNotificationRequest {
        user,
        kind: Some(NotificationType::System),
        title: title.to_string(),
        message: "Details inside".to_string(),
        link: None,
    }
}

#[tokio::test]
async fn broadcasts_reach_everyone_targeted_reach_one() {
    let ctx = setup().await;
    let mgr = create_user(&ctx.state, "boss", Role::Manager, Department::Diary).await;
    let s1 = create_user(&ctx.state, "alice", Role::Staff, Department::Diary).await;
    let s2 = create_user(&ctx.state, "bob", Role::Staff, Department::Diary).await;

    notifications::create(
        State(ctx.state.clone()),
        current(&mgr),
        Json(notice(None, "All hands")),
    )
    .await
    .unwrap();
    notifications::create(
        State(ctx.state.clone()),
        current(&mgr),
        Json(notice(Some(id_of(&s1)), "Just for alice")),
    )
    .await
    .unwrap();

    let for_s1 = notifications::list(State(ctx.state.clone()), current(&s1))
        .await
        .unwrap()
        .0
        .data
        .unwrap();
    let titles: Vec<&str> = for_s1.iter().map(|n| n.title.as_str()).collect();
    assert!(titles.contains(&"All hands"));
    assert!(titles.contains(&"Just for alice"));

    let for_s2 = notifications::list(State(ctx.state.clone()), current(&s2))
        .await
        .unwrap()
        .0
        .data
        .unwrap();
    let titles: Vec<&str> = for_s2.iter().map(|n| n.title.as_str()).collect();
    assert!(titles.contains(&"All hands"));
    assert!(!titles.contains(&"Just for alice"));
}

#[tokio::test]
async fn mark_read_is_owner_scoped() {
    let ctx = setup().await;
    let mgr = create_user(&ctx.state, "boss", Role::Manager, Department::Diary).await;
    let s1 = create_user(&ctx.state, "alice", Role::Staff, Department::Diary).await;
    let s2 = create_user(&ctx.state, "bob", Role::Staff, Department::Diary).await;

    let created = notifications::create(
        State(ctx.state.clone()),
        current(&mgr),
        Json(notice(Some(id_of(&s1)), "Just for alice")),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();
    let notification_id = created.id.as_ref().unwrap().to_string();

    // Someone else cannot mark it
    let err = notifications::mark_read(
        State(ctx.state.clone()),
        current(&s2),
        Path(notification_id.clone()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    // The owner can
    let updated = notifications::mark_read(
        State(ctx.state.clone()),
        current(&s1),
        Path(notification_id),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();
    assert!(updated.is_read);

    let count = notifications::unread_count(State(ctx.state.clone()), current(&s1))
        .await
        .unwrap()
        .0
        .data
        .unwrap();
    assert_eq!(count.count, 0);
}

#[tokio::test]
async fn mark_all_read_zeroes_the_counter() {
    let ctx = setup().await;
    let mgr = create_user(&ctx.state, "boss", Role::Manager, Department::Diary).await;
    let s1 = create_user(&ctx.state, "alice", Role::Staff, Department::Diary).await;

    for title in ["One", "Two", "Three"] {
        notifications::create(
            State(ctx.state.clone()),
            current(&mgr),
            Json(notice(Some(id_of(&s1)), title)),
        )
        .await
        .unwrap();
    }

    let count = notifications::unread_count(State(ctx.state.clone()), current(&s1))
        .await
        .unwrap()
        .0
        .data
        .unwrap();
    assert_eq!(count.count, 3);

    notifications::mark_all_read(State(ctx.state.clone()), current(&s1))
        .await
        .unwrap();

    let count = notifications::unread_count(State(ctx.state.clone()), current(&s1))
        .await
        .unwrap()
        .0
        .data
        .unwrap();
    assert_eq!(count.count, 0);
}

#[tokio::test]
async fn staff_cannot_author_notifications() {
    let ctx = setup().await;
    create_user(&ctx.state, "alice", Role::Staff, Department::Diary).await;
    let app = workdesk_server::api::build_app(&ctx.state);

    let auth = auth::login(
        State(ctx.state.clone()),
        Json(auth::LoginRequest {
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
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/notifications")
                .header(header::AUTHORIZATION, format!("Bearer {}", auth.token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"title":"Nope","message":"Not allowed"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
