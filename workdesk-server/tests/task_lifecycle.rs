//! Task creation, assignment, completion and notification fan-out

mod common;

use axum::Json;
use axum::extract::{Path, State};
use http::StatusCode;

use workdesk_server::api::manager::handler as manager;
use workdesk_server::api::staff::handler as staff;
use workdesk_server::api::tasks::handler as tasks;
use workdesk_server::db::models::{Department, Role, Task, TaskStatus, User};
use workdesk_server::db::repository::{NotificationRepository, UserRepository};

use common::{create_user, current, id_of, setup};

fn create_payload(title: &str, assigned_to: Option<String>) -> tasks::CreateTaskRequest {
    tasks::CreateTaskRequest {
        title: title.to_string(),
        description: "Do the thing".to_string(),
        department: Some(Department::Diary),
        category: None,
        priority: None,
        assigned_to,
        start_date: None,
        due_date: workdesk_server::utils::now_millis() + 86_400_000,
    }
}

async fn unread(state: &workdesk_server::AppState, user: &User) -> i64 {
    NotificationRepository::new(state.db())
        .unread_count(user.id.as_ref().unwrap())
        .await
        .unwrap()
}

fn task_id(task: &Task) -> String {
    task.id.as_ref().unwrap().to_string()
}

#[tokio::test]
async fn admin_pool_task_notifies_active_department_managers() {
    let ctx = setup().await;
    let admin = create_user(&ctx.state, "root", Role::Admin, Department::Diary).await;
    let m1 = create_user(&ctx.state, "m1", Role::Manager, Department::Diary).await;
    let m2 = create_user(&ctx.state, "m2", Role::Manager, Department::Diary).await;
    let m3 = create_user(&ctx.state, "m3", Role::Manager, Department::Diary).await;
    let m4 = create_user(&ctx.state, "m4", Role::Manager, Department::Calendar).await;

    // m3 is deactivated and must not be notified
    UserRepository::new(ctx.state.db())
        .toggle_status(&id_of(&m3))
        .await
        .unwrap();

    let task = tasks::create(
        State(ctx.state.clone()),
        current(&admin),
        Json(create_payload("Pool task", None)),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();

    assert_eq!(task.work_id, "TASK0001");
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.assigned_to.is_none());

    assert_eq!(unread(&ctx.state, &m1).await, 1);
    assert_eq!(unread(&ctx.state, &m2).await, 1);
    assert_eq!(unread(&ctx.state, &m3).await, 0);
    assert_eq!(unread(&ctx.state, &m4).await, 0);
}

#[tokio::test]
async fn manager_claims_pool_task_for_staff() {
    let ctx = setup().await;
    let admin = create_user(&ctx.state, "root", Role::Admin, Department::Diary).await;
    let mgr = create_user(&ctx.state, "boss", Role::Manager, Department::Diary).await;
    let worker = create_user(&ctx.state, "alice", Role::Staff, Department::Diary).await;

    let pool = tasks::create(
        State(ctx.state.clone()),
        current(&admin),
        Json(create_payload("Pool task", None)),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();

    let assigned = manager::assign_task(
        State(ctx.state.clone()),
        current(&mgr),
        Json(manager::AssignTaskRequest {
            task_id: Some(task_id(&pool)),
            assigned_to: id_of(&worker),
            title: None,
            description: None,
            category: None,
            priority: None,
            due_date: None,
        }),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();

    assert_eq!(assigned.status, TaskStatus::InProgress);
    assert_eq!(assigned.assigned_to, worker.id);
    assert_eq!(assigned.assigned_by, mgr.id);
    // Work id is assigned once and survives reassignment
    assert_eq!(assigned.work_id, pool.work_id);
    assert_eq!(unread(&ctx.state, &worker).await, 1);
}

#[tokio::test]
async fn managers_cannot_assign_outside_their_team() {
    let ctx = setup().await;
    let mgr = create_user(&ctx.state, "boss", Role::Manager, Department::Diary).await;
    let other_mgr = create_user(&ctx.state, "boss2", Role::Manager, Department::Diary).await;
    let outsider = create_user(&ctx.state, "carol", Role::Staff, Department::Calendar).await;

    for target in [&other_mgr, &outsider] {
        let err = manager::assign_task(
            State(ctx.state.clone()),
            current(&mgr),
            Json(manager::AssignTaskRequest {
                task_id: None,
                assigned_to: id_of(target),
                title: Some("New task".to_string()),
                description: Some("Details".to_string()),
                category: None,
                priority: None,
                due_date: Some(workdesk_server::utils::now_millis() + 1000),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn completion_forces_progress_and_fans_out() {
    let ctx = setup().await;
    let admin = create_user(&ctx.state, "root", Role::Admin, Department::Diary).await;
    let mgr = create_user(&ctx.state, "boss", Role::Manager, Department::Diary).await;
    let worker = create_user(&ctx.state, "alice", Role::Staff, Department::Diary).await;

    let task = tasks::create(
        State(ctx.state.clone()),
        current(&admin),
        Json(create_payload("Finish me", Some(id_of(&worker)))),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();

    let admin_before = unread(&ctx.state, &admin).await;
    let mgr_before = unread(&ctx.state, &mgr).await;
    let worker_before = unread(&ctx.state, &worker).await;

    let done = staff::update_progress(
        State(ctx.state.clone()),
        current(&worker),
        Path(task_id(&task)),
        Json(staff::UpdateProgressRequest {
            status: Some(TaskStatus::Completed),
            progress: Some(40),
            comment: None,
        }),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();

    assert_eq!(done.status, TaskStatus::Completed);
    assert_eq!(done.progress, 100);
    assert!(done.completed_date.is_some());

    // Admin, manager and creator hear about it; the actor does not
    assert_eq!(unread(&ctx.state, &admin).await, admin_before + 1);
    assert_eq!(unread(&ctx.state, &mgr).await, mgr_before + 1);
    assert_eq!(unread(&ctx.state, &worker).await, worker_before);
}

#[tokio::test]
async fn staff_cannot_touch_foreign_tasks() {
    let ctx = setup().await;
    let admin = create_user(&ctx.state, "root", Role::Admin, Department::Diary).await;
    let alice = create_user(&ctx.state, "alice", Role::Staff, Department::Diary).await;
    let bob = create_user(&ctx.state, "bob", Role::Staff, Department::Diary).await;

    let task = tasks::create(
        State(ctx.state.clone()),
        current(&admin),
        Json(create_payload("Alice only", Some(id_of(&alice)))),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();

    let err = staff::task_details(
        State(ctx.state.clone()),
        current(&bob),
        Path(task_id(&task)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    let err = staff::update_progress(
        State(ctx.state.clone()),
        current(&bob),
        Path(task_id(&task)),
        Json(staff::UpdateProgressRequest {
            status: Some(TaskStatus::InProgress),
            progress: None,
            comment: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    // The shared namespace hides it the same way
    let err = tasks::get_task(
        State(ctx.state.clone()),
        current(&bob),
        Path(task_id(&task)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn work_ids_are_sequential_and_stable() {
    let ctx = setup().await;
    let admin = create_user(&ctx.state, "root", Role::Admin, Department::Diary).await;

    let first = tasks::create(
        State(ctx.state.clone()),
        current(&admin),
        Json(create_payload("First", None)),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();
    let second = tasks::create(
        State(ctx.state.clone()),
        current(&admin),
        Json(create_payload("Second", None)),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();

    assert_eq!(first.work_id, "TASK0001");
    assert_eq!(second.work_id, "TASK0002");

    let updated = tasks::update(
        State(ctx.state.clone()),
        current(&admin),
        Path(task_id(&first)),
        Json(tasks::UpdateTaskRequest {
            title: Some("First, renamed".to_string()),
            description: None,
            category: None,
            department: None,
            priority: None,
            status: None,
            progress: None,
            start_date: None,
            due_date: None,
        }),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();
    assert_eq!(updated.work_id, "TASK0001");
    assert_eq!(updated.title, "First, renamed");
}

#[tokio::test]
async fn progress_over_100_is_rejected() {
    let ctx = setup().await;
    let admin = create_user(&ctx.state, "root", Role::Admin, Department::Diary).await;
    let alice = create_user(&ctx.state, "alice", Role::Staff, Department::Diary).await;

    let task = tasks::create(
        State(ctx.state.clone()),
        current(&admin),
        Json(create_payload("Careful", Some(id_of(&alice)))),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();

    let err = staff::update_progress(
        State(ctx.state.clone()),
        current(&alice),
        Path(task_id(&task)),
        Json(staff::UpdateProgressRequest {
            status: None,
            progress: Some(150),
            comment: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comments_reach_admins_and_creator_but_not_the_author() {
    let ctx = setup().await;
    let admin = create_user(&ctx.state, "root", Role::Admin, Department::Diary).await;
    let alice = create_user(&ctx.state, "alice", Role::Staff, Department::Diary).await;

    let task = tasks::create(
        State(ctx.state.clone()),
        current(&admin),
        Json(create_payload("Discuss", Some(id_of(&alice)))),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();

    let admin_before = unread(&ctx.state, &admin).await;
    let alice_before = unread(&ctx.state, &alice).await;
    let updated = staff::add_comment(
        State(ctx.state.clone()),
        current(&alice),
        Path(task_id(&task)),
        Json(staff::AddCommentRequest {
            text: "  halfway there  ".to_string(),
        }),
    )
    .await
    .unwrap()
    .0
    .data
    .unwrap();

    assert_eq!(updated.comments.len(), 1);
    assert_eq!(updated.comments[0].text, "halfway there");
    assert_eq!(unread(&ctx.state, &admin).await, admin_before + 1);
    assert_eq!(unread(&ctx.state, &alice).await, alice_before);
}
