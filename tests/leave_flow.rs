use std::sync::Arc;

use futures::StreamExt;
use leaveflow::model::ActorRole;
use leaveflow::notify::{MemorySink, Notice};
use leaveflow::store::MemoryStore;
use leaveflow::{Config, CreateLeave, LeaveRequest, LeaveStatus, LeaveWorkflowEngine, Session};

fn engine() -> (LeaveWorkflowEngine, Arc<MemorySink>) {
    let config = Config::default();
    let _guard = leaveflow::telemetry::init(&config);
    let sink = Arc::new(MemorySink::new());
    let engine = LeaveWorkflowEngine::new(Arc::new(MemoryStore::new()), sink.clone())
        .with_collection(config.leave_collection);
    (engine, sink)
}

#[tokio::test]
async fn student_leave_travels_from_class_teacher_to_admin() {
    let (engine, sink) = engine();
    let asha = Session::new("s-200", "Asha", ActorRole::Student);
    let class_teacher = Session::new("t-100", "R. Sharma", ActorRole::Teacher);
    let principal = Session::new("a-1", "Principal", ActorRole::Admin);

    // Watch the admin inbox across the whole flow.
    let mut admin_feed = engine.watch_admin_inbox().await.unwrap();
    assert!(admin_feed.next().await.unwrap().is_empty());

    // Asha (class 7) applies.
    let created = engine
        .apply_student_leave(
            &asha,
            "7",
            CreateLeave {
                start_date: "2024-05-01".parse().unwrap(),
                end_date: "2024-05-03".parse().unwrap(),
                reason: "fever".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.request.status(), LeaveStatus::PendingTeacher);

    // It sits in the teacher inbox, not the admin one.
    assert_eq!(engine.teacher_inbox().await.unwrap().len(), 1);
    assert!(engine.admin_inbox().await.unwrap().is_empty());
    assert!(admin_feed.next().await.unwrap().is_empty());

    // The class teacher forwards it without typing a remark.
    let forwarded = engine.forward(&class_teacher, &created.id, None).await.unwrap();
    assert_eq!(forwarded.request.status(), LeaveStatus::PendingAdmin);
    assert_eq!(
        forwarded.request.teacher_remark(),
        Some("Forwarded by Class Teacher")
    );
    assert!(engine.teacher_inbox().await.unwrap().is_empty());

    let snapshot = admin_feed.next().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, created.id);

    // The admin approves with a personal note.
    let approved = engine
        .approve(&principal, &created.id, Some("Get well soon"))
        .await
        .unwrap();
    assert_eq!(approved.request.status(), LeaveStatus::Approved);
    assert!(admin_feed.next().await.unwrap().is_empty());

    // Final stored record.
    let stored = engine.fetch(&created.id).await.unwrap().unwrap();
    let LeaveRequest::Student(student) = stored.request else {
        panic!("expected a student request");
    };
    assert_eq!(student.status, LeaveStatus::Approved);
    assert_eq!(student.class_name, "7");
    assert_eq!(
        student.teacher_remark.as_deref(),
        Some("Forwarded by Class Teacher")
    );
    assert_eq!(student.admin_remark.as_deref(), Some("Get well soon"));
    assert!(student.updated_at >= student.created_at);

    // Asha's own history shows the finished request.
    let history = engine.actor_history("s-200").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].request.status(), LeaveStatus::Approved);

    // One toast per action, in order.
    assert_eq!(
        sink.notices(),
        vec![
            Notice::Success("Leave request submitted".into()),
            Notice::Success("Leave request forwarded to admin".into()),
            Notice::Success("Leave approved".into()),
        ]
    );
}

#[tokio::test]
async fn teacher_personal_leave_skips_teacher_review() {
    let (engine, _) = engine();
    let class_teacher = Session::new("t-100", "R. Sharma", ActorRole::Teacher);
    let principal = Session::new("a-1", "Principal", ActorRole::Admin);

    let created = engine
        .apply_personal_leave(
            &class_teacher,
            CreateLeave {
                start_date: "2024-06-10".parse().unwrap(),
                end_date: "2024-06-10".parse().unwrap(),
                reason: "medical appointment".to_string(),
            },
        )
        .await
        .unwrap();

    // Straight to the admin inbox; the teacher inbox never sees it.
    assert!(engine.teacher_inbox().await.unwrap().is_empty());
    let inbox = engine.admin_inbox().await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].request.teacher_remark(), None);

    let rejected = engine
        .reject_by_admin(&principal, &created.id, None)
        .await
        .unwrap();
    assert_eq!(rejected.request.status(), LeaveStatus::Rejected);
    assert_eq!(rejected.request.admin_remark(), Some("Rejected"));
}
