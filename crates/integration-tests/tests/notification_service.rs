//! Notification inbox rules: unread-only listing and recipient-scoped deletes.

use std::sync::Arc;

use domains::error::ErrorKind;
use domains::models::Pagination;
use domains::ports::MockNotificationRepo;
use integration_tests::{unread_notification, verified_user};
use mockall::predicate::eq;
use services::NotificationService;
use uuid::Uuid;

#[tokio::test]
async fn listing_pages_unread_messages() {
    let recipient = verified_user("inbox@example.com");
    let recipient_id = recipient.id;

    let mut repo = MockNotificationRepo::new();
    repo.expect_count_unread()
        .with(eq(recipient_id))
        .returning(|_| Ok(12));
    repo.expect_list_unread()
        .with(eq(recipient_id), eq(5u32), eq(5u32))
        .returning(move |uid, _, _| {
            Ok((0..5)
                .map(|i| unread_notification(uid, &format!("message {i}")))
                .collect())
        });

    let svc = NotificationService::new(Arc::new(repo));
    let (notes, page) = svc.list_notifications(recipient_id, 5, 5).await.unwrap();
    assert_eq!(notes.len(), 5);
    assert!(notes.iter().all(|n| !n.read));
    assert_eq!(
        page,
        Pagination {
            limit: 5,
            offset: 5,
            count: 12
        }
    );
}

#[tokio::test]
async fn deletes_are_scoped_to_the_recipient() {
    let recipient = verified_user("inbox@example.com");
    let intruder = verified_user("other@example.com");
    let note = unread_notification(recipient.id, "yours only");
    let note_id = note.id;

    let mut repo = MockNotificationRepo::new();
    repo.expect_get().returning(move |_| Ok(note.clone()));
    let svc = NotificationService::new(Arc::new(repo));

    let err = svc
        .delete_notification(intruder.id, note_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert_eq!(err.to_string(), "permission denied");
}

#[tokio::test]
async fn anonymous_callers_are_rejected() {
    let svc = NotificationService::new(Arc::new(MockNotificationRepo::new()));
    let err = svc
        .delete_notification(Uuid::nil(), Uuid::now_v7())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthenticated);

    let err = svc.delete_all_notifications(Uuid::nil()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthenticated);
}

#[tokio::test]
async fn clearing_the_inbox_reports_how_many_went() {
    let recipient = verified_user("inbox@example.com");
    let mut repo = MockNotificationRepo::new();
    repo.expect_delete_by_user()
        .with(eq(recipient.id))
        .times(1)
        .returning(|_| Ok(7));
    let svc = NotificationService::new(Arc::new(repo));
    assert_eq!(svc.delete_all_notifications(recipient.id).await.unwrap(), 7);
}
