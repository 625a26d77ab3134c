mod common;

use archflow::actions::deliverables;
use archflow::error::ActionError;
use archflow::models::{DeliverableEdit, DeliverableStatus, DeliverableType, DeliverableUpload};
use archflow::storage::LocalStorage;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use uuid::Uuid;

use common::{editor, owner, MemoryStore, RecordingNotifier};

fn storage() -> (TempDir, LocalStorage) {
    let dir = tempfile::tempdir().unwrap();
    let objects = LocalStorage::new(dir.path(), "http://localhost:8080/files");
    (dir, objects)
}

fn upload(project_id: Uuid, file_name: &str, bytes: &[u8]) -> DeliverableUpload {
    DeliverableUpload {
        project_id,
        task_id: None,
        name: "Ground floor plan".into(),
        kind: DeliverableType::Drawing,
        description: None,
        file_name: file_name.into(),
        bytes: bytes.to_vec(),
        tags: vec!["plan".into()],
    }
}

#[tokio::test]
async fn upload_stores_file_and_creates_draft_v1() {
    let store = MemoryStore::new();
    let (dir, objects) = storage();
    let session = editor(&store);

    let deliverable = deliverables::upload_deliverable(&store, &objects, &session, upload(Uuid::new_v4(), "plan.pdf", b"%PDF"))
        .await
        .unwrap();

    assert_eq!(deliverable.version, 1);
    assert_eq!(deliverable.status, DeliverableStatus::Draft);
    assert_eq!(deliverable.file_size, Some(4));
    assert_eq!(deliverable.mime_type.as_deref(), Some("application/pdf"));
    assert_eq!(deliverable.created_by, session.user_id);
    assert_eq!(deliverable.file_url, format!("http://localhost:8080/files/{}", deliverable.file_key));
    assert_eq!(std::fs::read(dir.path().join(&deliverable.file_key)).unwrap(), b"%PDF");
}

#[tokio::test]
async fn failed_row_write_removes_the_stored_file() {
    let store = MemoryStore::new();
    let (dir, objects) = storage();
    let session = editor(&store);
    store.fail("create_deliverable");

    let err = deliverables::upload_deliverable(&store, &objects, &session, upload(Uuid::new_v4(), "plan.pdf", b"%PDF"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to create deliverable.");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn invalid_upload_leaves_no_file_behind() {
    let store = MemoryStore::new();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("objects");
    let objects = LocalStorage::new(root.clone(), "http://localhost:8080/files");
    let session = editor(&store);
    let mut bad = upload(Uuid::new_v4(), "plan.pdf", b"%PDF");
    bad.name = " ".into();

    let err = deliverables::upload_deliverable(&store, &objects, &session, bad).await.unwrap_err();

    assert!(err.field_errors().unwrap().contains("name"));
    assert!(store.calls().is_empty());
    assert_eq!(store.deliverable_count(), 0);
    // Storage is created lazily on the first upload
    assert!(!root.exists());
}

#[tokio::test]
async fn new_version_bumps_and_replaces_file() {
    let store = MemoryStore::new();
    let (dir, objects) = storage();
    let session = editor(&store);
    let boss = owner(&store);
    let first = deliverables::upload_deliverable(&store, &objects, &session, upload(Uuid::new_v4(), "plan.pdf", b"v1"))
        .await
        .unwrap();
    deliverables::approve_deliverable(&store, &RecordingNotifier::default(), &boss, first.id)
        .await
        .unwrap();

    let second = deliverables::new_deliverable_version(&store, &objects, &session, first.id, "plan-rev.pdf", b"v2 bytes")
        .await
        .unwrap();

    assert_eq!(second.version, 2);
    assert_eq!(second.status, DeliverableStatus::Draft);
    assert_eq!(second.approved_by, None);
    assert_eq!(second.file_size, Some(8));
    assert_ne!(second.file_key, first.file_key);
    assert!(!dir.path().join(&first.file_key).exists());
    assert_eq!(std::fs::read(dir.path().join(&second.file_key)).unwrap(), b"v2 bytes");
}

#[tokio::test]
async fn approval_is_for_owners_and_notifies_the_author() {
    let store = MemoryStore::new();
    let (_dir, objects) = storage();
    let notifier = RecordingNotifier::default();
    let author = editor(&store);
    let boss = owner(&store);
    let deliverable = deliverables::upload_deliverable(&store, &objects, &author, upload(Uuid::new_v4(), "plan.pdf", b"x"))
        .await
        .unwrap();

    let err = deliverables::approve_deliverable(&store, &notifier, &author, deliverable.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::Unauthorized));

    let approved = deliverables::approve_deliverable(&store, &notifier, &boss, deliverable.id)
        .await
        .unwrap();
    assert_eq!(approved.status, DeliverableStatus::Approved);
    assert_eq!(approved.approved_by, Some(boss.user_id));
    assert!(approved.approved_at.is_some());

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id, author.user_id);
    assert_eq!(sent[0].resource_type.as_deref(), Some("DELIVERABLE"));

    let rejected = deliverables::reject_deliverable(&store, &boss, deliverable.id).await.unwrap();
    assert_eq!(rejected.status, DeliverableStatus::Rejected);
    assert_eq!(rejected.approved_by, None);
}

#[tokio::test]
async fn edit_keeps_file_and_version() {
    let store = MemoryStore::new();
    let (_dir, objects) = storage();
    let session = editor(&store);
    let deliverable = deliverables::upload_deliverable(&store, &objects, &session, upload(Uuid::new_v4(), "plan.pdf", b"x"))
        .await
        .unwrap();

    let mut edit = DeliverableEdit::from(&deliverable);
    edit.name = "Ground floor plan, revised".into();
    edit.status = DeliverableStatus::InReview;
    let updated = deliverables::update_deliverable(&store, &session, deliverable.id, edit).await.unwrap();

    assert_eq!(updated.name, "Ground floor plan, revised");
    assert_eq!(updated.status, DeliverableStatus::InReview);
    assert_eq!(updated.file_key, deliverable.file_key);
    assert_eq!(updated.version, 1);
}

#[tokio::test]
async fn edit_cannot_approve_or_reject() {
    let store = MemoryStore::new();
    let (dir, objects) = storage();
    let session = editor(&store);
    let deliverable = deliverables::upload_deliverable(&store, &objects, &session, upload(Uuid::new_v4(), "plan.pdf", b"x"))
        .await
        .unwrap();

    for status in [DeliverableStatus::Approved, DeliverableStatus::Rejected] {
        let mut edit = DeliverableEdit::from(&deliverable);
        edit.status = status;
        let err = deliverables::update_deliverable(&store, &session, deliverable.id, edit)
            .await
            .unwrap_err();
        assert!(err.field_errors().unwrap().contains("status"));
    }

    assert_eq!(store.call_count("update_deliverable"), 0);
    let listed = deliverables::list_deliverables(&store, &session, deliverable.project_id).await.unwrap();
    assert_eq!(listed[0].status, DeliverableStatus::Draft);
    assert_eq!(listed[0].approved_by, None);
    assert!(dir.path().join(&deliverable.file_key).exists());
}

#[tokio::test]
async fn reopening_an_approved_deliverable_clears_the_approval() {
    let store = MemoryStore::new();
    let (_dir, objects) = storage();
    let author = editor(&store);
    let boss = owner(&store);
    let deliverable = deliverables::upload_deliverable(&store, &objects, &author, upload(Uuid::new_v4(), "plan.pdf", b"x"))
        .await
        .unwrap();
    let approved = deliverables::approve_deliverable(&store, &RecordingNotifier::default(), &boss, deliverable.id)
        .await
        .unwrap();

    let mut keep = DeliverableEdit::from(&approved);
    keep.description = Some("Issued for construction".into());
    let kept = deliverables::update_deliverable(&store, &author, approved.id, keep).await.unwrap();
    assert_eq!(kept.status, DeliverableStatus::Approved);
    assert_eq!(kept.approved_by, Some(boss.user_id));

    let mut reopen = DeliverableEdit::from(&kept);
    reopen.status = DeliverableStatus::InReview;
    let reopened = deliverables::update_deliverable(&store, &author, approved.id, reopen).await.unwrap();
    assert_eq!(reopened.status, DeliverableStatus::InReview);
    assert_eq!(reopened.approved_by, None);
    assert_eq!(reopened.approved_at, None);
    assert_eq!(reopened.file_key, deliverable.file_key);
    assert_eq!(reopened.version, 1);
}

#[tokio::test]
async fn delete_removes_row_then_file() {
    let store = MemoryStore::new();
    let (dir, objects) = storage();
    let session = editor(&store);
    let project_id = Uuid::new_v4();
    let deliverable = deliverables::upload_deliverable(&store, &objects, &session, upload(project_id, "plan.pdf", b"x"))
        .await
        .unwrap();

    deliverables::delete_deliverable(&store, &objects, &session, deliverable.id).await.unwrap();

    assert!(deliverables::list_deliverables(&store, &session, project_id).await.unwrap().is_empty());
    assert!(!dir.path().join(&deliverable.file_key).exists());
    assert!(matches!(
        deliverables::delete_deliverable(&store, &objects, &session, deliverable.id).await,
        Err(ActionError::NotFound("Deliverable"))
    ));
}
