//! Deliverables pair a database row with a stored file. The file is written
//! first; when the row cannot be written the file is removed again.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{authorize, editor, failed, owner};
use crate::auth::Session;
use crate::error::{ActionError, ActionResult, FieldErrors};
use crate::models::{Deliverable, DeliverableEdit, DeliverableInput, DeliverableStatus, DeliverableUpload};
use crate::notify::{Notification, Notifier};
use crate::storage::{mime_for, ObjectStore, StoredObject};
use crate::store::DeliverableStore;
use crate::validation;

/// Best-effort removal of an object that no row points at anymore.
async fn discard(objects: &dyn ObjectStore, key: &str) {
    if let Err(e) = objects.delete(key).await {
        warn!(%key, "failed to remove stored object: {e:#}");
    }
}

async fn load<S: DeliverableStore + ?Sized>(store: &S, id: Uuid, action: &'static str) -> ActionResult<Deliverable> {
    store
        .get_deliverable(id)
        .await
        .map_err(failed(action))?
        .ok_or(ActionError::NotFound("Deliverable"))
}

/// Stores the file and creates version 1 of the deliverable as a draft.
pub async fn upload_deliverable<S: DeliverableStore + ?Sized>(
    store: &S,
    objects: &dyn ObjectStore,
    session: &Session,
    upload: DeliverableUpload,
) -> ActionResult<Deliverable> {
    authorize(session, editor)?;
    validation::deliverable_name(&upload.name)?;

    let mime = mime_for(&upload.file_name);
    let StoredObject { key, url } = objects
        .upload(&upload.file_name, &upload.bytes, mime.essence_str())
        .await
        .map_err(failed("upload file"))?;

    let input = DeliverableInput {
        project_id: upload.project_id,
        task_id: upload.task_id,
        name: upload.name.trim().to_string(),
        kind: upload.kind,
        description: upload.description,
        file_url: url,
        file_key: key.clone(),
        file_size: i64::try_from(upload.bytes.len()).ok(),
        mime_type: Some(mime.essence_str().to_string()),
        version: 1,
        status: DeliverableStatus::Draft,
        tags: upload.tags,
    };
    if let Err(errors) = validation::deliverable(&input) {
        discard(objects, &key).await;
        return Err(errors.into());
    }

    match store.create_deliverable(session.user_id, &input).await {
        Ok(deliverable) => {
            info!(deliverable_id = %deliverable.id, %key, "deliverable uploaded");
            Ok(deliverable)
        }
        Err(e) => {
            discard(objects, &key).await;
            Err(failed("create deliverable")(e))
        }
    }
}

/// Edits the descriptive fields. The stored file and version are kept, and
/// approval or rejection is left to the owner-only review actions.
pub async fn update_deliverable<S: DeliverableStore + ?Sized>(
    store: &S,
    session: &Session,
    id: Uuid,
    edit: DeliverableEdit,
) -> ActionResult<Deliverable> {
    authorize(session, editor)?;
    validation::deliverable_name(&edit.name)?;
    let current = load(store, id, "update deliverable").await?;

    if edit.status != current.status && edit.status.is_review() {
        let mut errors = FieldErrors::new();
        errors.add("status", "Approve or reject the deliverable to review it");
        return Err(errors.into());
    }

    let input = DeliverableInput::edited(&current, edit);
    let deliverable = store
        .update_deliverable(id, &input)
        .await
        .map_err(failed("update deliverable"))?
        .ok_or(ActionError::NotFound("Deliverable"))?;

    info!(deliverable_id = %deliverable.id, status = deliverable.status.as_str(), "deliverable updated");
    Ok(deliverable)
}

/// Replaces the file, bumps the version and sends the deliverable back to
/// draft. The previous file is removed once the row points at the new one.
pub async fn new_deliverable_version<S: DeliverableStore + ?Sized>(
    store: &S,
    objects: &dyn ObjectStore,
    session: &Session,
    id: Uuid,
    file_name: &str,
    bytes: &[u8],
) -> ActionResult<Deliverable> {
    authorize(session, editor)?;
    let current = load(store, id, "upload new version").await?;

    let mime = mime_for(file_name);
    let StoredObject { key, url } = objects
        .upload(file_name, bytes, mime.essence_str())
        .await
        .map_err(failed("upload file"))?;

    let mut input = DeliverableInput::from(&current);
    input.file_url = url;
    input.file_key = key.clone();
    input.file_size = i64::try_from(bytes.len()).ok();
    input.mime_type = Some(mime.essence_str().to_string());
    input.version = current.version + 1;
    input.status = DeliverableStatus::Draft;

    let updated = match store.update_deliverable(id, &input).await {
        Ok(Some(updated)) => updated,
        Ok(None) => {
            discard(objects, &key).await;
            return Err(ActionError::NotFound("Deliverable"));
        }
        Err(e) => {
            discard(objects, &key).await;
            return Err(failed("upload new version")(e));
        }
    };
    discard(objects, &current.file_key).await;

    info!(deliverable_id = %id, version = updated.version, "deliverable version uploaded");
    Ok(updated)
}

/// Marks the deliverable approved by the session user and tells its author.
pub async fn approve_deliverable<S: DeliverableStore + ?Sized>(
    store: &S,
    notifier: &dyn Notifier,
    session: &Session,
    id: Uuid,
) -> ActionResult<Deliverable> {
    authorize(session, owner)?;

    let deliverable = store
        .set_deliverable_status(id, DeliverableStatus::Approved, Some(session.user_id), Utc::now())
        .await
        .map_err(failed("approve deliverable"))?
        .ok_or(ActionError::NotFound("Deliverable"))?;

    info!(deliverable_id = %id, approved_by = %session.user_id, "deliverable approved");
    if deliverable.created_by != session.user_id {
        notifier.publish(
            Notification::new(
                deliverable.created_by,
                "Deliverable approved",
                format!("{} approved \"{}\" v{}", session.user_name, deliverable.name, deliverable.version),
            )
            .about("DELIVERABLE", deliverable.id),
        );
    }
    Ok(deliverable)
}

pub async fn reject_deliverable<S: DeliverableStore + ?Sized>(
    store: &S,
    session: &Session,
    id: Uuid,
) -> ActionResult<Deliverable> {
    authorize(session, owner)?;

    let deliverable = store
        .set_deliverable_status(id, DeliverableStatus::Rejected, None, Utc::now())
        .await
        .map_err(failed("reject deliverable"))?
        .ok_or(ActionError::NotFound("Deliverable"))?;

    info!(deliverable_id = %id, "deliverable rejected");
    Ok(deliverable)
}

/// Removes the row, then its stored file.
pub async fn delete_deliverable<S: DeliverableStore + ?Sized>(
    store: &S,
    objects: &dyn ObjectStore,
    session: &Session,
    id: Uuid,
) -> ActionResult<()> {
    authorize(session, editor)?;
    let deliverable = load(store, id, "delete deliverable").await?;

    if !store.delete_deliverable(id).await.map_err(failed("delete deliverable"))? {
        return Err(ActionError::NotFound("Deliverable"));
    }
    objects
        .delete(&deliverable.file_key)
        .await
        .map_err(failed("delete stored file"))?;

    info!(deliverable_id = %id, key = %deliverable.file_key, "deliverable deleted");
    Ok(())
}

/// Most recently updated first.
pub async fn list_deliverables<S: DeliverableStore + ?Sized>(
    store: &S,
    _session: &Session,
    project_id: Uuid,
) -> ActionResult<Vec<Deliverable>> {
    store
        .list_deliverables(project_id)
        .await
        .map_err(failed("list deliverables"))
}
