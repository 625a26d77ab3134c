use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use super::{authorize, editor, failed};
use crate::auth::Session;
use crate::error::{ActionError, ActionResult};
use crate::models::{Client, ClientInput, Page, Paginated, Role};
use crate::store::ClientStore;
use crate::validation;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub async fn create_client<S: ClientStore + ?Sized>(
    store: &S,
    session: &Session,
    input: ClientInput,
) -> ActionResult<Client> {
    authorize(session, Role::can_create_client)?;
    validation::client(&input)?;

    let client = store
        .create_client(session.user_id, &input)
        .await
        .map_err(failed("create client"))?;

    info!(client_id = %client.id, "client created");
    Ok(client)
}

pub async fn get_client<S: ClientStore + ?Sized>(store: &S, _session: &Session, id: Uuid) -> ActionResult<Client> {
    store
        .get_client(id)
        .await
        .map_err(failed("load client"))?
        .ok_or(ActionError::NotFound("Client"))
}

pub async fn update_client<S: ClientStore + ?Sized>(
    store: &S,
    session: &Session,
    id: Uuid,
    input: ClientInput,
) -> ActionResult<Client> {
    authorize(session, editor)?;
    validation::client(&input)?;

    let client = store
        .update_client(id, &input)
        .await
        .map_err(failed("update client"))?
        .ok_or(ActionError::NotFound("Client"))?;

    info!(client_id = %client.id, "client updated");
    Ok(client)
}

/// Marks the client deleted and INACTIVE. The row is kept.
pub async fn soft_delete_client<S: ClientStore + ?Sized>(store: &S, session: &Session, id: Uuid) -> ActionResult<()> {
    soft_delete_client_at(store, session, id, Utc::now()).await
}

pub async fn soft_delete_client_at<S: ClientStore + ?Sized>(
    store: &S,
    session: &Session,
    id: Uuid,
    at: DateTime<Utc>,
) -> ActionResult<()> {
    authorize(session, editor)?;

    let deleted = store
        .soft_delete_client(id, at)
        .await
        .map_err(failed("delete client"))?;
    if !deleted {
        return Err(ActionError::NotFound("Client"));
    }

    info!(client_id = %id, "client soft-deleted");
    Ok(())
}

/// Live clients matching `query` on name, email or document, newest first.
pub async fn list_clients<S: ClientStore + ?Sized>(
    store: &S,
    _session: &Session,
    query: Option<&str>,
    page: Page,
) -> ActionResult<Paginated<Client>> {
    store.list_clients(query, page).await.map_err(failed("list clients"))
}
