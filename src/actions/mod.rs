//! Request handlers. Each one authorizes the session, validates its input,
//! then issues one store call (or one transactional batch). Store failures
//! are logged and surfaced as a single readable message.

pub mod activities;
pub mod board;
pub mod clients;
pub mod deliverables;
pub mod projects;
pub mod reports;
pub mod tasks;
pub mod time_logs;

use tracing::error;

use crate::auth::Session;
use crate::error::{ActionError, ActionResult};
use crate::models::Role;

pub(crate) fn authorize(session: &Session, allowed: fn(Role) -> bool) -> ActionResult<()> {
    if allowed(session.role) {
        Ok(())
    } else {
        tracing::warn!(user_id = %session.user_id, role = %session.role, "action not permitted");
        Err(ActionError::Unauthorized)
    }
}

pub(crate) fn editor(role: Role) -> bool {
    role.has_access(Role::Editor)
}

pub(crate) fn owner(role: Role) -> bool {
    role.has_access(Role::Owner)
}

/// Maps a store error to the message shown to the user, logging the cause.
pub(crate) fn failed(action: &'static str) -> impl FnOnce(anyhow::Error) -> ActionError {
    move |e| {
        error!("failed to {action}: {e:#}");
        ActionError::Failed(format!("Failed to {action}."))
    }
}
