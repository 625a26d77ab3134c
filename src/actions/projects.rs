use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{authorize, editor, failed};
use crate::auth::Session;
use crate::error::{ActionError, ActionResult};
use crate::models::{Project, ProjectFilter, ProjectInput, Role, DEFAULT_STAGES};
use crate::store::ProjectStore;
use crate::validation;

/// Creates the project together with its Kanban columns.
pub async fn create_project<S: ProjectStore + ?Sized>(
    store: &S,
    session: &Session,
    input: ProjectInput,
) -> ActionResult<Project> {
    authorize(session, Role::can_create_project)?;
    validation::project(&input)?;

    let stages: Vec<String> = if input.stages.is_empty() {
        DEFAULT_STAGES.iter().map(|s| s.to_string()).collect()
    } else {
        input.stages.iter().map(|s| s.trim().to_string()).collect()
    };

    let project = store
        .create_project(session.user_id, &input, &stages)
        .await
        .map_err(failed("create project"))?;

    info!(project_id = %project.id, stages = stages.len(), "project created");
    Ok(project)
}

pub async fn get_project<S: ProjectStore + ?Sized>(store: &S, _session: &Session, id: Uuid) -> ActionResult<Project> {
    store
        .get_project(id)
        .await
        .map_err(failed("load project"))?
        .ok_or(ActionError::NotFound("Project"))
}

/// Live projects, most recently updated first.
pub async fn list_projects<S: ProjectStore + ?Sized>(
    store: &S,
    _session: &Session,
    filter: ProjectFilter,
) -> ActionResult<Vec<Project>> {
    store.list_projects(&filter).await.map_err(failed("list projects"))
}

pub async fn update_project<S: ProjectStore + ?Sized>(
    store: &S,
    session: &Session,
    id: Uuid,
    input: ProjectInput,
) -> ActionResult<Project> {
    authorize(session, editor)?;
    validation::project(&input)?;

    let project = store
        .update_project(id, &input)
        .await
        .map_err(failed("update project"))?
        .ok_or(ActionError::NotFound("Project"))?;

    info!(project_id = %project.id, status = %project.status, "project updated");
    Ok(project)
}

pub async fn delete_project<S: ProjectStore + ?Sized>(store: &S, session: &Session, id: Uuid) -> ActionResult<()> {
    authorize(session, Role::can_delete_project)?;

    let deleted = store
        .soft_delete_project(id, Utc::now())
        .await
        .map_err(failed("delete project"))?;
    if !deleted {
        return Err(ActionError::NotFound("Project"));
    }

    info!(project_id = %id, "project deleted");
    Ok(())
}
