//! Task mutations. Each state change appends one entry to the task's
//! history before it is persisted.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{authorize, failed};
use crate::auth::Session;
use crate::error::{ActionError, ActionResult};
use crate::models::{
    HistoryEntry, HistoryKind, NewTask, Role, Task, TaskChanges, TaskHistory, TaskInput, TaskMove, TaskPosition,
};
use crate::notify::{Notification, Notifier};
use crate::store::BoardStore;
use crate::validation;

fn history_entry(session: &Session, kind: HistoryKind, details: impl Into<String>) -> HistoryEntry {
    HistoryEntry {
        date: Utc::now(),
        user_id: session.user_id,
        user_name: Some(session.user_name.clone()),
        kind,
        details: details.into(),
    }
}

fn status_changed(stage_name: &str) -> String {
    format!("Status changed to {stage_name}")
}

/// Tells the assignee about a change made by someone else.
fn notify_assignee(notifier: &dyn Notifier, session: &Session, task: &Task, title: &str, message: String) {
    match task.assignee_id {
        Some(assignee) if assignee != session.user_id => {
            notifier.publish(Notification::new(assignee, title, message).about("TASK", task.id));
        }
        _ => debug!(task_id = %task.id, "no assignee to notify"),
    }
}

/// Creates a task at the end of its column with a CREATED history entry.
pub async fn create_task<S: BoardStore + ?Sized>(
    store: &S,
    notifier: &dyn Notifier,
    session: &Session,
    project_id: Uuid,
    stage_id: Uuid,
    input: TaskInput,
) -> ActionResult<Task> {
    authorize(session, Role::can_edit_task)?;
    validation::task_title(&input.title)?;

    let stage = store
        .get_stage(stage_id)
        .await
        .map_err(failed("create task"))?
        .filter(|s| s.project_id == project_id)
        .ok_or(ActionError::NotFound("Stage"))?;

    let mut history = TaskHistory::default();
    history.record(history_entry(session, HistoryKind::Created, "Task created"));

    let task = store
        .insert_task(&NewTask {
            project_id,
            stage_id: stage.id,
            title: input.title.trim().to_string(),
            description: input.description,
            priority: input.priority.unwrap_or_default(),
            assignee_id: input.assignee_id,
            due_date: input.due_date,
            tags: input.tags,
            history,
        })
        .await
        .map_err(failed("create task"))?;

    info!(task_id = %task.id, stage = %stage.name, "task created");
    notify_assignee(
        notifier,
        session,
        &task,
        "New task assigned",
        format!("{} assigned you \"{}\"", session.user_name, task.title),
    );
    Ok(task)
}

/// Applies `changes` and records which fields moved. A no-op edit leaves the
/// task and its history untouched.
pub async fn update_task<S: BoardStore + ?Sized>(
    store: &S,
    notifier: &dyn Notifier,
    session: &Session,
    task_id: Uuid,
    changes: TaskChanges,
) -> ActionResult<Task> {
    authorize(session, Role::can_edit_task)?;
    if let Some(title) = &changes.title {
        validation::task_title(title)?;
    }

    let mut task = store
        .get_task(task_id)
        .await
        .map_err(failed("update task"))?
        .ok_or(ActionError::NotFound("Task"))?;

    let previous_assignee = task.assignee_id;
    let changed = changes.apply(&mut task);
    if changed.is_empty() {
        return Ok(task);
    }
    task.title = task.title.trim().to_string();
    task.historico
        .0
        .record(history_entry(session, HistoryKind::Updated, format!("Updated {}", changed.join(", "))));

    let task = store.save_task(&task).await.map_err(failed("update task"))?;

    info!(task_id = %task.id, fields = ?changed, "task updated");
    if task.assignee_id != previous_assignee {
        notify_assignee(
            notifier,
            session,
            &task,
            "New task assigned",
            format!("{} assigned you \"{}\"", session.user_name, task.title),
        );
    }
    Ok(task)
}

/// Moves a task to the end of another column of the same project.
pub async fn update_task_stage<S: BoardStore + ?Sized>(
    store: &S,
    notifier: &dyn Notifier,
    session: &Session,
    task_id: Uuid,
    stage_id: Uuid,
) -> ActionResult<Task> {
    authorize(session, Role::can_edit_task)?;

    let mut task = store
        .get_task(task_id)
        .await
        .map_err(failed("move task"))?
        .ok_or(ActionError::NotFound("Task"))?;
    let stage = store
        .get_stage(stage_id)
        .await
        .map_err(failed("move task"))?
        .filter(|s| s.project_id == task.project_id)
        .ok_or(ActionError::NotFound("Stage"))?;
    if task.stage_id == stage.id {
        return Ok(task);
    }

    let siblings = store.list_tasks(task.project_id).await.map_err(failed("move task"))?;
    task.position = siblings
        .iter()
        .filter(|t| t.stage_id == stage.id)
        .map(|t| t.position + 1)
        .max()
        .unwrap_or(0);
    task.stage_id = stage.id;
    task.historico
        .0
        .record(history_entry(session, HistoryKind::StatusChanged, status_changed(&stage.name)));

    let task = store.save_task(&task).await.map_err(failed("move task"))?;

    info!(task_id = %task.id, stage = %stage.name, "task moved");
    notify_assignee(
        notifier,
        session,
        &task,
        "Task updated",
        format!("\"{}\" moved to {}", task.title, stage.name),
    );
    Ok(task)
}

/// Applies a batch of card placements atomically. Cards that land in a
/// different column get a STATUS_CHANGED entry in the same write.
pub async fn update_task_positions<S: BoardStore + ?Sized>(
    store: &S,
    session: &Session,
    project_id: Uuid,
    updates: &[TaskPosition],
) -> ActionResult<()> {
    authorize(session, Role::can_edit_task)?;
    validation::task_positions(updates)?;

    let tasks = store
        .list_tasks(project_id)
        .await
        .map_err(failed("update task positions"))?;
    let stages = store
        .list_stages(project_id)
        .await
        .map_err(failed("update task positions"))?;
    let tasks: HashMap<Uuid, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
    let stage_names: HashMap<Uuid, &str> = stages.iter().map(|s| (s.id, s.name.as_str())).collect();

    let mut moves = Vec::with_capacity(updates.len());
    for update in updates {
        let task = tasks.get(&update.id).ok_or(ActionError::NotFound("Task"))?;
        let stage_id = update.stage_id.unwrap_or(task.stage_id);
        let stage_name = stage_names.get(&stage_id).ok_or(ActionError::NotFound("Stage"))?;

        let history = (stage_id != task.stage_id).then(|| {
            let mut history = task.historico.0.clone();
            history.record(history_entry(session, HistoryKind::StatusChanged, status_changed(stage_name)));
            history
        });
        moves.push(TaskMove {
            id: update.id,
            stage_id,
            position: update.position,
            history,
        });
    }
    // Cards left out of the batch keep their slot and still count
    let untouched = tasks
        .values()
        .filter(|t| !moves.iter().any(|m| m.id == t.id))
        .map(|t| (t.stage_id, t.position));
    validation::resolved_slots(moves.iter().map(|m| (m.stage_id, m.position)).chain(untouched))?;

    store
        .reorder_tasks(project_id, &moves)
        .await
        .map_err(failed("update task positions"))?;

    info!(%project_id, tasks = moves.len(), "tasks reordered");
    Ok(())
}

pub async fn delete_task<S: BoardStore + ?Sized>(store: &S, session: &Session, task_id: Uuid) -> ActionResult<()> {
    authorize(session, Role::can_delete_task)?;

    let deleted = store.delete_task(task_id).await.map_err(failed("delete task"))?;
    if !deleted {
        return Err(ActionError::NotFound("Task"));
    }

    info!(%task_id, "task deleted");
    Ok(())
}
