//! Kanban board: loading columns, column management and the index
//! arithmetic behind moving cards and columns around.

use std::collections::HashMap;

use tracing::{info, warn};
use uuid::Uuid;

use super::{authorize, editor, failed};
use crate::auth::Session;
use crate::error::{ActionError, ActionResult};
use crate::models::{Project, Stage, StageOrder, Task, TaskPosition};
use crate::store::{BoardStore, ProjectStore};
use crate::validation;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub stage: Stage,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub project: Project,
    pub columns: Vec<Column>,
}

impl Board {
    pub fn column_of(&self, task_id: Uuid) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.tasks.iter().any(|t| t.id == task_id))
    }

    pub fn task(&self, task_id: Uuid) -> Option<&Task> {
        self.columns.iter().flat_map(|c| c.tasks.iter()).find(|t| t.id == task_id)
    }
}

/// Stages sorted by `order`, each with its tasks sorted by `position`.
pub async fn load_board<S: ProjectStore + BoardStore + ?Sized>(
    store: &S,
    _session: &Session,
    project_id: Uuid,
) -> ActionResult<Board> {
    let project = store
        .get_project(project_id)
        .await
        .map_err(failed("load board"))?
        .ok_or(ActionError::NotFound("Project"))?;
    let mut stages = store.list_stages(project_id).await.map_err(failed("load board"))?;
    let tasks = store.list_tasks(project_id).await.map_err(failed("load board"))?;

    stages.sort_by_key(|s| s.order);
    let mut by_stage: HashMap<Uuid, Vec<Task>> = HashMap::new();
    for task in tasks {
        by_stage.entry(task.stage_id).or_default().push(task);
    }

    let columns = stages
        .into_iter()
        .map(|stage| {
            let mut tasks = by_stage.remove(&stage.id).unwrap_or_default();
            tasks.sort_by_key(|t| t.position);
            Column { stage, tasks }
        })
        .collect();

    Ok(Board { project, columns })
}

pub async fn create_stage<S: ProjectStore + BoardStore + ?Sized>(
    store: &S,
    session: &Session,
    project_id: Uuid,
    name: &str,
) -> ActionResult<Stage> {
    authorize(session, editor)?;
    validation::stage_name(name)?;

    if store.get_project(project_id).await.map_err(failed("create stage"))?.is_none() {
        return Err(ActionError::NotFound("Project"));
    }
    let stage = store
        .create_stage(project_id, name.trim())
        .await
        .map_err(failed("create stage"))?;

    info!(stage_id = %stage.id, order = stage.order, "stage created");
    Ok(stage)
}

pub async fn rename_stage<S: BoardStore + ?Sized>(
    store: &S,
    session: &Session,
    stage_id: Uuid,
    name: &str,
) -> ActionResult<Stage> {
    authorize(session, editor)?;
    validation::stage_name(name)?;

    store
        .rename_stage(stage_id, name.trim())
        .await
        .map_err(failed("rename stage"))?
        .ok_or(ActionError::NotFound("Stage"))
}

/// Applies a column reorder atomically: every stage gets its new order or
/// none does.
pub async fn update_stage_order<S: BoardStore + ?Sized>(
    store: &S,
    session: &Session,
    project_id: Uuid,
    updates: &[StageOrder],
) -> ActionResult<()> {
    authorize(session, editor)?;
    validation::stage_orders(updates)?;

    let stages = store
        .list_stages(project_id)
        .await
        .map_err(failed("update stage order"))?;
    let moved: HashMap<Uuid, i32> = updates.iter().map(|u| (u.id, u.order)).collect();
    if let Some(unknown) = updates.iter().find(|u| !stages.iter().any(|s| s.id == u.id)) {
        warn!(%project_id, stage_id = %unknown.id, "reorder names a stage outside the project");
        return Err(ActionError::NotFound("Stage"));
    }
    // Columns left out of the batch keep their order and still count
    validation::resolved_orders(stages.iter().map(|s| moved.get(&s.id).copied().unwrap_or(s.order)))?;

    store
        .reorder_stages(project_id, updates)
        .await
        .map_err(failed("update stage order"))?;

    info!(%project_id, stages = updates.len(), "stages reordered");
    Ok(())
}

/// Moves column `index` by `delta` places and renumbers every column.
/// Returns `None` when the move would leave the board.
pub fn move_stage(columns: &[Stage], index: usize, delta: isize) -> Option<Vec<StageOrder>> {
    let target = index.checked_add_signed(delta)?;
    if index >= columns.len() || target >= columns.len() {
        return None;
    }
    let mut ids: Vec<Uuid> = columns.iter().map(|s| s.id).collect();
    let id = ids.remove(index);
    ids.insert(target, id);
    Some(renumber(&ids).map(|(id, order)| StageOrder { id, order }).collect())
}

/// Moves card `index` within one column and renumbers the column.
pub fn move_task_within(column: &Column, index: usize, delta: isize) -> Option<Vec<TaskPosition>> {
    let target = index.checked_add_signed(delta)?;
    if index >= column.tasks.len() || target >= column.tasks.len() {
        return None;
    }
    let mut ids: Vec<Uuid> = column.tasks.iter().map(|t| t.id).collect();
    let id = ids.remove(index);
    ids.insert(target, id);
    Some(
        renumber(&ids)
            .map(|(id, position)| TaskPosition { id, position, stage_id: Some(column.stage.id) })
            .collect(),
    )
}

/// Moves a card to the end of another column. Both affected columns are
/// renumbered so positions stay dense.
pub fn move_task_to_stage(board: &Board, task_id: Uuid, target_stage: Uuid) -> Option<Vec<TaskPosition>> {
    let from = board.column_of(task_id)?;
    let to = board.columns.iter().position(|c| c.stage.id == target_stage)?;
    if from == to {
        return None;
    }

    let source: Vec<Uuid> = board.columns[from]
        .tasks
        .iter()
        .map(|t| t.id)
        .filter(|id| *id != task_id)
        .collect();
    let mut target: Vec<Uuid> = board.columns[to].tasks.iter().map(|t| t.id).collect();
    target.push(task_id);

    let source_stage = board.columns[from].stage.id;
    let mut updates: Vec<TaskPosition> = renumber(&source)
        .map(|(id, position)| TaskPosition { id, position, stage_id: Some(source_stage) })
        .collect();
    updates.extend(
        renumber(&target).map(|(id, position)| TaskPosition { id, position, stage_id: Some(target_stage) }),
    );
    Some(updates)
}

fn renumber(ids: &[Uuid]) -> impl Iterator<Item = (Uuid, i32)> + '_ {
    ids.iter().zip(0..).map(|(id, n)| (*id, n))
}
