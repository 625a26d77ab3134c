use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(sqlx::Type, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryKind {
    Created,
    StatusChanged,
    Updated,
}

/// One audit event in a task's `historico`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub user_id: Uuid,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    pub details: String,
}

/// Append-only audit trail. Entries can be added and read, never edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHistory(Vec<HistoryEntry>);

impl TaskHistory {
    pub fn record(&mut self, entry: HistoryEntry) {
        self.0.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.0.last()
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub stage_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub position: i32,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub historico: Json<TaskHistory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
}

/// Partial edit of a task; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<Option<Uuid>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub tags: Option<Vec<String>>,
}

impl TaskChanges {
    /// Applies the changes and returns the names of the fields that differ.
    pub fn apply(self, task: &mut Task) -> Vec<&'static str> {
        let mut changed = Vec::new();
        set_field(&mut task.title, self.title, "title", &mut changed);
        set_field(&mut task.description, self.description, "description", &mut changed);
        set_field(&mut task.priority, self.priority, "priority", &mut changed);
        set_field(&mut task.assignee_id, self.assignee_id, "assignee", &mut changed);
        set_field(&mut task.due_date, self.due_date, "due date", &mut changed);
        set_field(&mut task.tags, self.tags, "tags", &mut changed);
        changed
    }
}

fn set_field<T: PartialEq>(
    field: &mut T,
    value: Option<T>,
    name: &'static str,
    changed: &mut Vec<&'static str>,
) {
    if let Some(value) = value {
        if *field != value {
            *field = value;
            changed.push(name);
        }
    }
}

/// Row to insert; position is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: Uuid,
    pub stage_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub history: TaskHistory,
}

/// A requested placement, as sent by the board after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPosition {
    pub id: Uuid,
    pub position: i32,
    pub stage_id: Option<Uuid>,
}

/// A resolved placement handed to the store. `history` is set only when the
/// task changed stage and needs its ledger rewritten with the new entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskMove {
    pub id: Uuid,
    pub stage_id: Uuid,
    pub position: i32,
    pub history: Option<TaskHistory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            stage_id: Uuid::new_v4(),
            title: "Facade study".into(),
            description: None,
            priority: Priority::Medium,
            position: 0,
            assignee_id: None,
            due_date: None,
            tags: Vec::new(),
            historico: Json(TaskHistory::default()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn apply_reports_only_fields_that_differ() {
        let mut task = task();
        let changes = TaskChanges {
            title: Some("Facade study".into()),
            priority: Some(Priority::High),
            description: Some(Some("north side".into())),
            ..Default::default()
        };
        assert_eq!(changes.apply(&mut task), vec!["description", "priority"]);
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn history_serializes_with_camel_case_and_type_key() {
        let mut history = TaskHistory::default();
        history.record(HistoryEntry {
            date: Utc::now(),
            user_id: Uuid::nil(),
            user_name: None,
            kind: HistoryKind::StatusChanged,
            details: "Status changed to Done".into(),
        });
        let value = serde_json::to_value(&history).unwrap();
        let entry = &value.as_array().unwrap()[0];
        assert_eq!(entry["type"], "STATUS_CHANGED");
        assert!(entry.get("userId").is_some());
    }
}
