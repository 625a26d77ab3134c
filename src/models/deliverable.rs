use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(sqlx::Type, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "deliverable_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliverableType {
    #[default]
    Drawing,
    #[sqlx(rename = "MODEL_3D")]
    #[serde(rename = "MODEL_3D")]
    Model3d,
    Render,
    Report,
    Specification,
    Contract,
    Other,
}

impl DeliverableType {
    pub const ALL: [DeliverableType; 7] = [
        DeliverableType::Drawing,
        DeliverableType::Model3d,
        DeliverableType::Render,
        DeliverableType::Report,
        DeliverableType::Specification,
        DeliverableType::Contract,
        DeliverableType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeliverableType::Drawing => "DRAWING",
            DeliverableType::Model3d => "MODEL_3D",
            DeliverableType::Render => "RENDER",
            DeliverableType::Report => "REPORT",
            DeliverableType::Specification => "SPECIFICATION",
            DeliverableType::Contract => "CONTRACT",
            DeliverableType::Other => "OTHER",
        }
    }
}

#[derive(sqlx::Type, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "deliverable_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliverableStatus {
    #[default]
    Draft,
    InReview,
    Approved,
    Rejected,
}

impl DeliverableStatus {
    pub const ALL: [DeliverableStatus; 4] = [
        DeliverableStatus::Draft,
        DeliverableStatus::InReview,
        DeliverableStatus::Approved,
        DeliverableStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeliverableStatus::Draft => "DRAFT",
            DeliverableStatus::InReview => "IN_REVIEW",
            DeliverableStatus::Approved => "APPROVED",
            DeliverableStatus::Rejected => "REJECTED",
        }
    }

    /// Approval and rejection record a reviewer, so only owners set them.
    pub fn is_review(self) -> bool {
        matches!(self, DeliverableStatus::Approved | DeliverableStatus::Rejected)
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Deliverable {
    pub id: Uuid,
    pub project_id: Uuid,
    pub task_id: Option<Uuid>,
    pub name: String,
    #[sqlx(rename = "deliverable_type")]
    pub kind: DeliverableType,
    pub description: Option<String>,
    pub file_url: String,
    pub file_key: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub version: i32,
    pub status: DeliverableStatus,
    pub tags: Vec<String>,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row values for a deliverable, after its file has been stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverableInput {
    pub project_id: Uuid,
    pub task_id: Option<Uuid>,
    pub name: String,
    pub kind: DeliverableType,
    pub description: Option<String>,
    pub file_url: String,
    pub file_key: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub version: i32,
    pub status: DeliverableStatus,
    pub tags: Vec<String>,
}

impl From<&Deliverable> for DeliverableInput {
    fn from(deliverable: &Deliverable) -> Self {
        Self {
            project_id: deliverable.project_id,
            task_id: deliverable.task_id,
            name: deliverable.name.clone(),
            kind: deliverable.kind,
            description: deliverable.description.clone(),
            file_url: deliverable.file_url.clone(),
            file_key: deliverable.file_key.clone(),
            file_size: deliverable.file_size,
            mime_type: deliverable.mime_type.clone(),
            version: deliverable.version,
            status: deliverable.status,
            tags: deliverable.tags.clone(),
        }
    }
}

/// The fields an edit may change. File, version and reviewer stay with the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverableEdit {
    pub task_id: Option<Uuid>,
    pub name: String,
    pub kind: DeliverableType,
    pub description: Option<String>,
    pub status: DeliverableStatus,
    pub tags: Vec<String>,
}

impl From<&Deliverable> for DeliverableEdit {
    fn from(deliverable: &Deliverable) -> Self {
        Self {
            task_id: deliverable.task_id,
            name: deliverable.name.clone(),
            kind: deliverable.kind,
            description: deliverable.description.clone(),
            status: deliverable.status,
            tags: deliverable.tags.clone(),
        }
    }
}

impl DeliverableInput {
    /// Row values for `current` with the edited fields applied.
    pub fn edited(current: &Deliverable, edit: DeliverableEdit) -> Self {
        Self {
            task_id: edit.task_id,
            name: edit.name.trim().to_string(),
            kind: edit.kind,
            description: edit.description,
            status: edit.status,
            tags: edit.tags,
            ..Self::from(current)
        }
    }
}

/// A file submitted for storage along with its descriptive fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliverableUpload {
    pub project_id: Uuid,
    pub task_id: Option<Uuid>,
    pub name: String,
    pub kind: DeliverableType,
    pub description: Option<String>,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub tags: Vec<String>,
}
