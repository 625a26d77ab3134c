use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(sqlx::Type, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "activity_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    #[default]
    Meeting,
    Call,
    Email,
    SiteVisit,
    Design,
    Revision,
    Approval,
    Admin,
    Other,
}

impl ActivityType {
    pub const ALL: [ActivityType; 9] = [
        ActivityType::Meeting,
        ActivityType::Call,
        ActivityType::Email,
        ActivityType::SiteVisit,
        ActivityType::Design,
        ActivityType::Revision,
        ActivityType::Approval,
        ActivityType::Admin,
        ActivityType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::Meeting => "MEETING",
            ActivityType::Call => "CALL",
            ActivityType::Email => "EMAIL",
            ActivityType::SiteVisit => "SITE_VISIT",
            ActivityType::Design => "DESIGN",
            ActivityType::Revision => "REVISION",
            ActivityType::Approval => "APPROVAL",
            ActivityType::Admin => "ADMIN",
            ActivityType::Other => "OTHER",
        }
    }
}

#[derive(sqlx::Type, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "activity_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl ActivityStatus {
    pub const ALL: [ActivityStatus; 4] = [
        ActivityStatus::Scheduled,
        ActivityStatus::InProgress,
        ActivityStatus::Completed,
        ActivityStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityStatus::Scheduled => "SCHEDULED",
            ActivityStatus::InProgress => "IN_PROGRESS",
            ActivityStatus::Completed => "COMPLETED",
            ActivityStatus::Cancelled => "CANCELLED",
        }
    }
}

/// A calendar event. `duration` is in minutes.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: Uuid,
    #[sqlx(rename = "activity_type")]
    pub kind: ActivityType,
    pub title: String,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub participants: Vec<Uuid>,
    pub client_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub status: ActivityStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityInput {
    pub kind: ActivityType,
    pub title: String,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub participants: Vec<Uuid>,
    pub client_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub status: ActivityStatus,
    pub notes: Option<String>,
}

impl ActivityInput {
    pub fn new(kind: ActivityType, title: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: None,
            duration: None,
            start_time,
            end_time: None,
            location: None,
            contact_email: None,
            participants: Vec::new(),
            client_id: None,
            project_id: None,
            task_id: None,
            status: ActivityStatus::default(),
            notes: None,
        }
    }
}

impl From<&Activity> for ActivityInput {
    fn from(activity: &Activity) -> Self {
        Self {
            kind: activity.kind,
            title: activity.title.clone(),
            description: activity.description.clone(),
            duration: activity.duration,
            start_time: activity.start_time,
            end_time: activity.end_time,
            location: activity.location.clone(),
            contact_email: activity.contact_email.clone(),
            participants: activity.participants.clone(),
            client_id: activity.client_id,
            project_id: activity.project_id,
            task_id: activity.task_id,
            status: activity.status,
            notes: activity.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityFilter {
    pub client_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub kind: Option<ActivityType>,
}
