use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(sqlx::Type, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "time_log_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeLogCategory {
    #[default]
    Design,
    Meeting,
    Development,
    SiteVisit,
    Documentation,
    Admin,
    Other,
}

impl TimeLogCategory {
    pub const ALL: [TimeLogCategory; 7] = [
        TimeLogCategory::Design,
        TimeLogCategory::Meeting,
        TimeLogCategory::Development,
        TimeLogCategory::SiteVisit,
        TimeLogCategory::Documentation,
        TimeLogCategory::Admin,
        TimeLogCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeLogCategory::Design => "DESIGN",
            TimeLogCategory::Meeting => "MEETING",
            TimeLogCategory::Development => "DEVELOPMENT",
            TimeLogCategory::SiteVisit => "SITE_VISIT",
            TimeLogCategory::Documentation => "DOCUMENTATION",
            TimeLogCategory::Admin => "ADMIN",
            TimeLogCategory::Other => "OTHER",
        }
    }
}

/// Recorded work. `duration` is in hours and stays 0 while a timer runs.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct TimeLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub category: TimeLogCategory,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: f64,
    pub billable: bool,
    pub bill_rate: Option<f64>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl TimeLog {
    pub fn is_running(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_none()
    }
}

/// Manual entry or edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeLogInput {
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub category: TimeLogCategory,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: f64,
    pub billable: bool,
    pub bill_rate: Option<f64>,
    pub tags: Vec<String>,
}

impl TimeLogInput {
    pub fn new(date: NaiveDate, duration: f64) -> Self {
        Self {
            project_id: None,
            task_id: None,
            client_id: None,
            category: TimeLogCategory::default(),
            description: None,
            date,
            start_time: None,
            end_time: None,
            duration,
            billable: true,
            bill_rate: None,
            tags: Vec::new(),
        }
    }
}

impl From<&TimeLog> for TimeLogInput {
    fn from(log: &TimeLog) -> Self {
        Self {
            project_id: log.project_id,
            task_id: log.task_id,
            client_id: log.client_id,
            category: log.category,
            description: log.description.clone(),
            date: log.date,
            start_time: log.start_time,
            end_time: log.end_time,
            duration: log.duration,
            billable: log.billable,
            bill_rate: log.bill_rate,
            tags: log.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimerStart {
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub category: TimeLogCategory,
    pub description: Option<String>,
    pub billable: bool,
    pub bill_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeLogFilter {
    pub project_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

/// Hours between two instants; a clock that went backwards yields zero.
pub fn timer_duration_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let millis = (end - start).num_milliseconds().max(0);
    millis as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn timer_duration_is_in_hours() {
        let start = Utc::now();
        let end = start + Duration::minutes(90);
        assert_eq!(timer_duration_hours(start, end), 1.5);
    }

    #[test]
    fn timer_duration_never_negative() {
        let start = Utc::now();
        assert_eq!(timer_duration_hours(start, start - Duration::seconds(5)), 0.0);
    }
}
