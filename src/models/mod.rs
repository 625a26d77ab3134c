mod activity;
mod client;
mod deliverable;
mod page;
mod project;
mod report;
mod stage;
mod task;
mod time_log;
mod user;

pub use activity::{Activity, ActivityFilter, ActivityInput, ActivityStatus, ActivityType};
pub use client::{Client, ClientCategory, ClientInput, ClientLegalType, ClientStatus};
pub use deliverable::{
    Deliverable, DeliverableEdit, DeliverableInput, DeliverableStatus, DeliverableType, DeliverableUpload,
};
pub use page::{Page, Paginated};
pub use project::{
    ArchitecturalStyle, ConstructionType, Project, ProjectFilter, ProjectInput, ProjectVisibility,
    CLOSED_PROJECT_STATUSES, DEFAULT_PROJECT_STATUS, DEFAULT_STAGES, PROJECT_STATUSES,
};
pub use report::{CategoryHours, DayHours, NamedHours, StatusCount, UrgentProject, UserHours};
pub use stage::{Stage, StageOrder};
pub use task::{
    HistoryEntry, HistoryKind, NewTask, Priority, Task, TaskChanges, TaskHistory, TaskInput, TaskMove,
    TaskPosition,
};
pub use time_log::{timer_duration_hours, TimeLog, TimeLogCategory, TimeLogFilter, TimeLogInput, TimerStart};
pub use user::{NewUser, RegisterInput, Role, User, UserSummary};
