//! Terminal front end.

pub mod activities;
pub mod activity_wizard;
pub mod app;
pub mod board;
pub mod client_wizard;
pub mod clients;
pub mod components;
pub mod dashboard;
pub mod deliverable_wizard;
pub mod deliverables;
pub mod home;
pub mod login;
pub mod project_wizard;
pub mod projects;
pub mod reports;
pub mod task_wizard;
pub mod time_log_wizard;
pub mod time_logs;

pub use app::App;
