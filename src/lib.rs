//! ArchFlow: project, time and deliverable management for architecture
//! studios, backed by Postgres with a terminal front end.

pub mod actions;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod reports;
pub mod storage;
pub mod store;
pub mod ui;
pub mod validation;
