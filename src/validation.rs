//! Field-level checks run by the actions before any store call.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;
use uuid::Uuid;

use crate::error::FieldErrors;
use crate::models::{
    ActivityInput, ClientInput, DeliverableInput, ProjectInput, RegisterInput, StageOrder, TaskPosition,
    TimeLogInput,
};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .unwrap_or_else(|e| panic!("email pattern does not compile: {e}"))
});

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Absolute http(s) URL with a host.
pub fn is_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}

fn min_chars(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}

pub fn client(input: &ClientInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require(min_chars(&input.name, 2), "name", "Name must be at least 2 characters");
    errors.require(is_email(&input.email), "email", "Invalid email address");
    if let Some(website) = input.website.as_deref().filter(|w| !w.trim().is_empty()) {
        errors.require(is_url(website), "website", "Invalid URL");
    }
    errors.into_result()
}

pub fn activity(input: &ActivityInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require(min_chars(&input.title, 2), "title", "Title is required");
    if let Some(duration) = input.duration {
        errors.require(duration >= 0, "duration", "Duration cannot be negative");
    }
    if let Some(end) = input.end_time {
        errors.require(end >= input.start_time, "end_time", "End time must be after start time");
    }
    if let Some(email) = input.contact_email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        errors.require(is_email(email), "email", "Invalid email address");
    }
    errors.into_result()
}

pub fn time_log(input: &TimeLogInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require(
        input.duration.is_finite() && input.duration > 0.0,
        "duration",
        "Duration must be positive",
    );
    if let Some(rate) = input.bill_rate {
        errors.require(rate.is_finite() && rate >= 0.0, "bill_rate", "Bill rate cannot be negative");
    }
    if let (Some(start), Some(end)) = (input.start_time, input.end_time) {
        errors.require(end >= start, "end_time", "End time must be after start time");
    }
    errors.into_result()
}

pub fn timer_rate(bill_rate: Option<f64>) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if let Some(rate) = bill_rate {
        errors.require(rate.is_finite() && rate >= 0.0, "bill_rate", "Bill rate cannot be negative");
    }
    errors.into_result()
}

pub fn deliverable_name(name: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require(min_chars(name, 2), "name", "Name is required");
    errors.into_result()
}

pub fn deliverable(input: &DeliverableInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require(min_chars(&input.name, 2), "name", "Name is required");
    errors.require(is_url(&input.file_url), "file_url", "File URL is required");
    errors.require(input.version >= 1, "version", "Version must be at least 1");
    if let Some(size) = input.file_size {
        errors.require(size >= 0, "file_size", "File size cannot be negative");
    }
    errors.into_result()
}

pub fn project(input: &ProjectInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require(min_chars(&input.name, 2), "name", "Project name is required");
    errors.require(!input.status.trim().is_empty(), "status", "Status is required");
    if let Some(area) = input.total_area {
        errors.require(area.is_finite() && area >= 0.0, "total_area", "Area cannot be negative");
    }
    if let Some(floors) = input.number_of_floors {
        errors.require(floors >= 0, "number_of_floors", "Number of floors cannot be negative");
    }
    if let Some(spots) = input.parking_spots {
        errors.require(spots >= 0, "parking_spots", "Parking spots cannot be negative");
    }
    if let Some(cost) = input.planned_cost {
        errors.require(cost.is_finite() && cost >= 0.0, "planned_cost", "Planned cost cannot be negative");
    }
    errors.require(
        input.stages.iter().all(|name| !name.trim().is_empty()),
        "stages",
        "Stage names cannot be empty",
    );
    errors.into_result()
}

pub fn task_title(title: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require(!title.trim().is_empty(), "title", "Title is required");
    errors.into_result()
}

pub fn stage_name(name: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require(!name.trim().is_empty(), "name", "Stage name is required");
    errors.into_result()
}

/// A reorder batch must name each stage once and give each a distinct slot.
pub fn stage_orders(updates: &[StageOrder]) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require(!updates.is_empty(), "updates", "No updates given");
    errors.require(
        updates.iter().all(|u| u.order >= 0),
        "updates",
        "Order cannot be negative",
    );
    errors.require(distinct(updates.iter().map(|u| u.id)), "updates", "A stage appears more than once");
    errors.require(distinct(updates.iter().map(|u| u.order)), "updates", "Two stages share the same order");
    errors.into_result()
}

/// Same rule for tasks; slots are `(stage, position)` pairs. A missing stage
/// means the task stays in its current column, so those are checked by id only.
pub fn task_positions(updates: &[TaskPosition]) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require(!updates.is_empty(), "updates", "No updates given");
    errors.require(
        updates.iter().all(|u| u.position >= 0),
        "updates",
        "Position cannot be negative",
    );
    errors.require(distinct(updates.iter().map(|u| u.id)), "updates", "A task appears more than once");
    errors.require(
        distinct(updates.iter().filter_map(|u| u.stage_id.map(|stage| (stage, u.position)))),
        "updates",
        "Two tasks share the same position",
    );
    errors.into_result()
}

/// Checks the `(stage, position)` slots a project ends up with, once every
/// moved task's stage is known.
pub fn resolved_slots(slots: impl IntoIterator<Item = (Uuid, i32)>) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require(distinct(slots), "updates", "Two tasks share the same position");
    errors.into_result()
}

/// Checks every column order a project ends up with after a reorder.
pub fn resolved_orders(orders: impl IntoIterator<Item = i32>) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require(distinct(orders), "updates", "Two stages share the same order");
    errors.into_result()
}

pub fn register(input: &RegisterInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require(min_chars(&input.full_name, 2), "full_name", "Name must be at least 2 characters");
    errors.require(is_email(input.email.trim()), "email", "Invalid email address");
    errors.require(
        input.password.chars().count() >= 6,
        "password",
        "Password must be at least 6 characters",
    );
    errors.into_result()
}

fn distinct<T: std::hash::Hash + Eq>(values: impl IntoIterator<Item = T>) -> bool {
    let mut seen = HashSet::new();
    values.into_iter().all(|v| seen.insert(v))
}
