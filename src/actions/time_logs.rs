//! A user's own time. Nobody may edit, delete or stop another user's log.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::failed;
use crate::auth::Session;
use crate::error::{ActionError, ActionResult, FieldErrors};
use crate::models::{Page, Paginated, TimeLog, TimeLogFilter, TimeLogInput, TimerStart, timer_duration_hours};
use crate::store::TimeLogStore;
use crate::validation;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Loads a log and checks it belongs to the session user.
async fn own_log<S: TimeLogStore + ?Sized>(
    store: &S,
    session: &Session,
    id: Uuid,
    action: &'static str,
) -> ActionResult<TimeLog> {
    let log = store
        .get_time_log(id)
        .await
        .map_err(failed(action))?
        .ok_or(ActionError::NotFound("Time log"))?;
    if log.user_id != session.user_id {
        warn!(time_log_id = %id, user_id = %session.user_id, "time log belongs to another user");
        return Err(ActionError::Unauthorized);
    }
    Ok(log)
}

pub async fn create_time_log<S: TimeLogStore + ?Sized>(
    store: &S,
    session: &Session,
    input: TimeLogInput,
) -> ActionResult<TimeLog> {
    validation::time_log(&input)?;

    let log = store
        .create_time_log(session.user_id, &input)
        .await
        .map_err(failed("create time log"))?;

    info!(time_log_id = %log.id, hours = log.duration, billable = log.billable, "time logged");
    Ok(log)
}

pub async fn update_time_log<S: TimeLogStore + ?Sized>(
    store: &S,
    session: &Session,
    id: Uuid,
    input: TimeLogInput,
) -> ActionResult<TimeLog> {
    own_log(store, session, id, "update time log").await?;
    validation::time_log(&input)?;

    let log = store
        .update_time_log(id, &input)
        .await
        .map_err(failed("update time log"))?
        .ok_or(ActionError::NotFound("Time log"))?;

    info!(time_log_id = %log.id, "time log updated");
    Ok(log)
}

pub async fn delete_time_log<S: TimeLogStore + ?Sized>(store: &S, session: &Session, id: Uuid) -> ActionResult<()> {
    own_log(store, session, id, "delete time log").await?;

    if !store.delete_time_log(id).await.map_err(failed("delete time log"))? {
        return Err(ActionError::NotFound("Time log"));
    }

    info!(time_log_id = %id, "time log deleted");
    Ok(())
}

/// The session user's logs, newest date first.
pub async fn list_time_logs<S: TimeLogStore + ?Sized>(
    store: &S,
    session: &Session,
    filter: TimeLogFilter,
    page: Page,
) -> ActionResult<Paginated<TimeLog>> {
    store
        .list_time_logs(session.user_id, &filter, page)
        .await
        .map_err(failed("list time logs"))
}

pub async fn start_time_log<S: TimeLogStore + ?Sized>(
    store: &S,
    session: &Session,
    timer: TimerStart,
) -> ActionResult<TimeLog> {
    start_time_log_at(store, session, timer, Utc::now()).await
}

fn timer_running() -> ActionError {
    let mut errors = FieldErrors::new();
    errors.add("timer", "A timer is already running");
    errors.into()
}

/// Starts a timer at `at`. A user runs at most one timer at a time.
pub async fn start_time_log_at<S: TimeLogStore + ?Sized>(
    store: &S,
    session: &Session,
    timer: TimerStart,
    at: DateTime<Utc>,
) -> ActionResult<TimeLog> {
    validation::timer_rate(timer.bill_rate)?;

    let running = store
        .running_timer(session.user_id)
        .await
        .map_err(failed("start timer"))?;
    if let Some(running) = running {
        warn!(time_log_id = %running.id, "timer already running");
        return Err(timer_running());
    }

    // The store refuses a second running timer even when two starts race
    let Some(log) = store
        .start_timer(session.user_id, &timer, at)
        .await
        .map_err(failed("start timer"))?
    else {
        warn!(user_id = %session.user_id, "concurrent timer start refused");
        return Err(timer_running());
    };

    info!(time_log_id = %log.id, "timer started");
    Ok(log)
}

pub async fn stop_time_log<S: TimeLogStore + ?Sized>(store: &S, session: &Session, id: Uuid) -> ActionResult<TimeLog> {
    stop_time_log_at(store, session, id, Utc::now()).await
}

/// Stops a running timer at `at`; its duration becomes the elapsed hours.
pub async fn stop_time_log_at<S: TimeLogStore + ?Sized>(
    store: &S,
    session: &Session,
    id: Uuid,
    at: DateTime<Utc>,
) -> ActionResult<TimeLog> {
    let log = own_log(store, session, id, "stop timer").await?;
    let Some(start) = log.start_time.filter(|_| log.end_time.is_none()) else {
        let mut errors = FieldErrors::new();
        errors.add("timer", "Timer is not running");
        return Err(errors.into());
    };

    let duration = timer_duration_hours(start, at);
    let log = store
        .finish_timer(id, at, duration)
        .await
        .map_err(failed("stop timer"))?
        .ok_or(ActionError::NotFound("Time log"))?;

    info!(time_log_id = %log.id, hours = log.duration, "timer stopped");
    Ok(log)
}

pub async fn running_time_log<S: TimeLogStore + ?Sized>(
    store: &S,
    session: &Session,
) -> ActionResult<Option<TimeLog>> {
    store
        .running_timer(session.user_id)
        .await
        .map_err(failed("load running timer"))
}
