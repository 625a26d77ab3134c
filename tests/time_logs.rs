mod common;

use archflow::actions::time_logs;
use archflow::error::ActionError;
use archflow::models::{Page, TimeLogFilter, TimeLogInput, TimerStart};
use archflow::store::TimeLogStore;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use common::{date, editor, MemoryStore};

#[tokio::test]
async fn manual_entry_is_validated() {
    let store = MemoryStore::new();
    let session = editor(&store);

    let mut input = TimeLogInput::new(date(2024, 3, 12), 0.0);
    input.bill_rate = Some(-10.0);
    let err = time_logs::create_time_log(&store, &session, input).await.unwrap_err();

    let errors = err.field_errors().unwrap();
    assert!(errors.contains("duration"));
    assert!(errors.contains("bill_rate"));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn manual_entry_belongs_to_session_user() {
    let store = MemoryStore::new();
    let session = editor(&store);
    let project_id = Uuid::new_v4();
    let mut input = TimeLogInput::new(date(2024, 3, 12), 2.5);
    input.project_id = Some(project_id);
    input.bill_rate = Some(180.0);

    let log = time_logs::create_time_log(&store, &session, input).await.unwrap();

    assert_eq!(log.user_id, session.user_id);
    assert_eq!(log.duration, 2.5);
    assert!(log.billable);

    let listed = time_logs::list_time_logs(
        &store,
        &session,
        TimeLogFilter {
            project_id: Some(project_id),
            client_id: None,
        },
        Page::first(time_logs::DEFAULT_PAGE_SIZE),
    )
    .await
    .unwrap();
    assert_eq!(listed.total, 1);
    assert_eq!(listed.data[0].id, log.id);
}

#[tokio::test]
async fn timer_runs_once_and_stops_with_elapsed_hours() {
    let store = MemoryStore::new();
    let session = editor(&store);
    let start = Utc::now() - Duration::hours(3);

    let timer = TimerStart {
        billable: true,
        ..Default::default()
    };
    let running = time_logs::start_time_log_at(&store, &session, timer.clone(), start)
        .await
        .unwrap();
    assert!(running.is_running());
    assert_eq!(running.duration, 0.0);
    assert_eq!(running.date, start.date_naive());

    let err = time_logs::start_time_log(&store, &session, timer).await.unwrap_err();
    assert!(err.field_errors().unwrap().contains("timer"));

    let stopped = time_logs::stop_time_log_at(&store, &session, running.id, start + Duration::minutes(90))
        .await
        .unwrap();
    assert_eq!(stopped.duration, 1.5);
    assert!(!stopped.is_running());
    assert_eq!(time_logs::running_time_log(&store, &session).await.unwrap(), None);

    let err = time_logs::stop_time_log(&store, &session, running.id).await.unwrap_err();
    assert!(err.field_errors().unwrap().contains("timer"));
}

#[tokio::test]
async fn other_users_logs_are_off_limits() {
    let store = MemoryStore::new();
    let author = editor(&store);
    let intruder = store.add_user("Ivo Souza", archflow::models::Role::Owner);
    let log = time_logs::create_time_log(&store, &author, TimeLogInput::new(date(2024, 3, 12), 1.0))
        .await
        .unwrap();

    let err = time_logs::delete_time_log(&store, &intruder, log.id).await.unwrap_err();
    assert!(matches!(err, ActionError::Unauthorized));

    let err = time_logs::update_time_log(&store, &intruder, log.id, TimeLogInput::new(date(2024, 3, 12), 4.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::Unauthorized));
    assert_eq!(store.call_count("update_time_log"), 0);
}

#[tokio::test]
async fn owner_can_edit_and_delete_own_log() {
    let store = MemoryStore::new();
    let session = editor(&store);
    let log = time_logs::create_time_log(&store, &session, TimeLogInput::new(date(2024, 3, 12), 1.0))
        .await
        .unwrap();

    let mut input = TimeLogInput::from(&log);
    input.duration = 3.0;
    input.billable = false;
    let updated = time_logs::update_time_log(&store, &session, log.id, input).await.unwrap();
    assert_eq!(updated.duration, 3.0);
    assert!(!updated.billable);

    time_logs::delete_time_log(&store, &session, log.id).await.unwrap();
    let err = time_logs::delete_time_log(&store, &session, log.id).await.unwrap_err();
    assert!(matches!(err, ActionError::NotFound("Time log")));
}

#[tokio::test]
async fn store_refuses_a_second_running_timer() {
    let store = MemoryStore::new();
    let session = editor(&store);
    let at = Utc::now();

    let first = store.start_timer(session.user_id, &TimerStart::default(), at).await.unwrap();
    let second = store.start_timer(session.user_id, &TimerStart::default(), at).await.unwrap();

    assert!(first.is_some());
    assert_eq!(second, None);
}

#[tokio::test]
async fn concurrent_starts_leave_one_timer() {
    let store = MemoryStore::new();
    let session = editor(&store);

    let (a, b) = tokio::join!(
        time_logs::start_time_log(&store, &session, TimerStart::default()),
        time_logs::start_time_log(&store, &session, TimerStart::default()),
    );

    let started = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(started, 1);
    let refused = if a.is_err() { a } else { b };
    assert!(refused.unwrap_err().field_errors().unwrap().contains("timer"));
}
