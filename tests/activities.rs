mod common;

use archflow::actions::activities;
use archflow::error::ActionError;
use archflow::models::{ActivityFilter, ActivityInput, ActivityType, Page};
use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use common::{date, editor, viewer, MemoryStore};

#[tokio::test]
async fn end_before_start_and_bad_email_are_rejected() {
    let store = MemoryStore::new();
    let session = editor(&store);
    let start = Utc::now();
    let mut input = ActivityInput::new(ActivityType::Meeting, "Kickoff", start);
    input.end_time = Some(start - Duration::minutes(30));
    input.contact_email = Some("client-at-example".into());

    let err = activities::create_activity(&store, &session, input).await.unwrap_err();

    let errors = err.field_errors().unwrap();
    assert!(errors.contains("end_time"));
    assert!(errors.contains("email"));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn blank_contact_email_is_allowed() {
    let store = MemoryStore::new();
    let session = editor(&store);
    let mut input = ActivityInput::new(ActivityType::Call, "Follow up", Utc::now());
    input.contact_email = Some("  ".into());
    input.duration = Some(15);

    let activity = activities::create_activity(&store, &session, input).await.unwrap();

    assert_eq!(activity.created_by, session.user_id);
    assert_eq!(activity.duration, Some(15));
}

#[tokio::test]
async fn viewers_cannot_schedule() {
    let store = MemoryStore::new();
    let session = viewer(&store);

    let err = activities::create_activity(
        &store,
        &session,
        ActivityInput::new(ActivityType::Meeting, "Kickoff", Utc::now()),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ActionError::Unauthorized));
}

#[tokio::test]
async fn list_filters_by_kind_latest_first() {
    let store = MemoryStore::new();
    let session = editor(&store);
    let base = Utc.with_ymd_and_hms(2024, 3, 12, 9, 0, 0).unwrap();
    for (hours, kind) in [(0, ActivityType::Meeting), (2, ActivityType::SiteVisit), (4, ActivityType::Meeting)] {
        let input = ActivityInput::new(kind, format!("Event {hours}"), base + Duration::hours(hours));
        activities::create_activity(&store, &session, input).await.unwrap();
    }

    let meetings = activities::list_activities(
        &store,
        &session,
        ActivityFilter {
            kind: Some(ActivityType::Meeting),
            ..Default::default()
        },
        Page::first(activities::DEFAULT_PAGE_SIZE),
    )
    .await
    .unwrap();

    let titles: Vec<&str> = meetings.data.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Event 4", "Event 0"]);
}

#[tokio::test]
async fn agenda_resolves_participants_and_marks_unknown() {
    let store = MemoryStore::new();
    let session = editor(&store);
    let colleague = store.add_user("Ana Lima", archflow::models::Role::Editor);
    let ghost = Uuid::new_v4();
    let today = date(2024, 3, 12);

    let mut late = ActivityInput::new(ActivityType::Meeting, "Review", Utc.with_ymd_and_hms(2024, 3, 12, 16, 0, 0).unwrap());
    late.participants = vec![colleague.user_id, ghost];
    activities::create_activity(&store, &session, late).await.unwrap();
    let early = ActivityInput::new(ActivityType::Call, "Supplier", Utc.with_ymd_and_hms(2024, 3, 12, 8, 30, 0).unwrap());
    activities::create_activity(&store, &session, early).await.unwrap();
    let tomorrow = ActivityInput::new(ActivityType::Call, "Later", Utc.with_ymd_and_hms(2024, 3, 13, 0, 0, 0).unwrap());
    activities::create_activity(&store, &session, tomorrow).await.unwrap();

    let agenda = activities::todays_agenda(&store, &session, today).await.unwrap();

    let titles: Vec<&str> = agenda.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Supplier", "Review"]);
    let names: Vec<&str> = agenda[1].participants.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Ana Lima", "Unknown"]);
    assert_eq!(store.call_count("users_by_ids"), 1);
}

#[tokio::test]
async fn update_and_delete() {
    let store = MemoryStore::new();
    let session = editor(&store);
    let activity = activities::create_activity(
        &store,
        &session,
        ActivityInput::new(ActivityType::Meeting, "Kickoff", Utc::now()),
    )
    .await
    .unwrap();

    let mut input = ActivityInput::from(&activity);
    input.location = Some("Studio".into());
    let updated = activities::update_activity(&store, &session, activity.id, input).await.unwrap();
    assert_eq!(updated.location.as_deref(), Some("Studio"));

    activities::delete_activity(&store, &session, activity.id).await.unwrap();
    assert!(matches!(
        activities::get_activity(&store, &session, activity.id).await,
        Err(ActionError::NotFound("Activity"))
    ));
}
