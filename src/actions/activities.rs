use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use super::{authorize, editor, failed};
use crate::auth::Session;
use crate::error::{ActionError, ActionResult};
use crate::models::{Activity, ActivityFilter, ActivityInput, Page, Paginated};
use crate::reports::{AgendaItem, DateRange, Participant, UNKNOWN_LABEL};
use crate::store::{ActivityStore, UserStore};
use crate::validation;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

pub async fn create_activity<S: ActivityStore + ?Sized>(
    store: &S,
    session: &Session,
    input: ActivityInput,
) -> ActionResult<Activity> {
    authorize(session, editor)?;
    validation::activity(&input)?;

    let activity = store
        .create_activity(session.user_id, &input)
        .await
        .map_err(failed("create activity"))?;

    info!(activity_id = %activity.id, kind = activity.kind.as_str(), "activity created");
    Ok(activity)
}

pub async fn get_activity<S: ActivityStore + ?Sized>(
    store: &S,
    _session: &Session,
    id: Uuid,
) -> ActionResult<Activity> {
    store
        .get_activity(id)
        .await
        .map_err(failed("load activity"))?
        .ok_or(ActionError::NotFound("Activity"))
}

pub async fn update_activity<S: ActivityStore + ?Sized>(
    store: &S,
    session: &Session,
    id: Uuid,
    input: ActivityInput,
) -> ActionResult<Activity> {
    authorize(session, editor)?;
    validation::activity(&input)?;

    let activity = store
        .update_activity(id, &input)
        .await
        .map_err(failed("update activity"))?
        .ok_or(ActionError::NotFound("Activity"))?;

    info!(activity_id = %activity.id, "activity updated");
    Ok(activity)
}

pub async fn delete_activity<S: ActivityStore + ?Sized>(store: &S, session: &Session, id: Uuid) -> ActionResult<()> {
    authorize(session, editor)?;

    if !store.delete_activity(id).await.map_err(failed("delete activity"))? {
        return Err(ActionError::NotFound("Activity"));
    }

    info!(activity_id = %id, "activity deleted");
    Ok(())
}

/// Latest start first.
pub async fn list_activities<S: ActivityStore + ?Sized>(
    store: &S,
    _session: &Session,
    filter: ActivityFilter,
    page: Page,
) -> ActionResult<Paginated<Activity>> {
    store
        .list_activities(&filter, page)
        .await
        .map_err(failed("list activities"))
}

/// Everything scheduled on `today`, earliest first, with participant names
/// resolved. Participants that no longer exist are shown as unknown.
pub async fn todays_agenda<S: ActivityStore + UserStore + ?Sized>(
    store: &S,
    _session: &Session,
    today: NaiveDate,
) -> ActionResult<Vec<AgendaItem>> {
    let day = DateRange::day(today);
    let activities = store
        .activities_between(day.start_at(), day.end_at())
        .await
        .map_err(failed("load agenda"))?;

    let mut ids: Vec<Uuid> = activities.iter().flat_map(|a| a.participants.iter().copied()).collect();
    ids.sort_unstable();
    ids.dedup();
    let names: HashMap<Uuid, String> = if ids.is_empty() {
        HashMap::new()
    } else {
        store
            .users_by_ids(&ids)
            .await
            .map_err(failed("load agenda"))?
            .into_iter()
            .map(|u| (u.id, u.full_name))
            .collect()
    };

    Ok(activities
        .into_iter()
        .map(|activity| AgendaItem {
            id: activity.id,
            time: activity.start_time,
            title: activity.title,
            kind: activity.kind,
            participants: activity
                .participants
                .iter()
                .map(|id| Participant {
                    id: *id,
                    name: names.get(id).cloned().unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                })
                .collect(),
        })
        .collect())
}

