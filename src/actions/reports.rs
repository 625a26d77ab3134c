//! Read-only rollups. Personal metrics cover the session user's own time;
//! the report preview and the dashboard cover the whole firm.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use super::activities::todays_agenda;
use super::failed;
use crate::auth::Session;
use crate::error::ActionResult;
use crate::models::DayHours;
use crate::reports::{
    average_utilization, fill_daily_hours, label_categories, label_clients, label_projects, rank_users,
    BusinessReport, DashboardKpi, DashboardMetrics, DateRange, LabeledHours, ProductivityReport, ReportData,
    ReportFilters, ReportKind, TimeLogMetrics,
};
use crate::store::{ActivityStore, ReportStore, UserStore};

pub const TOP_PROJECTS: i64 = 5;
pub const URGENT_PROJECTS: i64 = 5;
pub const DASHBOARD_DAYS: u32 = 7;

/// Total, billable and estimated value of the user's time this month.
pub async fn time_log_metrics<S: ReportStore + ?Sized>(
    store: &S,
    session: &Session,
    today: NaiveDate,
    default_rate: f64,
) -> ActionResult<TimeLogMetrics> {
    let month = DateRange::month_of(today);
    let user = Some(session.user_id);

    let (total_hours, billable_hours, estimated_value) = tokio::try_join!(
        store.sum_hours(user, month, false),
        store.sum_hours(user, month, true),
        store.billable_value(user, month, &[], default_rate),
    )
    .map_err(failed("load time metrics"))?;

    Ok(TimeLogMetrics {
        total_hours,
        billable_hours,
        estimated_value,
    })
}

pub async fn time_by_category<S: ReportStore + ?Sized>(
    store: &S,
    session: &Session,
    range: DateRange,
) -> ActionResult<Vec<LabeledHours>> {
    let rows = store
        .hours_by_category(Some(session.user_id), range)
        .await
        .map_err(failed("load time by category"))?;
    Ok(label_categories(rows))
}

/// Hours per day for the last `days` days ending `today`, oldest first.
pub async fn daily_productivity<S: ReportStore + ?Sized>(
    store: &S,
    session: &Session,
    today: NaiveDate,
    days: u32,
) -> ActionResult<Vec<DayHours>> {
    let range = DateRange::last_days(today, days);
    let rows = store
        .hours_by_day(Some(session.user_id), range)
        .await
        .map_err(failed("load daily productivity"))?;
    Ok(fill_daily_hours(range, &rows))
}

pub async fn top_projects<S: ReportStore + ?Sized>(
    store: &S,
    session: &Session,
    range: DateRange,
) -> ActionResult<Vec<LabeledHours>> {
    let rows = store
        .hours_by_project(Some(session.user_id), range, Some(TOP_PROJECTS))
        .await
        .map_err(failed("load top projects"))?;
    Ok(label_projects(rows))
}

pub async fn time_by_client<S: ReportStore + ?Sized>(
    store: &S,
    session: &Session,
    range: DateRange,
) -> ActionResult<Vec<LabeledHours>> {
    let rows = store
        .hours_by_client(Some(session.user_id), range)
        .await
        .map_err(failed("load time by client"))?;
    Ok(label_clients(rows))
}

/// Every project the user logged time on, most hours first.
pub async fn project_breakdown<S: ReportStore + ?Sized>(
    store: &S,
    session: &Session,
    range: DateRange,
) -> ActionResult<Vec<LabeledHours>> {
    let rows = store
        .hours_by_project(Some(session.user_id), range, None)
        .await
        .map_err(failed("load project breakdown"))?;
    Ok(label_projects(rows))
}

/// Business and productivity sections for the chosen period and projects.
pub async fn report_preview<S: ReportStore + ?Sized>(
    store: &S,
    _session: &Session,
    filters: &ReportFilters,
    kind: ReportKind,
    today: NaiveDate,
    default_rate: f64,
) -> ActionResult<ReportData> {
    let range = filters.period.range(today);
    debug!(period = %filters.period, projects = filters.project_ids.len(), "building report");

    let (total_revenue, new_clients, by_user) = tokio::try_join!(
        store.billable_value(None, range, &filters.project_ids, default_rate),
        store.count_new_clients(range),
        store.hours_by_user(range, &filters.project_ids),
    )
    .map_err(failed("generate report"))?;

    let user_ranking = rank_users(by_user);
    let total_hours: f64 = user_ranking.iter().map(|u| u.total_hours).sum();
    let billable_hours: f64 = user_ranking.iter().map(|u| u.billable_hours).sum();

    Ok(ReportData {
        kind,
        period: range.label(),
        business: BusinessReport {
            total_revenue,
            new_clients,
        },
        productivity: ProductivityReport {
            total_hours,
            billable_hours,
            non_billable_hours: total_hours - billable_hours,
            average_utilization: average_utilization(&user_ranking),
            user_ranking,
        },
    })
}

/// Firm-wide overview: KPIs, nearest deadlines, today's agenda, the last
/// week of logged hours and the project status mix.
pub async fn dashboard_metrics<S: ReportStore + ActivityStore + UserStore + ?Sized>(
    store: &S,
    session: &Session,
    now: DateTime<Utc>,
    default_rate: f64,
) -> ActionResult<DashboardMetrics> {
    let today = now.date_naive();
    let month = DateRange::month_of(today);
    let week = DateRange::last_days(today, DASHBOARD_DAYS);

    let (active_projects, monthly_revenue, total_clients, urgent_projects, daily, project_distribution) =
        tokio::try_join!(
            store.count_active_projects(),
            store.billable_value(None, month, &[], default_rate),
            store.count_active_clients(),
            store.urgent_projects(today, URGENT_PROJECTS),
            store.hours_by_day(None, week),
            store.project_status_distribution(),
        )
        .map_err(failed("load dashboard"))?;
    let todays_agenda = todays_agenda(store, session, today).await?;

    Ok(DashboardMetrics {
        kpi: DashboardKpi {
            active_projects,
            monthly_revenue,
            total_clients,
        },
        urgent_projects,
        todays_agenda,
        productivity: fill_daily_hours(week, &daily),
        project_distribution,
    })
}
