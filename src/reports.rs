//! Report periods and the in-memory shaping applied on top of the grouped
//! rows returned by `ReportStore`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{ActivityType, CategoryHours, DayHours, NamedHours, StatusCount, UrgentProject, UserHours};

pub const NO_CLIENT_LABEL: &str = "Internal / No Client";
pub const UNKNOWN_CLIENT_LABEL: &str = "Unknown Client";
pub const UNKNOWN_LABEL: &str = "Unknown";

/// An inclusive range of calendar days (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end { Self { start, end } } else { Self { start: end, end: start } }
    }

    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// The `days` calendar days ending with `today`.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        let span = u64::from(days.max(1) - 1);
        let start = today.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN);
        Self::new(start, today)
    }

    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Midnight UTC at the start of the first day.
    pub fn start_at(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.start.and_time(NaiveTime::MIN))
    }

    /// Midnight UTC after the last day; use as an exclusive bound.
    pub fn end_at(&self) -> DateTime<Utc> {
        let next = self.end.succ_opt().unwrap_or(self.end);
        Utc.from_utc_datetime(&next.and_time(NaiveTime::MIN))
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|d| *d <= self.end)
    }

    pub fn label(&self) -> String {
        format!("{} - {}", self.start.format("%d/%m/%Y"), self.end.format("%d/%m/%Y"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Today,
    /// Sunday through Saturday.
    Week,
    Month,
    Quarter,
    Custom { from: NaiveDate, to: NaiveDate },
}

impl ReportPeriod {
    pub fn range(&self, today: NaiveDate) -> DateRange {
        match *self {
            ReportPeriod::Today => DateRange::day(today),
            ReportPeriod::Week => {
                let back = u64::from(today.weekday().num_days_from_sunday());
                let start = today.checked_sub_days(Days::new(back)).unwrap_or(today);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(today);
                DateRange::new(start, end)
            }
            ReportPeriod::Month => DateRange::month_of(today),
            ReportPeriod::Quarter => {
                let first_month = (today.month0() / 3) * 3 + 1;
                let start = NaiveDate::from_ymd_opt(today.year(), first_month, 1).unwrap_or(today);
                let end = start
                    .checked_add_months(Months::new(3))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(today);
                DateRange::new(start, end)
            }
            ReportPeriod::Custom { from, to } => DateRange::new(from, to),
        }
    }
}

impl FromStr for ReportPeriod {
    type Err = String;

    /// Accepts `today`, `week`, `month`, `quarter` or `YYYY-MM-DD..YYYY-MM-DD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(ReportPeriod::Today),
            "week" => Ok(ReportPeriod::Week),
            "month" => Ok(ReportPeriod::Month),
            "quarter" => Ok(ReportPeriod::Quarter),
            other => {
                let (from, to) = other
                    .split_once("..")
                    .ok_or_else(|| format!("unknown period '{other}'"))?;
                let parse = |v: &str| {
                    NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|e| format!("invalid date '{v}': {e}"))
                };
                Ok(ReportPeriod::Custom {
                    from: parse(from)?,
                    to: parse(to)?,
                })
            }
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportPeriod::Today => f.write_str("today"),
            ReportPeriod::Week => f.write_str("week"),
            ReportPeriod::Month => f.write_str("month"),
            ReportPeriod::Quarter => f.write_str("quarter"),
            ReportPeriod::Custom { from, to } => write!(f, "{from}..{to}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Business,
    #[default]
    Productivity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportFilters {
    pub period: ReportPeriod,
    pub project_ids: Vec<Uuid>,
}

impl Default for ReportFilters {
    fn default() -> Self {
        Self {
            period: ReportPeriod::Month,
            project_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLogMetrics {
    pub total_hours: f64,
    pub billable_hours: f64,
    pub estimated_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledHours {
    pub name: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRanking {
    pub id: Uuid,
    pub name: String,
    pub total_hours: f64,
    pub billable_hours: f64,
    /// Billable share of total hours, in percent.
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessReport {
    pub total_revenue: f64,
    pub new_clients: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityReport {
    pub total_hours: f64,
    pub billable_hours: f64,
    pub non_billable_hours: f64,
    pub average_utilization: f64,
    pub user_ranking: Vec<UserRanking>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    pub kind: ReportKind,
    pub period: String,
    pub business: BusinessReport,
    pub productivity: ProductivityReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgendaItem {
    pub id: Uuid,
    pub time: DateTime<Utc>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardKpi {
    pub active_projects: i64,
    pub monthly_revenue: f64,
    pub total_clients: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub kpi: DashboardKpi,
    pub urgent_projects: Vec<UrgentProject>,
    pub todays_agenda: Vec<AgendaItem>,
    pub productivity: Vec<DayHours>,
    pub project_distribution: Vec<StatusCount>,
}

/// One entry per day of `range`, oldest first; days without logs get 0.
pub fn fill_daily_hours(range: DateRange, rows: &[DayHours]) -> Vec<DayHours> {
    let by_day: HashMap<NaiveDate, f64> = rows.iter().map(|r| (r.date, r.hours)).collect();
    range
        .days()
        .map(|date| DayHours {
            date,
            hours: by_day.get(&date).copied().unwrap_or(0.0),
        })
        .collect()
}

pub fn utilization(total_hours: f64, billable_hours: f64) -> f64 {
    if total_hours > 0.0 { billable_hours / total_hours * 100.0 } else { 0.0 }
}

/// Most hours first.
pub fn rank_users(rows: Vec<UserHours>) -> Vec<UserRanking> {
    let mut ranking: Vec<UserRanking> = rows
        .into_iter()
        .map(|row| UserRanking {
            utilization: utilization(row.total_hours, row.billable_hours),
            id: row.user_id,
            name: row.name,
            total_hours: row.total_hours,
            billable_hours: row.billable_hours,
        })
        .collect();
    ranking.sort_by(|a, b| b.total_hours.total_cmp(&a.total_hours));
    ranking
}

pub fn average_utilization(ranking: &[UserRanking]) -> f64 {
    if ranking.is_empty() {
        return 0.0;
    }
    ranking.iter().map(|u| u.utilization).sum::<f64>() / ranking.len() as f64
}

pub fn label_projects(rows: Vec<NamedHours>) -> Vec<LabeledHours> {
    rows.into_iter()
        .map(|row| LabeledHours {
            name: row.name.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            hours: row.hours,
        })
        .collect()
}

/// Logs with no client are internal work; a client id that no longer
/// resolves to a name is reported as unknown.
pub fn label_clients(rows: Vec<NamedHours>) -> Vec<LabeledHours> {
    rows.into_iter()
        .map(|row| {
            let name = match (row.id, row.name) {
                (_, Some(name)) => name,
                (Some(_), None) => UNKNOWN_CLIENT_LABEL.to_string(),
                (None, None) => NO_CLIENT_LABEL.to_string(),
            };
            LabeledHours { name, hours: row.hours }
        })
        .collect()
}

pub fn label_categories(rows: Vec<CategoryHours>) -> Vec<LabeledHours> {
    rows.into_iter()
        .map(|row| LabeledHours {
            name: row.category.as_str().to_string(),
            hours: row.hours,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2024-03-13 is a Wednesday.
        let range = ReportPeriod::Week.range(date(2024, 3, 13));
        assert_eq!(range, DateRange::new(date(2024, 3, 10), date(2024, 3, 16)));
    }

    #[test]
    fn month_and_quarter_bounds() {
        assert_eq!(
            ReportPeriod::Month.range(date(2024, 2, 10)),
            DateRange::new(date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            ReportPeriod::Quarter.range(date(2024, 11, 30)),
            DateRange::new(date(2024, 10, 1), date(2024, 12, 31))
        );
    }

    #[test]
    fn custom_period_parses_and_orders() {
        let period: ReportPeriod = "2024-05-10..2024-05-01".parse().unwrap();
        assert_eq!(period.range(date(2030, 1, 1)), DateRange::new(date(2024, 5, 1), date(2024, 5, 10)));
        assert!("fortnight".parse::<ReportPeriod>().is_err());
    }

    #[test]
    fn label_uses_day_month_year() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(range.label(), "01/01/2024 - 31/01/2024");
    }

    #[test]
    fn daily_hours_are_zero_filled_oldest_first() {
        let range = DateRange::last_days(date(2024, 3, 7), 7);
        let rows = vec![
            DayHours { date: date(2024, 3, 7), hours: 2.5 },
            DayHours { date: date(2024, 3, 3), hours: 1.0 },
        ];
        let filled = fill_daily_hours(range, &rows);
        let hours: Vec<f64> = filled.iter().map(|d| d.hours).collect();
        assert_eq!(hours, vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.5]);
        assert_eq!(filled[0].date, date(2024, 3, 1));
    }

    #[test]
    fn ranking_sorts_by_hours_and_averages_utilization() {
        let rows = vec![
            UserHours { user_id: Uuid::new_v4(), name: "Ana".into(), total_hours: 10.0, billable_hours: 5.0 },
            UserHours { user_id: Uuid::new_v4(), name: "Bruno".into(), total_hours: 20.0, billable_hours: 20.0 },
            UserHours { user_id: Uuid::new_v4(), name: "Caio".into(), total_hours: 0.0, billable_hours: 0.0 },
        ];
        let ranking = rank_users(rows);
        let names: Vec<&str> = ranking.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Bruno", "Ana", "Caio"]);
        assert_eq!(ranking[1].utilization, 50.0);
        assert_eq!(ranking[2].utilization, 0.0);
        assert_eq!(average_utilization(&ranking), 50.0);
        assert_eq!(average_utilization(&[]), 0.0);
    }

    #[test]
    fn client_labels_distinguish_internal_from_unknown() {
        let labels = label_clients(vec![
            NamedHours { id: None, name: None, hours: 1.0 },
            NamedHours { id: Some(Uuid::new_v4()), name: None, hours: 2.0 },
            NamedHours { id: Some(Uuid::new_v4()), name: Some("Casa Verde".into()), hours: 3.0 },
        ]);
        let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec![NO_CLIENT_LABEL, UNKNOWN_CLIENT_LABEL, "Casa Verde"]);
    }
}
