use chrono::{Datelike, NaiveDate};
use shared::{DayAggregate, NormalizedAvailability, Status};

use crate::services::date_utils::{week_dates, weekday_short};
use crate::services::status_classifier::{classify, Classification};

/// One Monday-first column of the week view
#[derive(Debug, Clone, PartialEq)]
pub struct WeekCell {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub day_number: u32,
    pub is_today: bool,
    pub is_selected: bool,
    pub classification: Classification,
}

/// Classify a day aggregate, scoped to one desk when a filter is active.
/// Missing entries classify as unavailable.
pub(crate) fn classify_aggregate(aggregate: Option<&DayAggregate>, desk_filter: Option<i64>) -> Classification {
    match (aggregate, desk_filter) {
        (Some(aggregate), Some(desk_id)) => match aggregate.desk(desk_id) {
            Some(desk) => classify(desk.status, Some(desk.occupancy_percentage), &desk.reservas),
            None => classify(Status::Unknown, None, &[]),
        },
        (Some(aggregate), None) => classify(
            aggregate.status,
            Some(aggregate.occupancy_percentage),
            &aggregate.reservas,
        ),
        (None, _) => classify(Status::Unknown, None, &[]),
    }
}

pub fn render_week(
    data: &NormalizedAvailability,
    selected_date: NaiveDate,
    desk_filter: Option<i64>,
    today: NaiveDate,
) -> Vec<WeekCell> {
    week_dates(selected_date)
        .into_iter()
        .map(|date| WeekCell {
            date,
            weekday: weekday_short(date.weekday()),
            day_number: date.day(),
            is_today: date == today,
            is_selected: date == selected_date,
            classification: classify_aggregate(data.week_data.get(&date), desk_filter),
        })
        .collect()
}
