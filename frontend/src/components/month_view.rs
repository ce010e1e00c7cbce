//! Month view: a fixed 6x7 grid padded with days from adjacent months.

use chrono::{Datelike, NaiveDate, Weekday};
use shared::NormalizedAvailability;

use super::week_view::classify_aggregate;
use crate::services::date_utils::{month_grid, month_name, weekday_short, MONTH_GRID_ROWS};
use crate::services::status_classifier::Classification;

/// Distinguishes days of the displayed month from padding days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarDayType {
    /// A day in the month being displayed
    CurrentMonth,
    /// Padding from the previous or next month; de-emphasized but clickable
    FillerDay,
}

/// What a click on a month cell asks the controller to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAction {
    /// Switch to the day view on this date
    OpenDay(NaiveDate),
    /// Move the month view to the month containing this date
    ShowMonth(NaiveDate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthCell {
    pub date: NaiveDate,
    pub day_number: u32,
    pub day_type: CalendarDayType,
    pub is_today: bool,
    pub is_selected: bool,
    pub classification: Classification,
}

impl MonthCell {
    pub fn is_deemphasized(&self) -> bool {
        self.day_type == CalendarDayType::FillerDay
    }

    pub fn on_click(&self) -> CellAction {
        match self.day_type {
            CalendarDayType::CurrentMonth => CellAction::OpenDay(self.date),
            CalendarDayType::FillerDay => CellAction::ShowMonth(self.date),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
    /// e.g. `Junio 2024`
    pub title: String,
    pub weekday_headers: [&'static str; 7],
    pub rows: Vec<Vec<MonthCell>>,
}

impl MonthGrid {
    pub fn cells(&self) -> impl Iterator<Item = &MonthCell> {
        self.rows.iter().flatten()
    }
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn render_month(
    data: &NormalizedAvailability,
    selected_date: NaiveDate,
    desk_filter: Option<i64>,
    today: NaiveDate,
) -> MonthGrid {
    let cells: Vec<MonthCell> = month_grid(selected_date)
        .into_iter()
        .map(|date| {
            let day_type = if date.month() == selected_date.month() && date.year() == selected_date.year() {
                CalendarDayType::CurrentMonth
            } else {
                CalendarDayType::FillerDay
            };
            MonthCell {
                date,
                day_number: date.day(),
                day_type,
                is_today: date == today,
                is_selected: date == selected_date,
                classification: classify_aggregate(data.month_data.get(&date), desk_filter),
            }
        })
        .collect();

    let rows: Vec<Vec<MonthCell>> = cells.chunks(7).map(<[MonthCell]>::to_vec).collect();
    debug_assert_eq!(rows.len(), MONTH_GRID_ROWS);

    MonthGrid {
        title: format!("{} {}", month_name(selected_date.month()), selected_date.year()),
        weekday_headers: WEEKDAYS.map(weekday_short),
        rows,
    }
}
