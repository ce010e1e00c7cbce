//! Date navigation for the availability calendar.
//!
//! Everything here is synchronous and free of fetching or caching, so the
//! controller can compute the next date before deciding whether to fetch.

use chrono::{DateTime, Datelike, Days, Local, Months, NaiveDate, Weekday};
use shared::ViewMode;

/// Source of "today" for navigation and highlighting
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local system date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a given date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Navigation request coming from the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    Previous,
    Next,
    Today,
}

/// A date as handed over by callers: either already parsed or still text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Date(NaiveDate),
    Text(String),
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Date(date)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        DateInput::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        DateInput::Text(text)
    }
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp into a calendar date
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|timestamp| timestamp.date_naive())
}

/// Resolve any date input, falling back to today when it cannot be parsed
pub fn normalize_date(input: &DateInput, clock: &dyn Clock) -> NaiveDate {
    match input {
        DateInput::Date(date) => *date,
        DateInput::Text(text) => parse_date(text).unwrap_or_else(|| {
            tracing::debug!("Unparsable date '{}', falling back to today", text);
            clock.today()
        }),
    }
}

/// Format a date the way it is used in cache keys and request parameters
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Compute the date reached by one navigation step.
///
/// Month steps use chrono's month arithmetic, which clamps to the last valid
/// day: Jan 31 + 1 month is Feb 28 (or 29), and going back from there lands
/// on Jan 28 (or 29). Month navigation is not invertible at month end.
pub fn navigate(
    current: impl Into<DateInput>,
    view_mode: ViewMode,
    direction: NavigationDirection,
    clock: &dyn Clock,
) -> NaiveDate {
    let current = normalize_date(&current.into(), clock);

    let stepped = match (direction, view_mode) {
        (NavigationDirection::Today, _) => Some(clock.today()),
        (NavigationDirection::Next, ViewMode::Day) => current.checked_add_days(Days::new(1)),
        (NavigationDirection::Previous, ViewMode::Day) => current.checked_sub_days(Days::new(1)),
        (NavigationDirection::Next, ViewMode::Week) => current.checked_add_days(Days::new(7)),
        (NavigationDirection::Previous, ViewMode::Week) => current.checked_sub_days(Days::new(7)),
        (NavigationDirection::Next, ViewMode::Month) => current.checked_add_months(Months::new(1)),
        (NavigationDirection::Previous, ViewMode::Month) => current.checked_sub_months(Months::new(1)),
    };

    // Only reachable at the edges of chrono's representable range
    stepped.unwrap_or(current)
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// The seven dates of the Monday-first week containing `date`
pub fn week_dates(date: NaiveDate) -> Vec<NaiveDate> {
    week_start(date).iter_days().take(7).collect()
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Number of rows in the month grid; six rows fit every month layout
pub const MONTH_GRID_ROWS: usize = 6;

/// 42 dates (6 rows of Monday-first weeks) covering the month of `date`,
/// padded with days from the adjacent months
pub fn month_grid(date: NaiveDate) -> Vec<NaiveDate> {
    week_start(first_of_month(date))
        .iter_days()
        .take(MONTH_GRID_ROWS * 7)
        .collect()
}

/// Inclusive date range a view covers around the selected date
pub fn view_window(date: NaiveDate, view_mode: ViewMode) -> (NaiveDate, NaiveDate) {
    match view_mode {
        ViewMode::Day => (date, date),
        ViewMode::Week => {
            let start = week_start(date);
            (start, start.checked_add_days(Days::new(6)).unwrap_or(start))
        }
        ViewMode::Month => (first_of_month(date), last_of_month(date)),
    }
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Enero",
        2 => "Febrero",
        3 => "Marzo",
        4 => "Abril",
        5 => "Mayo",
        6 => "Junio",
        7 => "Julio",
        8 => "Agosto",
        9 => "Septiembre",
        10 => "Octubre",
        11 => "Noviembre",
        12 => "Diciembre",
        _ => "Mes desconocido",
    }
}

pub fn weekday_short(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Lun",
        Weekday::Tue => "Mar",
        Weekday::Wed => "Mié",
        Weekday::Thu => "Jue",
        Weekday::Fri => "Vie",
        Weekday::Sat => "Sáb",
        Weekday::Sun => "Dom",
    }
}

/// Format a date for headers (e.g., "10 de Junio de 2024")
pub fn format_date_for_display(date: NaiveDate) -> String {
    format!("{} de {} de {}", date.day(), month_name(date.month()), date.year())
}
