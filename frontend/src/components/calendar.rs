//! Top-level availability calendar: picks skeleton, error or the active view.

use chrono::NaiveDate;
use shared::ViewMode;

use super::day_view::{render_day, DayView};
use super::month_view::{render_month, MonthGrid};
use super::skeleton::SkeletonGrid;
use super::week_view::{render_week, WeekCell};
use crate::services::config::AvailabilityConfig;
use crate::services::logging::Logger;
use crate::state::{AvailabilityController, AvailabilityState, Phase};

/// Retry affordance shown with a failed load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAction;

impl RetryAction {
    pub const LABEL: &'static str = "Reintentar";

    pub fn apply(&self, controller: &AvailabilityController) {
        Logger::info_with_component("availability-calendar", "Retrying availability load");
        controller.refresh(true);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalendarView {
    Skeleton(SkeletonGrid),
    Failed { message: String, retry: RetryAction },
    Day(DayView),
    Week(Vec<WeekCell>),
    Month(MonthGrid),
}

pub fn render_calendar(state: &AvailabilityState, config: &AvailabilityConfig, today: NaiveDate) -> CalendarView {
    match state.phase {
        Phase::Idle | Phase::Loading => CalendarView::Skeleton(SkeletonGrid::for_view(
            state.view_mode,
            &state.data,
            &config.business_hours,
        )),
        Phase::Failed => CalendarView::Failed {
            message: state
                .error
                .as_ref()
                .map(|error| error.message().to_string())
                .unwrap_or_else(|| crate::services::error::FETCH_FAILED_MESSAGE.to_string()),
            retry: RetryAction,
        },
        Phase::Ready => match state.view_mode {
            ViewMode::Day => CalendarView::Day(render_day(&state.data, state.selected_date)),
            ViewMode::Week => CalendarView::Week(render_week(
                &state.data,
                state.selected_date,
                state.desk_filter,
                today,
            )),
            ViewMode::Month => CalendarView::Month(render_month(
                &state.data,
                state.selected_date,
                state.desk_filter,
                today,
            )),
        },
    }
}
