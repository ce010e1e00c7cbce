pub mod calendar;
pub mod day_view;
pub mod month_view;
pub mod skeleton;
pub mod week_view;

pub use calendar::{render_calendar, CalendarView, RetryAction};
pub use day_view::{render_day, DayView, DeskCard, SlotRow};
pub use month_view::{render_month, CalendarDayType, CellAction, MonthCell, MonthGrid};
pub use skeleton::SkeletonGrid;
pub use week_view::{render_week, WeekCell};
