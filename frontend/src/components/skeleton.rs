//! Loading placeholders shaped like the view they stand in for.

use shared::{NormalizedAvailability, ResourceType, ViewMode};

use crate::services::config::BusinessHours;
use crate::services::date_utils::MONTH_GRID_ROWS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonGrid {
    pub view_mode: ViewMode,
    pub rows: usize,
    pub columns: usize,
}

impl SkeletonGrid {
    /// `previous` is whatever data the controller still holds while loading;
    /// coworking day views reuse its desk count when it has one.
    pub fn for_view(view_mode: ViewMode, previous: &NormalizedAvailability, hours: &BusinessHours) -> Self {
        let (rows, columns) = match view_mode {
            ViewMode::Day => {
                let desks = previous.escritorios.len();
                if previous.resource_type == ResourceType::Coworking && desks > 0 {
                    (desks, 1)
                } else {
                    (hours.slot_count().max(1), 1)
                }
            }
            ViewMode::Week => (1, 7),
            ViewMode::Month => (MONTH_GRID_ROWS, 7),
        };
        Self { view_mode, rows, columns }
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.columns
    }
}
