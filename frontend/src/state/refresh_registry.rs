//! Fan-out of reservation mutations to the availability views that show them.

use chrono::NaiveDate;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use super::availability_controller::{AvailabilityController, ControllerCore};
use crate::services::notifications::{NotificationKind, NotificationSink, TracingNotificationSink};

/// Message shown after a mutation refreshed at least one open view
pub const AVAILABILITY_UPDATED_MESSAGE: &str = "Disponibilidad actualizada";

/// Weakly tracks mounted controllers so mutations elsewhere can refresh them
pub struct RefreshRegistry {
    controllers: Mutex<Vec<Weak<ControllerCore>>>,
    notifier: Arc<dyn NotificationSink>,
}

impl RefreshRegistry {
    pub fn new() -> Self {
        Self::with_notifier(Arc::new(TracingNotificationSink))
    }

    pub fn with_notifier(notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            controllers: Mutex::new(Vec::new()),
            notifier,
        }
    }

    fn controllers(&self) -> MutexGuard<'_, Vec<Weak<ControllerCore>>> {
        self.controllers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registration does not keep the controller alive
    pub fn register(&self, controller: &AvailabilityController) {
        self.controllers().push(controller.downgrade());
    }

    /// Number of registered controllers that are still alive
    pub fn len(&self) -> usize {
        let mut controllers = self.controllers();
        controllers.retain(|core| core.strong_count() > 0);
        controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A reservation for `resource_id` on `date` was created, changed or
    /// deleted. Refreshes, bypassing the cache, every mounted controller whose
    /// current view shows that date. Returns how many were refreshed.
    pub fn reservation_changed(&self, resource_id: i64, date: NaiveDate) -> usize {
        let live: Vec<Arc<ControllerCore>> = {
            let mut controllers = self.controllers();
            controllers.retain(|core| core.strong_count() > 0);
            controllers.iter().filter_map(Weak::upgrade).collect()
        };

        let mut refreshed = 0;
        for core in live.iter().filter(|core| core.watches(resource_id, date)) {
            core.refresh(true);
            refreshed += 1;
        }

        tracing::info!(resource_id, %date, refreshed, "reservation changed");
        if refreshed > 0 {
            self.notifier.notify(NotificationKind::Info, AVAILABILITY_UPDATED_MESSAGE);
        }
        refreshed
    }
}

impl Default for RefreshRegistry {
    fn default() -> Self {
        Self::new()
    }
}
