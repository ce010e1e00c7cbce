//! # Availability Controller
//!
//! Single source of truth for the availability calendar of one space.
//!
//! ## Responsibilities:
//! - Selected date, view mode, resource and desk filter
//! - One fetch cycle per effective change, cancelling the previous one
//! - Loading / error / data state published to the renderers
//!
//! State is published through a `tokio::sync::watch` channel. Results are
//! only written while holding the controller lock and only if their fetch is
//! still the active one, so a superseded response can never overwrite the
//! state of a newer navigation.

use chrono::NaiveDate;
use shared::{NormalizedAvailability, ResourceType, ViewMode};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::watch;

use crate::components::CellAction;
use crate::services::api::AvailabilityQuery;
use crate::services::date_utils::{
    navigate, normalize_date, parse_date, view_window, Clock, DateInput, NavigationDirection, SystemClock,
};
use crate::services::error::{AvailabilityError, FetchError};
use crate::services::fetcher::{AvailabilityFetcher, CancelSignal, FetchHandle, FetchOptions};
use crate::services::logging::Logger;
use crate::services::notifications::{NotificationKind, NotificationSink, TracingNotificationSink};

/// Lifecycle of the controller's data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Snapshot consumed by the renderers
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityState {
    pub selected_date: NaiveDate,
    pub view_mode: ViewMode,
    pub resource_id: i64,
    pub resource_type: ResourceType,
    /// Desk selected in week/month views; filtering happens client-side
    pub desk_filter: Option<i64>,
    pub data: NormalizedAvailability,
    pub loading: bool,
    pub error: Option<AvailabilityError>,
    pub phase: Phase,
}

impl AvailabilityState {
    pub fn query(&self) -> AvailabilityQuery {
        AvailabilityQuery {
            resource_id: self.resource_id,
            date: self.selected_date,
            view_mode: self.view_mode,
            resource_type: self.resource_type,
        }
    }
}

/// Construction parameters for a controller
pub struct ControllerOptions {
    pub resource_id: i64,
    pub resource_type: ResourceType,
    pub view_mode: ViewMode,
    /// Defaults to today when absent or unparsable
    pub initial_date: Option<DateInput>,
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<dyn NotificationSink>,
}

impl ControllerOptions {
    pub fn new(resource_id: i64, resource_type: ResourceType) -> Self {
        Self {
            resource_id,
            resource_type,
            view_mode: ViewMode::Day,
            initial_date: None,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(TracingNotificationSink),
        }
    }

    pub fn view_mode(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = view_mode;
        self
    }

    pub fn initial_date(mut self, date: impl Into<DateInput>) -> Self {
        self.initial_date = Some(date.into());
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }
}

#[derive(Default)]
struct ControllerInner {
    active: Option<FetchHandle>,
    next_fetch_id: u64,
    mounted: bool,
}

/// Shared between the controller, its fetch tasks and the refresh registry
pub(crate) struct ControllerCore {
    fetcher: AvailabilityFetcher,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn NotificationSink>,
    inner: Mutex<ControllerInner>,
    state_tx: watch::Sender<AvailabilityState>,
}

/// A requested change to what the controller is looking at
#[derive(Debug, Default, Clone, Copy)]
struct Navigation {
    date: Option<NaiveDate>,
    /// Stepped from the current date and view mode under the lock
    step: Option<NavigationDirection>,
    view_mode: Option<ViewMode>,
    resource: Option<(i64, ResourceType)>,
}

impl ControllerCore {
    fn lock_inner(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn snapshot(&self) -> AvailabilityState {
        self.state_tx.borrow().clone()
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.lock_inner().mounted
    }

    /// Whether a change to `resource_id` on `date` is visible in the current view
    pub(crate) fn watches(&self, resource_id: i64, date: NaiveDate) -> bool {
        if !self.is_mounted() {
            return false;
        }
        let state = self.state_tx.borrow();
        let (first, last) = view_window(state.selected_date, state.view_mode);
        state.resource_id == resource_id && first <= date && date <= last
    }

    fn mount(self: &Arc<Self>) {
        let mut inner = self.lock_inner();
        if inner.mounted {
            return;
        }
        inner.mounted = true;
        let state = self.snapshot();
        Logger::info_with_component(
            "availability-controller",
            &format!(
                "Mounted for space {} ({}) on {} in {} view",
                state.resource_id, state.resource_type, state.selected_date, state.view_mode
            ),
        );
        let failure = self.begin_cycle(&mut inner, false);
        drop(inner);
        self.report(failure);
    }

    fn unmount(&self) {
        let mut inner = self.lock_inner();
        inner.mounted = false;
        if let Some(active) = inner.active.take() {
            active.cancel();
        }
    }

    fn apply(self: &Arc<Self>, navigation: Navigation) {
        let mut inner = self.lock_inner();

        let changed = self.state_tx.send_if_modified(|state| {
            let mut changed = false;
            if let Some(date) = navigation.date {
                changed |= state.selected_date != date;
                state.selected_date = date;
            }
            if let Some(direction) = navigation.step {
                let date = navigate(state.selected_date, state.view_mode, direction, self.clock.as_ref());
                changed |= state.selected_date != date;
                state.selected_date = date;
            }
            if let Some(view_mode) = navigation.view_mode {
                changed |= state.view_mode != view_mode;
                state.view_mode = view_mode;
            }
            if let Some((resource_id, resource_type)) = navigation.resource {
                if state.resource_id != resource_id || state.resource_type != resource_type {
                    state.resource_id = resource_id;
                    state.resource_type = resource_type;
                    state.desk_filter = None;
                    changed = true;
                }
            }
            changed
        });

        if changed && inner.mounted {
            let failure = self.begin_cycle(&mut inner, false);
            drop(inner);
            self.report(failure);
        }
    }

    pub(crate) fn refresh(self: &Arc<Self>, bypass_cache: bool) {
        let mut inner = self.lock_inner();
        if !inner.mounted {
            tracing::debug!("Refresh requested on an unmounted availability controller");
            return;
        }
        let failure = self.begin_cycle(&mut inner, bypass_cache);
        drop(inner);
        self.report(failure);
    }

    /// Start a fetch cycle for the current state. Caller holds the inner lock
    /// and passes the returned failure message to [`Self::report`] once the
    /// lock is released.
    #[must_use]
    fn begin_cycle(self: &Arc<Self>, inner: &mut ControllerInner, bypass_cache: bool) -> Option<String> {
        if let Some(previous) = inner.active.take() {
            tracing::debug!(fetch_id = previous.id(), "cancelling superseded availability fetch");
            previous.cancel();
        }

        let query = self.state_tx.borrow().query();

        if bypass_cache {
            self.fetcher.invalidate(&query);
        } else if let Some(hit) = self.fetcher.cached(&query) {
            self.state_tx.send_modify(|state| {
                state.data = hit;
                state.error = None;
                state.loading = false;
                state.phase = Phase::Ready;
            });
            return None;
        }

        self.state_tx.send_modify(|state| {
            state.error = None;
            state.loading = true;
            state.phase = Phase::Loading;
        });

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                Logger::error_with_component(
                    "availability-controller",
                    &format!("Cannot fetch availability outside a tokio runtime: {}", e),
                );
                return Some(self.record_failure(AvailabilityError::from(&FetchError::Network(e.to_string()))));
            }
        };

        inner.next_fetch_id += 1;
        let fetch_id = inner.next_fetch_id;
        let signal = CancelSignal::new();
        let core = Arc::clone(self);
        let task_signal = signal.clone();
        let options = FetchOptions { bypass_cache };

        tracing::debug!(fetch_id, key = %query.cache_key(), bypass_cache, "starting availability fetch");
        let task = runtime.spawn(async move {
            let result = core.fetcher.fetch(&query, options, &task_signal).await;
            core.finish_cycle(fetch_id, &task_signal, result);
        });
        inner.active = Some(FetchHandle::new(fetch_id, signal, Some(task.abort_handle())));
        None
    }

    fn finish_cycle(
        &self,
        fetch_id: u64,
        signal: &CancelSignal,
        result: Result<NormalizedAvailability, FetchError>,
    ) {
        let mut inner = self.lock_inner();

        let is_active = inner.active.as_ref().map(FetchHandle::id) == Some(fetch_id);
        if signal.is_cancelled() || !is_active {
            tracing::debug!(fetch_id, "discarding result of superseded availability fetch");
            return;
        }
        inner.active = None;

        match result {
            Ok(data) => {
                self.state_tx.send_modify(|state| {
                    state.data = data;
                    state.error = None;
                    state.loading = false;
                    state.phase = Phase::Ready;
                });
            }
            Err(FetchError::Cancelled) => {
                self.state_tx.send_modify(|state| {
                    state.loading = false;
                    state.phase = if state.error.is_some() { Phase::Failed } else { Phase::Ready };
                });
            }
            Err(error) => {
                if error.is_contract_drift() {
                    tracing::warn!(fetch_id, contract_drift = true, "Availability response did not match the contract: {}", error);
                } else {
                    Logger::error_with_component(
                        "availability-controller",
                        &format!("Failed to fetch availability (fetch {}): {}", fetch_id, error),
                    );
                }
                let failure = self.record_failure(AvailabilityError::from(&error));
                drop(inner);
                self.report(Some(failure));
            }
        }
    }

    /// Publish the failed state. Caller holds the inner lock.
    fn record_failure(&self, error: AvailabilityError) -> String {
        let message = error.message().to_string();
        self.state_tx.send_modify(|state| {
            state.error = Some(error);
            state.loading = false;
            state.phase = Phase::Failed;
        });
        message
    }

    /// Notify a failure; must not be called while holding the inner lock
    fn report(&self, failure: Option<String>) {
        if let Some(message) = failure {
            self.notifier.notify(NotificationKind::Error, &message);
        }
    }
}

/// View-state controller for one mounted availability view
pub struct AvailabilityController {
    core: Arc<ControllerCore>,
}

impl AvailabilityController {
    pub fn new(fetcher: AvailabilityFetcher, options: ControllerOptions) -> Self {
        let selected_date = match &options.initial_date {
            Some(input) => normalize_date(input, options.clock.as_ref()),
            None => options.clock.today(),
        };

        let initial = AvailabilityState {
            selected_date,
            view_mode: options.view_mode,
            resource_id: options.resource_id,
            resource_type: options.resource_type,
            desk_filter: None,
            data: NormalizedAvailability::empty(options.resource_type),
            loading: false,
            error: None,
            phase: Phase::Idle,
        };
        let (state_tx, _) = watch::channel(initial);

        Self {
            core: Arc::new(ControllerCore {
                fetcher,
                clock: options.clock,
                notifier: options.notifier,
                inner: Mutex::new(ControllerInner::default()),
                state_tx,
            }),
        }
    }

    /// Run the first fetch cycle; changes made before mounting only update state
    pub fn mount(&self) {
        self.core.mount();
    }

    pub fn state(&self) -> AvailabilityState {
        self.core.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<AvailabilityState> {
        self.core.state_tx.subscribe()
    }

    pub fn set_date(&self, date: NaiveDate) {
        self.core.apply(Navigation {
            date: Some(date),
            ..Navigation::default()
        });
    }

    /// Unparsable dates are ignored and the current state is kept
    pub fn set_date_str(&self, date: &str) {
        match parse_date(date) {
            Some(date) => self.set_date(date),
            None => Logger::debug_with_component(
                "availability-controller",
                &format!("Ignoring navigation to unparsable date '{}'", date),
            ),
        }
    }

    pub fn set_view_mode(&self, view_mode: ViewMode) {
        self.core.apply(Navigation {
            view_mode: Some(view_mode),
            ..Navigation::default()
        });
    }

    /// Values outside `day`/`week`/`month` are ignored
    pub fn set_view_mode_str(&self, view_mode: &str) {
        match view_mode.parse::<ViewMode>() {
            Ok(view_mode) => self.set_view_mode(view_mode),
            Err(e) => tracing::debug!("Ignoring view mode change: {}", e),
        }
    }

    pub fn navigate_next(&self) {
        self.step(NavigationDirection::Next);
    }

    pub fn navigate_previous(&self) {
        self.step(NavigationDirection::Previous);
    }

    pub fn navigate_today(&self) {
        self.step(NavigationDirection::Today);
    }

    fn step(&self, direction: NavigationDirection) {
        self.core.apply(Navigation {
            step: Some(direction),
            ..Navigation::default()
        });
    }

    /// Change date and view together with a single fetch
    pub fn go_to_date_and_view(&self, date: NaiveDate, view_mode: ViewMode) {
        self.core.apply(Navigation {
            date: Some(date),
            view_mode: Some(view_mode),
            ..Navigation::default()
        });
    }

    pub fn set_resource(&self, resource_id: i64, resource_type: ResourceType) {
        self.core.apply(Navigation {
            resource: Some((resource_id, resource_type)),
            ..Navigation::default()
        });
    }

    pub fn set_desk_filter(&self, desk_id: Option<i64>) {
        self.core.state_tx.send_if_modified(|state| {
            let changed = state.desk_filter != desk_id;
            state.desk_filter = desk_id;
            changed
        });
    }

    /// Follow a click on a month cell
    pub fn apply_cell_action(&self, action: CellAction) {
        match action {
            CellAction::OpenDay(date) => self.go_to_date_and_view(date, ViewMode::Day),
            CellAction::ShowMonth(date) => self.set_date(date),
        }
    }

    /// Re-fetch the current view; bypassing also drops the current cache entry
    pub fn refresh(&self, bypass_cache: bool) {
        self.core.refresh(bypass_cache);
    }

    /// Refresh after an external mutation (bypasses the cache)
    pub fn refresh_default(&self) {
        self.refresh(true);
    }

    pub(crate) fn downgrade(&self) -> Weak<ControllerCore> {
        Arc::downgrade(&self.core)
    }
}

impl Drop for AvailabilityController {
    fn drop(&mut self) {
        self.core.unmount();
    }
}
