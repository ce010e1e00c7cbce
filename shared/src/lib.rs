use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Calendar granularity shown by the availability views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,
    Week,
    Month,
}

impl ViewMode {
    /// Value sent as the `vista` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Day => "day",
            ViewMode::Week => "week",
            ViewMode::Month => "month",
        }
    }

    pub fn all() -> [ViewMode; 3] {
        [ViewMode::Day, ViewMode::Week, ViewMode::Month]
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a view mode string is not one of `day`, `week`, `month`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid view mode '{0}', expected day, week or month")]
pub struct ParseViewModeError(pub String);

impl FromStr for ViewMode {
    type Err = ParseViewModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(ViewMode::Day),
            "week" => Ok(ViewMode::Week),
            "month" => Ok(ViewMode::Month),
            _ => Err(ParseViewModeError(s.to_string())),
        }
    }
}

/// Shape of a bookable space.
///
/// Coworking spaces expose individual desks (escritorios); every other space
/// type is booked as a whole through a flat list of time slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Coworking,
    Common,
}

impl ResourceType {
    /// Value sent as the `tipo_espacio` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Coworking => "coworking",
            ResourceType::Common => "common",
        }
    }

    /// Map a space-type string from the admin screens onto a resource shape
    pub fn from_space_type(space_type: &str) -> Self {
        if space_type.trim().eq_ignore_ascii_case("coworking") {
            ResourceType::Coworking
        } else {
            ResourceType::Common
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display status of a day, a desk or a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum Status {
    Free,
    Partial,
    Occupied,
    Unavailable,
    /// Transient UI state for dates that can no longer be booked
    Past,
    /// Transient UI state for a slot held by the current user
    Reserved,
    /// Missing or unrecognised status from the server
    Unknown,
}

impl Status {
    /// Lenient parse of the status strings the server has been seen to send
    pub fn parse(raw: &str) -> Status {
        match raw.trim().to_ascii_lowercase().as_str() {
            "free" | "disponible" | "libre" | "available" => Status::Free,
            "partial" | "parcial" | "parcialmente_ocupado" => Status::Partial,
            "occupied" | "ocupado" | "full" | "completo" => Status::Occupied,
            "unavailable" | "no_disponible" | "bloqueado" | "blocked" => Status::Unavailable,
            "past" | "pasado" => Status::Past,
            "reserved" | "reservado" => Status::Reserved,
            _ => Status::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Free => "free",
            Status::Partial => "partial",
            Status::Occupied => "occupied",
            Status::Unavailable => "unavailable",
            Status::Past => "past",
            Status::Reserved => "reserved",
            Status::Unknown => "unknown",
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Unknown
    }
}

impl From<Option<String>> for Status {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map(Status::parse).unwrap_or(Status::Unknown)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a reservation (reserva)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum ReservationState {
    Confirmada,
    Pendiente,
    Cancelada,
    Other,
}

impl ReservationState {
    /// Confirmed and pending reservations count toward occupancy
    pub fn is_active(&self) -> bool {
        matches!(self, ReservationState::Confirmada | ReservationState::Pendiente)
    }
}

impl From<Option<String>> for ReservationState {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "confirmada" => ReservationState::Confirmada,
            Some(s) if s == "pendiente" => ReservationState::Pendiente,
            Some(s) if s == "cancelada" => ReservationState::Cancelada,
            _ => ReservationState::Other,
        }
    }
}

/// Minimal reservation record as consumed by the availability core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default = "default_reservation_state")]
    pub estado: ReservationState,
}

fn default_reservation_state() -> ReservationState {
    ReservationState::Other
}

impl Reservation {
    pub fn new(estado: ReservationState) -> Self {
        Self { id: None, estado }
    }
}

/// Desk number, sent by the server either as an integer or as a label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeskNumber {
    Number(i64),
    Label(String),
}

impl fmt::Display for DeskNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeskNumber::Number(n) => write!(f, "{}", n),
            DeskNumber::Label(label) => f.write_str(label),
        }
    }
}

/// One bookable interval within operating hours
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Start time, "HH:MM"
    pub hora_inicio: String,
    /// End time, "HH:MM"
    pub hora_fin: String,
    pub disponible: bool,
}

impl TimeSlot {
    pub fn new(hora_inicio: impl Into<String>, hora_fin: impl Into<String>, disponible: bool) -> Self {
        Self {
            hora_inicio: hora_inicio.into(),
            hora_fin: hora_fin.into(),
            disponible,
        }
    }
}

/// Time slot as it arrives on the wire; both shapes are still served
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireTimeSlot {
    Range {
        hora_inicio: String,
        hora_fin: String,
        #[serde(default)]
        disponible: bool,
    },
    Legacy {
        time: String,
        #[serde(rename = "isAvailable", default)]
        is_available: bool,
    },
}

/// A physical desk inside a coworking space for a given day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Desk {
    pub id: i64,
    pub numero: Option<DeskNumber>,
    pub disponible: bool,
    pub slots: Vec<TimeSlot>,
}

impl Desk {
    /// Label shown on desk cards, falling back to the id when unnumbered
    pub fn display_number(&self) -> String {
        match &self.numero {
            Some(numero) => numero.to_string(),
            None => self.id.to_string(),
        }
    }
}

/// Desk entry as it arrives on the wire
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireDesk {
    pub id: i64,
    #[serde(default)]
    pub numero: Option<DeskNumber>,
    #[serde(default)]
    pub disponible: Option<bool>,
    #[serde(default)]
    pub slots: Vec<WireTimeSlot>,
}

/// Per-date aggregate used by week and month views
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DayAggregate {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub reservas: Vec<Reservation>,
    #[serde(rename = "occupancyPercentage", default)]
    pub occupancy_percentage: f64,
    #[serde(default)]
    pub escritorios: Vec<DeskAggregate>,
}

impl DayAggregate {
    /// Aggregate for a single desk on this date, if the server sent one
    pub fn desk(&self, desk_id: i64) -> Option<&DeskAggregate> {
        self.escritorios.iter().find(|desk| desk.id == desk_id)
    }
}

/// Same aggregate as [`DayAggregate`] scoped to one desk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskAggregate {
    #[serde(alias = "escritorio_id")]
    pub id: i64,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub reservas: Vec<Reservation>,
    #[serde(rename = "occupancyPercentage", default)]
    pub occupancy_percentage: f64,
}

/// Response body for `vista=day`
#[derive(Debug, Clone, Deserialize)]
pub struct DayAvailabilityPayload {
    #[serde(default)]
    pub escritorios: Option<Vec<WireDesk>>,
    #[serde(default)]
    pub slots: Option<Vec<WireTimeSlot>>,
}

/// Response body for `vista=week`
#[derive(Debug, Clone, Deserialize)]
pub struct WeekAvailabilityPayload {
    #[serde(rename = "weekData", alias = "weekAvailability", default)]
    pub week_data: Option<BTreeMap<String, DayAggregate>>,
}

/// Response body for `vista=month`
#[derive(Debug, Clone, Deserialize)]
pub struct MonthAvailabilityPayload {
    #[serde(rename = "monthData", alias = "monthAvailability", default)]
    pub month_data: Option<BTreeMap<String, DayAggregate>>,
    #[serde(default)]
    pub escritorios: Option<Vec<WireDesk>>,
}

/// Unified availability shape for every view mode.
///
/// Only the fields relevant to the requested view are populated; the others
/// stay as empty containers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedAvailability {
    pub resource_type: ResourceType,
    pub escritorios: Vec<Desk>,
    pub slots: Vec<TimeSlot>,
    pub week_data: BTreeMap<NaiveDate, DayAggregate>,
    pub month_data: BTreeMap<NaiveDate, DayAggregate>,
}

/// Day-view resource, tagged once by the normalizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DayResource<'a> {
    Coworking(&'a [Desk]),
    Common(&'a [TimeSlot]),
}

impl NormalizedAvailability {
    pub fn empty(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            escritorios: Vec::new(),
            slots: Vec::new(),
            week_data: BTreeMap::new(),
            month_data: BTreeMap::new(),
        }
    }

    pub fn day_resource(&self) -> DayResource<'_> {
        match self.resource_type {
            ResourceType::Coworking => DayResource::Coworking(&self.escritorios),
            ResourceType::Common => DayResource::Common(&self.slots),
        }
    }

    /// Aggregate for a date, looked up in the month data first and the week data second
    pub fn aggregate_for(&self, date: NaiveDate) -> Option<&DayAggregate> {
        self.month_data.get(&date).or_else(|| self.week_data.get(&date))
    }

    pub fn is_empty(&self) -> bool {
        self.escritorios.is_empty()
            && self.slots.is_empty()
            && self.week_data.is_empty()
            && self.month_data.is_empty()
    }
}
