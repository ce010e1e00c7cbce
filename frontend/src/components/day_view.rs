//! Day view: desk cards for coworking spaces, slot rows for common spaces.

use chrono::NaiveDate;
use shared::{DayResource, Desk, NormalizedAvailability, TimeSlot};

use crate::services::date_utils::format_date_for_display;
use crate::services::status_classifier::{classify_availability, Classification};

pub const NO_AVAILABILITY_MESSAGE: &str = "No hay datos de disponibilidad para esta fecha";

/// One bookable time range
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRow {
    pub hora_inicio: String,
    pub hora_fin: String,
    pub classification: Classification,
}

impl SlotRow {
    pub fn from_slot(slot: &TimeSlot) -> Self {
        Self {
            hora_inicio: slot.hora_inicio.clone(),
            hora_fin: slot.hora_fin.clone(),
            classification: classify_availability(slot.disponible),
        }
    }

    pub fn time_range(&self) -> String {
        format!("{}–{}", self.hora_inicio, self.hora_fin)
    }

    /// e.g. `08:00–09:00 Disponible`
    pub fn text(&self) -> String {
        format!("{} {}", self.time_range(), self.classification.label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeskCard {
    pub desk_id: i64,
    pub title: String,
    pub classification: Classification,
    pub slots: Vec<SlotRow>,
}

impl DeskCard {
    pub fn from_desk(desk: &Desk) -> Self {
        Self {
            desk_id: desk.id,
            title: format!("Escritorio {}", desk.display_number()),
            classification: classify_availability(desk.disponible),
            slots: desk.slots.iter().map(SlotRow::from_slot).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DayView {
    Coworking { heading: String, cards: Vec<DeskCard> },
    Common { heading: String, rows: Vec<SlotRow> },
    Empty { heading: String, message: &'static str },
}

impl DayView {
    pub fn heading(&self) -> &str {
        match self {
            DayView::Coworking { heading, .. }
            | DayView::Common { heading, .. }
            | DayView::Empty { heading, .. } => heading,
        }
    }
}

pub fn render_day(data: &NormalizedAvailability, selected_date: NaiveDate) -> DayView {
    let heading = format_date_for_display(selected_date);
    match data.day_resource() {
        DayResource::Coworking(desks) if !desks.is_empty() => DayView::Coworking {
            heading,
            cards: desks.iter().map(DeskCard::from_desk).collect(),
        },
        DayResource::Common(slots) if !slots.is_empty() => DayView::Common {
            heading,
            rows: slots.iter().map(SlotRow::from_slot).collect(),
        },
        _ => DayView::Empty {
            heading,
            message: NO_AVAILABILITY_MESSAGE,
        },
    }
}
