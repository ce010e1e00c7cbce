//! Maps raw occupancy data to a status label and a color token.

use shared::{Reservation, Status};

/// Result of classifying one day, desk or slot
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Effective status after fallbacks; never `Unknown`
    pub status: Status,
    pub label: String,
    pub color_token: &'static str,
    /// Confirmed plus pending reservations
    pub active_reservations: usize,
    pub occupancy_percentage: f64,
}

/// Fixed color lookup; anything without an entry uses the unavailable token
pub fn color_token_for(status_key: &str) -> &'static str {
    match status_key {
        "free" => "green",
        "partial" => "amber",
        "occupied" => "red",
        "unavailable" => "gray",
        "past" => "slate",
        "reserved" => "blue",
        _ => "gray",
    }
}

pub fn count_active_reservations(reservations: &[Reservation]) -> usize {
    reservations
        .iter()
        .filter(|reservation| reservation.estado.is_active())
        .count()
}

/// Classify a typed status.
///
/// `Unknown` degrades to `Unavailable` so a cell is never left blank.
pub fn classify(
    status: Status,
    occupancy_percentage: Option<f64>,
    reservations: &[Reservation],
) -> Classification {
    let status = match status {
        Status::Unknown => Status::Unavailable,
        other => other,
    };
    let active_reservations = count_active_reservations(reservations);
    let occupancy_percentage = occupancy_percentage
        .filter(|value| value.is_finite())
        .map(|value| value.clamp(0.0, 100.0))
        .unwrap_or(0.0);

    let label = match status {
        Status::Free => "Disponible".to_string(),
        Status::Partial => {
            let noun = if active_reservations == 1 { "reserva" } else { "reservas" };
            format!("Parcialmente ocupado ({} {})", active_reservations, noun)
        }
        Status::Occupied => "Ocupado".to_string(),
        Status::Past => "Fecha pasada".to_string(),
        Status::Reserved => "Reservado".to_string(),
        Status::Unavailable | Status::Unknown => "No disponible".to_string(),
    };

    Classification {
        status,
        label,
        color_token: color_token_for(status.as_str()),
        active_reservations,
        occupancy_percentage,
    }
}

/// Classify a raw status string as received from the server or a template
pub fn classify_str(
    status: Option<&str>,
    occupancy_percentage: Option<f64>,
    reservations: &[Reservation],
) -> Classification {
    let status = status.map(Status::parse).unwrap_or(Status::Unknown);
    classify(status, occupancy_percentage, reservations)
}

/// Classify the simple available/occupied flag carried by desks and slots
pub fn classify_availability(disponible: bool) -> Classification {
    let status = if disponible { Status::Free } else { Status::Occupied };
    classify(status, None, &[])
}
