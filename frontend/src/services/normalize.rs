//! Converts the availability endpoint's payloads into [`NormalizedAvailability`].
//!
//! The endpoint answers with a different body per view mode and has shipped
//! two spellings of some fields over time; this is the only place that knows
//! about either.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    DayAggregate, DayAvailabilityPayload, Desk, MonthAvailabilityPayload, NormalizedAvailability,
    ResourceType, TimeSlot, ViewMode, WeekAvailabilityPayload, WireDesk, WireTimeSlot,
};
use std::collections::BTreeMap;

use super::config::BusinessHours;
use super::date_utils::parse_date;
use super::error::NormalizationError;
use super::logging::Logger;

pub fn normalize_response(
    body: Value,
    view_mode: ViewMode,
    resource_type: ResourceType,
    hours: &BusinessHours,
) -> Result<NormalizedAvailability, NormalizationError> {
    if !body.is_object() {
        return Err(NormalizationError::NotAnObject);
    }

    let mut normalized = NormalizedAvailability::empty(resource_type);

    match view_mode {
        ViewMode::Day => {
            let payload: DayAvailabilityPayload = decode(body, view_mode)?;
            let desks = match (payload.escritorios, &payload.slots) {
                (Some(desks), _) => desks,
                // Some whole-space endpoints answer with the slot list only
                (None, Some(_)) => Vec::new(),
                (None, None) => {
                    return Err(NormalizationError::MissingField {
                        view: view_mode,
                        field: "escritorios",
                    })
                }
            };
            normalized.escritorios = desks.into_iter().map(|desk| normalize_desk(desk, hours)).collect();

            if resource_type == ResourceType::Common {
                normalized.slots = match payload.slots {
                    Some(slots) if normalized.escritorios.is_empty() => normalize_slots(slots, hours),
                    _ => normalized
                        .escritorios
                        .first()
                        .map(|desk| desk.slots.clone())
                        .unwrap_or_default(),
                };
            }
        }
        ViewMode::Week => {
            let payload: WeekAvailabilityPayload = decode(body, view_mode)?;
            let week_data = payload.week_data.ok_or(NormalizationError::MissingField {
                view: view_mode,
                field: "weekData",
            })?;
            normalized.week_data = normalize_aggregates(week_data);
        }
        ViewMode::Month => {
            let payload: MonthAvailabilityPayload = decode(body, view_mode)?;
            let month_data = payload.month_data.ok_or(NormalizationError::MissingField {
                view: view_mode,
                field: "monthData",
            })?;
            normalized.month_data = normalize_aggregates(month_data);
            normalized.escritorios = payload
                .escritorios
                .unwrap_or_default()
                .into_iter()
                .map(|desk| normalize_desk(desk, hours))
                .collect();
        }
    }

    Ok(normalized)
}

fn decode<T: DeserializeOwned>(body: Value, view: ViewMode) -> Result<T, NormalizationError> {
    serde_json::from_value(body).map_err(|source| NormalizationError::InvalidShape { view, source })
}

pub fn normalize_slot(slot: WireTimeSlot, hours: &BusinessHours) -> TimeSlot {
    match slot {
        WireTimeSlot::Range {
            hora_inicio,
            hora_fin,
            disponible,
        } => TimeSlot::new(hora_inicio, hora_fin, disponible),
        WireTimeSlot::Legacy { time, is_available } => {
            let end = hours.slot_end_for(&time);
            TimeSlot::new(time, end, is_available)
        }
    }
}

fn normalize_slots(slots: Vec<WireTimeSlot>, hours: &BusinessHours) -> Vec<TimeSlot> {
    slots.into_iter().map(|slot| normalize_slot(slot, hours)).collect()
}

pub fn normalize_desk(desk: WireDesk, hours: &BusinessHours) -> Desk {
    let slots = normalize_slots(desk.slots, hours);
    let disponible = desk
        .disponible
        .unwrap_or_else(|| slots.iter().any(|slot| slot.disponible));
    Desk {
        id: desk.id,
        numero: desk.numero,
        disponible,
        slots,
    }
}

fn normalize_aggregates(raw: BTreeMap<String, DayAggregate>) -> BTreeMap<NaiveDate, DayAggregate> {
    raw.into_iter()
        .filter_map(|(key, mut aggregate)| match parse_date(&key) {
            Some(date) => {
                aggregate.occupancy_percentage = clamp_percentage(aggregate.occupancy_percentage);
                for desk in &mut aggregate.escritorios {
                    desk.occupancy_percentage = clamp_percentage(desk.occupancy_percentage);
                }
                Some((date, aggregate))
            }
            None => {
                Logger::warn_with_component(
                    "availability-normalizer",
                    &format!("Dropping availability entry with invalid date key '{}'", key),
                );
                None
            }
        })
        .collect()
}

fn clamp_percentage(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::Status;

    fn hours() -> BusinessHours {
        BusinessHours::default()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_coworking_desks() {
        let body = json!({"escritorios": [
            {"id": 1, "numero": 1, "disponible": true},
            {"id": 2, "numero": 2, "disponible": false}
        ]});
        let data = normalize_response(body, ViewMode::Day, ResourceType::Coworking, &hours()).unwrap();
        assert_eq!(data.escritorios.len(), 2);
        assert!(data.escritorios[0].disponible);
        assert!(!data.escritorios[1].disponible);
        assert!(data.slots.is_empty());
        assert!(data.week_data.is_empty());
        assert!(data.month_data.is_empty());
    }

    #[test]
    fn test_day_common_flattens_first_desk_slots() {
        let body = json!({"escritorios": [
            {"id": 1, "slots": [{"hora_inicio": "08:00", "hora_fin": "09:00", "disponible": true}]}
        ]});
        let data = normalize_response(body, ViewMode::Day, ResourceType::Common, &hours()).unwrap();
        assert_eq!(data.slots, vec![TimeSlot::new("08:00", "09:00", true)]);
        // Wrapper desk inherits availability from its slots
        assert!(data.escritorios[0].disponible);
    }

    #[test]
    fn test_day_common_accepts_legacy_slots() {
        let body = json!({"slots": [{"time": "10:00", "isAvailable": false}]});
        let data = normalize_response(body, ViewMode::Day, ResourceType::Common, &hours()).unwrap();
        assert_eq!(data.slots, vec![TimeSlot::new("10:00", "11:00", false)]);
        assert!(data.escritorios.is_empty());
    }

    #[test]
    fn test_day_with_empty_desk_list_is_valid() {
        let data = normalize_response(json!({"escritorios": []}), ViewMode::Day, ResourceType::Common, &hours()).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_week_accepts_both_keys() {
        for key in ["weekData", "weekAvailability"] {
            let body = json!({ key: {"2024-06-10": {"status": "partial", "occupancyPercentage": 150}} });
            let data = normalize_response(body, ViewMode::Week, ResourceType::Common, &hours()).unwrap();
            let entry = &data.week_data[&date(2024, 6, 10)];
            assert_eq!(entry.status, Status::Partial);
            assert_eq!(entry.occupancy_percentage, 100.0);
            assert!(data.escritorios.is_empty());
            assert!(data.month_data.is_empty());
        }
    }

    #[test]
    fn test_month_with_desks_and_bad_keys() {
        let body = json!({
            "monthAvailability": {
                "2024-06-01": {"status": "free"},
                "junio": {"status": "free"}
            },
            "escritorios": [{"id": 3, "numero": "B2", "disponible": true}]
        });
        let data = normalize_response(body, ViewMode::Month, ResourceType::Coworking, &hours()).unwrap();
        assert_eq!(data.month_data.len(), 1);
        assert_eq!(data.escritorios[0].display_number(), "B2");
        assert!(data.week_data.is_empty());
    }

    #[test]
    fn test_every_valid_response_has_all_containers() {
        let cases = [
            (ViewMode::Day, json!({"escritorios": []})),
            (ViewMode::Week, json!({"weekData": {}})),
            (ViewMode::Month, json!({"monthData": {}})),
        ];
        for (mode, body) in cases {
            for resource_type in [ResourceType::Coworking, ResourceType::Common] {
                let data = normalize_response(body.clone(), mode, resource_type, &hours()).unwrap();
                assert!(data.is_empty(), "{:?}/{:?}", mode, resource_type);
                assert_eq!(data.resource_type, resource_type);
            }
        }
    }

    #[test]
    fn test_shape_errors() {
        assert!(matches!(
            normalize_response(Value::Null, ViewMode::Day, ResourceType::Common, &hours()),
            Err(NormalizationError::NotAnObject)
        ));
        assert!(matches!(
            normalize_response(json!([1, 2]), ViewMode::Week, ResourceType::Common, &hours()),
            Err(NormalizationError::NotAnObject)
        ));
        assert!(matches!(
            normalize_response(json!({"monthData": {}}), ViewMode::Week, ResourceType::Common, &hours()),
            Err(NormalizationError::MissingField { field: "weekData", .. })
        ));
        assert!(matches!(
            normalize_response(json!({}), ViewMode::Day, ResourceType::Coworking, &hours()),
            Err(NormalizationError::MissingField { field: "escritorios", .. })
        ));
        assert!(matches!(
            normalize_response(json!({"escritorios": "nope"}), ViewMode::Day, ResourceType::Coworking, &hours()),
            Err(NormalizationError::InvalidShape { .. })
        ));
    }
}
