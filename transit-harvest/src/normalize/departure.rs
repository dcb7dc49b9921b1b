//! Raw stop event to [`Departure`].

use serde_json::Value;

use crate::domain::{Departure, Notice};

use super::error::Rejection;
use super::extract::{expect_object, list, text, time};

/// Normalize one raw stop event. The station id and a valid planned
/// departure time are required; everything else is optional.
pub fn normalize_departure(raw: &Value) -> Result<Departure, Rejection> {
    expect_object(raw, "")?;

    let station_id = text(raw, "/location/id").ok_or(Rejection::MissingField("location.id"))?;
    let planned =
        time(raw, "/departureTimePlanned").ok_or(Rejection::MissingField("departureTimePlanned"))?;

    let mut departure =
        Departure::new(station_id, planned).with_estimate(time(raw, "/departureTimeEstimated"));

    departure.station_name = text(raw, "/location/name");
    departure.platform = text(raw, "/location/properties/platform")
        .or_else(|| text(raw, "/location/disassembledName"));
    departure.line_id = text(raw, "/transportation/id");
    departure.line_number = text(raw, "/transportation/number");
    departure.line_name = text(raw, "/transportation/name");
    departure.direction = text(raw, "/transportation/destination/name");
    departure.direction_id = text(raw, "/transportation/destination/id");
    departure.operator_id = text(raw, "/transportation/operator/id");
    departure.operator_name = text(raw, "/transportation/operator/name");
    departure.line_infos = notices(raw, "/infos")?;
    departure.stop_infos = notices(raw, "/location/infos")?;

    Ok(departure)
}

fn notices(raw: &Value, path: &str) -> Result<Vec<Notice>, Rejection> {
    list(raw, path)?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            expect_object(item, &format!("{path}/{i}"))?;
            Ok(notice(item))
        })
        .collect()
}

fn notice(raw: &Value) -> Notice {
    let subject = text(raw, "/subject").or_else(|| text(raw, "/title"));

    Notice {
        content: text(raw, "/content"),
        subtitle: text(raw, "/subtitle"),
        subject,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stop_event() -> Value {
        json!({
            "location": {
                "id": "de:08111:6118",
                "name": "Hauptbahnhof (tief)",
                "properties": { "platform": "101" },
                "infos": [
                    { "content": "Aufzug defekt", "subtitle": "Aufzug", "title": "Stoerung Aufzug" }
                ]
            },
            "departureTimePlanned": "2022-10-05T10:02:00Z",
            "departureTimeEstimated": "2022-10-05T10:05:00Z",
            "transportation": {
                "id": "ddb:92M01: :R:j22",
                "name": "S-Bahn S1",
                "number": "S1",
                "destination": { "id": "8001234", "name": "Kirchheim (T)" },
                "operator": { "id": "8", "name": "DB Regio AG" }
            },
            "infos": [
                { "content": "Bauarbeiten", "subtitle": "Ersatzverkehr", "subject": "S1" },
                { "content": "Nur Text" }
            ]
        })
    }

    #[test]
    fn full_stop_event() {
        let dep = normalize_departure(&stop_event()).unwrap();

        assert_eq!(dep.station_id, "de:08111:6118");
        assert_eq!(dep.station_name.as_deref(), Some("Hauptbahnhof (tief)"));
        assert_eq!(dep.platform.as_deref(), Some("101"));
        assert_eq!(dep.line_number.as_deref(), Some("S1"));
        assert_eq!(dep.direction.as_deref(), Some("Kirchheim (T)"));
        assert_eq!(dep.operator_name.as_deref(), Some("DB Regio AG"));
        assert_eq!(dep.delay_minutes, Some(3));

        assert_eq!(dep.line_infos.len(), 2);
        assert_eq!(dep.line_infos[0].subject.as_deref(), Some("S1"));
        assert_eq!(dep.line_infos[1].subtitle, None);

        assert_eq!(dep.stop_infos.len(), 1);
        assert_eq!(dep.stop_infos[0].subject.as_deref(), Some("Stoerung Aufzug"));
    }

    #[test]
    fn no_estimate_means_no_delay() {
        let mut raw = stop_event();
        raw.as_object_mut().unwrap().remove("departureTimeEstimated");

        let dep = normalize_departure(&raw).unwrap();
        assert_eq!(dep.estimated, None);
        assert_eq!(dep.delay_minutes, None);
    }

    #[test]
    fn minimal_stop_event() {
        let raw = json!({
            "location": { "id": "de:08111:6118" },
            "departureTimePlanned": "2022-10-05T10:02:00+02:00"
        });
        let dep = normalize_departure(&raw).unwrap();

        assert_eq!(dep.station_name, None);
        assert_eq!(dep.line_id, None);
        assert!(dep.line_infos.is_empty());
        assert!(dep.stop_infos.is_empty());
    }

    #[test]
    fn mandatory_fields() {
        let mut raw = stop_event();
        raw["location"].as_object_mut().unwrap().remove("id");
        assert_eq!(
            normalize_departure(&raw),
            Err(Rejection::MissingField("location.id"))
        );

        let mut raw = stop_event();
        raw["departureTimePlanned"] = json!("not a time");
        assert_eq!(
            normalize_departure(&raw),
            Err(Rejection::MissingField("departureTimePlanned"))
        );
    }

    #[test]
    fn malformed_infos() {
        let mut raw = stop_event();
        raw["infos"] = json!({ "content": "x" });
        assert_eq!(
            normalize_departure(&raw),
            Err(Rejection::malformed("/infos", "a list"))
        );

        let mut raw = stop_event();
        raw["location"]["infos"] = json!([1]);
        assert_eq!(
            normalize_departure(&raw),
            Err(Rejection::malformed("/location/infos/0", "an object"))
        );
    }
}
