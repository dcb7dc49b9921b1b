//! Raw trip record to [`Trip`] graph.
//!
//! The rail check runs over every leg before anything is built, so a trip
//! with one bus leg is dropped whole and never half-constructed.

use serde_json::Value;

use crate::domain::{
    Accessibility, Hint, Info, Interchange, Leg, ParentStation, PathDescription, Stop,
    Transportation, Trip,
};

use super::error::Rejection;
use super::extract::{
    coord, expect_object, flag, get, int, joined_text, json_text, list, object, text, time,
};

const TRAIN_TYPE: &str = "/transportation/properties/trainType";

/// Normalize one raw trip.
pub fn normalize_trip(raw: &Value) -> Result<Trip, Rejection> {
    expect_object(raw, "")?;

    let raw_legs = list(raw, "/legs")?;
    if raw_legs.is_empty() {
        return Err(Rejection::NoLegs);
    }

    let mut train_types = Vec::with_capacity(raw_legs.len());
    for (idx, raw_leg) in raw_legs.iter().enumerate() {
        expect_object(raw_leg, &format!("/legs/{idx}"))?;
        train_types.push(rail_train_type(raw_leg, idx)?);
    }

    let legs = raw_legs
        .iter()
        .zip(train_types)
        .enumerate()
        .map(|(idx, (raw_leg, train_type))| convert_leg(raw_leg, idx, train_type))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Trip {
        rating: int(raw, "/rating"),
        is_additional: flag(raw, "/isAdditional"),
        interchanges: int(raw, "/interchanges"),
        legs,
    })
}

/// The leg's train type, provided it names a rail service.
fn rail_train_type(raw_leg: &Value, idx: usize) -> Result<String, Rejection> {
    let train_type = text(raw_leg, TRAIN_TYPE).ok_or(Rejection::MissingTrainType { leg: idx })?;

    if is_bus(&train_type) {
        return Err(Rejection::NotRail {
            leg: idx,
            train_type,
        });
    }

    Ok(train_type)
}

/// Bus services (including rail replacement buses) carry "Bus" somewhere
/// in their train type.
fn is_bus(train_type: &str) -> bool {
    train_type.to_ascii_lowercase().contains("bus")
}

fn convert_leg(raw: &Value, idx: usize, train_type: String) -> Result<Leg, Rejection> {
    let base = format!("/legs/{idx}");

    Ok(Leg {
        duration: int(raw, "/duration"),
        is_realtime_controlled: flag(raw, "/isRealtimeControlled"),
        realtime_status: joined_text(raw, "/realtimeStatus"),
        transportation: convert_transportation(raw, train_type),
        origin: object(raw, "/origin").map(convert_stop),
        destination: object(raw, "/destination").map(convert_stop),
        hints: each(raw, &base, "/hints", convert_hint)?,
        stop_sequence: each(raw, &base, "/stopSequence", convert_stop)?,
        infos: each(raw, &base, "/infos", convert_info)?,
        path_descriptions: each(raw, &base, "/pathDescriptions", convert_path_description)?,
        interchange: object(raw, "/interchange").map(convert_interchange),
        accessibility: convert_accessibility(raw),
    })
}

/// Convert every element of the list at `path`. Elements must be objects;
/// their fields are all optional.
fn each<T>(
    raw: &Value,
    base: &str,
    path: &str,
    convert: fn(&Value) -> T,
) -> Result<Vec<T>, Rejection> {
    let items =
        list(raw, path).map_err(|_| Rejection::malformed(&format!("{base}{path}"), "a list"))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            expect_object(item, &format!("{base}{path}/{i}"))?;
            Ok(convert(item))
        })
        .collect()
}

fn convert_transportation(raw: &Value, train_type: String) -> Transportation {
    Transportation {
        id: text(raw, "/transportation/id"),
        name: text(raw, "/transportation/name"),
        disassembled_name: text(raw, "/transportation/disassembledName"),
        number: text(raw, "/transportation/number"),
        product_class: int(raw, "/transportation/product/class"),
        product_name: text(raw, "/transportation/product/name"),
        operator_id: text(raw, "/transportation/operator/id"),
        operator_code: text(raw, "/transportation/operator/code"),
        operator_name: text(raw, "/transportation/operator/name"),
        destination_id: text(raw, "/transportation/destination/id"),
        destination_name: text(raw, "/transportation/destination/name"),
        destination_type: text(raw, "/transportation/destination/type"),
        train_name: text(raw, "/transportation/properties/trainName"),
        train_type,
        train_number: text(raw, "/transportation/properties/trainNumber"),
        trip_code: int(raw, "/transportation/properties/tripCode"),
    }
}

fn convert_stop(raw: &Value) -> Stop {
    Stop {
        id: text(raw, "/id"),
        name: text(raw, "/name"),
        disassembled_name: text(raw, "/disassembledName"),
        stop_type: text(raw, "/type"),
        point_type: text(raw, "/pointType"),
        coord: coord(raw, "/coord"),
        level: int(raw, "/niveau"),
        parent: object(raw, "/parent").map(convert_parent),
        grandparent: object(raw, "/parent/parent").map(convert_parent),
        arrival_planned: time(raw, "/arrivalTimePlanned"),
        arrival_estimated: time(raw, "/arrivalTimeEstimated"),
        departure_planned: time(raw, "/departureTimePlanned"),
        departure_estimated: time(raw, "/departureTimeEstimated"),
        platform: text(raw, "/properties/platform"),
        platform_name: text(raw, "/properties/platformName"),
        planned_platform_name: text(raw, "/properties/plannedPlatformName"),
        area: text(raw, "/properties/area"),
    }
}

fn convert_parent(raw: &Value) -> ParentStation {
    ParentStation {
        id: text(raw, "/id"),
        name: text(raw, "/name"),
        disassembled_name: text(raw, "/disassembledName"),
        stop_type: text(raw, "/type"),
    }
}

fn convert_hint(raw: &Value) -> Hint {
    Hint {
        content: text(raw, "/content"),
        provider_code: text(raw, "/providerCode"),
        hint_type: text(raw, "/type"),
        subnet: text(raw, "/properties/subnet"),
    }
}

fn convert_info(raw: &Value) -> Info {
    Info {
        priority: text(raw, "/priority"),
        id: text(raw, "/id"),
        version: int(raw, "/version"),
        info_type: text(raw, "/type"),
        url: text(raw, "/url"),
        url_text: text(raw, "/urlText"),
        content: text(raw, "/content"),
        subtitle: text(raw, "/subtitle"),
        title: text(raw, "/title"),
        publisher: text(raw, "/properties/publisher"),
        properties_info_type: text(raw, "/properties/infoType"),
        html_text: text(raw, "/properties/htmlText"),
        sms_text: text(raw, "/properties/smsText"),
    }
}

fn convert_path_description(raw: &Value) -> PathDescription {
    PathDescription {
        turn_direction: text(raw, "/turnDirection"),
        manoeuvre: text(raw, "/manoeuvre"),
        name: text(raw, "/name"),
        level: int(raw, "/niveau"),
        coord: coord(raw, "/coord"),
        sky_direction: int(raw, "/skyDirection"),
        duration: int(raw, "/duration"),
        cum_duration: int(raw, "/cumDuration"),
        distance: int(raw, "/distance"),
        cum_distance: int(raw, "/cumDistance"),
        from_coords_index: int(raw, "/fromCoordsIndex"),
        to_coords_index: int(raw, "/toCoordsIndex"),
        indoor_type: text(raw, "/properties/indoorType"),
    }
}

fn convert_interchange(raw: &Value) -> Interchange {
    Interchange {
        desc: text(raw, "/desc"),
        interchange_type: int(raw, "/type"),
        coords: json_text(raw, "/coords"),
    }
}

fn convert_accessibility(raw: &Value) -> Option<Accessibility> {
    get(raw, "/properties")?;

    let low_floor_vehicle = flag(raw, "/properties/PlanLowFloorVehicle");
    let wheelchair_access = flag(raw, "/properties/PlanWheelChairAccess");

    if low_floor_vehicle.is_none() && wheelchair_access.is_none() {
        return None;
    }

    Some(Accessibility {
        low_floor_vehicle,
        wheelchair_access,
    })
}
