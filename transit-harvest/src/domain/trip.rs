//! Trip entity graph.
//!
//! A [`Trip`] owns its legs, and each [`Leg`] owns its stops, hints, infos
//! and path descriptions. Every attribute that the journey planner may omit
//! is an `Option`; `None` means the field was absent in the source record.

use chrono::{DateTime, FixedOffset};

/// A planar coordinate as reported by the journey planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

/// One journey instance between two stations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trip {
    pub rating: Option<i64>,
    pub is_additional: Option<bool>,
    pub interchanges: Option<i64>,
    /// Legs in travel order. Never empty for a normalized trip.
    pub legs: Vec<Leg>,
}

/// One transportation segment of a trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leg {
    /// Duration in seconds.
    pub duration: Option<i64>,
    pub is_realtime_controlled: Option<bool>,
    /// Realtime status flags joined with `,` (e.g. `MONITORED`).
    pub realtime_status: Option<String>,
    pub transportation: Transportation,
    pub origin: Option<Stop>,
    pub destination: Option<Stop>,
    pub hints: Vec<Hint>,
    pub stop_sequence: Vec<Stop>,
    pub infos: Vec<Info>,
    pub path_descriptions: Vec<PathDescription>,
    pub interchange: Option<Interchange>,
    pub accessibility: Option<Accessibility>,
}

/// The vehicle and line serving a leg.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transportation {
    pub id: Option<String>,
    pub name: Option<String>,
    pub disassembled_name: Option<String>,
    pub number: Option<String>,
    pub product_class: Option<i64>,
    pub product_name: Option<String>,
    pub operator_id: Option<String>,
    pub operator_code: Option<String>,
    pub operator_name: Option<String>,
    pub destination_id: Option<String>,
    pub destination_name: Option<String>,
    pub destination_type: Option<String>,
    pub train_name: Option<String>,
    /// Rail classification. Always present: legs without one are rejected.
    pub train_type: String,
    pub train_number: Option<String>,
    pub trip_code: Option<i64>,
}

/// A station reference with optional planned/estimated timing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stop {
    pub id: Option<String>,
    pub name: Option<String>,
    pub disassembled_name: Option<String>,
    pub stop_type: Option<String>,
    pub point_type: Option<String>,
    pub coord: Option<Coord>,
    pub level: Option<i64>,
    pub parent: Option<ParentStation>,
    /// The parent's parent, when the hierarchy goes two levels deep.
    pub grandparent: Option<ParentStation>,
    pub arrival_planned: Option<DateTime<FixedOffset>>,
    pub arrival_estimated: Option<DateTime<FixedOffset>>,
    pub departure_planned: Option<DateTime<FixedOffset>>,
    pub departure_estimated: Option<DateTime<FixedOffset>>,
    pub platform: Option<String>,
    pub platform_name: Option<String>,
    pub planned_platform_name: Option<String>,
    pub area: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParentStation {
    pub id: Option<String>,
    pub name: Option<String>,
    pub disassembled_name: Option<String>,
    pub stop_type: Option<String>,
}

/// Operational notice attached to a leg.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hint {
    pub content: Option<String>,
    pub provider_code: Option<String>,
    pub hint_type: Option<String>,
    pub subnet: Option<String>,
}

/// Rider-facing notice attached to a leg.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    pub priority: Option<String>,
    pub id: Option<String>,
    pub version: Option<i64>,
    pub info_type: Option<String>,
    pub url: Option<String>,
    pub url_text: Option<String>,
    pub content: Option<String>,
    pub subtitle: Option<String>,
    pub title: Option<String>,
    pub publisher: Option<String>,
    /// The `properties.infoType` marker, distinct from the top-level type.
    pub properties_info_type: Option<String>,
    pub html_text: Option<String>,
    pub sms_text: Option<String>,
}

/// A walking-direction step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathDescription {
    pub turn_direction: Option<String>,
    pub manoeuvre: Option<String>,
    pub name: Option<String>,
    pub level: Option<i64>,
    pub coord: Option<Coord>,
    pub sky_direction: Option<i64>,
    pub duration: Option<i64>,
    pub cum_duration: Option<i64>,
    pub distance: Option<i64>,
    pub cum_distance: Option<i64>,
    pub from_coords_index: Option<i64>,
    pub to_coords_index: Option<i64>,
    pub indoor_type: Option<String>,
}

/// How a rider changes onto the next leg.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interchange {
    pub desc: Option<String>,
    pub interchange_type: Option<i64>,
    /// Geometry of the interchange path, kept as its JSON text.
    pub coords: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accessibility {
    pub low_floor_vehicle: Option<bool>,
    pub wheelchair_access: Option<bool>,
}

