//! Departure entity graph.

use chrono::{DateTime, FixedOffset};

/// A single scheduled/estimated vehicle departure at a station.
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    pub station_id: String,
    pub station_name: Option<String>,
    pub platform: Option<String>,
    pub line_id: Option<String>,
    pub line_number: Option<String>,
    pub line_name: Option<String>,
    pub direction: Option<String>,
    pub direction_id: Option<String>,
    pub operator_id: Option<String>,
    pub operator_name: Option<String>,
    pub planned: DateTime<FixedOffset>,
    pub estimated: Option<DateTime<FixedOffset>>,
    /// Minutes late (negative when early). Unset without an estimate.
    pub delay_minutes: Option<i64>,
    pub line_infos: Vec<Notice>,
    pub stop_infos: Vec<Notice>,
}

impl Departure {
    /// Build a departure with only its mandatory fields set.
    pub fn new(station_id: impl Into<String>, planned: DateTime<FixedOffset>) -> Self {
        Self {
            station_id: station_id.into(),
            station_name: None,
            platform: None,
            line_id: None,
            line_number: None,
            line_name: None,
            direction: None,
            direction_id: None,
            operator_id: None,
            operator_name: None,
            planned,
            estimated: None,
            delay_minutes: None,
            line_infos: Vec::new(),
            stop_infos: Vec::new(),
        }
    }

    /// Set the estimated time and recompute the delay from it.
    pub fn with_estimate(mut self, estimated: Option<DateTime<FixedOffset>>) -> Self {
        self.estimated = estimated;
        self.delay_minutes = estimated.map(|e| delay_minutes(self.planned, e));
        self
    }
}

/// A line or stop notice attached to a departure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notice {
    pub content: Option<String>,
    pub subtitle: Option<String>,
    pub subject: Option<String>,
}

/// Whole minutes between planned and estimated time, truncated toward zero.
pub fn delay_minutes(planned: DateTime<FixedOffset>, estimated: DateTime<FixedOffset>) -> i64 {
    estimated.signed_duration_since(planned).num_minutes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn delay_is_estimated_minus_planned() {
        assert_eq!(
            delay_minutes(at("2022-10-05T12:00:00Z"), at("2022-10-05T12:04:00Z")),
            4
        );
        assert_eq!(
            delay_minutes(at("2022-10-05T12:00:00Z"), at("2022-10-05T11:59:00Z")),
            -1
        );
    }

    #[test]
    fn delay_across_offsets() {
        // 14:03 at +02:00 is 12:03 UTC.
        assert_eq!(
            delay_minutes(at("2022-10-05T12:00:00Z"), at("2022-10-05T14:03:00+02:00")),
            3
        );
    }

    #[test]
    fn with_estimate_sets_delay() {
        let dep = Departure::new("de:08111:6118", at("2022-10-05T12:00:00Z"))
            .with_estimate(Some(at("2022-10-05T12:07:00Z")));
        assert_eq!(dep.delay_minutes, Some(7));

        let dep = Departure::new("de:08111:6118", at("2022-10-05T12:00:00Z")).with_estimate(None);
        assert_eq!(dep.delay_minutes, None);
        assert_eq!(dep.estimated, None);
    }
}
