//! Normalization rejection reasons.

/// Why a raw record produced no entity graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// A leg carries no train type at all
    #[error("leg {leg} has no train type")]
    MissingTrainType { leg: usize },

    /// A leg's train type marks it as a bus
    #[error("leg {leg} is not rail: {train_type}")]
    NotRail { leg: usize, train_type: String },

    /// The trip has no legs to keep
    #[error("trip has no legs")]
    NoLegs,

    /// A field without which the record is meaningless is absent
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A container has the wrong JSON shape
    #[error("malformed record at {path}: expected {expected}")]
    Malformed {
        path: String,
        expected: &'static str,
    },
}

impl Rejection {
    pub fn malformed(path: &str, expected: &'static str) -> Self {
        let path = if path.is_empty() { "/" } else { path };
        Rejection::Malformed {
            path: path.to_string(),
            expected,
        }
    }

    /// Business-rule filtering, as opposed to a broken record.
    pub fn is_filtered(&self) -> bool {
        matches!(
            self,
            Rejection::MissingTrainType { .. } | Rejection::NotRail { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Rejection::NotRail {
            leg: 1,
            train_type: "SEV-Bus".into(),
        };
        assert_eq!(err.to_string(), "leg 1 is not rail: SEV-Bus");

        let err = Rejection::MissingField("departureTimePlanned");
        assert_eq!(
            err.to_string(),
            "missing required field: departureTimePlanned"
        );

        let err = Rejection::malformed("", "an object");
        assert_eq!(err.to_string(), "malformed record at /: expected an object");
    }

    #[test]
    fn filtering_vs_broken() {
        assert!(Rejection::MissingTrainType { leg: 0 }.is_filtered());
        assert!(!Rejection::NoLegs.is_filtered());
        assert!(!Rejection::malformed("/legs", "a list").is_filtered());
    }
}
