//! Raw records to typed entity graphs.
//!
//! Each raw record becomes either a whole graph or a [`Rejection`]. Nothing
//! here fails a batch: [`normalize_all`] keeps going past bad records and
//! hands back both the graphs and the per-record reasons.

mod departure;
mod error;
mod extract;
mod trip;

pub use departure::normalize_departure;
pub use error::Rejection;
pub use trip::normalize_trip;

use serde_json::Value;

/// The outcome of normalizing a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub graphs: Vec<T>,
    /// Index into the input batch and the reason that record was dropped.
    pub rejected: Vec<(usize, Rejection)>,
}

impl<T> Normalized<T> {
    /// Records dropped by business rules (e.g. bus legs).
    pub fn filtered(&self) -> usize {
        self.rejected.iter().filter(|(_, r)| r.is_filtered()).count()
    }

    /// Records dropped because they were broken.
    pub fn broken(&self) -> impl Iterator<Item = &(usize, Rejection)> {
        self.rejected.iter().filter(|(_, r)| !r.is_filtered())
    }
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            graphs: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// Normalize every record with `convert`.
pub fn normalize_all<'a, T, I>(
    records: I,
    convert: fn(&Value) -> Result<T, Rejection>,
) -> Normalized<T>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut out = Normalized::default();
    for (idx, raw) in records.into_iter().enumerate() {
        match convert(raw) {
            Ok(graph) => out.graphs.push(graph),
            Err(reason) => out.rejected.push((idx, reason)),
        }
    }
    out
}
