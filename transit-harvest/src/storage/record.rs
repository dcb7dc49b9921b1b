//! What the store needs to know about a graph type.

use std::future::Future;

use chrono::{DateTime, FixedOffset};
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::error::StoreError;

/// A graph with its root row id.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<R> {
    pub id: i64,
    pub value: R,
}

/// An entity graph that can be written to and read back from a partition.
pub trait Record: Sized {
    /// File name prefix for this record's partitions.
    const PREFIX: &'static str;

    /// Table whose rows own everything else in the graph.
    const ROOT_TABLE: &'static str;

    /// Statements run on every partition open.
    const SCHEMA: &'static [&'static str];

    /// Insert the whole graph inside `tx`, returning the root row id.
    fn insert(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> impl Future<Output = Result<i64, StoreError>>;

    /// Every graph in the partition, ordered by root id.
    fn load_all(
        pool: &SqlitePool,
    ) -> impl Future<Output = Result<Vec<Stored<Self>>, StoreError>>;
}

pub(super) fn timestamp(t: Option<DateTime<FixedOffset>>) -> Option<String> {
    t.map(|t| t.to_rfc3339())
}

pub(super) fn parse_timestamp(
    table: &'static str,
    column: &'static str,
    value: Option<String>,
) -> Result<Option<DateTime<FixedOffset>>, StoreError> {
    value
        .map(|v| {
            DateTime::parse_from_rfc3339(&v).map_err(|_| StoreError::Corrupt {
                table,
                column,
                value: v.clone(),
            })
        })
        .transpose()
}
