//! Day-partitioned SQLite store.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::error::StoreError;
use super::record::{Record, Stored};

/// Path of the partition for `date`: `<dir>/<prefix><YYYY-MM-DD>.db`.
pub fn partition_path(dir: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{prefix}{}.db", date.format("%Y-%m-%d")))
}

/// What happened to a batch handed to [`PartitionedStore::persist_many`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Root ids of graphs that were committed, in input order.
    pub committed: Vec<i64>,
    /// Inputs that carried no graph.
    pub skipped: usize,
    /// Input index and error for each graph that was rolled back.
    pub failures: Vec<(usize, StoreError)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Partition {
    date: NaiveDate,
    pool: SqlitePool,
}

/// Writes graphs of type `R` into one SQLite file per calendar day.
///
/// Every operation first checks the clock; when the day has moved on, the
/// current file is closed and the next day's file is opened (and created if
/// needed). Each graph is written in its own transaction, so a failing
/// graph never takes its siblings down with it.
pub struct PartitionedStore<R: Record, C: Clock> {
    dir: PathBuf,
    prefix: String,
    clock: C,
    current: Option<Partition>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record, C: Clock> PartitionedStore<R, C> {
    /// A store writing under `dir` with the record type's default prefix.
    /// No file is opened until the first operation.
    pub fn new(dir: impl Into<PathBuf>, clock: C) -> Self {
        Self::with_prefix(dir, R::PREFIX, clock)
    }

    pub fn with_prefix(dir: impl Into<PathBuf>, prefix: impl Into<String>, clock: C) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            clock,
            current: None,
            _record: PhantomData,
        }
    }

    /// Date of the open partition, if any.
    pub fn current_date(&self) -> Option<NaiveDate> {
        self.current.as_ref().map(|p| p.date)
    }

    /// Path of the partition the next write goes to.
    pub fn current_path(&self) -> PathBuf {
        let date = match &self.current {
            Some(open) if open.date >= self.clock.today() => open.date,
            _ => self.clock.today(),
        };
        partition_path(&self.dir, &self.prefix, date)
    }

    /// Write one graph. Returns its root id.
    pub async fn persist_one(&mut self, graph: &R) -> Result<i64, StoreError> {
        let pool = self.partition().await?;
        write_graph(pool, graph).await
    }

    /// Write a batch, one transaction per graph. `None` entries are
    /// skipped; a failing graph is rolled back and recorded.
    pub async fn persist_many(
        &mut self,
        graphs: impl IntoIterator<Item = Option<R>>,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for (idx, graph) in graphs.into_iter().enumerate() {
            let Some(graph) = graph else {
                report.skipped += 1;
                continue;
            };

            match self.persist_one(&graph).await {
                Ok(id) => report.committed.push(id),
                Err(e) => {
                    warn!(index = idx, error = %e, "Could not store graph");
                    report.failures.push((idx, e));
                }
            }
        }

        debug!(
            committed = report.committed.len(),
            failed = report.failures.len(),
            skipped = report.skipped,
            "Batch stored"
        );
        report
    }

    /// Delete a graph and everything it owns. Returns whether it existed.
    pub async fn delete_one(&mut self, id: i64) -> Result<bool, StoreError> {
        let pool = self.partition().await?;
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", R::ROOT_TABLE))
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every graph in the current partition.
    pub async fn list_all(&mut self) -> Result<Vec<Stored<R>>, StoreError> {
        let pool = self.partition().await?;
        R::load_all(pool).await
    }

    /// Close the open partition, if any.
    pub async fn close(&mut self) {
        if let Some(partition) = self.current.take() {
            partition.pool.close().await;
        }
    }

    /// The pool for the current partition, rotating first if the day has
    /// advanced past it. A clock that steps back keeps the open partition.
    async fn partition(&mut self) -> Result<&SqlitePool, StoreError> {
        let today = self.clock.today();

        let partition = match self.current.take() {
            Some(open) if open.date >= today => {
                if open.date > today {
                    warn!(
                        open = %open.date,
                        today = %today,
                        "Clock went back, keeping partition"
                    );
                }
                open
            }
            stale => {
                if let Some(old) = stale {
                    info!(from = %old.date, to = %today, "Rolling over to new partition");
                    old.pool.close().await;
                }
                Partition {
                    date: today,
                    pool: open_partition::<R>(&self.dir, &self.prefix, today).await?,
                }
            }
        };

        Ok(&self.current.insert(partition).pool)
    }
}

/// Read every graph from the partition for `date` without writing to it.
/// Fails if that partition was never created.
pub async fn list_partition<R: Record>(
    dir: &Path,
    prefix: &str,
    date: NaiveDate,
) -> Result<Vec<Stored<R>>, StoreError> {
    let path = partition_path(dir, prefix, date);
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .read_only(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|source| StoreError::Open { path, source })?;

    let graphs = R::load_all(&pool).await;
    pool.close().await;
    graphs
}

async fn open_partition<R: Record>(
    dir: &Path,
    prefix: &str,
    date: NaiveDate,
) -> Result<SqlitePool, StoreError> {
    std::fs::create_dir_all(dir).map_err(|source| StoreError::Dir {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = partition_path(dir, prefix, date);
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;

    for statement in R::SCHEMA {
        sqlx::query(statement).execute(&pool).await?;
    }

    info!(path = %path.display(), "Opened partition");
    Ok(pool)
}

async fn write_graph<R: Record>(pool: &SqlitePool, graph: &R) -> Result<i64, StoreError> {
    let mut tx = pool.begin().await?;
    // Dropping `tx` on error rolls the graph back.
    let id = graph.insert(&mut tx).await?;
    tx.commit().await?;
    Ok(id)
}
