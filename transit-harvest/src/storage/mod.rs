//! Persistence of entity graphs.
//!
//! Graphs go into one SQLite file per calendar day and record type
//! (`trips-2022-10-05.db`, `departures-2022-10-05.db`). The store is the
//! only writer and takes `&mut self` for every operation.

mod clock;
mod departure;
mod error;
mod record;
mod schema;
mod store;
mod trip;


pub use clock::{Clock, ManualClock, SystemClock};
pub use error::StoreError;
pub use record::{Record, Stored};
pub use store::{BatchReport, PartitionedStore, list_partition, partition_path};
