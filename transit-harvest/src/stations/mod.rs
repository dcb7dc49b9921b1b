//! Station lists.
//!
//! Loads the `;`-delimited station files that say which stations to harvest
//! and what to call them in log output.

mod error;
mod registry;

pub use error::StationError;
pub use registry::StationRegistry;
