//! EFA journey planner client.
//!
//! This module provides the HTTP client for the EFA (Elektronische
//! Fahrplanauskunft) API used by the VVS network, plus a scripted
//! in-memory source for tests and dry runs.
//!
//! Key characteristics of EFA responses:
//! - Records are deeply nested and fields are omitted rather than sent as
//!   null, so nothing below the top-level list is trusted here
//! - Trip queries return `journeys`, departure monitor queries return
//!   `stopEvents`; a missing list means "no results"

mod client;
mod error;
mod mock;

pub use client::{DEFAULT_BASE_URL, EfaClient, EfaConfig, EfaSession};
pub use error::FetchError;
pub use mock::{Reply, ScriptedFetch};
