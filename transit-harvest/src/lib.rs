//! Transit data harvester.
//!
//! Periodically pulls trip and departure records for a list of stations
//! from an EFA journey planner, turns them into typed graphs, and stores
//! them in one SQLite file per day.

pub mod config;
pub mod domain;
pub mod efa;
pub mod harvest;
pub mod normalize;
pub mod notify;
pub mod pipeline;
pub mod stations;
pub mod storage;
