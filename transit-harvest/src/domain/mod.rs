//! Domain types for the transit harvester.
//!
//! Station identifiers are validated at construction. Trip and departure
//! graphs mirror the remote records field for field; every optional source
//! field stays `None` when the source did not carry it.

mod departure;
mod station;
mod trip;

pub use departure::{Departure, Notice, delay_minutes};
pub use station::{InvalidStationId, StationId};
pub use trip::{
    Accessibility, Coord, Hint, Info, Interchange, Leg, ParentStation, PathDescription, Stop,
    Transportation, Trip,
};
