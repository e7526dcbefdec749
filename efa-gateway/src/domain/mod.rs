//! Domain types for the departure gateway.
//!
//! These are the strongly-typed records produced by the resolver and the
//! normalizer. Nothing past normalization sees raw upstream JSON.

mod departure;
mod stop;

pub use departure::{BoardOptions, Departure};
pub use stop::{Coordinates, StopCandidate};
