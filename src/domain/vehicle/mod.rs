//! Vehicle aggregate
//!
//! Vehicle categories and the locations a vehicle can be parked at.

pub mod model;

pub use model::{Location, VehicleType};
