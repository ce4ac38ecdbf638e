//! Inventory aggregate
//!
//! Free-spot counters per vehicle type.

pub mod model;

pub use model::{SpotCounts, SpotInventory};
