//! Ticket aggregate
//!
//! Contains the Ticket and Receipt entities and the billable-duration rule.

pub mod model;

pub use model::{billable_minutes, Receipt, Ticket};
