//! Application services

mod parking;

pub use parking::{ParkingService, DEFAULT_CURRENCY};
