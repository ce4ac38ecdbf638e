pub mod fee;
pub mod inventory;
pub mod ticket;
pub mod vehicle;

// Re-export commonly used types
pub use fee::{FeeTable, FeeTier, TierIssue};
pub use inventory::{SpotCounts, SpotInventory};
pub use ticket::{billable_minutes, Receipt, Ticket};
pub use vehicle::{Location, VehicleType};

// Re-export ParkingError from support for convenience
pub use crate::support::errors::{ParkingError, ParkingResult};
