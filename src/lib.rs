//! # Parking Lot Service
//!
//! In-memory parking lot: spot inventory per vehicle type, tickets on entry,
//! tiered time-based fees on exit.
//!
//! ## Architecture
//!
//! - **domain**: vehicle types, locations, spot inventory, tickets, receipts
//!   and the fee table
//! - **application**: the [`ParkingService`] that ties them together
//! - **notifications**: broadcast of park/unpark events
//! - **config**: TOML configuration for the binary
//! - **support**: errors, clock, identifier generation and logging setup
//!
//! ```
//! use parking_service::domain::{FeeTable, SpotCounts, VehicleType};
//! use parking_service::ParkingService;
//!
//! let lot = ParkingService::new(
//!     &SpotCounts::from([(VehicleType::Car, 1)]),
//!     FeeTable::standard(),
//! );
//! let ticket = lot.park("Car", "Mall").unwrap();
//! assert_eq!(ticket.spot_number, 1);
//! let receipt = lot.unpark(&ticket.ticket_number).unwrap();
//! assert_eq!(receipt.fees, 20);
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod notifications;
pub mod support;

pub use application::ParkingService;
pub use config::{default_config_path, AppConfig};
pub use domain::{ParkingError, Receipt, Ticket};
pub use notifications::{create_event_bus, Event, EventBus, SharedEventBus};
pub use support::logging::init_tracing;
