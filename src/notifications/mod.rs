//! Notifications module
//!
//! Broadcasts parking events to in-process subscribers.
//!
//! # Usage
//! ```ignore
//! use parking_service::notifications::create_event_bus;
//!
//! let event_bus = create_event_bus();
//! let mut subscriber = event_bus.subscribe();
//! // hand `event_bus` to `ParkingService::with_event_bus`, then:
//! while let Some(message) = subscriber.recv().await {
//!     println!("{}", message.event.event_type());
//! }
//! ```

pub mod event_bus;
pub mod events;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use events::*;
