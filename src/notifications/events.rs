//! Notification events
//!
//! Defines the events published for every park and unpark attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Location, VehicleType};

/// Event types for notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// A ticket was issued
    VehicleParked(VehicleParkedEvent),
    /// A ticket was closed and a receipt issued
    VehicleUnparked(VehicleUnparkedEvent),
    /// A park or unpark request failed
    ParkingRejected(ParkingRejectedEvent),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::VehicleParked(_) => "vehicle_parked",
            Event::VehicleUnparked(_) => "vehicle_unparked",
            Event::ParkingRejected(_) => "parking_rejected",
        }
    }

    /// Get the ticket number if applicable
    pub fn ticket_number(&self) -> Option<&str> {
        match self {
            Event::VehicleParked(e) => Some(&e.ticket_number),
            Event::VehicleUnparked(e) => Some(&e.ticket_number),
            Event::ParkingRejected(e) => e.ticket_number.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleParkedEvent {
    pub ticket_number: String,
    pub vehicle_type: VehicleType,
    pub location: Location,
    pub spot_number: u32,
    pub remaining_spots: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleUnparkedEvent {
    pub ticket_number: String,
    pub receipt_number: String,
    pub vehicle_type: VehicleType,
    pub location: Location,
    pub spot_number: u32,
    pub duration_minutes: u64,
    pub fees: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingRejectedEvent {
    /// Machine-readable error kind, e.g. `no_available_spots`
    pub reason: String,
    pub message: String,
    pub ticket_number: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}
