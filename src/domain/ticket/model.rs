//! Ticket and receipt domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::vehicle::{Location, VehicleType};

const MILLIS_PER_MINUTE: i64 = 60_000;

/// An active parking session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_number: String,
    pub vehicle_type: VehicleType,
    /// Count-derived spot number; may be handed out again after a release
    pub spot_number: u32,
    pub entry_date_time: DateTime<Utc>,
    pub location: Location,
}

impl Ticket {
    pub fn new(
        ticket_number: impl Into<String>,
        vehicle_type: VehicleType,
        spot_number: u32,
        entry_date_time: DateTime<Utc>,
        location: Location,
    ) -> Self {
        Self {
            ticket_number: ticket_number.into(),
            vehicle_type,
            spot_number,
            entry_date_time,
            location,
        }
    }

    /// Billable minutes if the session closed at `exit`
    pub fn duration_minutes(&self, exit: DateTime<Utc>) -> u64 {
        billable_minutes(self.entry_date_time, exit)
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ticket {} | {} at {} | spot {} | entered {}",
            self.ticket_number,
            self.vehicle_type,
            self.location,
            self.spot_number,
            self.entry_date_time.to_rfc3339()
        )
    }
}

/// Result of closing a parking session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_number: String,
    pub ticket_number: String,
    pub vehicle_type: VehicleType,
    pub location: Location,
    pub spot_number: u32,
    pub entry_date_time: DateTime<Utc>,
    pub exit_date_time: DateTime<Utc>,
    pub duration_minutes: u64,
    pub fees: u64,
    pub currency: String,
}

impl Receipt {
    /// e.g. "15 USD"
    pub fn format_fees(&self) -> String {
        format!("{} {}", self.fees, self.currency)
    }
}

impl std::fmt::Display for Receipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Receipt {} | ticket {} | spot {} | {} -> {} ({} min) | fees {}",
            self.receipt_number,
            self.ticket_number,
            self.spot_number,
            self.entry_date_time.to_rfc3339(),
            self.exit_date_time.to_rfc3339(),
            self.duration_minutes,
            self.format_fees()
        )
    }
}

/// Whole minutes between entry and exit, with any partial minute rounded up.
/// An exit before the entry counts as zero minutes.
pub fn billable_minutes(entry: DateTime<Utc>, exit: DateTime<Utc>) -> u64 {
    let millis = (exit - entry).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    // millis > 0, so the ceiling division stays positive
    ((millis + MILLIS_PER_MINUTE - 1) / MILLIS_PER_MINUTE) as u64
}
