//! Vehicle categories and parking locations

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::support::errors::ParkingError;

/// Vehicle category; each one has its own spot pool and fee tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum VehicleType {
    Motorcycle,
    Car,
    Bus,
}

impl VehicleType {
    /// Every supported category, in display order
    pub const ALL: [VehicleType; 3] = [Self::Motorcycle, Self::Car, Self::Bus];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Motorcycle => "Motorcycle",
            Self::Car => "Car",
            Self::Bus => "Bus",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Serialized as a plain string so it also works as a TOML table key
impl Serialize for VehicleType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = ParkingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParkingError::InvalidVehicleType(s.to_string()))
    }
}

impl TryFrom<String> for VehicleType {
    type Error = ParkingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Parking location, used as the fee table key.
///
/// Locations are open: any name is accepted on entry, and one without a
/// configured fee table only fails when the fee is computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    pub const AIRPORT: &'static str = "Airport";
    pub const STADIUM: &'static str = "Stadium";
    pub const MALL: &'static str = "Mall";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
