use thiserror::Error;

use crate::domain::VehicleType;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParkingError {
    #[error("Invalid vehicle type: {0}")]
    InvalidVehicleType(String),

    #[error("No available spots for {0}")]
    NoAvailableSpots(VehicleType),

    #[error("Invalid ticket number: {0}")]
    InvalidTicket(String),

    #[error("No fee model available for {vehicle_type} at {location}")]
    NoFeeModel {
        vehicle_type: VehicleType,
        location: String,
    },
}

impl ParkingError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ParkingError::InvalidVehicleType(_) => "invalid_vehicle_type",
            ParkingError::NoAvailableSpots(_) => "no_available_spots",
            ParkingError::InvalidTicket(_) => "invalid_ticket",
            ParkingError::NoFeeModel { .. } => "no_fee_model",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type ParkingResult<T> = Result<T, ParkingError>;
