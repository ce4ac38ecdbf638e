//! Spot inventory entity

use std::collections::BTreeMap;

use crate::domain::vehicle::VehicleType;

/// Spot count per vehicle type; types without an entry have zero spots
pub type SpotCounts = BTreeMap<VehicleType, u32>;

/// Free spots per vehicle type, shared by every location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotInventory {
    free: SpotCounts,
    capacity: SpotCounts,
}

impl SpotInventory {
    pub fn new(capacity: &SpotCounts) -> Self {
        let capacity: SpotCounts = VehicleType::ALL
            .into_iter()
            .map(|v| (v, capacity.get(&v).copied().unwrap_or(0)))
            .collect();
        Self {
            free: capacity.clone(),
            capacity,
        }
    }

    pub fn available(&self, vehicle_type: VehicleType) -> u32 {
        self.free.get(&vehicle_type).copied().unwrap_or(0)
    }

    pub fn capacity(&self, vehicle_type: VehicleType) -> u32 {
        self.capacity.get(&vehicle_type).copied().unwrap_or(0)
    }

    /// Take one spot and return its number, which is the free count before
    /// the spot was taken. `None` when nothing is free.
    pub fn assign(&mut self, vehicle_type: VehicleType) -> Option<u32> {
        let free = self.free.entry(vehicle_type).or_insert(0);
        if *free == 0 {
            return None;
        }
        *free -= 1;
        Some(*free + 1)
    }

    /// Give one spot back. Returns `false`, leaving the count alone, if the
    /// type is already at capacity.
    pub fn release(&mut self, vehicle_type: VehicleType) -> bool {
        let capacity = self.capacity(vehicle_type);
        let free = self.free.entry(vehicle_type).or_insert(0);
        if *free >= capacity {
            return false;
        }
        *free += 1;
        true
    }

    pub fn snapshot(&self) -> SpotCounts {
        self.free.clone()
    }
}
