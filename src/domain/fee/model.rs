//! Tiered parking fee model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::vehicle::{Location, VehicleType};
use crate::support::errors::{ParkingError, ParkingResult};

/// One fee tier: a half-open duration interval `[start, end)` in minutes
/// with a flat fee. A tier without `end` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTier {
    pub start: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
    pub fee: u64,
}

impl FeeTier {
    pub fn new(start: u64, end: u64, fee: u64) -> Self {
        Self {
            start,
            end: Some(end),
            fee,
        }
    }

    pub fn open_ended(start: u64, fee: u64) -> Self {
        Self {
            start,
            end: None,
            fee,
        }
    }

    pub fn contains(&self, duration_minutes: u64) -> bool {
        duration_minutes >= self.start && self.end.map_or(true, |end| duration_minutes < end)
    }
}

/// Problems in a tier list that keep it from partitioning `[0, ∞)`.
///
/// The calculator tolerates all of these; they are only reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierIssue {
    Empty,
    DoesNotStartAtZero { first_start: u64 },
    Gap { from: u64, to: u64 },
    Overlap { at: u64 },
    Bounded { last_end: u64 },
}

impl std::fmt::Display for TierIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "no tiers configured"),
            Self::DoesNotStartAtZero { first_start } => {
                write!(f, "first tier starts at {} instead of 0", first_start)
            }
            Self::Gap { from, to } => write!(f, "no tier covers minutes {}..{}", from, to),
            Self::Overlap { at } => write!(f, "tiers overlap at minute {}", at),
            Self::Bounded { last_end } => {
                write!(f, "durations of {} minutes or more match no tier", last_end)
            }
        }
    }
}

/// Fee tiers keyed by location, then by vehicle type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeTable(BTreeMap<Location, BTreeMap<VehicleType, Vec<FeeTier>>>);

impl FeeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of the tiers for one (location, vehicle type)
    pub fn with_tiers(
        mut self,
        location: impl Into<Location>,
        vehicle_type: VehicleType,
        tiers: Vec<FeeTier>,
    ) -> Self {
        self.0
            .entry(location.into())
            .or_default()
            .insert(vehicle_type, tiers);
        self
    }

    pub fn tiers(&self, vehicle_type: VehicleType, location: &Location) -> Option<&[FeeTier]> {
        self.0
            .get(location)
            .and_then(|by_type| by_type.get(&vehicle_type))
            .map(Vec::as_slice)
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.0.keys()
    }

    /// Sum of the fees of every tier whose interval contains the duration.
    ///
    /// A duration that matches no tier costs nothing.
    pub fn calculate_fees(
        &self,
        vehicle_type: VehicleType,
        duration_minutes: u64,
        location: &Location,
    ) -> ParkingResult<u64> {
        let tiers = self
            .tiers(vehicle_type, location)
            .ok_or_else(|| ParkingError::NoFeeModel {
                vehicle_type,
                location: location.to_string(),
            })?;

        Ok(tiers
            .iter()
            .filter(|tier| tier.contains(duration_minutes))
            .map(|tier| tier.fee)
            .sum())
    }

    /// Report every tier list that is not a gap-free partition of `[0, ∞)`
    pub fn validate(&self) -> Vec<(Location, VehicleType, TierIssue)> {
        let mut issues = Vec::new();
        for (location, by_type) in &self.0 {
            for (vehicle_type, tiers) in by_type {
                for issue in tier_issues(tiers) {
                    issues.push((location.clone(), *vehicle_type, issue));
                }
            }
        }
        issues
    }

    /// Stock fee table for the Airport, Stadium and Mall lots
    pub fn standard() -> Self {
        use VehicleType::{Bus, Car, Motorcycle};

        Self::new()
            .with_tiers(
                Location::AIRPORT,
                Motorcycle,
                vec![
                    FeeTier::new(0, 60, 5),
                    FeeTier::new(60, 180, 10),
                    FeeTier::open_ended(180, 15),
                ],
            )
            .with_tiers(
                Location::AIRPORT,
                Car,
                vec![
                    FeeTier::new(0, 60, 10),
                    FeeTier::new(60, 180, 15),
                    FeeTier::open_ended(180, 20),
                ],
            )
            .with_tiers(
                Location::AIRPORT,
                Bus,
                vec![FeeTier::new(0, 180, 20), FeeTier::open_ended(180, 30)],
            )
            .with_tiers(
                Location::STADIUM,
                Motorcycle,
                vec![
                    FeeTier::new(0, 120, 10),
                    FeeTier::new(120, 240, 15),
                    FeeTier::open_ended(240, 20),
                ],
            )
            .with_tiers(
                Location::STADIUM,
                Car,
                vec![
                    FeeTier::new(0, 120, 15),
                    FeeTier::new(120, 240, 20),
                    FeeTier::open_ended(240, 25),
                ],
            )
            .with_tiers(
                Location::STADIUM,
                Bus,
                vec![FeeTier::new(0, 240, 25), FeeTier::open_ended(240, 35)],
            )
            .with_tiers(
                Location::MALL,
                Motorcycle,
                vec![
                    FeeTier::new(0, 180, 15),
                    FeeTier::new(180, 360, 20),
                    FeeTier::open_ended(360, 25),
                ],
            )
            .with_tiers(
                Location::MALL,
                Car,
                vec![
                    FeeTier::new(0, 180, 20),
                    FeeTier::new(180, 360, 25),
                    FeeTier::open_ended(360, 30),
                ],
            )
            .with_tiers(
                Location::MALL,
                Bus,
                vec![FeeTier::new(0, 360, 30), FeeTier::open_ended(360, 40)],
            )
    }
}

fn tier_issues(tiers: &[FeeTier]) -> Vec<TierIssue> {
    let mut sorted: Vec<&FeeTier> = tiers.iter().collect();
    sorted.sort_by_key(|t| t.start);

    let Some(first) = sorted.first() else {
        return vec![TierIssue::Empty];
    };

    let mut issues = Vec::new();
    if first.start != 0 {
        issues.push(TierIssue::DoesNotStartAtZero {
            first_start: first.start,
        });
    }

    // `covered_to == None` means everything from the first start on is covered
    let mut covered_to = Some(first.start);
    for tier in &sorted {
        match covered_to {
            None => issues.push(TierIssue::Overlap { at: tier.start }),
            Some(to) if tier.start > to => issues.push(TierIssue::Gap {
                from: to,
                to: tier.start,
            }),
            Some(to) if tier.start < to => issues.push(TierIssue::Overlap { at: tier.start }),
            Some(_) => {}
        }
        covered_to = match (covered_to, tier.end) {
            (None, _) | (_, None) => None,
            (Some(to), Some(end)) => Some(to.max(end)),
        };
    }

    if let Some(last_end) = covered_to {
        issues.push(TierIssue::Bounded { last_end });
    }
    issues
}
