//! Fee aggregate
//!
//! Contains the fee tiers, the fee table and the fee calculation.

pub mod model;

pub use model::{FeeTable, FeeTier, TierIssue};
