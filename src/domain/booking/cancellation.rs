//! Cancellation policies and penalty computation.
//!
//! A post carries a set of tiers, each keyed by how many days before the
//! start date the cancellation happens. The tightest tier that still covers
//! the remaining time applies; the `9999` sentinel covers any time before
//! the start.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::{Percentage, Timestamp, ValidationError};

/// Sentinel `days_quantity` meaning "any time before the start date".
pub const ANY_TIME_BEFORE_START: u32 = 9999;

/// How a tier charges the cancelling party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PenaltyRule {
    /// Percentage of the booking total (0-100).
    Percentage(u8),

    /// Fixed amount in minor units, capped at the booking total.
    Fixed(i64),
}

/// One cancellation tier of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationPolicy {
    pub days_quantity: u32,
    pub rule: PenaltyRule,
}

impl CancellationPolicy {
    pub fn percentage(days_quantity: u32, percent: u8) -> Self {
        Self {
            days_quantity,
            rule: PenaltyRule::Percentage(percent),
        }
    }

    pub fn fixed(days_quantity: u32, amount: i64) -> Self {
        Self {
            days_quantity,
            rule: PenaltyRule::Fixed(amount),
        }
    }

    /// Penalty this tier charges on `total_amount`.
    pub fn penalty_for(&self, total_amount: i64) -> i64 {
        match self.rule {
            PenaltyRule::Percentage(p) => Percentage::new(p).of_minor_units(total_amount),
            PenaltyRule::Fixed(amount) => amount.clamp(0, total_amount.max(0)),
        }
    }

    fn covers(&self, days_until_start: i64) -> bool {
        self.days_quantity == ANY_TIME_BEFORE_START
            || i64::from(self.days_quantity) >= days_until_start
    }
}

/// Validates a post's policy set at authoring time.
///
/// # Errors
///
/// - duplicate `days_quantity` values
/// - percentages above 100
/// - negative fixed amounts
pub fn validate_policies(policies: &[CancellationPolicy]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(policies.len());
    for policy in policies {
        if !seen.insert(policy.days_quantity) {
            return Err(ValidationError::invalid_format(
                "days_quantity",
                format!("duplicate tier for {} days", policy.days_quantity),
            ));
        }
        match policy.rule {
            PenaltyRule::Percentage(p) => {
                Percentage::try_new(p)?;
            }
            PenaltyRule::Fixed(amount) if amount < 0 => {
                return Err(ValidationError::out_of_range(
                    "fixed_amount",
                    0,
                    i64::MAX,
                    amount,
                ));
            }
            PenaltyRule::Fixed(_) => {}
        }
    }
    Ok(())
}

/// Selects the tier that applies `days_until_start` days before the start.
pub fn select_policy(
    policies: &[CancellationPolicy],
    days_until_start: i64,
) -> Option<CancellationPolicy> {
    let mut sorted = policies.to_vec();
    sorted.sort_by_key(|p| p.days_quantity);
    sorted.into_iter().find(|p| p.covers(days_until_start))
}

/// Computes the cancellation penalty in minor units.
///
/// Returns 0 when no tier is defined or none covers the remaining time.
pub fn compute_penalty(
    policies: &[CancellationPolicy],
    total_amount: i64,
    start_date: Timestamp,
    now: Timestamp,
) -> i64 {
    let days_until_start = start_date.days_until_from(&now);
    select_policy(policies, days_until_start)
        .map(|policy| policy.penalty_for(total_amount))
        .unwrap_or(0)
}
