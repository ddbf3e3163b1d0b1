//! Subscription plans and their quotas.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::PlanId;

/// Billing cadence of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Annual,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(BillingCycle::Monthly),
            "annual" => Some(BillingCycle::Annual),
            _ => None,
        }
    }
}

/// A publisher plan. `None` limits mean unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub price: i64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub max_posts: Option<u32>,
    pub max_bookings: Option<u32>,
}

impl Plan {
    /// Remaining post slots given `used` active posts.
    pub fn remaining_posts(&self, used: u32) -> Option<u32> {
        self.max_posts.map(|max| max.saturating_sub(used))
    }

    /// Remaining booking slots given `used` bookings.
    pub fn remaining_bookings(&self, used: u32) -> Option<u32> {
        self.max_bookings.map(|max| max.saturating_sub(used))
    }
}
