//! Subscription status state machine.
//!
//! Statuses are driven by payment-authority events. `cancelled` and
//! `expired` are terminal; a returning user gets a new subscription.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Local subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Created, no payment outcome yet.
    Pending,

    /// Paid up. Grants publisher capabilities.
    Active,

    /// Payment in process or awaiting review.
    OnHold,

    /// Paused at the authority.
    Paused,

    /// Ended by payment failure or user action. Terminal.
    Cancelled,

    /// Ran out its billing period. Terminal.
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::OnHold => "on_hold",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SubscriptionStatus::Pending),
            "active" => Some(SubscriptionStatus::Active),
            "on_hold" => Some(SubscriptionStatus::OnHold),
            "paused" => Some(SubscriptionStatus::Paused),
            "cancelled" => Some(SubscriptionStatus::Cancelled),
            "expired" => Some(SubscriptionStatus::Expired),
            _ => None,
        }
    }

    /// Current subscriptions count toward the one-per-user rule.
    pub fn is_current(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Pending
                | SubscriptionStatus::Active
                | SubscriptionStatus::OnHold
                | SubscriptionStatus::Paused
        )
    }

    /// Active or on hold: the user is considered subscribed.
    pub fn counts_as_subscribed(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::OnHold)
    }

    /// Maps a preapproval status reported by the authority.
    pub fn from_preapproval(status: &str) -> Option<Self> {
        match status {
            "authorized" => Some(SubscriptionStatus::Active),
            "cancelled" => Some(SubscriptionStatus::Cancelled),
            "paused" => Some(SubscriptionStatus::Paused),
            _ => None,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            // From PENDING
            (Pending, Active)
                | (Pending, OnHold)
                | (Pending, Cancelled)
                | (Pending, Expired)
            // From ON_HOLD
                | (OnHold, Active)
                | (OnHold, Cancelled)
                | (OnHold, Paused)
            // From ACTIVE
                | (Active, Paused)
                | (Active, Cancelled)
                | (Active, Expired)
            // From PAUSED
                | (Paused, Active)
                | (Paused, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Pending => vec![Active, OnHold, Cancelled, Expired],
            OnHold => vec![Active, Cancelled, Paused],
            Active => vec![Paused, Cancelled, Expired],
            Paused => vec![Active, Cancelled],
            Cancelled | Expired => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SubscriptionStatus; 6] = [
        SubscriptionStatus::Pending,
        SubscriptionStatus::Active,
        SubscriptionStatus::OnHold,
        SubscriptionStatus::Paused,
        SubscriptionStatus::Cancelled,
        SubscriptionStatus::Expired,
    ];

    #[test]
    fn active_never_regresses_to_on_hold() {
        assert!(!SubscriptionStatus::Active.can_transition_to(&SubscriptionStatus::OnHold));
        assert!(!SubscriptionStatus::Active.can_transition_to(&SubscriptionStatus::Pending));
    }

    #[test]
    fn on_hold_and_paused_reactivate() {
        assert!(SubscriptionStatus::OnHold.can_transition_to(&SubscriptionStatus::Active));
        assert!(SubscriptionStatus::Paused.can_transition_to(&SubscriptionStatus::Active));
        assert!(SubscriptionStatus::Pending.can_transition_to(&SubscriptionStatus::Active));
    }

    #[test]
    fn cancelled_and_expired_are_terminal() {
        assert!(SubscriptionStatus::Cancelled.is_terminal());
        assert!(SubscriptionStatus::Expired.is_terminal());
        for target in ALL {
            assert!(!SubscriptionStatus::Cancelled.can_transition_to(&target));
        }
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(&to),
                    from.valid_transitions().contains(&to),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn current_statuses() {
        let current: Vec<_> = ALL.into_iter().filter(|s| s.is_current()).collect();
        assert_eq!(
            current,
            vec![
                SubscriptionStatus::Pending,
                SubscriptionStatus::Active,
                SubscriptionStatus::OnHold,
                SubscriptionStatus::Paused,
            ]
        );
    }

    #[test]
    fn preapproval_statuses_map() {
        assert_eq!(
            SubscriptionStatus::from_preapproval("authorized"),
            Some(SubscriptionStatus::Active)
        );
        assert_eq!(
            SubscriptionStatus::from_preapproval("paused"),
            Some(SubscriptionStatus::Paused)
        );
        assert_eq!(
            SubscriptionStatus::from_preapproval("cancelled"),
            Some(SubscriptionStatus::Cancelled)
        );
        assert_eq!(SubscriptionStatus::from_preapproval("pending"), None);
    }

    #[test]
    fn storage_names_round_trip() {
        for status in ALL {
            assert_eq!(SubscriptionStatus::parse(status.as_str()), Some(status));
        }
    }
}
