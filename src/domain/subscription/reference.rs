//! Structured external reference attached to authority payments.
//!
//! Format: `subscription_{planId}_{userId}`. Plan ids never contain `_`,
//! so everything after the second separator is the user id.

use std::fmt;

use crate::domain::foundation::{PlanId, UserId, ValidationError};

const PREFIX: &str = "subscription_";

/// Parsed `external_reference` linking an authority payment to a local
/// user and plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalReference {
    pub plan_id: PlanId,
    pub user_id: UserId,
}

impl ExternalReference {
    pub fn new(plan_id: PlanId, user_id: UserId) -> Self {
        Self { plan_id, user_id }
    }

    /// Parses a reference string.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` when the prefix is missing or either part is empty.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let rest = raw.strip_prefix(PREFIX).ok_or_else(|| {
            ValidationError::invalid_format("external_reference", "missing subscription prefix")
        })?;
        let (plan, user) = rest.split_once('_').ok_or_else(|| {
            ValidationError::invalid_format("external_reference", "expected plan and user parts")
        })?;
        Ok(Self {
            plan_id: PlanId::new(plan)?,
            user_id: UserId::new(user)?,
        })
    }
}

impl fmt::Display for ExternalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}_{}", PREFIX, self.plan_id, self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_and_user() {
        let reference = ExternalReference::parse("subscription_gold_user-42").unwrap();
        assert_eq!(reference.plan_id.as_str(), "gold");
        assert_eq!(reference.user_id.as_str(), "user-42");
    }

    #[test]
    fn user_id_may_contain_separator() {
        let reference = ExternalReference::parse("subscription_gold_google_oauth2_123").unwrap();
        assert_eq!(reference.plan_id.as_str(), "gold");
        assert_eq!(reference.user_id.as_str(), "google_oauth2_123");
    }

    #[test]
    fn rejects_malformed_references() {
        assert!(ExternalReference::parse("booking_gold_user").is_err());
        assert!(ExternalReference::parse("subscription_gold").is_err());
        assert!(ExternalReference::parse("subscription__user").is_err());
        assert!(ExternalReference::parse("subscription_gold_").is_err());
        assert!(ExternalReference::parse("").is_err());
    }

    #[test]
    fn displays_in_wire_format() {
        let reference = ExternalReference::new(
            PlanId::new("basic").unwrap(),
            UserId::new("u1").unwrap(),
        );
        assert_eq!(reference.to_string(), "subscription_basic_u1");
    }
}
