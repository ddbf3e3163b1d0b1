//! Subscription aggregate.
//!
//! One user holds at most one *current* subscription (pending, active,
//! on hold, paused). Cancelled and expired subscriptions are kept for
//! history and never reopened.
//!
//! `version` guards concurrent reconciliations the same way bookings do:
//! an update lands only if the stored version still equals the loaded one.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PlanId, StateMachine, SubscriptionId, Timestamp, UserId};

use super::{BillingCycle, Plan, SubscriptionError, SubscriptionStatus};

/// Audit trail kept alongside the subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionMetadata {
    pub external_payment_id: Option<String>,
    pub card_reference: Option<String>,
    pub hold_reason: Option<String>,
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub approved_payment_ids: Vec<String>,
    pub activated_at: Option<Timestamp>,
    pub held_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub paused_at: Option<Timestamp>,
    pub link_repaired_at: Option<Timestamp>,
}

/// Outcome of a status-affecting operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed {
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    },
    Unchanged,
}

impl Transition {
    /// Status the subscription moved to, if it moved.
    pub fn new_status(&self) -> Option<SubscriptionStatus> {
        match self {
            Transition::Changed { to, .. } => Some(*to),
            Transition::Unchanged => None,
        }
    }

    /// Activation and cancellation change what the user is entitled to.
    pub fn affects_entitlements(&self) -> bool {
        matches!(
            self.new_status(),
            Some(SubscriptionStatus::Active) | Some(SubscriptionStatus::Cancelled)
        )
    }
}

/// Subscription aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub plan_name: String,
    pub external_subscription_id: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: SubscriptionStatus,
    pub external_status: String,
    pub billing_cycle: BillingCycle,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub metadata: SubscriptionMetadata,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub version: u64,
}

impl Subscription {
    /// Opens a subscription for `plan` directly in `status`.
    pub fn open(
        id: SubscriptionId,
        user_id: UserId,
        plan: &Plan,
        status: SubscriptionStatus,
        external_status: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        let mut metadata = SubscriptionMetadata::default();
        match status {
            SubscriptionStatus::Active => metadata.activated_at = Some(now),
            SubscriptionStatus::OnHold => metadata.held_at = Some(now),
            _ => {}
        }
        Self {
            id,
            user_id,
            plan_id: plan.id.clone(),
            plan_name: plan.name.clone(),
            external_subscription_id: None,
            amount: plan.price,
            currency: plan.currency.clone(),
            status,
            external_status: external_status.into(),
            billing_cycle: plan.billing_cycle,
            start_date: now,
            end_date: None,
            metadata,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Moves to `target`. Same-state requests are no-ops.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if the state machine rejects the move.
    pub fn transition_to(
        &mut self,
        target: SubscriptionStatus,
        now: Timestamp,
    ) -> Result<Transition, SubscriptionError> {
        if self.status == target {
            return Ok(Transition::Unchanged);
        }
        let from = self.status;
        self.status = from
            .transition_to(target)
            .map_err(|_| SubscriptionError::invalid_transition(from, target))?;
        match target {
            SubscriptionStatus::Active => self.metadata.activated_at = Some(now),
            SubscriptionStatus::OnHold => self.metadata.held_at = Some(now),
            SubscriptionStatus::Cancelled => {
                self.metadata.cancelled_at = Some(now);
                self.end_date = Some(now);
            }
            SubscriptionStatus::Paused => self.metadata.paused_at = Some(now),
            SubscriptionStatus::Expired => self.end_date = Some(now),
            SubscriptionStatus::Pending => {}
        }
        self.updated_at = now;
        Ok(Transition::Changed { from, to: target })
    }

    /// Applies an approved payment.
    pub fn activate_with_payment(
        &mut self,
        external_payment_id: &str,
        now: Timestamp,
    ) -> Result<Transition, SubscriptionError> {
        let transition = self.transition_to(SubscriptionStatus::Active, now)?;
        self.external_status = "approved".to_string();
        self.metadata.hold_reason = None;
        self.record_approved_payment(external_payment_id, now);
        Ok(transition)
    }

    /// Applies a pending or in-process payment.
    ///
    /// # Errors
    ///
    /// `RegressionRefused` when the subscription is already active.
    pub fn put_on_hold(
        &mut self,
        external_payment_id: &str,
        reason: &str,
        now: Timestamp,
    ) -> Result<Transition, SubscriptionError> {
        if self.status == SubscriptionStatus::Active {
            return Err(SubscriptionError::RegressionRefused(self.id));
        }
        let transition = self.transition_to(SubscriptionStatus::OnHold, now)?;
        self.external_status = reason.to_string();
        self.metadata.external_payment_id = Some(external_payment_id.to_string());
        self.metadata.hold_reason = Some(reason.to_string());
        if transition == Transition::Unchanged {
            self.metadata.held_at = Some(now);
            self.updated_at = now;
        }
        Ok(transition)
    }

    /// Cancels after a rejected or cancelled payment, or a cancelled
    /// preapproval.
    pub fn cancel(
        &mut self,
        reason: &str,
        external_status: &str,
        now: Timestamp,
    ) -> Result<Transition, SubscriptionError> {
        let transition = self.transition_to(SubscriptionStatus::Cancelled, now)?;
        if transition != Transition::Unchanged {
            self.external_status = external_status.to_string();
            self.metadata.cancellation_reason = Some(reason.to_string());
        }
        Ok(transition)
    }

    /// Stores the authority's subscription id found by reference lookup.
    pub fn repair_link(&mut self, external_subscription_id: &str, now: Timestamp) {
        self.external_subscription_id = Some(external_subscription_id.to_string());
        self.metadata.link_repaired_at = Some(now);
        self.updated_at = now;
    }

    fn record_approved_payment(&mut self, external_payment_id: &str, now: Timestamp) {
        self.metadata.external_payment_id = Some(external_payment_id.to_string());
        if !self
            .metadata
            .approved_payment_ids
            .iter()
            .any(|id| id == external_payment_id)
        {
            self.metadata
                .approved_payment_ids
                .push(external_payment_id.to_string());
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> Plan {
        Plan {
            id: PlanId::new("basic").unwrap(),
            name: "Basic".to_string(),
            price: 9_900,
            currency: "ARS".to_string(),
            billing_cycle: BillingCycle::Monthly,
            max_posts: Some(5),
            max_bookings: None,
        }
    }

    fn subscription(status: SubscriptionStatus) -> Subscription {
        Subscription::open(
            SubscriptionId::new(),
            UserId::new("u1").unwrap(),
            &plan(),
            status,
            "test",
            Timestamp::from_unix_millis(0),
        )
    }

    fn later() -> Timestamp {
        Timestamp::from_unix_millis(60_000)
    }

    #[test]
    fn open_copies_plan_terms() {
        let sub = subscription(SubscriptionStatus::Active);
        assert_eq!(sub.amount, 9_900);
        assert_eq!(sub.plan_name, "Basic");
        assert!(sub.metadata.activated_at.is_some());
    }

    #[test]
    fn activate_from_on_hold_records_payment() {
        let mut sub = subscription(SubscriptionStatus::OnHold);
        let transition = sub.activate_with_payment("p1", later()).unwrap();

        assert_eq!(
            transition,
            Transition::Changed {
                from: SubscriptionStatus::OnHold,
                to: SubscriptionStatus::Active
            }
        );
        assert!(transition.affects_entitlements());
        assert_eq!(sub.metadata.approved_payment_ids, vec!["p1".to_string()]);
    }

    #[test]
    fn activate_when_active_appends_history_once() {
        let mut sub = subscription(SubscriptionStatus::Active);
        assert_eq!(
            sub.activate_with_payment("p1", later()).unwrap(),
            Transition::Unchanged
        );
        sub.activate_with_payment("p2", later()).unwrap();
        sub.activate_with_payment("p2", later()).unwrap();
        assert_eq!(sub.metadata.approved_payment_ids, vec!["p1", "p2"]);
    }

    #[test]
    fn hold_refuses_to_regress_active() {
        let mut sub = subscription(SubscriptionStatus::Active);
        let before = sub.clone();
        let result = sub.put_on_hold("p9", "in_process", later());
        assert!(matches!(result, Err(SubscriptionError::RegressionRefused(_))));
        assert_eq!(sub, before);
    }

    #[test]
    fn hold_from_pending_and_refresh_when_held() {
        let mut sub = subscription(SubscriptionStatus::Pending);
        assert!(sub.put_on_hold("p1", "pending", later()).unwrap().new_status().is_some());

        let again = sub.put_on_hold("p2", "in_process", later()).unwrap();
        assert_eq!(again, Transition::Unchanged);
        assert_eq!(sub.metadata.hold_reason.as_deref(), Some("in_process"));
        assert_eq!(sub.metadata.external_payment_id.as_deref(), Some("p2"));
    }

    #[test]
    fn cancel_sets_audit_fields() {
        let mut sub = subscription(SubscriptionStatus::Active);
        sub.cancel("payment rejected", "rejected", later()).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
        assert_eq!(sub.metadata.cancelled_at, Some(later()));
        assert_eq!(sub.end_date, Some(later()));
        assert_eq!(
            sub.metadata.cancellation_reason.as_deref(),
            Some("payment rejected")
        );
    }

    #[test]
    fn cancelled_cannot_reactivate() {
        let mut sub = subscription(SubscriptionStatus::Cancelled);
        let result = sub.activate_with_payment("p1", later());
        assert!(matches!(
            result,
            Err(SubscriptionError::InvalidTransition { .. })
        ));
        assert!(sub.metadata.approved_payment_ids.is_empty());
    }

    #[test]
    fn repair_link_stamps_audit() {
        let mut sub = subscription(SubscriptionStatus::Active);
        sub.repair_link("pre-1", later());
        assert_eq!(sub.external_subscription_id.as_deref(), Some("pre-1"));
        assert_eq!(sub.metadata.link_repaired_at, Some(later()));
    }
}
