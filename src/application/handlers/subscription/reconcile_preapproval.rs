//! ReconcilePreapprovalHandler - Mirrors an authority preapproval (the
//! recurring-billing agreement) onto the local subscription.

use std::sync::Arc;

use crate::application::handlers::entitlement::EntitlementCache;
use crate::domain::foundation::{SubscriptionId, Timestamp};
use crate::domain::subscription::{
    AuthorityPreapproval, ExternalReference, Subscription, SubscriptionError, SubscriptionStatus,
    Transition,
};
use crate::ports::{PaymentAuthority, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct ReconcilePreapprovalCommand {
    pub preapproval_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreapprovalReconciliation {
    Applied {
        subscription_id: SubscriptionId,
        transition: Transition,
        link_repaired: bool,
    },
    Skipped(String),
}

pub struct ReconcilePreapprovalHandler {
    authority: Arc<dyn PaymentAuthority>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    entitlements: Arc<EntitlementCache>,
}

impl ReconcilePreapprovalHandler {
    pub fn new(
        authority: Arc<dyn PaymentAuthority>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        entitlements: Arc<EntitlementCache>,
    ) -> Self {
        Self {
            authority,
            subscriptions,
            entitlements,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReconcilePreapprovalCommand,
    ) -> Result<PreapprovalReconciliation, SubscriptionError> {
        let preapproval = self.authority.get_preapproval(&cmd.preapproval_id).await?;
        let Some(target) = SubscriptionStatus::from_preapproval(&preapproval.status) else {
            return Ok(PreapprovalReconciliation::Skipped(format!(
                "unhandled preapproval status {}",
                preapproval.status
            )));
        };

        let now = Timestamp::now();
        let (mut sub, link_repaired) = self.locate(&preapproval, now).await?;

        let applied = apply(&mut sub, &preapproval, target, now);
        if applied.is_ok() || link_repaired {
            self.subscriptions.update(&sub).await?;
        }
        let transition = applied.map_err(|e| {
            tracing::info!(
                subscription_id = %sub.id,
                preapproval_id = %preapproval.id,
                error = %e,
                "Preapproval transition rejected"
            );
            e
        })?;

        tracing::info!(
            subscription_id = %sub.id,
            user_id = %sub.user_id,
            preapproval_id = %preapproval.id,
            transition = ?transition,
            link_repaired,
            "Applied preapproval"
        );

        if transition.affects_entitlements() {
            self.entitlements.resync(&sub.user_id).await;
        }

        Ok(PreapprovalReconciliation::Applied {
            subscription_id: sub.id,
            transition,
            link_repaired,
        })
    }

    /// Finds the subscription by its stored authority id, falling back to
    /// the user's current subscription for the referenced plan. The bool is
    /// true when the fallback matched and the link was repaired.
    async fn locate(
        &self,
        preapproval: &AuthorityPreapproval,
        now: Timestamp,
    ) -> Result<(Subscription, bool), SubscriptionError> {
        if let Some(sub) = self.subscriptions.find_by_external_id(&preapproval.id).await? {
            return Ok((sub, false));
        }

        let raw = preapproval.external_reference.clone().unwrap_or_default();
        let reference = ExternalReference::parse(&raw)
            .map_err(|_| SubscriptionError::MalformedReference(raw.clone()))?;

        let mut sub = self
            .subscriptions
            .find_current_for_user(&reference.user_id)
            .await?
            .filter(|sub| sub.plan_id == reference.plan_id)
            .ok_or_else(|| SubscriptionError::not_found(preapproval.id.clone()))?;

        sub.repair_link(&preapproval.id, now);
        tracing::info!(
            subscription_id = %sub.id,
            preapproval_id = %preapproval.id,
            "Repaired subscription link by external reference"
        );
        Ok((sub, true))
    }
}

fn apply(
    sub: &mut Subscription,
    preapproval: &AuthorityPreapproval,
    target: SubscriptionStatus,
    now: Timestamp,
) -> Result<Transition, SubscriptionError> {
    match target {
        SubscriptionStatus::Cancelled => {
            let reason = preapproval
                .reason
                .clone()
                .unwrap_or_else(|| "Preapproval cancelled".to_string());
            sub.cancel(&reason, &preapproval.status, now)
        }
        other => {
            let transition = sub.transition_to(other, now)?;
            sub.external_status = preapproval.status.clone();
            Ok(transition)
        }
    }
}
