//! ReconcilePaymentHandler - Applies an authority payment to the user's
//! subscription.
//!
//! The payment record, keyed by its external id, is written only after the
//! subscription write settles. A stored record that this status cannot
//! advance means the state was already reconciled, so the subscription is
//! left alone. A retryable failure writes no record, so the redelivery
//! applies the payment again.

use std::sync::Arc;

use crate::application::handlers::entitlement::EntitlementCache;
use crate::domain::foundation::{PaymentRecordId, SubscriptionId, Timestamp};
use crate::domain::subscription::{
    AuthorityPayment, ExternalReference, PaymentAction, PaymentRecord, PaymentStatus, Plan,
    RecordOutcome, Subscription, SubscriptionError, SubscriptionStatus, Transition,
};
use crate::ports::{PaymentAuthority, PaymentRepository, PlanRepository, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct ReconcilePaymentCommand {
    pub payment_id: String,
}

/// Outcome of a payment event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentReconciliation {
    /// A subscription was created in `status`.
    Created {
        subscription_id: SubscriptionId,
        status: SubscriptionStatus,
    },
    /// An existing subscription was updated.
    Updated {
        subscription_id: SubscriptionId,
        transition: Transition,
    },
    /// Only the payment record was stored.
    RecordedOnly,
    /// Nothing to do.
    Skipped(String),
}

pub struct ReconcilePaymentHandler {
    authority: Arc<dyn PaymentAuthority>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    payments: Arc<dyn PaymentRepository>,
    plans: Arc<dyn PlanRepository>,
    entitlements: Arc<EntitlementCache>,
}

impl ReconcilePaymentHandler {
    pub fn new(
        authority: Arc<dyn PaymentAuthority>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        payments: Arc<dyn PaymentRepository>,
        plans: Arc<dyn PlanRepository>,
        entitlements: Arc<EntitlementCache>,
    ) -> Self {
        Self {
            authority,
            subscriptions,
            payments,
            plans,
            entitlements,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReconcilePaymentCommand,
    ) -> Result<PaymentReconciliation, SubscriptionError> {
        // 1. Fetch the authoritative payment
        let payment = self.authority.get_payment(&cmd.payment_id).await?;
        if !payment.is_recurring() {
            return Ok(PaymentReconciliation::Skipped(format!(
                "payment {} is not a recurring payment",
                payment.id
            )));
        }

        // 2. Resolve user and plan
        let raw_reference = payment.external_reference.clone().unwrap_or_default();
        let reference = ExternalReference::parse(&raw_reference)
            .map_err(|_| SubscriptionError::MalformedReference(raw_reference.clone()))?;
        let plan = self
            .plans
            .find_by_id(&reference.plan_id)
            .await?
            .ok_or_else(|| SubscriptionError::PlanNotFound(reference.plan_id.clone()))?;

        let action = PaymentAction::for_authority_status(&payment.status);
        let status = match PaymentStatus::from_authority(&payment.status) {
            Some(status) if action != PaymentAction::Ignore => status,
            _ => {
                return Ok(PaymentReconciliation::Skipped(format!(
                    "unhandled payment status {}",
                    payment.status
                )))
            }
        };

        // 3. Skip states already reconciled
        if let Some(stored) = self.payments.find_by_external_id(&payment.id).await? {
            if !stored.status.can_advance_to(&status) {
                tracing::info!(
                    payment_id = %payment.id,
                    status = %payment.status,
                    "Payment already reconciled"
                );
                return Ok(PaymentReconciliation::Skipped(format!(
                    "payment {} already reconciled",
                    payment.id
                )));
            }
        }

        // 4. Apply to the subscription
        let now = Timestamp::now();
        let current = self
            .subscriptions
            .find_current_for_user(&reference.user_id)
            .await?;
        let current_id = current.as_ref().map(|s| s.id);
        let applied = match action {
            PaymentAction::ActivateOrCreate => {
                self.activate_or_create(&payment, &reference, &plan, current, now)
                    .await
            }
            PaymentAction::PutOnHold => {
                self.put_on_hold(&payment, &reference, &plan, current, now)
                    .await
            }
            PaymentAction::Cancel => self.cancel(&payment, &reference, current, now).await,
            PaymentAction::RecordOnly => {
                tracing::info!(
                    payment_id = %payment.id,
                    status = %payment.status,
                    user_id = %reference.user_id,
                    "Recorded payment reversal"
                );
                Ok(PaymentReconciliation::RecordedOnly)
            }
            PaymentAction::Ignore => Ok(PaymentReconciliation::Skipped(payment.status.clone())),
        };

        // A retryable failure leaves no record behind, so the redelivery
        // reaches the subscription again.
        if let Err(err) = &applied {
            if err.is_retryable() {
                return applied;
            }
        }

        // 5. Record the payment once the subscription write settled
        let subscription_id = match &applied {
            Ok(PaymentReconciliation::Created { subscription_id, .. })
            | Ok(PaymentReconciliation::Updated { subscription_id, .. }) => Some(*subscription_id),
            _ => current_id,
        };
        let record = payment_record(
            &payment,
            &reference,
            &raw_reference,
            &plan,
            status,
            subscription_id,
            now,
        );
        if self.payments.record(&record).await? == RecordOutcome::Unchanged {
            tracing::debug!(
                payment_id = %payment.id,
                "Payment record already advanced by a concurrent delivery"
            );
        }
        let result = applied?;

        // 6. Keep entitlements in step
        if affects_entitlements(&result) {
            self.entitlements.resync(&reference.user_id).await;
        }

        Ok(result)
    }

    async fn activate_or_create(
        &self,
        payment: &AuthorityPayment,
        reference: &ExternalReference,
        plan: &Plan,
        current: Option<Subscription>,
        now: Timestamp,
    ) -> Result<PaymentReconciliation, SubscriptionError> {
        match current {
            None => {
                let mut sub = Subscription::open(
                    SubscriptionId::new(),
                    reference.user_id.clone(),
                    plan,
                    SubscriptionStatus::Active,
                    "approved",
                    now,
                );
                sub.activate_with_payment(&payment.id, now)?;
                sub.metadata.card_reference = card_reference(payment);
                self.subscriptions.save(&sub).await?;
                tracing::info!(
                    subscription_id = %sub.id,
                    user_id = %sub.user_id,
                    payment_id = %payment.id,
                    "Created active subscription"
                );
                Ok(PaymentReconciliation::Created {
                    subscription_id: sub.id,
                    status: sub.status,
                })
            }
            Some(mut sub) => {
                let transition = sub.activate_with_payment(&payment.id, now)?;
                if let Some(card) = card_reference(payment) {
                    sub.metadata.card_reference = Some(card);
                }
                self.subscriptions.update(&sub).await?;
                tracing::info!(
                    subscription_id = %sub.id,
                    user_id = %sub.user_id,
                    payment_id = %payment.id,
                    transition = ?transition,
                    "Applied approved payment"
                );
                Ok(PaymentReconciliation::Updated {
                    subscription_id: sub.id,
                    transition,
                })
            }
        }
    }

    async fn put_on_hold(
        &self,
        payment: &AuthorityPayment,
        reference: &ExternalReference,
        plan: &Plan,
        current: Option<Subscription>,
        now: Timestamp,
    ) -> Result<PaymentReconciliation, SubscriptionError> {
        let reason = hold_reason(payment);
        match current {
            None => {
                let mut sub = Subscription::open(
                    SubscriptionId::new(),
                    reference.user_id.clone(),
                    plan,
                    SubscriptionStatus::OnHold,
                    reason.clone(),
                    now,
                );
                sub.put_on_hold(&payment.id, &reason, now)?;
                self.subscriptions.save(&sub).await?;
                tracing::info!(
                    subscription_id = %sub.id,
                    user_id = %sub.user_id,
                    payment_id = %payment.id,
                    "Created subscription on hold"
                );
                Ok(PaymentReconciliation::Created {
                    subscription_id: sub.id,
                    status: sub.status,
                })
            }
            Some(mut sub) => {
                let transition = sub.put_on_hold(&payment.id, &reason, now).map_err(|e| {
                    if let SubscriptionError::RegressionRefused(id) = &e {
                        tracing::info!(
                            subscription_id = %id,
                            payment_id = %payment.id,
                            "Refusing to put active subscription on hold"
                        );
                    }
                    e
                })?;
                self.subscriptions.update(&sub).await?;
                Ok(PaymentReconciliation::Updated {
                    subscription_id: sub.id,
                    transition,
                })
            }
        }
    }

    async fn cancel(
        &self,
        payment: &AuthorityPayment,
        reference: &ExternalReference,
        current: Option<Subscription>,
        now: Timestamp,
    ) -> Result<PaymentReconciliation, SubscriptionError> {
        let mut sub =
            current.ok_or_else(|| SubscriptionError::NotFoundForUser(reference.user_id.clone()))?;

        let reason = format!("Payment {} was {}", payment.id, payment.status);
        let transition = sub.cancel(&reason, &payment.status, now)?;
        sub.metadata.external_payment_id = Some(payment.id.clone());
        self.subscriptions.update(&sub).await?;
        tracing::info!(
            subscription_id = %sub.id,
            user_id = %sub.user_id,
            payment_id = %payment.id,
            "Cancelled subscription after failed payment"
        );
        Ok(PaymentReconciliation::Updated {
            subscription_id: sub.id,
            transition,
        })
    }
}

fn affects_entitlements(result: &PaymentReconciliation) -> bool {
    match result {
        PaymentReconciliation::Created { status, .. } => *status == SubscriptionStatus::Active,
        PaymentReconciliation::Updated { transition, .. } => transition.affects_entitlements(),
        PaymentReconciliation::RecordedOnly | PaymentReconciliation::Skipped(_) => false,
    }
}

fn payment_record(
    payment: &AuthorityPayment,
    reference: &ExternalReference,
    raw_reference: &str,
    plan: &Plan,
    status: PaymentStatus,
    subscription_id: Option<SubscriptionId>,
    now: Timestamp,
) -> PaymentRecord {
    PaymentRecord {
        id: PaymentRecordId::new(),
        user_id: reference.user_id.clone(),
        subscription_id,
        external_payment_id: payment.id.clone(),
        amount: payment.amount_minor_units(),
        currency: payment
            .currency_id
            .clone()
            .unwrap_or_else(|| plan.currency.clone()),
        status,
        external_status_detail: payment
            .status_detail
            .clone()
            .unwrap_or_else(|| payment.status.clone()),
        external_reference: raw_reference.to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn hold_reason(payment: &AuthorityPayment) -> String {
    payment
        .status_detail
        .clone()
        .unwrap_or_else(|| payment.status.clone())
}

fn card_reference(payment: &AuthorityPayment) -> Option<String> {
    let card = payment.card.as_ref()?;
    card.id.clone().or_else(|| card.last_four_digits.clone())
}
