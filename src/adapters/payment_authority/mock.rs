//! Mock payment authority for testing.
//!
//! Supports pre-configured resources, error injection and call tracking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::subscription::{AuthorityPayment, AuthorityPreapproval};
use crate::ports::{AuthorityError, PaymentAuthority};

/// Mock payment authority.
///
/// # Example
///
/// ```ignore
/// let authority = MockPaymentAuthority::new();
/// authority.put_payment(payment("123", "approved"));
/// authority.fail_next(AuthorityError::network("boom"));
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentAuthority {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    payments: HashMap<String, AuthorityPayment>,
    preapprovals: HashMap<String, AuthorityPreapproval>,
    next_error: Option<AuthorityError>,
    calls: Vec<String>,
}

impl MockPaymentAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_payment(&self, payment: AuthorityPayment) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.payments.insert(payment.id.clone(), payment);
    }

    pub fn put_preapproval(&self, preapproval: AuthorityPreapproval) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.preapprovals.insert(preapproval.id.clone(), preapproval);
    }

    /// Makes the next call fail with `error`.
    pub fn fail_next(&self, error: AuthorityError) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.next_error = Some(error);
    }

    /// Calls made so far, as `payment:{id}` / `preapproval:{id}`.
    pub fn calls(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }
}

#[async_trait]
impl PaymentAuthority for MockPaymentAuthority {
    async fn get_payment(&self, payment_id: &str) -> Result<AuthorityPayment, AuthorityError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(format!("payment:{}", payment_id));
        if let Some(err) = state.next_error.take() {
            return Err(err);
        }
        state
            .payments
            .get(payment_id)
            .cloned()
            .ok_or_else(|| AuthorityError::not_found(&format!("payment {}", payment_id)))
    }

    async fn get_preapproval(
        &self,
        preapproval_id: &str,
    ) -> Result<AuthorityPreapproval, AuthorityError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(format!("preapproval:{}", preapproval_id));
        if let Some(err) = state.next_error.take() {
            return Err(err);
        }
        state
            .preapprovals
            .get(preapproval_id)
            .cloned()
            .ok_or_else(|| AuthorityError::not_found(&format!("preapproval {}", preapproval_id)))
    }
}
