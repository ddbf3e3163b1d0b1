//! Payment record repository port.
//!
//! The authority's payment id is the idempotency key.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::subscription::{PaymentRecord, RecordOutcome};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Inserts the record, or advances the stored one if `observed` is a
    /// forward status move. Must be atomic per external payment id.
    async fn record(&self, observed: &PaymentRecord) -> Result<RecordOutcome, DomainError>;

    async fn find_by_external_id(
        &self,
        external_payment_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError>;
}
