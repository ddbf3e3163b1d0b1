//! Payment authority adapters.

mod http_client;
mod mock;

pub use http_client::{AuthorityConfig, HttpPaymentAuthority};
pub use mock::MockPaymentAuthority;
