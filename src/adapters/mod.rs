//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `cache` - Shared key-value cache (in-memory, Redis)
//! - `http` - axum routers
//! - `memory` - In-memory repositories for tests and local runs
//! - `notifications` - Booking notification senders
//! - `payment_authority` - Retrying HTTP client for the payment authority
//! - `postgres` - sqlx repositories

pub mod cache;
pub mod http;
pub mod memory;
pub mod notifications;
pub mod payment_authority;
pub mod postgres;

pub use cache::{InMemoryCache, RedisCache};
pub use http::{app_router, AppState};
pub use payment_authority::{AuthorityConfig, HttpPaymentAuthority, MockPaymentAuthority};
