//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `BookingRepository` - Bookings with version compare-and-swap
//! - `SubscriptionRepository`, `PaymentRepository`, `PlanRepository`
//! - `UserRepository`, `PostRepository` - Collaborator collections
//!
//! ## Integration Ports
//!
//! - `PaymentAuthority` - Retrying reads of payments and preapprovals
//! - `KeyValueCache` - Shared TTL cache with atomic check-and-set
//! - `NotificationSender` - Booking participant notifications

mod booking_repository;
mod key_value_cache;
mod notification_sender;
mod payment_authority;
mod payment_repository;
mod plan_repository;
mod post_repository;
mod subscription_repository;
mod user_repository;

pub use booking_repository::BookingRepository;
pub use key_value_cache::{CacheError, KeyValueCache};
pub use notification_sender::NotificationSender;
pub use payment_authority::{AuthorityError, AuthorityErrorCode, PaymentAuthority};
pub use payment_repository::PaymentRepository;
pub use plan_repository::PlanRepository;
pub use post_repository::PostRepository;
pub use subscription_repository::SubscriptionRepository;
pub use user_repository::UserRepository;
