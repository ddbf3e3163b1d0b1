//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `booking` - Booking lifecycle and cancellation penalties
//! - `subscription` - Subscriptions, payments and webhook envelopes
//! - `entitlement` - Roles, post activation and permission rules

pub mod booking;
pub mod entitlement;
pub mod foundation;
pub mod subscription;
