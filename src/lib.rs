//! Tourbook - Tourism marketplace backend
//!
//! This crate implements the booking lifecycle of a tourism marketplace,
//! reconciles subscriptions against an external payment authority, and keeps
//! each user's roles and post visibility in line with their subscription.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
