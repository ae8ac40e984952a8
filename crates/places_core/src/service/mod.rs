//! Backing-service contracts and adapters.
//!
//! # Responsibility
//! - Define the async CRUD capability set consumed by domain entities.
//! - Provide an in-process implementation and a REST adapter.
//!
//! # Invariants
//! - Adapters return authoritative records; entities never fabricate them.
//! - Every failure surfaces as `ServiceError`; adapters never panic.

pub mod http;
pub mod memory;
pub mod places_service;
