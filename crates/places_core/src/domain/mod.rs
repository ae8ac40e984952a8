//! Domain entities with change notification.
//!
//! # Responsibility
//! - Hold authoritative in-memory state for the viewer profile and gallery.
//! - Route every mutation through the backing service before committing.
//! - Announce committed changes to subscribed views.
//!
//! # Invariants
//! - A failed service call leaves entity state untouched and fires nothing.
//! - At most one mutating request is in flight per entity; overlapping calls
//!   fail with `DomainError::Busy`.
//! - Entity locks are never held across an `.await`.

pub mod error;
pub mod gallery;
mod in_flight;
pub mod place;
pub mod user;
