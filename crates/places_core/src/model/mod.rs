//! Wire records exchanged with the backing service.
//!
//! # Responsibility
//! - Define the raw user/place shapes returned by the places API.
//! - Define request bodies for profile, avatar and place creation.
//!
//! # Invariants
//! - Records are authoritative snapshots; entities derive view state from
//!   them and never edit them field by field.
//! - Serialized field names match the REST API (`_id`, `about`, `link`, ...).

pub mod record;
