//! Places backing-service contract.
//!
//! # Responsibility
//! - Describe the profile and place operations the domain layer relies on.
//! - Give all adapters one error vocabulary.
//!
//! # Invariants
//! - Each call is one request; a failed call has no partial effect that the
//!   caller is expected to observe.

use crate::model::record::{AvatarUpdate, NewPlace, PlaceId, PlaceRecord, ProfileUpdate, UserRecord};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure reported by a backing-service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The request never produced a response (connect, timeout, TLS).
    Transport(String),
    /// The service answered with a non-success status.
    Status { status: u16, message: String },
    /// The response body could not be decoded.
    Decode(String),
    /// The service refused the input (validation).
    Rejected(String),
    /// The addressed place does not exist on the service.
    NotFound(PlaceId),
    /// The viewer may not modify the addressed place.
    Forbidden(PlaceId),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "request failed: {message}"),
            Self::Status { status, message } => {
                write!(f, "request failed with status {status}: {message}")
            }
            Self::Decode(message) => write!(f, "invalid response payload: {message}"),
            Self::Rejected(message) => write!(f, "request rejected: {message}"),
            Self::NotFound(id) => write!(f, "place not found: {id}"),
            Self::Forbidden(id) => write!(f, "place cannot be modified by viewer: {id}"),
        }
    }
}

impl Error for ServiceError {}

/// Async CRUD capability set for the viewer profile and gallery places.
#[async_trait]
pub trait PlacesService: Send + Sync {
    async fn get_user(&self) -> ServiceResult<UserRecord>;
    async fn update_user(&self, update: &ProfileUpdate) -> ServiceResult<UserRecord>;
    async fn update_user_avatar(&self, update: &AvatarUpdate) -> ServiceResult<UserRecord>;
    async fn get_places(&self) -> ServiceResult<Vec<PlaceRecord>>;
    async fn create_place(&self, place: &NewPlace) -> ServiceResult<PlaceRecord>;
    async fn delete_place(&self, id: &PlaceId) -> ServiceResult<()>;
    async fn like_place(&self, id: &PlaceId) -> ServiceResult<PlaceRecord>;
    async fn dislike_place(&self, id: &PlaceId) -> ServiceResult<PlaceRecord>;
}
