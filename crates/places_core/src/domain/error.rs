//! Domain-layer error type.

use crate::model::record::PlaceId;
use crate::service::places_service::ServiceError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DomainResult<T> = Result<T, DomainError>;

/// Error returned by entity operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Backing-service call failed; nothing was committed.
    Service(ServiceError),
    /// Another mutating operation on the same entity is still in flight.
    Busy,
    /// The gallery holds no place with this id.
    PlaceNotFound(PlaceId),
    /// The place was removed from its gallery and can no longer change.
    PlaceRemoved(PlaceId),
    /// A place with this id is already in the gallery.
    DuplicatePlace(PlaceId),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::Busy => write!(f, "another change is still pending"),
            Self::PlaceNotFound(id) => write!(f, "place not in gallery: {id}"),
            Self::PlaceRemoved(id) => write!(f, "place was removed: {id}"),
            Self::DuplicatePlace(id) => write!(f, "place already in gallery: {id}"),
        }
    }
}

impl Error for DomainError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ServiceError> for DomainError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}
