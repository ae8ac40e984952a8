//! Core domain logic for the places gallery.
//! Entities here are the single source of truth that views subscribe to.

pub mod config;
pub mod domain;
pub mod logging;
pub mod model;
pub mod notify;
pub mod service;

pub use config::{ApiConfig, ConfigError, LogConfig};
pub use domain::error::{DomainError, DomainResult};
pub use domain::gallery::{Gallery, GalleryChange};
pub use domain::place::Place;
pub use domain::user::User;
pub use logging::{
    default_log_level, init_from_config, init_logging, logging_status, LogTarget, LoggingError,
};
pub use model::record::{
    AvatarUpdate, LikeState, NewPlace, PlaceId, PlaceRecord, ProfileUpdate, UserId, UserRecord,
};
pub use notify::{ChangeNotifier, Listener};
pub use service::http::HttpPlacesService;
pub use service::memory::InMemoryPlacesService;
pub use service::places_service::{PlacesService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
