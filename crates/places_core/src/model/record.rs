//! User and place records.
//!
//! # Responsibility
//! - Mirror the backing-service JSON shapes with serde.
//! - Derive like/ownership state for a given viewer in one place.
//!
//! # Invariants
//! - `LikeState::liked` and `LikeState::likes` are always computed from the
//!   same `likers` list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned user identifier.
pub type UserId = String;

/// Server-assigned place identifier.
pub type PlaceId = String;

/// Raw user profile as returned by the backing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    /// Job title. Serialized as `about` to match the API.
    pub about: String,
    #[serde(rename = "avatar")]
    pub avatar_url: String,
}

/// Raw place card as returned by the backing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRecord {
    #[serde(rename = "_id")]
    pub id: PlaceId,
    pub name: String,
    #[serde(rename = "link")]
    pub image_url: String,
    pub owner: UserRecord,
    /// Liker set. The API calls this `likes` and sends full user objects.
    #[serde(rename = "likes", default)]
    pub likers: Vec<UserRecord>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Like state of one place from one viewer's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LikeState {
    /// Whether the viewer is in the liker set.
    pub liked: bool,
    /// Size of the liker set.
    pub likes: usize,
}

impl PlaceRecord {
    /// Derives `liked`/`likes` for `viewer` from this record's liker set.
    pub fn like_state(&self, viewer: &str) -> LikeState {
        LikeState {
            liked: self.likers.iter().any(|liker| liker.id == viewer),
            likes: self.likers.len(),
        }
    }

    pub fn is_owned_by(&self, viewer: &str) -> bool {
        self.owner.id == viewer
    }
}

/// Body for `PATCH /users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub about: String,
}

/// Body for `PATCH /users/me/avatar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarUpdate {
    #[serde(rename = "avatar")]
    pub avatar_url: String,
}

/// Body for `POST /cards`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlace {
    pub name: String,
    #[serde(rename = "link")]
    pub image_url: String,
}
