//! In-process places service.
//!
//! # Responsibility
//! - Serve profile and place records from memory for local runs and tests.
//! - Apply the same input rules and ownership checks as the REST API.
//!
//! # Invariants
//! - Newest place is first in `get_places` order.
//! - A liker appears at most once per place.
//! - Only the owner may delete a place.

use crate::model::record::{
    AvatarUpdate, NewPlace, PlaceId, PlaceRecord, ProfileUpdate, UserId, UserRecord,
};
use crate::service::places_service::{PlacesService, ServiceError, ServiceResult};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

static HTTP_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid url regex"));

const NAME_CHARS: (usize, usize) = (2, 30);
const ABOUT_CHARS: (usize, usize) = (2, 200);

const SEED_PLACES: [(&str, &str); 6] = [
    (
        "Arkhyz",
        "https://pictures.s3.yandex.net/frontend-developer/cards-compressed/arkhyz.jpg",
    ),
    (
        "Chelyabinsk Oblast",
        "https://pictures.s3.yandex.net/frontend-developer/cards-compressed/chelyabinsk-oblast.jpg",
    ),
    (
        "Ivanovo",
        "https://pictures.s3.yandex.net/frontend-developer/cards-compressed/ivanovo.jpg",
    ),
    (
        "Kamchatka",
        "https://pictures.s3.yandex.net/frontend-developer/cards-compressed/kamchatka.jpg",
    ),
    (
        "Kholmogorsky District",
        "https://pictures.s3.yandex.net/frontend-developer/cards-compressed/kholmogorsky-rayon.jpg",
    ),
    (
        "Baikal",
        "https://pictures.s3.yandex.net/frontend-developer/cards-compressed/baikal.jpg",
    ),
];

struct MemoryState {
    viewer: UserRecord,
    places: Vec<PlaceRecord>,
}

/// Memory-backed `PlacesService` acting on behalf of one viewer.
pub struct InMemoryPlacesService {
    state: Mutex<MemoryState>,
}

impl InMemoryPlacesService {
    /// Creates a service for `viewer` serving `places` in the given order.
    pub fn new(viewer: UserRecord, places: Vec<PlaceRecord>) -> Self {
        Self {
            state: Mutex::new(MemoryState { viewer, places }),
        }
    }

    /// Creates a service with a default viewer and six curated places.
    ///
    /// Seed places belong to a separate curator account, so the viewer can
    /// like them but not delete them.
    pub fn seeded() -> Self {
        let viewer = UserRecord {
            id: new_id(),
            name: "Jacques Cousteau".to_string(),
            about: "Sailor, researcher".to_string(),
            avatar_url: "https://pictures.s3.yandex.net/frontend-developer/common/ava.jpg"
                .to_string(),
        };
        let curator = UserRecord {
            id: new_id(),
            name: "Gallery curator".to_string(),
            about: "Keeps the starter collection".to_string(),
            avatar_url: viewer.avatar_url.clone(),
        };
        let places = SEED_PLACES
            .iter()
            .map(|(name, link)| PlaceRecord {
                id: new_id(),
                name: (*name).to_string(),
                image_url: (*link).to_string(),
                owner: curator.clone(),
                likers: Vec::new(),
                created_at: Utc::now(),
            })
            .collect();
        Self::new(viewer, places)
    }

    /// Returns the identifier of the viewer this service acts for.
    pub fn viewer_id(&self) -> UserId {
        self.lock().viewer.id.clone()
    }

    /// Records a like from someone other than the viewer.
    ///
    /// Returns `false` when the place does not exist.
    pub fn add_foreign_like(&self, id: &str, liker: UserRecord) -> bool {
        let mut state = self.lock();
        let Some(place) = state.places.iter_mut().find(|place| place.id == id) else {
            return false;
        };
        if !place.likers.iter().any(|existing| existing.id == liker.id) {
            place.likers.push(liker);
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_likers(
        &self,
        id: &PlaceId,
        apply: impl FnOnce(&mut Vec<UserRecord>, &UserRecord),
    ) -> ServiceResult<PlaceRecord> {
        let mut state = self.lock();
        let viewer = state.viewer.clone();
        let place = state
            .places
            .iter_mut()
            .find(|place| &place.id == id)
            .ok_or_else(|| ServiceError::NotFound(id.clone()))?;
        apply(&mut place.likers, &viewer);
        Ok(place.clone())
    }
}

impl Default for InMemoryPlacesService {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl PlacesService for InMemoryPlacesService {
    async fn get_user(&self) -> ServiceResult<UserRecord> {
        Ok(self.lock().viewer.clone())
    }

    async fn update_user(&self, update: &ProfileUpdate) -> ServiceResult<UserRecord> {
        let name = validate_text("name", &update.name, NAME_CHARS)?;
        let about = validate_text("about", &update.about, ABOUT_CHARS)?;

        let mut state = self.lock();
        state.viewer.name = name;
        state.viewer.about = about;
        debug!("event=memory_user_updated module=memory_service status=ok");
        Ok(state.viewer.clone())
    }

    async fn update_user_avatar(&self, update: &AvatarUpdate) -> ServiceResult<UserRecord> {
        let avatar_url = validate_url(&update.avatar_url)?;

        let mut state = self.lock();
        state.viewer.avatar_url = avatar_url;
        debug!("event=memory_avatar_updated module=memory_service status=ok");
        Ok(state.viewer.clone())
    }

    async fn get_places(&self) -> ServiceResult<Vec<PlaceRecord>> {
        Ok(self.lock().places.clone())
    }

    async fn create_place(&self, place: &NewPlace) -> ServiceResult<PlaceRecord> {
        let name = validate_text("name", &place.name, NAME_CHARS)?;
        let image_url = validate_url(&place.image_url)?;

        let mut state = self.lock();
        let record = PlaceRecord {
            id: new_id(),
            name,
            image_url,
            owner: state.viewer.clone(),
            likers: Vec::new(),
            created_at: Utc::now(),
        };
        state.places.insert(0, record.clone());
        debug!(
            "event=memory_place_created module=memory_service status=ok place_id={}",
            record.id
        );
        Ok(record)
    }

    async fn delete_place(&self, id: &PlaceId) -> ServiceResult<()> {
        let mut state = self.lock();
        let index = state
            .places
            .iter()
            .position(|place| &place.id == id)
            .ok_or_else(|| ServiceError::NotFound(id.clone()))?;
        if state.places[index].owner.id != state.viewer.id {
            return Err(ServiceError::Forbidden(id.clone()));
        }
        state.places.remove(index);
        debug!("event=memory_place_deleted module=memory_service status=ok place_id={id}");
        Ok(())
    }

    async fn like_place(&self, id: &PlaceId) -> ServiceResult<PlaceRecord> {
        self.update_likers(id, |likers, viewer| {
            if !likers.iter().any(|liker| liker.id == viewer.id) {
                likers.push(viewer.clone());
            }
        })
    }

    async fn dislike_place(&self, id: &PlaceId) -> ServiceResult<PlaceRecord> {
        self.update_likers(id, |likers, viewer| {
            likers.retain(|liker| liker.id != viewer.id);
        })
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn validate_text(field: &str, value: &str, (min, max): (usize, usize)) -> ServiceResult<String> {
    let trimmed = value.trim();
    let count = trimmed.chars().count();
    if count < min || count > max {
        return Err(ServiceError::Rejected(format!(
            "{field} must be {min}..={max} characters, got {count}"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_url(value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if !HTTP_URL_RE.is_match(trimmed) {
        return Err(ServiceError::Rejected(format!(
            "`{trimmed}` is not an http(s) url"
        )));
    }
    Ok(trimmed.to_string())
}
