//! Shared test doubles for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use places_core::{
    AvatarUpdate, InMemoryPlacesService, NewPlace, PlaceId, PlaceRecord, PlacesService,
    ProfileUpdate, ServiceError, ServiceResult, UserRecord,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

const CREATE_KEY: &str = "#create";
const PROFILE_KEY: &str = "#profile";

/// Signals sent/awaited around one held response.
pub struct Hold {
    /// Resolves once the held request was applied by the service.
    pub entered: oneshot::Receiver<()>,
    /// Send to let the held request complete.
    pub release: oneshot::Sender<()>,
}

/// `InMemoryPlacesService` wrapper with failure injection, call counting
/// and the ability to delay like/dislike/create responses.
///
/// A held request is applied by the inner service immediately; only the
/// response is delayed until released.
pub struct ScriptedService {
    inner: InMemoryPlacesService,
    next_failure: Mutex<Option<ServiceError>>,
    holds: Mutex<Vec<(PlaceId, oneshot::Sender<()>, oneshot::Receiver<()>)>>,
    create_id_override: Mutex<Option<PlaceId>>,
    calls: AtomicUsize,
}

impl ScriptedService {
    pub fn seeded() -> Arc<Self> {
        Arc::new(Self::wrap(InMemoryPlacesService::seeded()))
    }

    pub fn wrap(inner: InMemoryPlacesService) -> Self {
        Self {
            inner,
            next_failure: Mutex::new(None),
            holds: Mutex::new(Vec::new()),
            create_id_override: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &InMemoryPlacesService {
        &self.inner
    }

    /// Makes the next service call fail with `error` without touching state.
    pub fn fail_next(&self, error: ServiceError) {
        *self.next_failure.lock().unwrap() = Some(error);
    }

    /// Delays the next like/dislike response for `place_id` until released.
    pub fn hold_next_like(&self, place_id: &str) -> Hold {
        self.hold(place_id)
    }

    /// Delays the next create response until released.
    pub fn hold_next_create(&self) -> Hold {
        self.hold(CREATE_KEY)
    }

    /// Delays the next profile (name/job or avatar) response until released.
    pub fn hold_next_profile(&self) -> Hold {
        self.hold(PROFILE_KEY)
    }

    /// Makes the next created place come back under `id`.
    pub fn answer_next_create_with_id(&self, id: &str) {
        *self.create_id_override.lock().unwrap() = Some(id.to_string());
    }

    fn hold(&self, key: &str) -> Hold {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.holds
            .lock()
            .unwrap()
            .push((key.to_string(), entered_tx, release_rx));
        Hold {
            entered: entered_rx,
            release: release_tx,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin(&self) -> ServiceResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_failure.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn wait_if_held(&self, key: &str) {
        let hold = {
            let mut holds = self.holds.lock().unwrap();
            let index = holds.iter().position(|(held_key, _, _)| held_key == key);
            index.map(|index| holds.remove(index))
        };
        if let Some((_, entered, release)) = hold {
            let _ = entered.send(());
            let _ = release.await;
        }
    }
}

#[async_trait]
impl PlacesService for ScriptedService {
    async fn get_user(&self) -> ServiceResult<UserRecord> {
        self.begin()?;
        self.inner.get_user().await
    }

    async fn update_user(&self, update: &ProfileUpdate) -> ServiceResult<UserRecord> {
        self.begin()?;
        let response = self.inner.update_user(update).await;
        self.wait_if_held(PROFILE_KEY).await;
        response
    }

    async fn update_user_avatar(&self, update: &AvatarUpdate) -> ServiceResult<UserRecord> {
        self.begin()?;
        let response = self.inner.update_user_avatar(update).await;
        self.wait_if_held(PROFILE_KEY).await;
        response
    }

    async fn get_places(&self) -> ServiceResult<Vec<PlaceRecord>> {
        self.begin()?;
        self.inner.get_places().await
    }

    async fn create_place(&self, place: &NewPlace) -> ServiceResult<PlaceRecord> {
        self.begin()?;
        let mut response = self.inner.create_place(place).await;
        let override_id = self.create_id_override.lock().unwrap().take();
        if let Some(id) = override_id {
            if let Ok(record) = response.as_mut() {
                record.id = id;
            }
        }
        self.wait_if_held(CREATE_KEY).await;
        response
    }

    async fn delete_place(&self, id: &PlaceId) -> ServiceResult<()> {
        self.begin()?;
        self.inner.delete_place(id).await
    }

    async fn like_place(&self, id: &PlaceId) -> ServiceResult<PlaceRecord> {
        self.begin()?;
        let response = self.inner.like_place(id).await;
        self.wait_if_held(id).await;
        response
    }

    async fn dislike_place(&self, id: &PlaceId) -> ServiceResult<PlaceRecord> {
        self.begin()?;
        let response = self.inner.dislike_place(id).await;
        self.wait_if_held(id).await;
        response
    }
}

pub fn user(id: &str, name: &str) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        name: name.to_string(),
        about: "Explorer".to_string(),
        avatar_url: format!("https://example.com/{id}.png"),
    }
}

pub fn place(id: &str, owner: &UserRecord, likers: &[&UserRecord]) -> PlaceRecord {
    PlaceRecord {
        id: id.to_string(),
        name: format!("Place {id}"),
        image_url: format!("https://example.com/{id}.jpg"),
        owner: owner.clone(),
        likers: likers.iter().map(|liker| (*liker).clone()).collect(),
        created_at: chrono::Utc::now(),
    }
}

/// Subscribes a counter to a notifier and returns the shared count.
pub fn counter<T: 'static>(notifier: &places_core::ChangeNotifier<T>) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&count);
    notifier.subscribe(Arc::new(move |_: &T| {
        handle.fetch_add(1, Ordering::SeqCst);
    }));
    count
}
