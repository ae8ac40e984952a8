//! Viewer profile entity.
//!
//! # Invariants
//! - `name` and `job` are replaced together from one service response.
//! - `set_avatar_url` only touches the avatar field.

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::in_flight::FlightGate;
use crate::model::record::{AvatarUpdate, ProfileUpdate, UserId, UserRecord};
use crate::notify::ChangeNotifier;
use crate::service::places_service::PlacesService;
use log::{info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The current viewer's profile.
pub struct User {
    service: Arc<dyn PlacesService>,
    id: UserId,
    state: Mutex<UserRecord>,
    gate: FlightGate,
    change: ChangeNotifier<()>,
}

impl User {
    /// Wraps an already fetched profile record.
    pub fn new(service: Arc<dyn PlacesService>, record: UserRecord) -> Self {
        Self {
            service,
            id: record.id.clone(),
            state: Mutex::new(record),
            gate: FlightGate::default(),
            change: ChangeNotifier::new(),
        }
    }

    /// Fetches the viewer profile from `service`.
    pub async fn load(service: Arc<dyn PlacesService>) -> DomainResult<Self> {
        let record = service.get_user().await?;
        Ok(Self::new(service, record))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    pub fn job(&self) -> String {
        self.lock().about.clone()
    }

    pub fn avatar_url(&self) -> String {
        self.lock().avatar_url.clone()
    }

    /// Returns a copy of the current profile record.
    pub fn snapshot(&self) -> UserRecord {
        self.lock().clone()
    }

    /// Whether a mutating request is in flight.
    pub fn is_pending(&self) -> bool {
        self.gate.is_busy()
    }

    /// Fires after every committed profile change.
    pub fn change(&self) -> &ChangeNotifier<()> {
        &self.change
    }

    /// Persists name and job in one request, then adopts the returned values.
    ///
    /// # Errors
    /// - `Busy` while another profile change is pending.
    /// - `Service` when the request fails; local state is unchanged.
    pub async fn update(&self, name: &str, job: &str) -> DomainResult<()> {
        let guard = self.gate.try_begin().ok_or(DomainError::Busy)?;
        let request = ProfileUpdate {
            name: name.to_string(),
            about: job.to_string(),
        };
        let record = match self.service.update_user(&request).await {
            Ok(record) => record,
            Err(err) => {
                warn!("event=user_update module=user status=error user_id={} error={err}", self.id);
                return Err(err.into());
            }
        };

        {
            let mut state = self.lock();
            state.name = record.name;
            state.about = record.about;
        }
        drop(guard);

        info!("event=user_update module=user status=ok user_id={}", self.id);
        self.change.trigger(&());
        Ok(())
    }

    /// Persists a new avatar url, then adopts the returned value.
    ///
    /// # Errors
    /// Same contract as [`User::update`].
    pub async fn set_avatar_url(&self, url: &str) -> DomainResult<()> {
        let guard = self.gate.try_begin().ok_or(DomainError::Busy)?;
        let request = AvatarUpdate {
            avatar_url: url.to_string(),
        };
        let record = match self.service.update_user_avatar(&request).await {
            Ok(record) => record,
            Err(err) => {
                warn!("event=user_avatar module=user status=error user_id={} error={err}", self.id);
                return Err(err.into());
            }
        };

        self.lock().avatar_url = record.avatar_url;
        drop(guard);

        info!("event=user_avatar module=user status=ok user_id={}", self.id);
        self.change.trigger(&());
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, UserRecord> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
