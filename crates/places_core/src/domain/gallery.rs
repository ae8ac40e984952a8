//! Gallery aggregate: the viewer plus the ordered place collection.
//!
//! # Responsibility
//! - Build `Place` entities from service records for the current viewer.
//! - Mediate add/remove against the backing service.
//! - Announce structural changes with the affected place id.
//!
//! # Invariants
//! - Place ids are unique within the collection.
//! - Order is service order at load time; `add` prepends.
//! - A removed place is marked removed and dropped from the collection
//!   before `GalleryChange::Removed` fires.

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::in_flight::FlightGate;
use crate::domain::place::Place;
use crate::domain::user::User;
use crate::model::record::{NewPlace, PlaceId, PlaceRecord, UserRecord};
use crate::notify::ChangeNotifier;
use crate::service::places_service::PlacesService;
use log::{info, warn};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Structural change announced by [`Gallery::change`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryChange {
    Added(PlaceId),
    Removed(PlaceId),
}

/// Ordered collection of places owned by one viewer session.
pub struct Gallery {
    service: Arc<dyn PlacesService>,
    user: Arc<User>,
    places: Mutex<Vec<Arc<Place>>>,
    gate: FlightGate,
    change: ChangeNotifier<GalleryChange>,
}

impl Gallery {
    /// Fetches the viewer profile and the place list, then builds the gallery.
    pub async fn load(service: Arc<dyn PlacesService>) -> DomainResult<Self> {
        let user = service.get_user().await?;
        let places = service.get_places().await?;
        let gallery = Self::from_records(service, places, user)?;
        info!(
            "event=gallery_load module=gallery status=ok places={}",
            gallery.len()
        );
        Ok(gallery)
    }

    /// Builds a gallery from raw records.
    ///
    /// `liked`/`likes` of each place are derived against `user.id`.
    ///
    /// # Errors
    /// - `DuplicatePlace` when two records share an id.
    pub fn from_records(
        service: Arc<dyn PlacesService>,
        places: Vec<PlaceRecord>,
        user: UserRecord,
    ) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(places.len());
        for record in &places {
            if !seen.insert(record.id.as_str()) {
                return Err(DomainError::DuplicatePlace(record.id.clone()));
            }
        }

        let user = Arc::new(User::new(Arc::clone(&service), user));
        let places = places
            .into_iter()
            .map(|record| Arc::new(Place::new(Arc::clone(&service), record, user.id())))
            .collect();

        Ok(Self {
            service,
            user,
            places: Mutex::new(places),
            gate: FlightGate::default(),
            change: ChangeNotifier::new(),
        })
    }

    /// The viewer whose perspective this gallery renders.
    pub fn user(&self) -> &Arc<User> {
        &self.user
    }

    /// Whether a mutating request is in flight.
    pub fn is_pending(&self) -> bool {
        self.gate.is_busy()
    }

    /// Fires after every committed add or remove.
    pub fn change(&self) -> &ChangeNotifier<GalleryChange> {
        &self.change
    }

    /// Current places in display order.
    pub fn places(&self) -> Vec<Arc<Place>> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn find(&self, id: &str) -> Option<Arc<Place>> {
        self.lock().iter().find(|place| place.id() == id).cloned()
    }

    /// Serializes current places back to their last authoritative records.
    pub fn records(&self) -> Vec<PlaceRecord> {
        self.lock().iter().map(|place| place.record()).collect()
    }

    /// Creates a place on the service and prepends it.
    ///
    /// # Errors
    /// - `Busy` while another add/remove is pending.
    /// - `Service` when creation fails; the collection is unchanged.
    /// - `DuplicatePlace` when the service returns an id already present. The
    ///   service has already stored the place at that point; the local
    ///   collection is left unchanged and no `Added` fires, so the two diverge
    ///   until the gallery is reloaded.
    pub async fn add(&self, name: &str, image_url: &str) -> DomainResult<Arc<Place>> {
        let guard = self.gate.try_begin().ok_or(DomainError::Busy)?;
        let request = NewPlace {
            name: name.to_string(),
            image_url: image_url.to_string(),
        };
        let record = match self.service.create_place(&request).await {
            Ok(record) => record,
            Err(err) => {
                warn!("event=gallery_add module=gallery status=error error={err}");
                return Err(err.into());
            }
        };

        let place = Arc::new(Place::new(
            Arc::clone(&self.service),
            record,
            self.user.id(),
        ));
        {
            let mut places = self.lock();
            if places.iter().any(|existing| existing.id() == place.id()) {
                warn!(
                    "event=gallery_add module=gallery status=error reason=duplicate place_id={}",
                    place.id()
                );
                return Err(DomainError::DuplicatePlace(place.id().to_string()));
            }
            places.insert(0, Arc::clone(&place));
        }
        drop(guard);

        info!(
            "event=gallery_add module=gallery status=ok place_id={}",
            place.id()
        );
        self.change
            .trigger(&GalleryChange::Added(place.id().to_string()));
        Ok(place)
    }

    /// Deletes a place on the service and drops it from the collection.
    ///
    /// # Errors
    /// - `PlaceNotFound` when `id` is not in the gallery; no request is sent.
    /// - `Busy` while another add/remove is pending.
    /// - `Service` when deletion fails; the collection is unchanged.
    pub async fn remove(&self, id: &str) -> DomainResult<()> {
        let id = id.to_string();
        if self.find(&id).is_none() {
            return Err(DomainError::PlaceNotFound(id));
        }
        let guard = self.gate.try_begin().ok_or(DomainError::Busy)?;

        if let Err(err) = self.service.delete_place(&id).await {
            warn!("event=gallery_remove module=gallery status=error place_id={id} error={err}");
            return Err(err.into());
        }

        let mut places = self.lock();
        let Some(index) = places.iter().position(|place| place.id() == id) else {
            return Err(DomainError::PlaceNotFound(id));
        };
        let place = places.remove(index);
        drop(places);
        place.mark_removed();
        drop(guard);

        info!("event=gallery_remove module=gallery status=ok place_id={id}");
        self.change.trigger(&GalleryChange::Removed(id));
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Place>>> {
        self.places.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
