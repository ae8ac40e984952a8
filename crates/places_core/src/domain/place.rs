//! Gallery place entity.
//!
//! # Invariants
//! - `liked`, `likes` and the stored record always come from the same
//!   service response.
//! - A place removed from its gallery rejects further mutations, including a
//!   like response that arrives after the removal.

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::in_flight::FlightGate;
use crate::model::record::{LikeState, PlaceId, PlaceRecord, UserId};
use crate::notify::ChangeNotifier;
use crate::service::places_service::{PlacesService, ServiceError};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct PlaceState {
    record: PlaceRecord,
    like: LikeState,
    removed: bool,
}

/// One place card, seen from the viewer's perspective.
pub struct Place {
    service: Arc<dyn PlacesService>,
    id: PlaceId,
    viewer_id: UserId,
    state: Mutex<PlaceState>,
    gate: FlightGate,
    change: ChangeNotifier<()>,
}

impl Place {
    /// Builds a place from a service record for `viewer_id`.
    pub fn new(
        service: Arc<dyn PlacesService>,
        record: PlaceRecord,
        viewer_id: impl Into<UserId>,
    ) -> Self {
        let viewer_id = viewer_id.into();
        let like = record.like_state(&viewer_id);
        Self {
            service,
            id: record.id.clone(),
            viewer_id,
            state: Mutex::new(PlaceState {
                record,
                like,
                removed: false,
            }),
            gate: FlightGate::default(),
            change: ChangeNotifier::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> String {
        self.lock().record.name.clone()
    }

    pub fn image_url(&self) -> String {
        self.lock().record.image_url.clone()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.lock().record.created_at
    }

    /// Whether the viewer is in the liker set.
    pub fn liked(&self) -> bool {
        self.lock().like.liked
    }

    /// Size of the liker set.
    pub fn likes(&self) -> usize {
        self.lock().like.likes
    }

    /// `liked` and `likes` read under one lock.
    pub fn like_state(&self) -> LikeState {
        self.lock().like
    }

    pub fn owned_by_viewer(&self) -> bool {
        self.lock().record.is_owned_by(&self.viewer_id)
    }

    /// Returns a copy of the last authoritative record.
    pub fn record(&self) -> PlaceRecord {
        self.lock().record.clone()
    }

    /// Whether a mutating request is in flight.
    pub fn is_pending(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn is_removed(&self) -> bool {
        self.lock().removed
    }

    /// Fires after every committed like change.
    pub fn change(&self) -> &ChangeNotifier<()> {
        &self.change
    }

    /// Likes the place if the viewer has not liked it yet, otherwise unlikes.
    ///
    /// Returns the committed like state.
    ///
    /// # Errors
    /// - `PlaceRemoved` if the place left its gallery (before or during the call).
    /// - `Busy` while an earlier toggle is pending.
    /// - `Service` when the request fails or answers for another place.
    pub async fn toggle_like(&self) -> DomainResult<LikeState> {
        self.ensure_live()?;
        let guard = self.gate.try_begin().ok_or(DomainError::Busy)?;

        let was_liked = self.liked();
        debug!(
            "event=place_like_request module=place place_id={} action={}",
            self.id,
            if was_liked { "dislike" } else { "like" }
        );
        let response = if was_liked {
            self.service.dislike_place(&self.id).await
        } else {
            self.service.like_place(&self.id).await
        };
        let record = match response {
            Ok(record) if record.id == self.id => record,
            Ok(record) => {
                let err = ServiceError::Decode(format!(
                    "like response for place {} does not match {}",
                    record.id, self.id
                ));
                warn!(
                    "event=place_like_toggled module=place status=error place_id={} error={err}",
                    self.id
                );
                return Err(err.into());
            }
            Err(err) => {
                warn!(
                    "event=place_like_toggled module=place status=error place_id={} error={err}",
                    self.id
                );
                return Err(err.into());
            }
        };
        let like = self.commit(record)?;
        drop(guard);

        info!(
            "event=place_like_toggled module=place status=ok place_id={} liked={} likes={}",
            self.id, like.liked, like.likes
        );
        self.change.trigger(&());
        Ok(like)
    }

    pub(crate) fn mark_removed(&self) {
        self.lock().removed = true;
    }

    /// Adopts `record` unless the place was removed meanwhile.
    ///
    /// The removal check and the write share one lock, so `mark_removed`
    /// either happens before (response discarded) or after (change kept).
    fn commit(&self, record: PlaceRecord) -> DomainResult<LikeState> {
        let mut state = self.lock();
        if state.removed {
            return Err(DomainError::PlaceRemoved(self.id.clone()));
        }
        state.like = record.like_state(&self.viewer_id);
        state.record = record;
        Ok(state.like)
    }

    fn ensure_live(&self) -> DomainResult<()> {
        if self.is_removed() {
            return Err(DomainError::PlaceRemoved(self.id.clone()));
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, PlaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
