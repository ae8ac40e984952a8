mod common;

use common::{counter, ScriptedService};
use places_core::{DomainError, Gallery, LikeState, PlacesService, User};
use std::sync::atomic::Ordering;
use std::sync::Arc;

async fn load(service: &Arc<ScriptedService>) -> Gallery {
    let handle: Arc<dyn PlacesService> = service.clone();
    Gallery::load(handle).await.unwrap()
}

#[tokio::test]
async fn overlapping_toggle_is_rejected_while_first_is_pending() {
    let service = ScriptedService::seeded();
    let gallery = load(&service).await;
    let place = gallery.places()[0].clone();
    let notified = counter(place.change());

    let hold = service.hold_next_like(place.id());
    let first = {
        let place = Arc::clone(&place);
        tokio::spawn(async move { place.toggle_like().await })
    };
    hold.entered.await.unwrap();
    let calls_in_flight = service.calls();

    let second = place.toggle_like().await;
    assert_eq!(second, Err(DomainError::Busy));
    assert_eq!(service.calls(), calls_in_flight, "rejected call must not hit the service");
    assert!(!place.liked());
    assert_eq!(notified.load(Ordering::SeqCst), 0);

    hold.release.send(()).unwrap();
    let committed = first.await.unwrap().unwrap();

    assert_eq!(committed, LikeState { liked: true, likes: 1 });
    assert_eq!(place.like_state(), committed);
    assert_eq!(notified.load(Ordering::SeqCst), 1);

    // Once settled, the next toggle is admitted again.
    let again = place.toggle_like().await.unwrap();
    assert_eq!(again, LikeState { liked: false, likes: 0 });
}

#[tokio::test]
async fn toggles_on_different_places_commit_independently_out_of_order() {
    let service = ScriptedService::seeded();
    let gallery = load(&service).await;
    let places = gallery.places();
    let (left, right) = (places[0].clone(), places[1].clone());

    let left_hold = service.hold_next_like(left.id());
    let right_hold = service.hold_next_like(right.id());
    let left_task = {
        let place = Arc::clone(&left);
        tokio::spawn(async move { place.toggle_like().await })
    };
    let right_task = {
        let place = Arc::clone(&right);
        tokio::spawn(async move { place.toggle_like().await })
    };
    left_hold.entered.await.unwrap();
    right_hold.entered.await.unwrap();

    // Release in reverse issue order.
    right_hold.release.send(()).unwrap();
    let right_state = right_task.await.unwrap().unwrap();
    assert!(right_state.liked);
    assert!(!left.liked());

    left_hold.release.send(()).unwrap();
    let left_state = left_task.await.unwrap().unwrap();
    assert!(left_state.liked);
    assert!(right.liked());
}

#[tokio::test]
async fn removal_during_pending_toggle_discards_the_response() {
    let service = ScriptedService::seeded();
    let gallery = load(&service).await;
    let mine = gallery
        .add("Elbrus", "https://example.com/elbrus.jpg")
        .await
        .unwrap();
    let notified = counter(mine.change());

    let hold = service.hold_next_like(mine.id());
    let toggle = {
        let place = Arc::clone(&mine);
        tokio::spawn(async move { place.toggle_like().await })
    };
    hold.entered.await.unwrap();

    gallery.remove(mine.id()).await.unwrap();
    hold.release.send(()).unwrap();

    let outcome = toggle.await.unwrap();
    assert_eq!(outcome, Err(DomainError::PlaceRemoved(mine.id().to_string())));
    assert!(!mine.liked());
    assert_eq!(notified.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn overlapping_gallery_changes_are_rejected_while_add_is_pending() {
    let service = ScriptedService::seeded();
    let gallery = Arc::new(load(&service).await);
    let notified = counter(gallery.change());
    let before = gallery.len();

    let hold = service.hold_next_create();
    let first = {
        let gallery = Arc::clone(&gallery);
        tokio::spawn(async move {
            gallery
                .add("Elbrus", "https://example.com/elbrus.jpg")
                .await
                .map(|place| place.id().to_string())
        })
    };
    hold.entered.await.unwrap();

    let second = gallery
        .add("Kazbek", "https://example.com/kazbek.jpg")
        .await
        .err();
    assert_eq!(second, Some(DomainError::Busy));
    let existing = gallery.places()[0].id().to_string();
    assert_eq!(gallery.remove(&existing).await, Err(DomainError::Busy));
    assert_eq!(gallery.len(), before);
    assert_eq!(notified.load(Ordering::SeqCst), 0);

    hold.release.send(()).unwrap();
    let added_id = first.await.unwrap().unwrap();

    assert_eq!(gallery.len(), before + 1);
    assert_eq!(gallery.places()[0].id(), added_id);
    assert_eq!(notified.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn gallery_changes_proceed_while_a_place_toggle_is_pending() {
    let service = ScriptedService::seeded();
    let gallery = load(&service).await;
    let mine = gallery
        .add("Elbrus", "https://example.com/elbrus.jpg")
        .await
        .unwrap();

    let hold = service.hold_next_like(mine.id());
    let toggle = {
        let place = Arc::clone(&mine);
        tokio::spawn(async move { place.toggle_like().await })
    };
    hold.entered.await.unwrap();

    let added = gallery
        .add("Kazbek", "https://example.com/kazbek.jpg")
        .await
        .unwrap();
    assert_eq!(gallery.places()[0].id(), added.id());

    hold.release.send(()).unwrap();
    assert!(toggle.await.unwrap().unwrap().liked);
}

#[tokio::test]
async fn second_profile_change_is_rejected_while_update_is_pending() {
    let service = ScriptedService::seeded();
    let handle: Arc<dyn PlacesService> = service.clone();
    let user = Arc::new(User::load(handle).await.unwrap());
    let notified = counter(user.change());
    let avatar_before = user.avatar_url();

    let hold = service.hold_next_profile();
    let first = {
        let user = Arc::clone(&user);
        tokio::spawn(async move { user.update("Ada Lovelace", "Analyst").await })
    };
    hold.entered.await.unwrap();
    let calls_in_flight = service.calls();
    assert!(user.is_pending());

    let second = user
        .set_avatar_url("https://example.com/new-avatar.png")
        .await;
    assert_eq!(second, Err(DomainError::Busy));
    assert_eq!(service.calls(), calls_in_flight, "rejected call must not hit the service");
    assert_eq!(user.avatar_url(), avatar_before);
    assert_eq!(notified.load(Ordering::SeqCst), 0);

    hold.release.send(()).unwrap();
    first.await.unwrap().unwrap();

    assert!(!user.is_pending());
    assert_eq!(user.name(), "Ada Lovelace");
    assert_eq!(user.job(), "Analyst");
    assert_eq!(user.avatar_url(), avatar_before);
    assert_eq!(notified.load(Ordering::SeqCst), 1);
}
