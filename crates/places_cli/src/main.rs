//! CLI smoke entry point.
//!
//! # Responsibility
//! - Load a gallery from the configured REST API, or from the in-memory
//!   service when no token is set.
//! - Print the profile and cards, then toggle one like to exercise the
//!   change notification path end to end.

use log::error;
use places_core::{
    init_from_config, ApiConfig, Gallery, HttpPlacesService, InMemoryPlacesService, LogConfig,
    PlacesService,
};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = init_from_config(&LogConfig::from_env()) {
        eprintln!("logging disabled: {err}");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_run module=places_cli status=error error={message}");
            eprintln!("places_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let api_config = ApiConfig::from_env().map_err(|e| e.to_string())?;
    let service: Arc<dyn PlacesService> = match api_config {
        Some(config) => {
            println!("source=http base_url={} group={}", config.base_url, config.group);
            Arc::new(HttpPlacesService::new(&config).map_err(|e| e.to_string())?)
        }
        None => {
            println!("source=memory");
            Arc::new(InMemoryPlacesService::seeded())
        }
    };

    let gallery = Gallery::load(service).await.map_err(|e| e.to_string())?;
    let user = gallery.user();
    println!(
        "profile name={:?} job={:?} avatar={}",
        user.name(),
        user.job(),
        user.avatar_url()
    );
    for place in gallery.places() {
        println!(
            "card id={} name={:?} likes={} liked={} own={}",
            place.id(),
            place.name(),
            place.likes(),
            place.liked(),
            place.owned_by_viewer()
        );
    }

    let Some(first) = gallery.places().into_iter().next() else {
        println!("gallery is empty");
        return Ok(());
    };
    let watched = Arc::downgrade(&first);
    first.change().subscribe(Arc::new(move |_: &()| {
        if let Some(place) = watched.upgrade() {
            println!(
                "changed id={} likes={} liked={}",
                place.id(),
                place.likes(),
                place.liked()
            );
        }
    }));
    first.toggle_like().await.map_err(|e| e.to_string())?;

    println!("places_core version={}", places_core::core_version());
    Ok(())
}
