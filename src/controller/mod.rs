//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives the audio backend.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `search`: Catalog lookups
//! - `playback`: Transport control methods
//! - `player_events`: Audio backend event listener

mod input;
mod search;
mod playback;
mod player_events;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::audio::AudioBackend;
use crate::model::{AppModel, ItunesClient};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) client: ItunesClient,
    pub(crate) audio_backend: Option<AudioBackend>,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        client: ItunesClient,
        audio_backend: Option<AudioBackend>,
    ) -> Self {
        Self {
            model,
            client,
            audio_backend,
        }
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        Self::describe_failure(&format!("{error:#}"))
    }

    /// Turn a failure chain into the message shown in the error overlay
    pub(crate) fn describe_failure(failure: &str) -> String {
        if failure.contains("429") {
            "Rate limited by the catalog. Please wait a moment.".to_string()
        } else if failure.contains("Unsupported preview format") {
            "This preview could not be decoded.".to_string()
        } else if failure.contains("No audio output device") {
            "No audio output device available.".to_string()
        } else {
            format!("Error: {}", failure)
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(
        fetcher: crate::fetch::fake::RecordingFetcher,
    ) -> (Self, std::sync::mpsc::Receiver<crate::audio::AudioCommand>) {
        let fetcher: Arc<dyn crate::fetch::HttpFetch> = Arc::new(fetcher);
        let client = ItunesClient::new(fetcher.clone(), crate::model::ITUNES_SEARCH_URL);
        let (backend, commands) = AudioBackend::detached(fetcher);
        let model = Arc::new(Mutex::new(AppModel::new(crate::audio::DEFAULT_VOLUME)));
        (Self::new(model, client, Some(backend)), commands)
    }
}
