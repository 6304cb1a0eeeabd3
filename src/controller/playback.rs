//! Playback control methods

use crate::model::{MediaCommand, MediaEvent, PlaybackSelection};

use super::AppController;

/// Position control step for the arrow keys (percent)
pub const SEEK_STEP: f64 = 5.0;
/// Volume step for `+` / `-`
pub const VOLUME_STEP: f32 = 0.05;

impl AppController {
    /// Start playing the highlighted search result.
    pub async fn play_selected_result(&self) {
        let mut model = self.model.lock().await;
        let Some(selection) = model.search().selected_result().map(PlaybackSelection::from) else {
            return;
        };

        tracing::info!(
            title = %selection.title,
            artist = %selection.artist,
            preview = %selection.preview_url,
            "Selecting track"
        );
        let command = model.transport_mut().select_track(selection);
        tracing::debug!(generation = model.transport().generation(), "Track selected");
        drop(model);

        self.dispatch(command).await;
    }

    pub async fn toggle_playback(&self) {
        let mut model = self.model.lock().await;
        let command = model.transport_mut().toggle_play_pause();
        let status = model.transport().status();
        drop(model);

        match command {
            Some(command) => {
                tracing::info!(?status, "Playback toggled");
                self.dispatch(command).await;
            }
            None => tracing::debug!("Nothing loaded, ignoring play/pause"),
        }
    }

    /// Move the position control by `delta` percent and seek there.
    pub async fn seek_relative(&self, delta: f64) {
        let mut model = self.model.lock().await;
        let from = model.transport().position_secs();
        let target = f64::from(model.transport().progress()) + delta;
        let command = model.transport_mut().seek_to(target);
        let duration = model.transport().duration_secs();
        drop(model);

        if let Some(command) = command {
            tracing::debug!(from, target, ?duration, "Seeking");
            self.dispatch(command).await;
        }
    }

    pub async fn volume_up(&self) {
        self.adjust_volume(VOLUME_STEP).await;
    }

    pub async fn volume_down(&self) {
        self.adjust_volume(-VOLUME_STEP).await;
    }

    async fn adjust_volume(&self, delta: f32) {
        let mut model = self.model.lock().await;
        let current = model.transport().volume();
        // Snap to the step grid so repeated presses land on round values
        let target = ((current + delta) / VOLUME_STEP).round() * VOLUME_STEP;
        let command = model.transport_mut().set_volume(target);
        drop(model);

        self.dispatch(command).await;
    }

    /// Hand a transport command to the audio backend.
    pub(crate) async fn dispatch(&self, command: MediaCommand) {
        if let Some(backend) = &self.audio_backend {
            backend.execute(command);
            return;
        }

        // Without an output device a load can never start
        if let MediaCommand::Load { generation, .. } = command {
            tracing::warn!(generation, "No audio backend, playback unavailable");
            self.handle_media_event(MediaEvent::Failed {
                generation,
                reason: "No audio output device".to_string(),
            })
            .await;
        }
    }
}
