//! Audio backend event listener

use tokio::sync::mpsc::UnboundedReceiver;

use crate::model::MediaEvent;
use super::AppController;

impl AppController {
    pub fn start_player_event_listener(&self, mut event_channel: UnboundedReceiver<MediaEvent>) {
        let controller = self.clone();
        tracing::info!("Starting audio event listener");

        tokio::spawn(async move {
            while let Some(event) = event_channel.recv().await {
                if controller.model.lock().await.should_quit() {
                    tracing::debug!("Audio event listener shutting down");
                    break;
                }
                controller.handle_media_event(event).await;
            }
        });
    }

    /// Fold one backend event into the transport state.
    pub async fn handle_media_event(&self, event: MediaEvent) {
        let mut model = self.model.lock().await;
        let applied = model.transport_mut().apply(&event);

        match &event {
            MediaEvent::TimeUpdate { generation, position_secs, .. } => {
                tracing::trace!(generation, position_secs, applied, "MediaEvent::TimeUpdate");
            }
            MediaEvent::Ended { generation } => {
                tracing::debug!(generation, applied, "MediaEvent::Ended");
            }
            MediaEvent::Failed { generation, reason } => {
                tracing::warn!(generation, applied, reason = %reason, "MediaEvent::Failed");
                if applied {
                    model.set_error(Self::describe_failure(reason));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fake::RecordingFetcher;
    use crate::model::{PlaybackSelection, PlayIndicator, TransportStatus};

    async fn playing_controller() -> AppController {
        let (controller, _commands) = AppController::for_tests(RecordingFetcher::failing());
        controller.model.lock().await.transport_mut().select_track(PlaybackSelection {
            title: "Intro".to_string(),
            artist: "The xx".to_string(),
            artwork_url: String::new(),
            preview_url: "https://audio.example/intro.m4a".to_string(),
        });
        controller
    }

    #[tokio::test]
    async fn finished_signal_ends_the_clip() {
        let controller = playing_controller().await;
        controller
            .handle_media_event(MediaEvent::TimeUpdate {
                generation: 1,
                position_secs: 29.0,
                duration_secs: Some(30.0),
            })
            .await;

        controller.handle_media_event(MediaEvent::Ended { generation: 1 }).await;

        let model = controller.model.lock().await;
        let transport = model.transport();
        assert_eq!(transport.status(), TransportStatus::Ended);
        assert_eq!(transport.indicator(), PlayIndicator::Paused);
        assert_eq!(transport.progress(), 0);
        assert_eq!(transport.elapsed_label(), "0:00");
        assert_eq!(transport.total_label(), "0:30");
    }

    #[tokio::test]
    async fn stale_failure_is_not_shown() {
        let controller = playing_controller().await;

        controller
            .handle_media_event(MediaEvent::Failed {
                generation: 7,
                reason: "old".to_string(),
            })
            .await;

        let model = controller.model.lock().await;
        assert!(!model.has_error());
        assert_eq!(model.transport().status(), TransportStatus::Playing);
    }

    #[tokio::test]
    async fn listener_applies_queued_events() {
        let controller = playing_controller().await;
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        controller.start_player_event_listener(rx);

        tx.send(MediaEvent::Failed {
            generation: 1,
            reason: "Unsupported preview format: no tracks".to_string(),
        })
        .unwrap();
        drop(tx);

        for _ in 0..50 {
            if controller.model.lock().await.has_error() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let model = controller.model.lock().await;
        assert_eq!(model.transport().status(), TransportStatus::Paused);
        assert_eq!(
            model.ui_state().error_message.as_deref(),
            Some("This preview could not be decoded.")
        );
    }
}
