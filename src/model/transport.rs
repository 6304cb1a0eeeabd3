//! Transport state machine for the single preview resource
//!
//! The transport never touches the audio device. User input is turned into
//! [`MediaCommand`]s for the backend, and backend [`MediaEvent`]s are folded
//! back into the visual state shown by the progress bar and labels.

use super::content::PlaybackSelection;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TransportStatus {
    /// Nothing selected yet
    #[default]
    Idle,
    Playing,
    Paused,
    /// Clip finished; looks like `Paused` at position zero
    Ended,
}

/// Play/pause glyph shown on the control surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayIndicator {
    Playing,
    Paused,
}

/// Instruction for the audio backend
#[derive(Clone, Debug, PartialEq)]
pub enum MediaCommand {
    Load { generation: u64, url: String },
    Pause,
    Resume,
    Seek { position_secs: f64 },
    SetVolume(f32),
}

/// Signal emitted by the audio backend, tagged with the load it belongs to
#[derive(Clone, Debug, PartialEq)]
pub enum MediaEvent {
    TimeUpdate {
        generation: u64,
        position_secs: f64,
        duration_secs: Option<f64>,
    },
    Ended {
        generation: u64,
    },
    Failed {
        generation: u64,
        reason: String,
    },
}

impl MediaEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::TimeUpdate { generation, .. }
            | Self::Ended { generation }
            | Self::Failed { generation, .. } => *generation,
        }
    }
}

/// `minutes:seconds` with two-digit seconds, e.g. 65 -> `1:05`
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[derive(Clone, Debug)]
pub struct Transport {
    status: TransportStatus,
    selection: Option<PlaybackSelection>,
    generation: u64,
    position_secs: f64,
    duration_secs: Option<f64>,
    /// Position control value, 0..=100
    progress: u8,
    elapsed_label: String,
    total_label: String,
    volume: f32,
    /// The active selection never started; nothing is loaded in the backend
    load_failed: bool,
}

impl Transport {
    pub fn new(volume: f32) -> Self {
        Self {
            status: TransportStatus::Idle,
            selection: None,
            generation: 0,
            position_secs: 0.0,
            duration_secs: None,
            progress: 0,
            elapsed_label: format_time(0.0),
            total_label: format_time(0.0),
            volume: volume.clamp(0.0, 1.0),
            load_failed: false,
        }
    }

    pub fn status(&self) -> TransportStatus {
        self.status
    }

    pub fn indicator(&self) -> PlayIndicator {
        if self.status == TransportStatus::Playing {
            PlayIndicator::Playing
        } else {
            PlayIndicator::Paused
        }
    }

    pub fn selection(&self) -> Option<&PlaybackSelection> {
        self.selection.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn elapsed_label(&self) -> &str {
        &self.elapsed_label
    }

    pub fn total_label(&self) -> &str {
        &self.total_label
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Replace the active resource and start playing it.
    pub fn select_track(&mut self, selection: PlaybackSelection) -> MediaCommand {
        self.generation += 1;
        let url = selection.preview_url.clone();

        self.selection = Some(selection);
        self.status = TransportStatus::Playing;
        self.load_failed = false;
        self.position_secs = 0.0;
        self.duration_secs = None;
        self.progress = 0;
        self.elapsed_label = format_time(0.0);

        MediaCommand::Load {
            generation: self.generation,
            url,
        }
    }

    /// Flip between playing and paused. After a failed load the selection is
    /// loaded again under a new generation instead of resumed.
    pub fn toggle_play_pause(&mut self) -> Option<MediaCommand> {
        match self.status {
            TransportStatus::Idle => None,
            TransportStatus::Paused if self.load_failed => {
                let selection = self.selection.clone()?;
                Some(self.select_track(selection))
            }
            TransportStatus::Playing => {
                self.status = TransportStatus::Paused;
                Some(MediaCommand::Pause)
            }
            TransportStatus::Paused | TransportStatus::Ended => {
                self.status = TransportStatus::Playing;
                Some(MediaCommand::Resume)
            }
        }
    }

    /// Move the position control to `control_value` (0..=100) and seek there.
    /// Does nothing while the duration is unknown.
    pub fn seek_to(&mut self, control_value: f64) -> Option<MediaCommand> {
        let duration = self.known_duration()?;
        let control_value = control_value.clamp(0.0, 100.0);
        let position_secs = control_value / 100.0 * duration;

        self.progress = control_value.round() as u8;
        self.position_secs = position_secs;
        self.elapsed_label = format_time(position_secs);
        if self.status == TransportStatus::Ended {
            self.status = TransportStatus::Paused;
        }

        Some(MediaCommand::Seek { position_secs })
    }

    pub fn set_volume(&mut self, volume: f32) -> MediaCommand {
        self.volume = volume.clamp(0.0, 1.0);
        MediaCommand::SetVolume(self.volume)
    }

    /// Fold a backend event into the visual state. Events from a previous
    /// selection are ignored and `false` is returned.
    pub fn apply(&mut self, event: &MediaEvent) -> bool {
        if self.status == TransportStatus::Idle || event.generation() != self.generation {
            return false;
        }

        match event {
            MediaEvent::TimeUpdate {
                position_secs,
                duration_secs,
                ..
            } => {
                if let Some(duration) = duration_secs.filter(|d| d.is_finite() && *d > 0.0) {
                    let position = position_secs.clamp(0.0, duration);
                    self.duration_secs = Some(duration);
                    self.position_secs = position;
                    self.progress = (position / duration * 100.0).round() as u8;
                    self.elapsed_label = format_time(position);
                    self.total_label = format_time(duration);
                }
            }
            MediaEvent::Ended { .. } => {
                self.status = TransportStatus::Ended;
                self.position_secs = 0.0;
                self.progress = 0;
                self.elapsed_label = format_time(0.0);
            }
            MediaEvent::Failed { .. } => {
                self.status = TransportStatus::Paused;
                self.load_failed = true;
            }
        }
        true
    }

    fn known_duration(&self) -> Option<f64> {
        if self.status == TransportStatus::Idle || self.load_failed {
            return None;
        }
        self.duration_secs.filter(|d| *d > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn selection(title: &str) -> PlaybackSelection {
        PlaybackSelection {
            title: title.to_string(),
            artist: "Daft Punk".to_string(),
            artwork_url: "https://is1.example/600x600bb.jpg".to_string(),
            preview_url: format!("https://audio.example/{title}.m4a"),
        }
    }

    fn tick(generation: u64, position: f64, duration: Option<f64>) -> MediaEvent {
        MediaEvent::TimeUpdate {
            generation,
            position_secs: position,
            duration_secs: duration,
        }
    }

    fn playing(duration: f64) -> Transport {
        let mut transport = Transport::new(0.5);
        transport.select_track(selection("one"));
        transport.apply(&tick(1, 0.0, Some(duration)));
        transport
    }

    #[rstest]
    #[case(65.0, "1:05")]
    #[case(5.0, "0:05")]
    #[case(600.0, "10:00")]
    #[case(0.0, "0:00")]
    #[case(29.97, "0:29")]
    #[case(-3.0, "0:00")]
    #[case(f64::NAN, "0:00")]
    fn formats_time(#[case] seconds: f64, #[case] expected: &str) {
        assert_eq!(format_time(seconds), expected);
    }

    #[test]
    fn select_track_starts_playing_from_zero() {
        let mut transport = playing(30.0);
        transport.apply(&tick(1, 12.0, Some(30.0)));

        let command = transport.select_track(selection("two"));

        assert_eq!(
            command,
            MediaCommand::Load {
                generation: 2,
                url: "https://audio.example/two.m4a".to_string()
            }
        );
        assert_eq!(transport.status(), TransportStatus::Playing);
        assert_eq!(transport.indicator(), PlayIndicator::Playing);
        assert_eq!(transport.elapsed_label(), "0:00");
        assert_eq!(transport.progress(), 0);
        assert_eq!(transport.duration_secs(), None);
        assert_eq!(transport.selection().unwrap().title, "two");
    }

    #[test]
    fn toggle_in_idle_is_a_noop() {
        let mut transport = Transport::new(0.5);
        assert_eq!(transport.toggle_play_pause(), None);
        assert_eq!(transport.status(), TransportStatus::Idle);
        assert_eq!(transport.indicator(), PlayIndicator::Paused);
    }

    #[test]
    fn toggle_pauses_and_resumes() {
        let mut transport = playing(30.0);

        assert_eq!(transport.toggle_play_pause(), Some(MediaCommand::Pause));
        assert_eq!(transport.status(), TransportStatus::Paused);
        assert_eq!(transport.indicator(), PlayIndicator::Paused);

        assert_eq!(transport.toggle_play_pause(), Some(MediaCommand::Resume));
        assert_eq!(transport.status(), TransportStatus::Playing);
        assert_eq!(transport.indicator(), PlayIndicator::Playing);
    }

    #[test]
    fn time_update_moves_progress_and_labels() {
        let mut transport = playing(30.0);
        assert!(transport.apply(&tick(1, 10.0, Some(30.0))));

        assert_eq!(transport.progress(), 33);
        assert_eq!(transport.elapsed_label(), "0:10");
        assert_eq!(transport.total_label(), "0:30");
    }

    #[test]
    fn time_update_without_duration_is_skipped() {
        let mut transport = Transport::new(0.5);
        transport.select_track(selection("one"));
        transport.apply(&tick(1, 4.0, None));

        assert_eq!(transport.progress(), 0);
        assert_eq!(transport.elapsed_label(), "0:00");
        assert_eq!(transport.duration_secs(), None);
    }

    #[test]
    fn ended_resets_position_but_keeps_total() {
        let mut transport = playing(30.0);
        transport.apply(&tick(1, 29.5, Some(30.0)));

        assert!(transport.apply(&MediaEvent::Ended { generation: 1 }));

        assert_eq!(transport.status(), TransportStatus::Ended);
        assert_eq!(transport.indicator(), PlayIndicator::Paused);
        assert_eq!(transport.progress(), 0);
        assert_eq!(transport.elapsed_label(), "0:00");
        assert_eq!(transport.total_label(), "0:30");
    }

    #[test]
    fn toggle_after_end_restarts() {
        let mut transport = playing(30.0);
        transport.apply(&MediaEvent::Ended { generation: 1 });

        assert_eq!(transport.toggle_play_pause(), Some(MediaCommand::Resume));
        assert_eq!(transport.status(), TransportStatus::Playing);
    }

    #[test]
    fn seek_uses_known_duration() {
        let mut transport = playing(100.0);

        let command = transport.seek_to(50.0);

        assert_matches!(command, Some(MediaCommand::Seek { position_secs }) if position_secs == 50.0);
        assert_eq!(transport.progress(), 50);
        assert_eq!(transport.elapsed_label(), "0:50");
    }

    #[test]
    fn seek_without_duration_does_nothing() {
        let mut transport = Transport::new(0.5);
        assert_eq!(transport.seek_to(50.0), None);

        transport.select_track(selection("one"));
        assert_eq!(transport.seek_to(50.0), None);
        assert_eq!(transport.progress(), 0);
    }

    #[test]
    fn volume_is_linear_and_clamped() {
        let mut transport = Transport::new(0.5);
        assert_eq!(transport.set_volume(0.25), MediaCommand::SetVolume(0.25));
        assert_eq!(transport.set_volume(1.4), MediaCommand::SetVolume(1.0));
        assert_eq!(transport.set_volume(-0.2), MediaCommand::SetVolume(0.0));
        assert_eq!(transport.volume(), 0.0);
    }

    #[test]
    fn events_from_previous_selection_are_ignored() {
        let mut transport = playing(30.0);
        transport.select_track(selection("two"));

        assert!(!transport.apply(&tick(1, 20.0, Some(30.0))));
        assert!(!transport.apply(&MediaEvent::Ended { generation: 1 }));
        assert_eq!(transport.status(), TransportStatus::Playing);
        assert_eq!(transport.elapsed_label(), "0:00");
    }

    #[test]
    fn failure_leaves_transport_not_playing() {
        let mut transport = Transport::new(0.5);
        transport.select_track(selection("one"));

        transport.apply(&MediaEvent::Failed {
            generation: 1,
            reason: "decode error".to_string(),
        });

        assert_eq!(transport.status(), TransportStatus::Paused);
        assert_eq!(transport.indicator(), PlayIndicator::Paused);
        assert!(transport.load_failed());
    }

    #[test]
    fn toggle_after_failure_reloads_instead_of_resuming() {
        let mut transport = Transport::new(0.5);
        transport.select_track(selection("one"));
        transport.apply(&MediaEvent::Failed {
            generation: 1,
            reason: "connection refused".to_string(),
        });

        let command = transport.toggle_play_pause();

        assert_eq!(
            command,
            Some(MediaCommand::Load {
                generation: 2,
                url: "https://audio.example/one.m4a".to_string()
            })
        );
        assert_eq!(transport.status(), TransportStatus::Playing);
        assert!(!transport.load_failed());
        assert!(!transport.apply(&MediaEvent::Failed {
            generation: 1,
            reason: "late".to_string(),
        }));
    }

    #[test]
    fn seek_after_failure_does_nothing() {
        let mut transport = playing(30.0);
        transport.apply(&MediaEvent::Failed {
            generation: 1,
            reason: "decode error".to_string(),
        });

        assert_eq!(transport.seek_to(50.0), None);
    }
}
