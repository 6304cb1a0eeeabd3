//! Audio backend: a rodio sink driven from a dedicated thread
//!
//! The output stream cannot leave the thread that opened it, so the sink
//! lives in [`AudioActor`] and is driven through [`AudioCommand`]s. Timing and
//! completion signals come back as [`MediaEvent`]s on a tokio channel.

use std::io::Cursor;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::fetch::HttpFetch;
use crate::model::{MediaCommand, MediaEvent};

pub const DEFAULT_VOLUME: f32 = 0.5;

/// Interval between timing signals while a clip is loaded
const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub enum AudioCommand {
    /// Drop whatever is playing and wait for the clip of `generation`
    Load { generation: u64 },
    /// Downloaded clip for `generation`
    Source { generation: u64, bytes: Arc<[u8]> },
    Pause,
    Resume,
    Seek(Duration),
    SetVolume(f32),
    Shutdown,
}

/// Handle to the audio thread
#[derive(Clone)]
pub struct AudioBackend {
    commands: Sender<AudioCommand>,
    events: UnboundedSender<MediaEvent>,
    event_channel: Arc<Mutex<Option<UnboundedReceiver<MediaEvent>>>>,
    fetcher: Arc<dyn HttpFetch>,
}

impl AudioBackend {
    /// Open the default output device and start the audio thread.
    pub fn new(fetcher: Arc<dyn HttpFetch>, volume: f32) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = unbounded_channel();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        let actor_events = event_tx.clone();
        thread::Builder::new()
            .name("preview-audio".to_string())
            .spawn(move || {
                let stream = match OutputStreamBuilder::open_default_stream() {
                    Ok(mut stream) => {
                        stream.log_on_drop(false);
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                AudioActor::new(RodioOutput::new(stream, volume), actor_events, volume).run(command_rx);
            })
            .context("Failed to spawn audio thread")?;

        ready_rx
            .recv()
            .context("Audio thread exited during startup")?
            .map_err(|e| anyhow!("No audio output device: {e}"))?;

        tracing::info!(volume, "Audio backend initialized");
        Ok(Self::from_parts(command_tx, event_tx, event_rx, fetcher))
    }

    fn from_parts(
        commands: Sender<AudioCommand>,
        events: UnboundedSender<MediaEvent>,
        event_rx: UnboundedReceiver<MediaEvent>,
        fetcher: Arc<dyn HttpFetch>,
    ) -> Self {
        Self {
            commands,
            events,
            event_channel: Arc::new(Mutex::new(Some(event_rx))),
            fetcher,
        }
    }

    /// Backend without an audio thread; commands are handed to the caller.
    #[cfg(test)]
    pub fn detached(fetcher: Arc<dyn HttpFetch>) -> (Self, Receiver<AudioCommand>) {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = unbounded_channel();
        (Self::from_parts(command_tx, event_tx, event_rx, fetcher), command_rx)
    }

    /// Take the media event channel. Returns `None` once it has been taken.
    pub fn take_event_channel(&self) -> Option<UnboundedReceiver<MediaEvent>> {
        self.event_channel.lock().ok()?.take()
    }

    /// Carry out a transport command. Loading downloads the clip in the
    /// background; failures come back as [`MediaEvent::Failed`].
    pub fn execute(&self, command: MediaCommand) {
        match command {
            MediaCommand::Load { generation, url } => {
                self.send(AudioCommand::Load { generation });
                self.download(generation, url);
            }
            MediaCommand::Pause => self.send(AudioCommand::Pause),
            MediaCommand::Resume => self.send(AudioCommand::Resume),
            MediaCommand::Seek { position_secs } => {
                self.send(AudioCommand::Seek(Duration::from_secs_f64(position_secs.max(0.0))))
            }
            MediaCommand::SetVolume(volume) => self.send(AudioCommand::SetVolume(volume)),
        }
    }

    pub fn shutdown(&self) {
        self.send(AudioCommand::Shutdown);
    }

    fn send(&self, command: AudioCommand) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Audio thread is gone, command dropped");
        }
    }

    fn download(&self, generation: u64, url: String) {
        let fetcher = self.fetcher.clone();
        let commands = self.commands.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            tracing::debug!(generation, url = %url, "Downloading preview");
            match fetcher.get_bytes(url).await {
                Ok(bytes) => {
                    tracing::debug!(generation, bytes = bytes.len(), "Preview downloaded");
                    let _ = commands.send(AudioCommand::Source {
                        generation,
                        bytes: bytes.into(),
                    });
                }
                Err(e) => {
                    tracing::error!(generation, error = %e, "Preview download failed");
                    let _ = events.send(MediaEvent::Failed {
                        generation,
                        reason: format!("{e:#}"),
                    });
                }
            }
        });
    }
}

/// Where decoded clips are played
///
/// Exactly one clip is held at a time. `reset` drops it along with anything
/// still queued.
trait ClipOutput {
    fn reset(&mut self, volume: f32);

    /// Decode `clip` and queue it on a fresh sink, returning its duration.
    fn start(&mut self, clip: Arc<[u8]>, volume: f32, paused: bool) -> Result<Option<Duration>>;

    fn play(&mut self);

    fn pause(&mut self);

    fn stop(&mut self);

    fn seek(&mut self, position: Duration) -> Result<()>;

    fn set_volume(&mut self, volume: f32);

    fn position(&self) -> Duration;

    fn is_empty(&self) -> bool;

    fn is_paused(&self) -> bool;
}

/// Default output device with a single rodio sink
struct RodioOutput {
    stream: OutputStream,
    sink: Sink,
}

impl RodioOutput {
    fn new(stream: OutputStream, volume: f32) -> Self {
        let sink = Sink::connect_new(stream.mixer());
        sink.set_volume(volume);
        Self { stream, sink }
    }
}

impl ClipOutput for RodioOutput {
    fn reset(&mut self, volume: f32) {
        self.sink.stop();
        self.sink = Sink::connect_new(self.stream.mixer());
        self.sink.set_volume(volume);
    }

    fn start(&mut self, clip: Arc<[u8]>, volume: f32, paused: bool) -> Result<Option<Duration>> {
        let byte_len = clip.len() as u64;
        let source = Decoder::builder()
            .with_data(Cursor::new(clip))
            .with_byte_len(byte_len)
            .with_seekable(true)
            .with_hint("m4a")
            .build()
            .context("Unsupported preview format")?;

        let duration = source.total_duration();
        self.reset(volume);
        if paused {
            self.sink.pause();
        }
        self.sink.append(source);
        Ok(duration)
    }

    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.sink
            .try_seek(position)
            .map_err(|e| anyhow!("Seek to {position:?} failed: {e}"))
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn is_empty(&self) -> bool {
        self.sink.empty()
    }

    fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }
}

/// Owner of the clip output, driven by [`AudioCommand`]s
struct AudioActor<O> {
    output: O,
    events: UnboundedSender<MediaEvent>,
    generation: u64,
    clip: Option<Arc<[u8]>>,
    duration: Option<Duration>,
    volume: f32,
    want_playing: bool,
    ended: bool,
    last_tick: Instant,
}

impl<O: ClipOutput> AudioActor<O> {
    fn new(output: O, events: UnboundedSender<MediaEvent>, volume: f32) -> Self {
        Self {
            output,
            events,
            generation: 0,
            clip: None,
            duration: None,
            volume,
            want_playing: false,
            ended: false,
            last_tick: Instant::now(),
        }
    }

    fn run(mut self, commands: Receiver<AudioCommand>) {
        tracing::debug!("Audio thread started");
        loop {
            match commands.recv_timeout(TICK_INTERVAL) {
                Ok(AudioCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Ok(command) => self.handle(command),
                Err(RecvTimeoutError::Timeout) => {}
            }

            if self.last_tick.elapsed() >= TICK_INTERVAL {
                self.last_tick = Instant::now();
                self.tick();
            }
        }
        self.output.stop();
        tracing::debug!("Audio thread stopped");
    }

    fn handle(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::Load { generation } => {
                self.output.reset(self.volume);
                self.generation = generation;
                self.clip = None;
                self.duration = None;
                self.want_playing = true;
                self.ended = false;
            }
            AudioCommand::Source { generation, bytes } => {
                if generation != self.generation {
                    tracing::debug!(generation, current = self.generation, "Dropping stale clip");
                    return;
                }
                if let Err(e) = self.start_clip(bytes.clone(), !self.want_playing) {
                    tracing::error!(generation, error = %e, "Could not decode preview");
                    self.emit(MediaEvent::Failed {
                        generation,
                        reason: format!("{e:#}"),
                    });
                    return;
                }
                self.clip = Some(bytes);
            }
            AudioCommand::Pause => {
                self.want_playing = false;
                self.output.pause();
            }
            AudioCommand::Resume => {
                self.want_playing = true;
                if self.ended {
                    self.restart();
                }
                self.output.play();
            }
            AudioCommand::Seek(position) => {
                if self.clip.is_none() {
                    return;
                }
                if self.ended {
                    self.restart();
                }
                if let Err(e) = self.output.seek(position) {
                    tracing::warn!(error = %e, "Seek failed");
                }
                self.emit_time_update();
            }
            AudioCommand::SetVolume(volume) => {
                self.volume = volume;
                self.output.set_volume(volume);
            }
            AudioCommand::Shutdown => {}
        }
    }

    fn tick(&mut self) {
        if self.clip.is_none() || self.ended {
            return;
        }
        if self.output.is_empty() {
            self.ended = true;
            self.want_playing = false;
            self.emit(MediaEvent::Ended {
                generation: self.generation,
            });
        } else if !self.output.is_paused() {
            self.emit_time_update();
        }
    }

    fn start_clip(&mut self, bytes: Arc<[u8]>, paused: bool) -> Result<()> {
        self.duration = self.output.start(bytes, self.volume, paused)?;
        self.ended = false;
        Ok(())
    }

    /// Queue the buffered clip again, paused at the start.
    fn restart(&mut self) {
        let Some(bytes) = self.clip.clone() else {
            return;
        };
        if let Err(e) = self.start_clip(bytes, true) {
            tracing::error!(error = %e, "Could not restart preview");
        }
    }

    fn emit_time_update(&self) {
        self.emit(MediaEvent::TimeUpdate {
            generation: self.generation,
            position_secs: self.output.position().as_secs_f64(),
            duration_secs: self.duration.map(|d| d.as_secs_f64()),
        });
    }

    fn emit(&self, event: MediaEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fake::RecordingFetcher;
    use assert_matches::assert_matches;

    const WAIT: Duration = Duration::from_secs(2);

    async fn next_command(commands: Receiver<AudioCommand>) -> (Receiver<AudioCommand>, AudioCommand) {
        tokio::task::spawn_blocking(move || {
            let command = commands.recv_timeout(WAIT).expect("no audio command");
            (commands, command)
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn load_resets_sink_then_delivers_clip() {
        let fetcher = RecordingFetcher::with_bytes(vec![1, 2, 3]);
        let (backend, commands) = AudioBackend::detached(Arc::new(fetcher.clone()));

        backend.execute(MediaCommand::Load {
            generation: 3,
            url: "https://audio.example/a.m4a".to_string(),
        });

        let (commands, first) = next_command(commands).await;
        assert_matches!(first, AudioCommand::Load { generation: 3 });

        let (_commands, second) = next_command(commands).await;
        assert_matches!(second, AudioCommand::Source { generation: 3, bytes } => {
            assert_eq!(&bytes[..], &[1u8, 2, 3][..]);
        });
        assert_eq!(fetcher.requests(), vec!["https://audio.example/a.m4a"]);
    }

    #[tokio::test]
    async fn failed_download_reports_failure() {
        let (backend, _commands) = AudioBackend::detached(Arc::new(RecordingFetcher::failing()));
        let mut events = backend.take_event_channel().unwrap();

        backend.execute(MediaCommand::Load {
            generation: 1,
            url: "https://audio.example/missing.m4a".to_string(),
        });

        let event = tokio::time::timeout(WAIT, events.recv()).await.unwrap();
        assert_matches!(event, Some(MediaEvent::Failed { generation: 1, .. }));
    }

    #[test]
    fn event_channel_is_taken_once() {
        let (backend, _commands) = AudioBackend::detached(Arc::new(RecordingFetcher::failing()));
        assert!(backend.take_event_channel().is_some());
        assert!(backend.take_event_channel().is_none());
    }

    #[test]
    fn seek_and_volume_map_directly() {
        let (backend, commands) = AudioBackend::detached(Arc::new(RecordingFetcher::failing()));

        backend.execute(MediaCommand::Seek { position_secs: 12.5 });
        backend.execute(MediaCommand::SetVolume(0.3));
        backend.execute(MediaCommand::Pause);

        assert_matches!(commands.try_recv(), Ok(AudioCommand::Seek(d)) if d == Duration::from_millis(12_500));
        assert_matches!(commands.try_recv(), Ok(AudioCommand::SetVolume(v)) if v == 0.3);
        assert_matches!(commands.try_recv(), Ok(AudioCommand::Pause));
    }

    /// In-memory output recording what the actor asked of it
    #[derive(Default)]
    struct FakeOutput {
        resets: usize,
        /// Paused flag of every queued clip
        starts: Vec<bool>,
        seeks: Vec<Duration>,
        loaded: bool,
        finished: bool,
        paused: bool,
        undecodable: bool,
    }

    impl ClipOutput for FakeOutput {
        fn reset(&mut self, _volume: f32) {
            self.resets += 1;
            self.loaded = false;
            self.paused = false;
        }

        fn start(&mut self, _clip: Arc<[u8]>, volume: f32, paused: bool) -> Result<Option<Duration>> {
            if self.undecodable {
                return Err(anyhow!("Unsupported preview format"));
            }
            self.reset(volume);
            self.starts.push(paused);
            self.loaded = true;
            self.finished = false;
            self.paused = paused;
            Ok(Some(Duration::from_secs(30)))
        }

        fn play(&mut self) {
            self.paused = false;
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn stop(&mut self) {
            self.loaded = false;
        }

        fn seek(&mut self, position: Duration) -> Result<()> {
            self.seeks.push(position);
            Ok(())
        }

        fn set_volume(&mut self, _volume: f32) {}

        fn position(&self) -> Duration {
            self.seeks.last().copied().unwrap_or_default()
        }

        fn is_empty(&self) -> bool {
            !self.loaded || self.finished
        }

        fn is_paused(&self) -> bool {
            self.paused
        }
    }

    fn clip() -> Arc<[u8]> {
        Arc::from(vec![0u8; 16])
    }

    fn actor_with_clip(generation: u64) -> (AudioActor<FakeOutput>, UnboundedReceiver<MediaEvent>) {
        let (events, rx) = unbounded_channel();
        let mut actor = AudioActor::new(FakeOutput::default(), events, 0.5);
        actor.handle(AudioCommand::Load { generation });
        actor.handle(AudioCommand::Source {
            generation,
            bytes: clip(),
        });
        (actor, rx)
    }

    fn ended_actor() -> (AudioActor<FakeOutput>, UnboundedReceiver<MediaEvent>) {
        let (mut actor, mut rx) = actor_with_clip(1);
        actor.output.finished = true;
        actor.tick();
        assert_matches!(rx.try_recv(), Ok(MediaEvent::Ended { generation: 1 }));
        (actor, rx)
    }

    #[test]
    fn tick_reports_position_while_playing() {
        let (mut actor, mut rx) = actor_with_clip(1);
        assert_eq!(actor.output.starts, vec![false]);

        actor.tick();

        assert_matches!(
            rx.try_recv(),
            Ok(MediaEvent::TimeUpdate { generation: 1, duration_secs: Some(d), .. }) if d == 30.0
        );
    }

    #[test]
    fn drained_sink_is_reported_once_as_ended() {
        let (mut actor, mut rx) = ended_actor();

        actor.tick();

        assert_matches!(rx.try_recv(), Err(_));
    }

    #[test]
    fn resume_after_end_restarts_from_the_beginning() {
        let (mut actor, mut rx) = ended_actor();

        actor.handle(AudioCommand::Resume);

        assert_eq!(actor.output.starts, vec![false, true]);
        assert!(!actor.output.is_paused());
        assert!(actor.output.seeks.is_empty());
        actor.tick();
        assert_matches!(rx.try_recv(), Ok(MediaEvent::TimeUpdate { position_secs, .. }) if position_secs == 0.0);
    }

    #[test]
    fn seek_after_end_rebuilds_the_clip_paused() {
        let (mut actor, mut rx) = ended_actor();

        actor.handle(AudioCommand::Seek(Duration::from_secs(12)));

        assert_eq!(actor.output.starts, vec![false, true]);
        assert_eq!(actor.output.seeks, vec![Duration::from_secs(12)]);
        assert!(actor.output.is_paused());
        assert_matches!(rx.try_recv(), Ok(MediaEvent::TimeUpdate { position_secs, .. }) if position_secs == 12.0);

        actor.tick();
        assert_matches!(rx.try_recv(), Err(_));
    }

    #[test]
    fn stale_clip_is_dropped() {
        let (events, _rx) = unbounded_channel();
        let mut actor = AudioActor::new(FakeOutput::default(), events, 0.5);
        actor.handle(AudioCommand::Load { generation: 2 });

        actor.handle(AudioCommand::Source {
            generation: 1,
            bytes: clip(),
        });

        assert!(actor.output.starts.is_empty());
        assert!(actor.clip.is_none());
    }

    #[test]
    fn load_tears_down_the_previous_clip() {
        let (mut actor, mut rx) = actor_with_clip(1);
        let resets = actor.output.resets;

        actor.handle(AudioCommand::Load { generation: 2 });

        assert_eq!(actor.output.resets, resets + 1);
        assert!(actor.output.is_empty());
        assert!(actor.clip.is_none());
        actor.tick();
        assert_matches!(rx.try_recv(), Err(_));
    }

    #[test]
    fn undecodable_clip_reports_failure() {
        let (events, mut rx) = unbounded_channel();
        let mut actor = AudioActor::new(
            FakeOutput {
                undecodable: true,
                ..Default::default()
            },
            events,
            0.5,
        );
        actor.handle(AudioCommand::Load { generation: 4 });

        actor.handle(AudioCommand::Source {
            generation: 4,
            bytes: clip(),
        });

        assert_matches!(rx.try_recv(), Ok(MediaEvent::Failed { generation: 4, reason }) => {
            assert!(reason.contains("Unsupported preview format"));
        });
        assert!(actor.clip.is_none());
    }
}
