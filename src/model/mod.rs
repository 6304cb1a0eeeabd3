//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (focus, UI state)
//! - `content`: Search results and playback selections
//! - `search`: Lookup sequencing and the results area state
//! - `transport`: Playback state machine and time formatting
//! - `itunes_client`: iTunes catalog search client
//! - `app_model`: Main application model owning all of the above

mod types;
mod content;
mod search;
mod transport;
mod itunes_client;
mod app_model;

pub use types::{ActiveSection, UiState};

pub use content::{PlaybackSelection, ResultsView, SearchResult};

pub use transport::{MediaCommand, MediaEvent, PlayIndicator, Transport, TransportStatus};

pub use itunes_client::{ItunesClient, ITUNES_SEARCH_URL};

pub use app_model::AppModel;
