//! Command line configuration

use clap::Parser;

use crate::audio::DEFAULT_VOLUME;
use crate::model::ITUNES_SEARCH_URL;

pub const DEFAULT_SEARCH_TERM: &str = "The Weeknd";

/// Search the iTunes catalog and play 30 second previews in the terminal
#[derive(Clone, Debug, Parser)]
#[command(name = "preview-rs", version)]
pub struct AppConfig {
    /// Term searched automatically on startup
    #[arg(long, default_value = DEFAULT_SEARCH_TERM)]
    pub term: String,

    /// Initial output volume between 0 and 1
    #[arg(long, default_value_t = DEFAULT_VOLUME, value_parser = parse_volume)]
    pub volume: f32,

    /// Catalog search endpoint
    #[arg(long, default_value = ITUNES_SEARCH_URL)]
    pub endpoint: String,
}

fn parse_volume(value: &str) -> Result<f32, String> {
    let volume: f32 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if (0.0..=1.0).contains(&volume) {
        Ok(volume)
    } else {
        Err(format!("volume must be between 0 and 1, got {volume}"))
    }
}
