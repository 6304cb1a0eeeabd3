//! Search results and the selection handed to the transport

const LOW_RES_ARTWORK: &str = "100x100bb";
const HIGH_RES_ARTWORK: &str = "600x600bb";

/// A playable track from the catalog lookup
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub artist: String,
    pub preview_url: String,
    pub artwork_url: String,
}

impl SearchResult {
    /// Artwork locator rewritten to request the 600x600 variant.
    ///
    /// Locators without the low-resolution marker are returned unchanged.
    pub fn high_res_artwork(&self) -> String {
        self.artwork_url.replace(LOW_RES_ARTWORK, HIGH_RES_ARTWORK)
    }
}

/// The track currently owned by the transport
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackSelection {
    pub title: String,
    pub artist: String,
    pub artwork_url: String,
    pub preview_url: String,
}

impl From<&SearchResult> for PlaybackSelection {
    fn from(result: &SearchResult) -> Self {
        Self {
            title: result.title.clone(),
            artist: result.artist.clone(),
            artwork_url: result.high_res_artwork(),
            preview_url: result.preview_url.clone(),
        }
    }
}

/// What the results area currently shows
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ResultsView {
    #[default]
    Empty,
    Loading,
    Results {
        results: Vec<SearchResult>,
        selected_index: usize,
    },
    /// Valid response without a single previewable entry
    NoResults,
    /// Network or decode failure
    Failed,
}
