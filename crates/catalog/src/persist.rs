//! Optional favorites persistence.
//!
//! Environments that have somewhere durable to write can hand the store a
//! [`FavoritesStore`]; environments that do not simply skip it. Nothing in
//! this module errors outward: a missing or unreadable file degrades to a
//! warn log and an absent value.

use std::fs;
use std::path::PathBuf;

use tracing::warn;

use bazaar_core::ProductId;

/// Where favorited product ids survive between sessions.
pub trait FavoritesStore: Send {
    /// Load the persisted favorites, or `None` when nothing usable exists.
    fn load(&self) -> Option<Vec<ProductId>>;

    /// Persist the favorites. Failures are logged, never surfaced.
    fn save(&self, favorites: &[ProductId]);
}

/// JSON-file favorites persistence.
#[derive(Debug, Clone)]
pub struct JsonFileFavorites {
    path: PathBuf,
}

impl JsonFileFavorites {
    /// Persist favorites at `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FavoritesStore for JsonFileFavorites {
    fn load(&self) -> Option<Vec<ProductId>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %self.path.display(), "Could not read favorites: {err}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(favorites) => Some(favorites),
            Err(err) => {
                warn!(path = %self.path.display(), "Ignoring corrupt favorites file: {err}");
                None
            }
        }
    }

    fn save(&self, favorites: &[ProductId]) {
        let json = match serde_json::to_string(favorites) {
            Ok(json) => json,
            Err(err) => {
                warn!("Could not encode favorites: {err}");
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, json) {
            warn!(path = %self.path.display(), "Could not write favorites: {err}");
        }
    }
}
