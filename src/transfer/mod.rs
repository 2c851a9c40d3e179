// KiddieFlix - Import/Export
// Export writes { profiles, videos, favoritesMap }. Import accepts that shape
// or the legacy bare array of videos.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{FavoritesMap, Video};
use crate::db::KeyValueStore;
use crate::error::{KiddieError, Result};
use crate::identity::{self, Profile};
use crate::state::AppState;

/// The full dataset as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub profiles: Vec<Profile>,
    pub videos: Vec<Video>,
    pub favorites_map: FavoritesMap,
}

/// A validated import, ready to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportPayload {
    /// Old format: a bare list of videos. Profiles and favorites are untouched.
    Legacy(Vec<Video>),
    Full {
        videos: Vec<Video>,
        profiles: Option<Vec<Profile>>,
        favorites: Option<FavoritesMap>,
    },
}

/// What an import replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub videos: usize,
    pub profiles: Option<usize>,
    pub favorites_replaced: bool,
}

/// Parse and validate an import document without touching any state.
pub fn parse_import(text: &str) -> Result<ImportPayload> {
    let data: Value = serde_json::from_str(text)
        .map_err(|e| KiddieError::MalformedDocument(e.to_string()))?;

    match data {
        Value::Array(_) => {
            let videos = serde_json::from_value(data)
                .map_err(|e| KiddieError::InvalidDocument(format!("videos: {}", e)))?;
            Ok(ImportPayload::Legacy(videos))
        }
        Value::Object(mut obj) => {
            let videos = match obj.remove("videos") {
                Some(v @ Value::Array(_)) => serde_json::from_value::<Vec<Video>>(v)
                    .map_err(|e| KiddieError::InvalidDocument(format!("videos: {}", e)))?,
                _ => return Err(KiddieError::InvalidDocument("missing videos list".to_string())),
            };

            // An empty or non-list profiles field leaves the registry as is
            let profiles = match obj.remove("profiles") {
                Some(Value::Array(items)) if !items.is_empty() => {
                    let profiles = serde_json::from_value::<Vec<Profile>>(Value::Array(items))
                        .map_err(|e| KiddieError::InvalidDocument(format!("profiles: {}", e)))?;
                    Some(identity::dedup_ids(profiles))
                }
                _ => None,
            };

            let favorites = match obj.remove("favoritesMap") {
                Some(v @ Value::Object(_)) => Some(
                    serde_json::from_value::<FavoritesMap>(v)
                        .map_err(|e| KiddieError::InvalidDocument(format!("favoritesMap: {}", e)))?,
                ),
                _ => None,
            };

            Ok(ImportPayload::Full { videos, profiles, favorites })
        }
        _ => Err(KiddieError::InvalidDocument("expected a list or an object".to_string())),
    }
}

impl<S: KeyValueStore> AppState<S> {
    pub fn export_document(&self) -> ExportDocument {
        ExportDocument {
            profiles: self.profiles.clone(),
            videos: self.videos.clone(),
            favorites_map: self.favorites.clone(),
        }
    }

    /// Pretty-printed export JSON.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_document())?)
    }

    pub fn export_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.export_json()?)?;
        log::info!("Exported {} video(s) to {}", self.videos.len(), path.display());
        Ok(())
    }

    /// Replace state from a validated payload; every replaced slot is persisted together.
    pub fn apply_import(&mut self, payload: ImportPayload) -> Result<ImportSummary> {
        let (videos, profiles, favorites) = match payload {
            ImportPayload::Legacy(videos) => (videos, None, None),
            ImportPayload::Full { videos, profiles, favorites } => (videos, profiles, favorites),
        };

        let summary = ImportSummary {
            videos: videos.len(),
            profiles: profiles.as_ref().map(Vec::len),
            favorites_replaced: favorites.is_some(),
        };

        self.commit(Some(videos), profiles, favorites)?;

        if let Some(current) = self.current_profile_id.clone() {
            if self.profile(&current).is_none() {
                log::info!("Current profile {} not in imported profiles; clearing", current);
                self.set_current_profile(None)?;
            }
        }

        log::info!("Imported {} video(s)", summary.videos);
        Ok(summary)
    }

    /// Parse then apply. Nothing changes when the document is rejected.
    pub fn import_json(&mut self, text: &str) -> Result<ImportSummary> {
        let payload = parse_import(text)?;
        self.apply_import(payload)
    }

    pub fn import_from_file(&mut self, path: &Path) -> Result<ImportSummary> {
        let text = std::fs::read_to_string(path)?;
        self.import_json(&text)
    }
}
