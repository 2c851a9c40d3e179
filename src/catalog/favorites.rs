// KiddieFlix - Favorites
// profile id -> video ids. Stored as ordered lists, treated as sets.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesMap(BTreeMap<String, Vec<String>>);

impl FavoritesMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the stored map leniently: non-object data yields an empty map,
    /// entries that are not lists of strings are dropped.
    pub fn load(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Self::default();
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(obj)) => Self::from_json_object(obj),
            Ok(_) => {
                log::warn!("Stored favorites are not an object; starting empty");
                Self::default()
            }
            Err(e) => {
                log::warn!("Stored favorites unreadable; starting empty: {}", e);
                Self::default()
            }
        }
    }

    fn from_json_object(obj: serde_json::Map<String, Value>) -> Self {
        let mut map = BTreeMap::new();
        for (profile_id, value) in obj {
            let Value::Array(items) = value else {
                log::warn!("Dropping favorites for {}: not a list", profile_id);
                continue;
            };
            let ids: Vec<String> = items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            map.insert(profile_id, ids);
        }
        Self(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, profile_id: &str, video_id: &str) -> bool {
        self.0
            .get(profile_id)
            .is_some_and(|ids| ids.iter().any(|id| id == video_id))
    }

    /// Favorite ids of one profile as a set (empty when the profile has none).
    pub fn set_for(&self, profile_id: &str) -> HashSet<&str> {
        self.0
            .get(profile_id)
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Flip membership. Returns true when the video is now a favorite.
    pub fn toggle(&mut self, profile_id: &str, video_id: &str) -> bool {
        let ids = self.0.entry(profile_id.to_string()).or_default();
        if ids.iter().any(|id| id == video_id) {
            // Set semantics: drop any duplicates too
            ids.retain(|id| id != video_id);
            false
        } else {
            ids.push(video_id.to_string());
            true
        }
    }

    /// Remove `video_ids` from every profile's set. Returns how many entries were removed.
    pub fn scrub(&mut self, video_ids: &HashSet<String>) -> usize {
        let mut removed = 0;
        for ids in self.0.values_mut() {
            let before = ids.len();
            ids.retain(|id| !video_ids.contains(id));
            removed += before - ids.len();
        }
        removed
    }

    pub fn profile_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
