// KiddieFlix - Catalog
// Video registry, per-profile visibility, favorites and bulk delete.

pub mod favorites;
mod selection;
pub mod video_id;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::{SEED_VIDEO_ID, SEED_VIDEO_TITLE, UNTITLED};
use crate::db::KeyValueStore;
use crate::error::{KiddieError, Result};
use crate::state::AppState;

pub use favorites::FavoritesMap;
pub use selection::Selection;
pub use video_id::extract_video_id;

/// A bookmarked video. No `profiles` (or an empty list) means every profile sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<String>>,
}

impl Video {
    pub fn is_global(&self) -> bool {
        self.profiles.as_ref().map_or(true, |p| p.is_empty())
    }

    pub fn is_visible_to(&self, profile_id: &str) -> bool {
        match &self.profiles {
            Some(targets) if !targets.is_empty() => targets.iter().any(|t| t == profile_id),
            _ => true,
        }
    }

    /// Title for display; blank titles show as "Untitled".
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() { UNTITLED } else { &self.title }
    }
}

/// Who a new video is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targeting {
    AllProfiles,
    Profiles(Vec<String>),
}

pub fn seed_videos() -> Vec<Video> {
    vec![Video {
        id: SEED_VIDEO_ID.to_string(),
        title: SEED_VIDEO_TITLE.to_string(),
        profiles: None,
    }]
}

/// Parse the stored registry. Missing or unreadable data yields the seed list.
pub(crate) fn load_videos(raw: Option<&str>) -> Vec<Video> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return seed_videos();
    };

    match serde_json::from_str::<Vec<Video>>(raw) {
        Ok(videos) => videos,
        Err(e) => {
            log::warn!("Stored videos unreadable, using seed list: {}", e);
            seed_videos()
        }
    }
}

/// Videos a profile may see, in registry order. `None` sees everything.
pub fn visible_for<'a>(videos: &'a [Video], profile_id: Option<&str>) -> Vec<&'a Video> {
    match profile_id {
        None => videos.iter().collect(),
        Some(pid) => videos.iter().filter(|v| v.is_visible_to(pid)).collect(),
    }
}

/// Narrow to the profile's favorites when `fav_only` is on. No profile, no filter.
pub fn apply_favorites_filter<'a>(
    list: Vec<&'a Video>,
    favorites: &FavoritesMap,
    profile_id: Option<&str>,
    fav_only: bool,
) -> Vec<&'a Video> {
    match profile_id {
        Some(pid) if fav_only => {
            let favs = favorites.set_for(pid);
            list.into_iter().filter(|v| favs.contains(v.id.as_str())).collect()
        }
        _ => list,
    }
}

impl<S: KeyValueStore> AppState<S> {
    /// The grid: visible to the current profile, narrowed by the favorites toggle.
    pub fn visible_videos(&self) -> Vec<&Video> {
        let profile = self.current_profile_id();
        let list = visible_for(&self.videos, profile);
        apply_favorites_filter(list, &self.favorites, profile, self.fav_only)
    }

    /// Whether the active profile has starred `video_id`.
    pub fn is_favorite(&self, video_id: &str) -> bool {
        self.current_profile_id()
            .is_some_and(|pid| self.favorites.contains(pid, video_id))
    }

    /// Flip `video_id` in `profile_id`'s favorites. Returns the new membership.
    pub fn toggle_favorite(&mut self, profile_id: Option<&str>, video_id: &str) -> Result<bool> {
        let profile_id = profile_id.ok_or(KiddieError::NoActiveProfile)?;

        let mut favorites = self.favorites.clone();
        let now_favorite = favorites.toggle(profile_id, video_id);
        self.commit_favorites(favorites)?;
        Ok(now_favorite)
    }

    /// Toggle a favorite for whoever is currently watching.
    pub fn toggle_favorite_for_current(&mut self, video_id: &str) -> Result<bool> {
        let current = self.current_profile_id.clone();
        self.toggle_favorite(current.as_deref(), video_id)
    }

    /// Flip the favorites-only view. Needs an active profile.
    pub fn toggle_favorites_only(&mut self) -> Result<bool> {
        if self.current_profile_id.is_none() {
            return Err(KiddieError::NoActiveProfile);
        }
        self.fav_only = !self.fav_only;
        Ok(self.fav_only)
    }

    /// Append a video from a URL. Duplicates are allowed.
    pub fn add_video(&mut self, url: &str, title: &str, targeting: Targeting) -> Result<Video> {
        let url = url.trim();
        let id = extract_video_id(url).ok_or_else(|| KiddieError::InvalidVideoUrl(url.to_string()))?;

        let profiles = match targeting {
            Targeting::AllProfiles => None,
            Targeting::Profiles(ids) if ids.is_empty() => return Err(KiddieError::EmptyTargeting),
            Targeting::Profiles(ids) => {
                if let Some(unknown) = ids.iter().find(|pid| self.profile(pid).is_none()) {
                    return Err(KiddieError::ProfileNotFound(unknown.clone()));
                }
                Some(ids)
            }
        };

        let title = title.trim();
        let video = Video {
            id,
            title: if title.is_empty() { UNTITLED.to_string() } else { title.to_string() },
            profiles,
        };

        let mut videos = self.videos.clone();
        videos.push(video.clone());
        self.commit_videos(videos)?;

        log::info!("Added video {} ({})", video.id, video.title);
        Ok(video)
    }

    /// The only way videos leave the registry: drop every entry whose id is in
    /// `ids`, scrub those ids from all favorites, and persist both together.
    /// Returns how many registry entries were removed.
    pub fn delete_many(&mut self, ids: &HashSet<String>) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let videos: Vec<Video> = self.videos
            .iter()
            .filter(|v| !ids.contains(&v.id))
            .cloned()
            .collect();
        let removed = self.videos.len() - videos.len();

        let mut favorites = self.favorites.clone();
        let scrubbed = favorites.scrub(ids);

        self.commit(Some(videos), None, Some(favorites))?;

        log::info!("Deleted {} video(s), scrubbed {} favorite(s)", removed, scrubbed);
        Ok(removed)
    }

    /// Remove every video (profiles stay). Goes through `delete_many`.
    pub fn clear_videos(&mut self) -> Result<usize> {
        let all: HashSet<String> = self.videos.iter().map(|v| v.id.clone()).collect();
        self.delete_many(&all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FAVORITES_KEY, VIDEOS_KEY};
    use crate::db::MemoryStore;

    fn video(id: &str, profiles: Option<&[&str]>) -> Video {
        Video {
            id: id.to_string(),
            title: format!("Video {}", id),
            profiles: profiles.map(|p| p.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn ids(list: &[&Video]) -> Vec<String> {
        list.iter().map(|v| v.id.clone()).collect()
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// State with profiles a/b and a few targeted videos.
    fn catalog_state() -> AppState<MemoryStore> {
        let store = MemoryStore::with_slots([
            ("kiddieflix.profiles", r##"[
                {"id":"a","name":"Ana","color":"#1DD75B","emoji":"🟢"},
                {"id":"b","name":"Ben","color":"#FFD234","emoji":"🟡"}
            ]"##),
            ("kiddieflix.videos", r#"[
                {"id":"globalvid01","title":"Everyone"},
                {"id":"anaonly0001","title":"Ana only","profiles":["a"]},
                {"id":"benonly0001","title":"Ben only","profiles":["b"]},
                {"id":"emptylist01","title":"Empty list","profiles":[]}
            ]"#),
        ]);
        AppState::load(store).unwrap()
    }

    #[test]
    fn test_visible_for() {
        let videos = vec![
            video("g", None),
            video("e", Some(&[])),
            video("a", Some(&["p1"])),
            video("ab", Some(&["p1", "p2"])),
        ];

        assert_eq!(ids(&visible_for(&videos, None)), vec!["g", "e", "a", "ab"]);
        assert_eq!(ids(&visible_for(&videos, Some("p1"))), vec!["g", "e", "a", "ab"]);
        assert_eq!(ids(&visible_for(&videos, Some("p2"))), vec!["g", "e", "ab"]);
        assert_eq!(ids(&visible_for(&videos, Some("p3"))), vec!["g", "e"]);
    }

    #[test]
    fn test_favorites_filter() {
        let videos = vec![video("x", None), video("y", None)];
        let mut favs = FavoritesMap::new();
        favs.toggle("p1", "y");

        let all = visible_for(&videos, Some("p1"));
        assert_eq!(ids(&apply_favorites_filter(all.clone(), &favs, Some("p1"), true)), vec!["y"]);
        assert_eq!(ids(&apply_favorites_filter(all.clone(), &favs, Some("p1"), false)), vec!["x", "y"]);
        // Without a profile the toggle has no effect
        assert_eq!(ids(&apply_favorites_filter(all, &favs, None, true)), vec!["x", "y"]);
    }

    #[test]
    fn test_visible_videos_follow_current_profile() {
        let mut state = catalog_state();
        assert_eq!(state.visible_videos().len(), 4);

        state.set_current_profile(Some("a")).unwrap();
        assert_eq!(
            ids(&state.visible_videos()),
            vec!["globalvid01", "anaonly0001", "emptylist01"]
        );

        state.toggle_favorite_for_current("anaonly0001").unwrap();
        assert!(state.is_favorite("anaonly0001"));
        assert!(state.toggle_favorites_only().unwrap());
        assert_eq!(ids(&state.visible_videos()), vec!["anaonly0001"]);

        // Switching profile turns the filter back off
        state.set_current_profile(Some("b")).unwrap();
        assert!(!state.favorites_only());
        assert!(!state.is_favorite("anaonly0001"));
    }

    #[test]
    fn test_favorites_need_a_profile() {
        let mut state = catalog_state();
        assert!(matches!(state.toggle_favorite(None, "globalvid01"), Err(KiddieError::NoActiveProfile)));
        assert!(matches!(state.toggle_favorite_for_current("globalvid01"), Err(KiddieError::NoActiveProfile)));
        assert!(matches!(state.toggle_favorites_only(), Err(KiddieError::NoActiveProfile)));
        assert!(!state.is_favorite("globalvid01"));
    }

    #[test]
    fn test_toggle_favorite_persists() {
        let mut state = catalog_state();
        assert!(state.toggle_favorite(Some("a"), "globalvid01").unwrap());
        assert_eq!(
            state.store().get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"{"a":["globalvid01"]}"#)
        );
        assert!(!state.toggle_favorite(Some("a"), "globalvid01").unwrap());
        assert!(!state.favorites().contains("a", "globalvid01"));
    }

    #[test]
    fn test_add_video_all_profiles() {
        let mut state = catalog_state();
        let added = state
            .add_video("https://youtu.be/abcdefghijk?t=5", "  ", Targeting::AllProfiles)
            .unwrap();

        assert_eq!(added.id, "abcdefghijk");
        assert_eq!(added.title, "Untitled");
        assert!(added.profiles.is_none());
        assert!(added.is_global());

        let stored = state.store().get(VIDEOS_KEY).unwrap().unwrap();
        assert!(stored.ends_with(r#"{"id":"abcdefghijk","title":"Untitled"}]"#), "no profiles field: {}", stored);
    }

    #[test]
    fn test_add_video_targeted() {
        let mut state = catalog_state();
        let added = state
            .add_video(
                "https://www.youtube.com/watch?v=abcdefghijk",
                "Bedtime",
                Targeting::Profiles(vec!["b".into()]),
            )
            .unwrap();
        assert_eq!(added.profiles, Some(vec!["b".to_string()]));

        state.set_current_profile(Some("a")).unwrap();
        assert!(!state.visible_videos().iter().any(|v| v.id == "abcdefghijk"));
    }

    #[test]
    fn test_add_video_rejections() {
        let mut state = catalog_state();
        let before = state.videos().len();

        assert!(matches!(
            state.add_video("not a url", "x", Targeting::AllProfiles),
            Err(KiddieError::InvalidVideoUrl(_))
        ));
        assert!(matches!(
            state.add_video("https://youtu.be/abcdefghijk", "x", Targeting::Profiles(vec![])),
            Err(KiddieError::EmptyTargeting)
        ));
        assert!(matches!(
            state.add_video("https://youtu.be/abcdefghijk", "x", Targeting::Profiles(vec!["zz".into()])),
            Err(KiddieError::ProfileNotFound(_))
        ));
        assert_eq!(state.videos().len(), before);
    }

    #[test]
    fn test_add_video_allows_duplicates() {
        let mut state = catalog_state();
        state.add_video("https://youtu.be/abcdefghijk", "One", Targeting::AllProfiles).unwrap();
        state.add_video("https://youtu.be/abcdefghijk", "Two", Targeting::AllProfiles).unwrap();
        assert_eq!(state.videos().iter().filter(|v| v.id == "abcdefghijk").count(), 2);
    }

    #[test]
    fn test_delete_many_scrubs_favorites() {
        let mut state = catalog_state();
        state.toggle_favorite(Some("a"), "globalvid01").unwrap();
        state.toggle_favorite(Some("a"), "anaonly0001").unwrap();
        state.toggle_favorite(Some("b"), "globalvid01").unwrap();

        let removed = state.delete_many(&set(&["globalvid01"])).unwrap();
        assert_eq!(removed, 1);
        assert!(!state.videos().iter().any(|v| v.id == "globalvid01"));
        assert!(!state.favorites().contains("a", "globalvid01"));
        assert!(!state.favorites().contains("b", "globalvid01"));
        assert!(state.favorites().contains("a", "anaonly0001"));

        // Both slots were written
        let stored_videos = state.store().get(VIDEOS_KEY).unwrap().unwrap();
        assert!(!stored_videos.contains("globalvid01"));
        let stored_favs = FavoritesMap::load(state.store().get(FAVORITES_KEY).unwrap().as_deref());
        assert_eq!(&stored_favs, state.favorites());
    }

    #[test]
    fn test_delete_many_removes_duplicates_and_handles_empty() {
        let mut state = catalog_state();
        state.add_video("https://youtu.be/globalvid01", "Copy", Targeting::AllProfiles).unwrap();
        assert_eq!(state.delete_many(&HashSet::new()).unwrap(), 0);
        assert_eq!(state.delete_many(&set(&["globalvid01"])).unwrap(), 2);
        // Profiles without favorites are fine
        assert_eq!(state.delete_many(&set(&["benonly0001"])).unwrap(), 1);
    }

    #[test]
    fn test_clear_videos_keeps_profiles() {
        let mut state = catalog_state();
        state.toggle_favorite(Some("b"), "benonly0001").unwrap();

        assert_eq!(state.clear_videos().unwrap(), 4);
        assert!(state.videos().is_empty());
        assert_eq!(state.profiles().len(), 2);
        assert!(state.favorites().set_for("b").is_empty());
    }

    #[test]
    fn test_load_videos_fallbacks() {
        assert_eq!(load_videos(None), seed_videos());
        assert_eq!(load_videos(Some("{}")), seed_videos());
        assert_eq!(load_videos(Some("[{\"title\":\"no id\"}]")), seed_videos());
        assert!(load_videos(Some("[]")).is_empty());
    }
}
