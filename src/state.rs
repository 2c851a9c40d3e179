// KiddieFlix - Application State
// Constructed once from the store at startup, mutated only through the
// identity/catalog/transfer operations, persisted after every mutation.

use crate::catalog::{self, FavoritesMap, Selection, Video};
use crate::constants::{
    CURRENT_PROFILE_KEY, FAVORITES_KEY, PIN_KEY, PROFILES_KEY, PROFILE_FALLBACK_LABEL, VIDEOS_KEY,
};
use crate::db::KeyValueStore;
use crate::error::{KiddieError, Result};
use crate::identity::{self, pin, PinPrompt, PinScheme, Profile, Sha256Pin};

pub struct AppState<S: KeyValueStore> {
    pub(crate) store: S,
    pub(crate) scheme: Box<dyn PinScheme>,
    pub(crate) videos: Vec<Video>,
    pub(crate) profiles: Vec<Profile>,
    pub(crate) current_profile_id: Option<String>,
    pub(crate) favorites: FavoritesMap,
    pub(crate) pin_hash: Option<String>,
    pub(crate) fav_only: bool,
    pub(crate) selection: Selection,
}

impl<S: KeyValueStore> AppState<S> {
    /// Load every slot from `store` with the default SHA-256 PIN scheme.
    pub fn load(store: S) -> Result<Self> {
        Self::load_with_scheme(store, Box::new(Sha256Pin))
    }

    /// Load every slot from `store`. Missing or malformed data falls back to
    /// defaults; a failed read is an error, so defaults never replace data
    /// that could not be read.
    pub fn load_with_scheme(store: S, scheme: Box<dyn PinScheme>) -> Result<Self> {
        let videos = catalog::load_videos(store.get(VIDEOS_KEY)?.as_deref());
        let favorites = FavoritesMap::load(store.get(FAVORITES_KEY)?.as_deref());
        let pin_hash = store.get(PIN_KEY)?.filter(|h| !h.is_empty());
        let stored_current = store.get(CURRENT_PROFILE_KEY)?.filter(|id| !id.is_empty());

        let loaded = identity::load_profiles(store.get(PROFILES_KEY)?.as_deref());
        let profiles_need_persist = loaded.needs_persist();

        let mut state = Self {
            store,
            scheme,
            videos,
            profiles: loaded.into_profiles(),
            current_profile_id: None,
            favorites,
            pin_hash,
            fav_only: false,
            selection: Selection::default(),
        };

        if profiles_need_persist {
            state.save_profiles_or_log();
        }

        state.current_profile_id = match stored_current {
            Some(id) if state.profile(&id).is_some() => Some(id),
            Some(id) => {
                log::debug!("Ignoring dangling current profile {}", id);
                None
            }
            None => None,
        };

        Ok(state)
    }

    /// Replace an empty registry with the default pair and persist it.
    pub fn ensure_profiles(&mut self) {
        if self.profiles.is_empty() {
            log::warn!("No profiles; creating defaults");
            self.profiles = identity::default_profiles();
            self.save_profiles_or_log();
        }
    }

    fn save_profiles_or_log(&mut self) {
        if let Err(e) = self.save_profiles() {
            log::error!("Failed to persist default profiles: {}", e);
        }
    }

    // --- Accessors ---

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn current_profile_id(&self) -> Option<&str> {
        self.current_profile_id.as_deref()
    }

    pub fn current_profile(&self) -> Option<&Profile> {
        self.current_profile_id.as_deref().and_then(|id| self.profile(id))
    }

    /// Name for the profile pill; a stale or missing pointer shows "Profile".
    pub fn current_profile_label(&self) -> &str {
        self.current_profile().map(|p| p.name.as_str()).unwrap_or(PROFILE_FALLBACK_LABEL)
    }

    pub fn favorites(&self) -> &FavoritesMap {
        &self.favorites
    }

    pub fn favorites_only(&self) -> bool {
        self.fav_only
    }

    pub fn has_pin(&self) -> bool {
        self.pin_hash.is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // --- Current profile ---

    /// Point at `id` (or nothing) and persist. Always turns the favorites-only view off.
    pub fn set_current_profile(&mut self, id: Option<&str>) -> Result<()> {
        self.store.set(CURRENT_PROFILE_KEY, id.unwrap_or(""))?;
        self.current_profile_id = id.map(str::to_string);
        self.fav_only = false;
        Ok(())
    }

    // --- Authorization ---

    /// The single gate for sensitive actions.
    /// Passes silently when no PIN is stored or `required` is false.
    pub fn require_authorization(&self, required: bool, prompt: &mut dyn PinPrompt) -> bool {
        if self.pin_hash.is_none() || !required {
            return true;
        }
        let Some(code) = prompt.request_pin("Parent PIN:") else {
            log::debug!("Authorization cancelled");
            return false;
        };
        let ok = self.verify_pin(&code);
        if !ok {
            log::debug!("Authorization denied");
        }
        ok
    }

    /// Like `require_authorization`, reporting a denial as an error.
    pub(crate) fn authorize(&self, required: bool, prompt: &mut dyn PinPrompt) -> Result<()> {
        if self.require_authorization(required, prompt) {
            Ok(())
        } else {
            Err(KiddieError::AuthorizationDenied)
        }
    }

    /// Gate for the parent panel (add/import/export/clear).
    pub fn unlock_parent_panel(&self, prompt: &mut dyn PinPrompt) -> Result<()> {
        self.authorize(true, prompt)
    }

    pub fn verify_pin(&self, code: &str) -> bool {
        pin::verify_code(self.scheme.as_ref(), self.pin_hash.as_deref(), code)
    }

    /// Set the first parent PIN. Use `change_pin` once one exists.
    pub fn setup_pin(&mut self, code: &str, confirm: &str) -> Result<()> {
        if self.pin_hash.is_some() {
            return Err(KiddieError::PinAlreadySet);
        }
        let code = pin::validate_new_pin(code, confirm)?;
        self.store_pin(&code)?;
        log::info!("Parent PIN set");
        Ok(())
    }

    pub fn change_pin(&mut self, old_code: &str, new_code: &str, confirm: &str) -> Result<()> {
        if !self.verify_pin(old_code) {
            return Err(KiddieError::AuthorizationDenied);
        }
        let code = pin::validate_new_pin(new_code, confirm)?;
        self.store_pin(&code)?;
        log::info!("Parent PIN changed");
        Ok(())
    }

    pub fn remove_pin(&mut self, current_code: &str) -> Result<()> {
        if !self.verify_pin(current_code) {
            return Err(KiddieError::AuthorizationDenied);
        }
        self.store.remove(PIN_KEY)?;
        self.pin_hash = None;
        log::info!("Parent PIN removed");
        Ok(())
    }

    fn store_pin(&mut self, code: &str) -> Result<()> {
        let hash = self.scheme.digest(code);
        self.store.set(PIN_KEY, &hash)?;
        self.pin_hash = Some(hash);
        Ok(())
    }

    // --- Persistence ---
    // Each commit writes the store first and only then swaps the in-memory
    // copy, so a failed write leaves both sides unchanged.

    fn save_profiles(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.profiles)?;
        self.store.set(PROFILES_KEY, &json)
    }

    pub(crate) fn commit_profiles(&mut self, profiles: Vec<Profile>) -> Result<()> {
        self.commit(None, Some(profiles), None)
    }

    pub(crate) fn commit_videos(&mut self, videos: Vec<Video>) -> Result<()> {
        self.commit(Some(videos), None, None)
    }

    pub(crate) fn commit_favorites(&mut self, favorites: FavoritesMap) -> Result<()> {
        self.commit(None, None, Some(favorites))
    }

    /// Persist any combination of registries as one unit, then adopt them.
    pub(crate) fn commit(
        &mut self,
        videos: Option<Vec<Video>>,
        profiles: Option<Vec<Profile>>,
        favorites: Option<FavoritesMap>,
    ) -> Result<()> {
        let mut entries: Vec<(&str, String)> = Vec::new();
        if let Some(ref v) = videos {
            entries.push((VIDEOS_KEY, serde_json::to_string(v)?));
        }
        if let Some(ref p) = profiles {
            entries.push((PROFILES_KEY, serde_json::to_string(p)?));
        }
        if let Some(ref f) = favorites {
            entries.push((FAVORITES_KEY, serde_json::to_string(f)?));
        }
        if entries.is_empty() {
            return Ok(());
        }

        self.store.set_many(&entries)?;

        if let Some(v) = videos {
            self.videos = v;
        }
        if let Some(p) = profiles {
            self.profiles = p;
        }
        if let Some(f) = favorites {
            self.favorites = f;
        }
        Ok(())
    }
}
