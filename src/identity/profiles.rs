// KiddieFlix - Profile management
// Every operation here passes the parent gate before touching the registry.

use super::{new_profile, normalize_name, validate_color, validate_emoji, PinPrompt, Profile, ProfileEdit};
use crate::db::KeyValueStore;
use crate::error::{KiddieError, Result};
use crate::state::AppState;

impl<S: KeyValueStore> AppState<S> {
    /// Pick a profile from the gate. Switching away from a different active
    /// profile needs the parent PIN; picking the first one does not.
    pub fn select_profile(&mut self, id: &str, prompt: &mut dyn PinPrompt) -> Result<()> {
        if self.profile(id).is_none() {
            return Err(KiddieError::ProfileNotFound(id.to_string()));
        }

        let switching = self.current_profile_id().is_some_and(|current| current != id);
        self.authorize(switching, prompt)?;
        self.set_current_profile(Some(id))
    }

    /// Create a profile with a random color and emoji.
    pub fn add_profile(&mut self, name: &str, prompt: &mut dyn PinPrompt) -> Result<Profile> {
        self.authorize(true, prompt)?;
        let profile = new_profile(name)?;

        let mut profiles = self.profiles.clone();
        profiles.push(profile.clone());
        self.commit_profiles(profiles)?;

        log::info!("Added profile {} ({})", profile.name, profile.id);
        Ok(profile)
    }

    /// Apply one edit. Deleting the active profile also clears the current pointer;
    /// the profile's favorites entry is left in place.
    pub fn edit_profile(&mut self, id: &str, edit: ProfileEdit, prompt: &mut dyn PinPrompt) -> Result<()> {
        self.authorize(true, prompt)?;

        let index = self.profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| KiddieError::ProfileNotFound(id.to_string()))?;

        let mut profiles = self.profiles.clone();
        match edit {
            ProfileEdit::Rename(name) => profiles[index].name = normalize_name(&name)?,
            ProfileEdit::Recolor(color) => profiles[index].color = validate_color(&color)?,
            ProfileEdit::Reemoji(emoji) => profiles[index].emoji = validate_emoji(&emoji)?,
            ProfileEdit::Delete => {
                profiles.remove(index);
            }
        }

        let deleting_current = !profiles.iter().any(|p| p.id == id)
            && self.current_profile_id() == Some(id);

        self.commit_profiles(profiles)?;
        if deleting_current {
            self.set_current_profile(None)?;
        }

        log::info!("Edited profile {}", id);
        Ok(())
    }
}
