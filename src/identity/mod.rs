// KiddieFlix - Identity
// Child profiles, the active-profile pointer and the parent PIN gate.

pub mod pin;
mod profiles;

use rand::seq::SliceRandom;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PROFILES, FALLBACK_PROFILE_IDS, PROFILE_COLORS, PROFILE_EMOJIS,
    PROFILE_FALLBACK_COLOR, PROFILE_FALLBACK_EMOJI, PROFILE_NAME_MAX_CHARS,
};
use crate::error::{KiddieError, Result};

pub use pin::{FixedPin, PinPrompt, PinScheme, Sha256Pin};

/// A child identity scoping video visibility and favorites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub emoji: String,
}

impl Profile {
    /// Emoji shown on the profile card; blank emoji falls back to a star.
    pub fn avatar(&self) -> &str {
        if self.emoji.is_empty() { PROFILE_FALLBACK_EMOJI } else { &self.emoji }
    }

    /// Color shown on the profile pill.
    pub fn pill_color(&self) -> &str {
        if self.color.is_empty() { PROFILE_FALLBACK_COLOR } else { &self.color }
    }
}

/// A single edit chosen from the profile management menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEdit {
    Rename(String),
    Recolor(String),
    Reemoji(String),
    Delete,
}

/// Fresh random profile id.
pub fn new_profile_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// First-run profiles with fresh ids.
pub fn default_profiles() -> Vec<Profile> {
    DEFAULT_PROFILES
        .iter()
        .map(|(name, color, emoji)| Profile {
            id: new_profile_id(),
            name: name.to_string(),
            color: color.to_string(),
            emoji: emoji.to_string(),
        })
        .collect()
}

/// Profiles used when the stored registry cannot be read at all.
pub fn fallback_profiles() -> Vec<Profile> {
    DEFAULT_PROFILES
        .iter()
        .zip(FALLBACK_PROFILE_IDS)
        .map(|((name, color, emoji), id)| Profile {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            emoji: emoji.to_string(),
        })
        .collect()
}

/// Outcome of reading the stored profile registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoadedProfiles {
    Stored(Vec<Profile>),
    /// Missing or empty registry; defaults were generated.
    Defaulted(Vec<Profile>),
    /// Unreadable registry; the fixed fallback pair was substituted.
    Recovered(Vec<Profile>),
}

impl LoadedProfiles {
    pub(crate) fn needs_persist(&self) -> bool {
        !matches!(self, LoadedProfiles::Stored(_))
    }

    pub(crate) fn into_profiles(self) -> Vec<Profile> {
        match self {
            LoadedProfiles::Stored(p) | LoadedProfiles::Defaulted(p) | LoadedProfiles::Recovered(p) => p,
        }
    }
}

/// Parse the stored registry, never failing.
pub(crate) fn load_profiles(raw: Option<&str>) -> LoadedProfiles {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return LoadedProfiles::Defaulted(default_profiles());
    };

    match serde_json::from_str::<Vec<Profile>>(raw) {
        Ok(profiles) if profiles.is_empty() => LoadedProfiles::Defaulted(default_profiles()),
        Ok(profiles) => LoadedProfiles::Stored(dedup_ids(profiles)),
        Err(e) => {
            log::warn!("Stored profiles unreadable, using fallback pair: {}", e);
            LoadedProfiles::Recovered(fallback_profiles())
        }
    }
}

// Later duplicates lose; ids must stay unique for the registry's lifetime.
pub(crate) fn dedup_ids(profiles: Vec<Profile>) -> Vec<Profile> {
    let mut seen = std::collections::HashSet::new();
    let before = profiles.len();
    let kept: Vec<Profile> = profiles.into_iter().filter(|p| seen.insert(p.id.clone())).collect();
    if kept.len() != before {
        log::warn!("Dropped {} profile(s) with duplicate ids", before - kept.len());
    }
    kept
}

/// Build a new profile with a random palette color and emoji.
pub fn new_profile(name: &str) -> Result<Profile> {
    let name = normalize_name(name)?;
    let mut rng = rand::thread_rng();
    let color = PROFILE_COLORS.choose(&mut rng).copied().unwrap_or(PROFILE_FALLBACK_COLOR);
    let emoji = PROFILE_EMOJIS.choose(&mut rng).copied().unwrap_or(PROFILE_FALLBACK_EMOJI);

    Ok(Profile {
        id: new_profile_id(),
        name,
        color: color.to_string(),
        emoji: emoji.to_string(),
    })
}

/// Trim and cap a profile name at 18 characters.
pub fn normalize_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(KiddieError::InvalidProfileName);
    }
    Ok(trimmed.chars().take(PROFILE_NAME_MAX_CHARS).collect::<String>().trim_end().to_string())
}

/// Accept `#rgb` or `#rrggbb`, any case.
pub fn validate_color(color: &str) -> Result<String> {
    let color = color.trim();
    let is_hex = Regex::new(r"(?i)^#([0-9a-f]{3}|[0-9a-f]{6})$")
        .map(|re| re.is_match(color))
        .unwrap_or(false);
    if is_hex {
        Ok(color.to_string())
    } else {
        Err(KiddieError::InvalidColor(color.to_string()))
    }
}

pub fn validate_emoji(emoji: &str) -> Result<String> {
    let emoji = emoji.trim();
    if emoji.is_empty() {
        return Err(KiddieError::InvalidEmoji);
    }
    Ok(emoji.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_load_missing_registry_generates_defaults() {
        let loaded = load_profiles(None);
        assert!(loaded.needs_persist());
        let profiles = loaded.into_profiles();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "Kid 1");
        assert_eq!(profiles[1].color, "#FFD234");
        assert_ne!(profiles[0].id, profiles[1].id);
    }

    #[test]
    fn test_load_empty_registry_generates_defaults() {
        assert!(matches!(load_profiles(Some("[]")), LoadedProfiles::Defaulted(_)));
        assert!(matches!(load_profiles(Some("  ")), LoadedProfiles::Defaulted(_)));
    }

    #[test]
    fn test_load_malformed_registry_uses_fixed_pair() {
        for raw in ["not json", "{\"a\":1}", "[1,2,3]", "[{\"name\":\"no id\"}]"] {
            let loaded = load_profiles(Some(raw));
            assert!(matches!(loaded, LoadedProfiles::Recovered(_)), "raw: {}", raw);
            let ids: Vec<String> = loaded.into_profiles().into_iter().map(|p| p.id).collect();
            assert_eq!(ids, vec!["kid1", "kid2"]);
        }
    }

    #[test]
    fn test_load_stored_registry_keeps_unique_ids() {
        let raw = r##"[
            {"id":"a","name":"Ana","color":"#000","emoji":"🎈"},
            {"id":"a","name":"Dup","color":"#fff","emoji":"⭐"},
            {"id":"b","name":"Ben","color":"#111"}
        ]"##;
        let loaded = load_profiles(Some(raw));
        assert!(!loaded.needs_persist());
        let profiles = loaded.into_profiles();
        let ids: HashSet<_> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(profiles.len(), 2);
        assert_eq!(ids.len(), 2);
        assert_eq!(profiles[0].name, "Ana");
        assert_eq!(profiles[1].avatar(), "⭐");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Mia ").unwrap(), "Mia");
        assert_eq!(normalize_name("abcdefghijklmnopqrstuvwxyz").unwrap(), "abcdefghijklmnopqr");
        assert!(matches!(normalize_name("   "), Err(KiddieError::InvalidProfileName)));
    }

    #[test]
    fn test_new_profile_uses_palette() {
        let p = new_profile("Zoe").unwrap();
        assert_eq!(p.name, "Zoe");
        assert!(PROFILE_COLORS.contains(&p.color.as_str()));
        assert!(PROFILE_EMOJIS.contains(&p.emoji.as_str()));
        assert!(!p.id.is_empty());
    }

    #[test]
    fn test_validate_color() {
        assert_eq!(validate_color("#1dd75b").unwrap(), "#1dd75b");
        assert_eq!(validate_color("#ABC").unwrap(), "#ABC");
        assert!(validate_color("1DD75B").is_err());
        assert!(validate_color("#12345").is_err());
        assert!(validate_color("#GGGGGG").is_err());
    }

    #[test]
    fn test_validate_emoji() {
        assert_eq!(validate_emoji(" 🧩 ").unwrap(), "🧩");
        assert!(matches!(validate_emoji(""), Err(KiddieError::InvalidEmoji)));
    }
}
