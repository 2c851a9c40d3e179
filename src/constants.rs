// KiddieFlix Constants
// Storage keys are shared with exported data from earlier versions. Do not rename.

// Storage slots
pub const VIDEOS_KEY: &str = "kiddieflix.videos";
pub const PIN_KEY: &str = "kiddieflix.pinHash";
pub const PROFILES_KEY: &str = "kiddieflix.profiles";
pub const CURRENT_PROFILE_KEY: &str = "kiddieflix.currentProfileId";
pub const FAVORITES_KEY: &str = "kiddieflix.favorites";

// Paths
pub const APP_DB_DIR: &str = ".kiddieflix";
pub const APP_DB_FILENAME: &str = "app.db";
pub const HOME_ENV_VAR: &str = "KIDDIEFLIX_HOME";
pub const EXPORT_FILENAME: &str = "kiddieflix-data.json";

// PIN
pub const PIN_MIN_LEN: usize = 4;
pub const PIN_MAX_LEN: usize = 8;

// Profiles
pub const PROFILE_NAME_MAX_CHARS: usize = 18;
pub const PROFILE_FALLBACK_LABEL: &str = "Profile";
pub const PROFILE_FALLBACK_COLOR: &str = "#FFD234";
pub const PROFILE_FALLBACK_EMOJI: &str = "⭐";

pub const PROFILE_COLORS: [&str; 6] = [
    "#1DD75B", "#FFD234", "#7B5CFF", "#00D1FF", "#FF7B9E", "#FF9F1C",
];

pub const PROFILE_EMOJIS: [&str; 10] = [
    "🟢", "🟡", "🟣", "🔵", "🩷", "🟧", "⭐", "🎈", "🧩", "📺",
];

// (name, color, emoji) for first-run profiles
pub const DEFAULT_PROFILES: [(&str, &str, &str); 2] = [
    ("Kid 1", "#1DD75B", "🟢"),
    ("Kid 2", "#FFD234", "🟡"),
];

// Fixed ids used when the stored registry cannot be read at all
pub const FALLBACK_PROFILE_IDS: [&str; 2] = ["kid1", "kid2"];

// Videos
pub const VIDEO_ID_LEN: usize = 11;
pub const UNTITLED: &str = "Untitled";
pub const SEED_VIDEO_ID: &str = "M7lc1UVf-VE";
pub const SEED_VIDEO_TITLE: &str = "Demo Video (YouTube API)";
