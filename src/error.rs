// KiddieFlix Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KiddieError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("That doesn't look like a valid YouTube URL: {0}")]
    InvalidVideoUrl(String),

    #[error("PIN should be {min}-{max} digits", min = crate::constants::PIN_MIN_LEN, max = crate::constants::PIN_MAX_LEN)]
    InvalidPin,

    #[error("PINs don't match")]
    PinMismatch,

    #[error("A parent PIN is already set")]
    PinAlreadySet,

    #[error("Pick at least one profile or choose all profiles")]
    EmptyTargeting,

    #[error("Invalid profile name")]
    InvalidProfileName,

    #[error("Invalid color (expected #rgb or #rrggbb): {0}")]
    InvalidColor(String),

    #[error("Emoji cannot be empty")]
    InvalidEmoji,

    #[error("Couldn't read that file: {0}")]
    MalformedDocument(String),

    #[error("Invalid JSON format: {0}")]
    InvalidDocument(String),

    #[error("Wrong PIN")]
    AuthorizationDenied,

    #[error("Pick a profile first")]
    NoActiveProfile,

    #[error("Selection mode is not active")]
    SelectionInactive,

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),
}

pub type Result<T> = std::result::Result<T, KiddieError>;
