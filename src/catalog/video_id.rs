// Video id extraction
// Accepts youtube.com/...?v=ID and youtu.be/ID, with or without extra params.

use regex::Regex;

const VIDEO_ID_PATTERN: &str = r"(?:youtube\.com/.*[?&]v=|youtu\.be/)([A-Za-z0-9_-]{11})";

/// Pull the 11-character video id out of a URL. Returns None for anything else.
pub fn extract_video_id(url: &str) -> Option<String> {
    let re = Regex::new(VIDEO_ID_PATTERN).ok()?;
    re.captures(url)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}
