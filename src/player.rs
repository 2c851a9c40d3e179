// KiddieFlix - Player
// Thin seam over the embeddable video widget. The widget owns playback; we only drive it.

use crate::constants::VIDEO_ID_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Unstarted,
    Playing,
    Paused,
    Ended,
}

/// Capabilities the embedded widget exposes for one video at a time.
pub trait EmbeddedPlayer {
    fn load(&mut self, video_id: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn state(&self) -> PlaybackState;
}

/// A video open in the player overlay.
pub struct PlayerSession<P: EmbeddedPlayer> {
    player: P,
    video_id: String,
}

impl<P: EmbeddedPlayer> PlayerSession<P> {
    /// Load the video and start it.
    pub fn open(mut player: P, video_id: &str) -> Self {
        log::debug!("Opening player for {}", video_id);
        player.load(video_id);
        player.play();
        Self { player, video_id: video_id.to_string() }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn state(&self) -> PlaybackState {
        self.player.state()
    }

    /// Pause when playing, otherwise play. Returns the new state.
    pub fn toggle_play_pause(&mut self) -> PlaybackState {
        if self.player.state() == PlaybackState::Playing {
            self.player.pause();
        } else {
            self.player.play();
        }
        self.player.state()
    }

    /// Stop playback and hand the widget back.
    pub fn close(mut self) -> P {
        self.player.stop();
        self.player
    }
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/hqdefault.jpg", video_id)
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// A player that just tracks state, for surfaces with no embedded widget
/// (the CLI prints the watch URL instead).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessPlayer {
    loaded: Option<String>,
    state: PlaybackState,
}

impl Default for HeadlessPlayer {
    fn default() -> Self {
        Self { loaded: None, state: PlaybackState::Unstarted }
    }
}

impl HeadlessPlayer {
    pub fn loaded(&self) -> Option<&str> {
        self.loaded.as_deref()
    }
}

impl EmbeddedPlayer for HeadlessPlayer {
    fn load(&mut self, video_id: &str) {
        if video_id.len() != VIDEO_ID_LEN {
            log::warn!("Loading unusual video id: {}", video_id);
        }
        self.loaded = Some(video_id.to_string());
        self.state = PlaybackState::Unstarted;
    }

    fn play(&mut self) {
        if self.loaded.is_some() {
            self.state = PlaybackState::Playing;
        }
    }

    fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    fn stop(&mut self) {
        self.loaded = None;
        self.state = PlaybackState::Unstarted;
    }

    fn state(&self) -> PlaybackState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Records calls so the session's driving order can be checked
    #[derive(Default)]
    struct RecordingPlayer {
        calls: Vec<String>,
        state: Option<PlaybackState>,
    }

    impl EmbeddedPlayer for RecordingPlayer {
        fn load(&mut self, video_id: &str) {
            self.calls.push(format!("load:{}", video_id));
            self.state = Some(PlaybackState::Unstarted);
        }
        fn play(&mut self) {
            self.calls.push("play".into());
            self.state = Some(PlaybackState::Playing);
        }
        fn pause(&mut self) {
            self.calls.push("pause".into());
            self.state = Some(PlaybackState::Paused);
        }
        fn stop(&mut self) {
            self.calls.push("stop".into());
            self.state = Some(PlaybackState::Ended);
        }
        fn state(&self) -> PlaybackState {
            self.state.unwrap_or(PlaybackState::Unstarted)
        }
    }

    #[test]
    fn test_session_lifecycle() {
        let mut session = PlayerSession::open(RecordingPlayer::default(), "abcdefghijk");
        assert_eq!(session.video_id(), "abcdefghijk");
        assert_eq!(session.state(), PlaybackState::Playing);

        assert_eq!(session.toggle_play_pause(), PlaybackState::Paused);
        assert_eq!(session.toggle_play_pause(), PlaybackState::Playing);

        let player = session.close();
        assert_eq!(player.calls, vec!["load:abcdefghijk", "play", "pause", "play", "stop"]);
    }

    #[test]
    fn test_toggle_after_end_restarts() {
        let mut player = RecordingPlayer::default();
        player.load("abcdefghijk");
        player.stop();
        let mut session = PlayerSession { player, video_id: "abcdefghijk".into() };

        assert_eq!(session.toggle_play_pause(), PlaybackState::Playing);
    }

    #[test]
    fn test_headless_player() {
        let mut session = PlayerSession::open(HeadlessPlayer::default(), "M7lc1UVf-VE");
        assert_eq!(session.state(), PlaybackState::Playing);
        assert_eq!(session.toggle_play_pause(), PlaybackState::Paused);

        let player = session.close();
        assert_eq!(player.loaded(), None);
        assert_eq!(player.state(), PlaybackState::Unstarted);

        let mut idle = HeadlessPlayer::default();
        idle.play();
        assert_eq!(idle.state(), PlaybackState::Unstarted);
    }

    #[test]
    fn test_urls() {
        assert_eq!(thumbnail_url("abc"), "https://img.youtube.com/vi/abc/hqdefault.jpg");
        assert_eq!(watch_url("abc"), "https://www.youtube.com/watch?v=abc");
    }
}
