// Multi-select delete mode
// Pending-delete ids layered over delete_many. Entering needs the parent PIN.

use std::collections::HashSet;

use crate::db::KeyValueStore;
use crate::error::{KiddieError, Result};
use crate::identity::PinPrompt;
use crate::state::AppState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    active: bool,
    selected: HashSet<String>,
}

impl Selection {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.selected.contains(video_id)
    }
}

impl<S: KeyValueStore> AppState<S> {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn enter_selection(&mut self, prompt: &mut dyn PinPrompt) -> Result<()> {
        self.authorize(true, prompt)?;
        self.selection = Selection { active: true, selected: HashSet::new() };
        Ok(())
    }

    pub fn exit_selection(&mut self) {
        self.selection = Selection::default();
    }

    /// Mark or unmark a video. Only ids currently in the registry can be picked.
    /// Returns true when the video is now selected.
    pub fn toggle_selected(&mut self, video_id: &str) -> Result<bool> {
        if !self.selection.active {
            return Err(KiddieError::SelectionInactive);
        }
        if !self.videos.iter().any(|v| v.id == video_id) {
            return Err(KiddieError::VideoNotFound(video_id.to_string()));
        }

        if self.selection.selected.remove(video_id) {
            Ok(false)
        } else {
            self.selection.selected.insert(video_id.to_string());
            Ok(true)
        }
    }

    /// Mark every id in `ids`. Unlike `toggle_selected`, repeats stay selected.
    /// Fails without changing the selection if any id is not in the registry.
    pub fn select_ids(&mut self, ids: &[String]) -> Result<usize> {
        if !self.selection.active {
            return Err(KiddieError::SelectionInactive);
        }
        if let Some(unknown) = ids.iter().find(|id| !self.videos.iter().any(|v| &v.id == *id)) {
            return Err(KiddieError::VideoNotFound(unknown.clone()));
        }

        self.selection.selected.extend(ids.iter().cloned());
        Ok(self.selection.selected.len())
    }

    /// Delete everything selected and leave selection mode.
    pub fn delete_selected(&mut self) -> Result<usize> {
        if !self.selection.active {
            return Err(KiddieError::SelectionInactive);
        }
        let ids = self.selection.selected.clone();
        let removed = self.delete_many(&ids)?;
        self.exit_selection();
        Ok(removed)
    }
}
