use std::collections::BTreeMap;

use desktop_kernel_contract::{
    ApplicationId, Position, ProcessId, Size, WindowCapabilities, WindowId,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW_WIDTH: i32 = 420;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 300;
pub const MIN_WINDOW_WIDTH: i32 = 220;
pub const MIN_WINDOW_HEIGHT: i32 = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeLimits {
    pub min: Size,
    pub max: Size,
}

impl SizeLimits {
    pub fn clamp(self, size: Size) -> Size {
        size.clamped(self.min, self.max)
    }
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            min: Size::new(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT),
            max: Size::new(i32::MAX, i32::MAX),
        }
    }
}

/// One open window as tracked by the kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub id: WindowId,
    pub title: String,
    pub icon_id: String,
    pub application_id: ApplicationId,
    pub process_id: ProcessId,
    pub position: Position,
    pub size: Size,
    pub z_index: u64,
    pub is_focused: bool,
    pub is_minimized: bool,
    pub is_maximized: bool,
    pub capabilities: WindowCapabilities,
    pub size_limits: SizeLimits,
}

/// Observable per-window state derived from the record flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPhase {
    OpenUnfocused,
    OpenFocused,
    Minimized,
    Maximized,
}

impl WindowRecord {
    pub fn phase(&self) -> WindowPhase {
        if self.is_minimized {
            WindowPhase::Minimized
        } else if self.is_maximized {
            WindowPhase::Maximized
        } else if self.is_focused {
            WindowPhase::OpenFocused
        } else {
            WindowPhase::OpenUnfocused
        }
    }
}

/// Most-recently-focused window ids, oldest first. Each id appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FocusHistory {
    entries: Vec<WindowId>,
}

impl FocusHistory {
    /// Moves `window_id` to the most-recent end.
    pub fn touch(&mut self, window_id: WindowId) {
        self.remove(window_id);
        self.entries.push(window_id);
    }

    /// Removes `window_id`; returns whether it was present.
    pub fn remove(&mut self, window_id: WindowId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|id| *id != window_id);
        self.entries.len() != before
    }

    pub fn most_recent(&self) -> Option<WindowId> {
        self.entries.last().copied()
    }

    /// Moves the most recent entry to the oldest slot and returns the new most recent entry.
    ///
    /// Does nothing with fewer than two entries.
    pub fn rotate_top_to_front(&mut self) -> Option<WindowId> {
        if self.entries.len() < 2 {
            return None;
        }
        let top = self.entries.pop()?;
        self.entries.insert(0, top);
        self.most_recent()
    }

    pub fn contains(&self, window_id: WindowId) -> bool {
        self.entries.contains(&window_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[WindowId] {
        &self.entries
    }
}

/// The window store. Mutated only through [`crate::reducer::reduce_window`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowState {
    pub windows: BTreeMap<WindowId, WindowRecord>,
    pub focused_window_id: Option<WindowId>,
    pub z_index_counter: u64,
    pub next_window_id: u64,
    pub focus_history: FocusHistory,
    pub last_created_position: Option<Position>,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            windows: BTreeMap::new(),
            focused_window_id: None,
            z_index_counter: 0,
            next_window_id: 1,
            focus_history: FocusHistory::default(),
            last_created_position: None,
        }
    }
}

impl WindowState {
    pub fn window(&self, window_id: WindowId) -> Option<&WindowRecord> {
        self.windows.get(&window_id)
    }

    pub fn active_window(&self) -> Option<&WindowRecord> {
        self.focused_window_id.and_then(|id| self.windows.get(&id))
    }

    pub fn window_for_process(&self, process_id: ProcessId) -> Option<&WindowRecord> {
        self.windows.values().find(|w| w.process_id == process_id)
    }

    /// Windows ordered bottom to top.
    pub fn windows_by_z_order(&self) -> Vec<&WindowRecord> {
        let mut ordered: Vec<&WindowRecord> = self.windows.values().collect();
        ordered.sort_by_key(|w| w.z_index);
        ordered
    }

    pub fn top_z_index(&self) -> Option<u64> {
        self.windows.values().map(|w| w.z_index).max()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn touch_keeps_each_id_once_and_moves_it_to_the_end() {
        let mut history = FocusHistory::default();
        history.touch(WindowId(1));
        history.touch(WindowId(2));
        history.touch(WindowId(1));

        assert_eq!(history.as_slice(), &[WindowId(2), WindowId(1)]);
        assert_eq!(history.most_recent(), Some(WindowId(1)));
    }

    #[test]
    fn rotate_requires_two_entries() {
        let mut history = FocusHistory::default();
        history.touch(WindowId(1));
        assert_eq!(history.rotate_top_to_front(), None);
        assert_eq!(history.as_slice(), &[WindowId(1)]);

        history.touch(WindowId(2));
        assert_eq!(history.rotate_top_to_front(), Some(WindowId(1)));
        assert_eq!(history.as_slice(), &[WindowId(2), WindowId(1)]);
    }

    #[test]
    fn remove_reports_presence() {
        let mut history = FocusHistory::default();
        history.touch(WindowId(4));
        assert!(history.remove(WindowId(4)));
        assert!(!history.remove(WindowId(4)));
        assert!(history.is_empty());
    }
}
