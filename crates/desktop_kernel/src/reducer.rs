//! Window actions and the transition function that applies them to [`WindowState`].
//!
//! [`reduce_window`] is the only code that mutates the store. It performs every check before the
//! first write, so an `Err` leaves the state untouched, and it returns the events the caller must
//! publish, in order, once the state borrow has been released.

use desktop_kernel_contract::{
    ApplicationId, KernelEvent, Position, ProcessId, Size, WindowCapabilities, WindowId,
};
use thiserror::Error;

use crate::model::{SizeLimits, WindowRecord, WindowState};

/// Fully resolved window creation input. Placement and config lookup happen before dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWindow {
    pub title: String,
    pub icon_id: String,
    pub application_id: ApplicationId,
    pub process_id: ProcessId,
    pub position: Position,
    pub size: Size,
    pub capabilities: WindowCapabilities,
    pub size_limits: SizeLimits,
}

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_window`].
pub enum WindowAction {
    /// Insert a new focused window on top of the stack.
    Create(NewWindow),
    /// Remove a window and hand focus to the most recent remaining one.
    Close {
        /// Window to close.
        window_id: WindowId,
    },
    /// Focus, un-minimize, and raise a window.
    Focus {
        /// Window to focus.
        window_id: WindowId,
    },
    /// Minimize a window and drop it from focus history.
    Minimize {
        /// Window to minimize.
        window_id: WindowId,
    },
    /// Mark a window maximized. Geometry is left to the presentation layer.
    Maximize {
        /// Window to maximize.
        window_id: WindowId,
    },
    /// Clear the minimized and maximized flags without focusing.
    Restore {
        /// Window to restore.
        window_id: WindowId,
    },
    /// Set a window position.
    Move {
        /// Window to move.
        window_id: WindowId,
        /// New top-left corner.
        position: Position,
    },
    /// Set a window size.
    Resize {
        /// Window to resize.
        window_id: WindowId,
        /// New size.
        size: Size,
    },
    /// Drop a window from focus history without touching store focus.
    Blur {
        /// Window to blur.
        window_id: WindowId,
    },
    /// Alternate between the two most recently focused windows.
    SwitchFocus,
    /// Focus the entry just below the top of focus history.
    FocusPrevious,
    /// Unfocus the focused window without choosing a replacement.
    ClearFocus,
}

/// Transitions gated by a window capability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Minimize,
    Maximize,
    Resize,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Minimize => "minimize",
            Self::Maximize => "maximize",
            Self::Resize => "resize",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors for actions that cannot be applied.
pub enum ReducerError {
    /// The target window id was not found in the current state.
    #[error("{0} not found")]
    WindowNotFound(WindowId),
    /// The window's capabilities do not allow the transition.
    #[error("{window_id} does not support {transition}")]
    UnsupportedTransition {
        /// Target window.
        window_id: WindowId,
        /// Rejected transition.
        transition: Transition,
    },
}

/// Applies a [`WindowAction`] to the store and returns the events to publish.
///
/// # Errors
///
/// Returns [`ReducerError::WindowNotFound`] when the action references a missing window and
/// [`ReducerError::UnsupportedTransition`] when a capability flag forbids it. In both cases the
/// state is unchanged.
pub fn reduce_window(
    state: &mut WindowState,
    action: WindowAction,
) -> Result<Vec<KernelEvent>, ReducerError> {
    let previous_focus = state.focused_window_id;
    let mut events = Vec::new();

    match action {
        WindowAction::Create(new_window) => {
            let window_id = WindowId(state.next_window_id);
            state.next_window_id = state.next_window_id.saturating_add(1);
            events.push(KernelEvent::WindowCreated {
                window_id,
                application_id: new_window.application_id.clone(),
                process_id: new_window.process_id,
            });
            state.last_created_position = Some(new_window.position);
            state.windows.insert(
                window_id,
                WindowRecord {
                    id: window_id,
                    title: new_window.title,
                    icon_id: new_window.icon_id,
                    application_id: new_window.application_id,
                    process_id: new_window.process_id,
                    position: new_window.position,
                    size: new_window.size,
                    z_index: 0,
                    is_focused: false,
                    is_minimized: false,
                    is_maximized: false,
                    capabilities: new_window.capabilities,
                    size_limits: new_window.size_limits,
                },
            );
            events.extend(raise_and_focus(state, window_id));
        }
        WindowAction::Close { window_id } => {
            let record = state
                .windows
                .remove(&window_id)
                .ok_or(ReducerError::WindowNotFound(window_id))?;
            state.focus_history.remove(window_id);
            events.push(KernelEvent::WindowClosed {
                window_id,
                process_id: record.process_id,
            });
            if state.focused_window_id == Some(window_id) {
                state.focused_window_id = None;
                refocus_from_history(state, window_id, &mut events);
            }
        }
        WindowAction::Focus { window_id } => {
            ensure_exists(state, window_id)?;
            events.extend(raise_and_focus(state, window_id));
        }
        WindowAction::Minimize { window_id } => {
            let window = find_window(state, window_id)?;
            if !window.capabilities.can_minimize {
                return Err(unsupported(window_id, Transition::Minimize));
            }
            if window.is_minimized {
                return Ok(events);
            }
            if let Some(window) = state.windows.get_mut(&window_id) {
                window.is_minimized = true;
                window.is_focused = false;
            }
            state.focus_history.remove(window_id);
            events.push(KernelEvent::WindowMinimized { window_id });
            if state.focused_window_id == Some(window_id) {
                state.focused_window_id = None;
                refocus_from_history(state, window_id, &mut events);
            }
        }
        WindowAction::Maximize { window_id } => {
            let window = find_window(state, window_id)?;
            if !window.capabilities.can_maximize {
                return Err(unsupported(window_id, Transition::Maximize));
            }
            if window.is_maximized && !window.is_minimized {
                return Ok(events);
            }
            if let Some(window) = state.windows.get_mut(&window_id) {
                window.is_maximized = true;
                window.is_minimized = false;
            }
            events.push(KernelEvent::WindowMaximized { window_id });
        }
        WindowAction::Restore { window_id } => {
            let window = find_window(state, window_id)?;
            if !window.is_maximized && !window.is_minimized {
                return Ok(events);
            }
            if let Some(window) = state.windows.get_mut(&window_id) {
                window.is_maximized = false;
                window.is_minimized = false;
            }
            events.push(KernelEvent::WindowRestored { window_id });
        }
        WindowAction::Move {
            window_id,
            position,
        } => {
            let window = find_window_mut(state, window_id)?;
            window.position = position;
            events.push(KernelEvent::WindowMoved {
                window_id,
                position,
            });
        }
        WindowAction::Resize { window_id, size } => {
            let window = find_window_mut(state, window_id)?;
            if !window.capabilities.can_resize {
                return Err(unsupported(window_id, Transition::Resize));
            }
            let size = window.size_limits.clamp(size);
            window.size = size;
            events.push(KernelEvent::WindowResized { window_id, size });
        }
        WindowAction::Blur { window_id } => {
            ensure_exists(state, window_id)?;
            if state.focus_history.remove(window_id) {
                events.push(KernelEvent::WindowBlurred { window_id });
            }
        }
        WindowAction::SwitchFocus => {
            if let Some(next) = state.focus_history.rotate_top_to_front() {
                events.extend(raise_and_focus(state, next));
            }
        }
        WindowAction::FocusPrevious => {
            let entries = state.focus_history.as_slice();
            if entries.len() >= 2 {
                let previous = entries[entries.len() - 2];
                events.extend(raise_and_focus(state, previous));
            }
        }
        WindowAction::ClearFocus => {
            if let Some(focused) = state.focused_window_id.take() {
                if let Some(window) = state.windows.get_mut(&focused) {
                    window.is_focused = false;
                }
                events.push(KernelEvent::FocusCleared {
                    previous: Some(focused),
                });
            }
        }
    }

    if state.focused_window_id != previous_focus {
        events.push(KernelEvent::FocusChanged {
            previous: previous_focus,
            current: state.focused_window_id,
        });
    }
    Ok(events)
}

/// Checks the store invariants and describes the first violation found.
pub fn validate_invariants(state: &WindowState) -> Result<(), String> {
    for id in state.focus_history.as_slice() {
        match state.windows.get(id) {
            None => return Err(format!("{id} is in focus history but not open")),
            Some(window) if window.is_minimized => {
                return Err(format!("{id} is minimized but still in focus history"))
            }
            Some(_) => {}
        }
    }

    let focused: Vec<WindowId> = state
        .windows
        .values()
        .filter(|w| w.is_focused)
        .map(|w| w.id)
        .collect();
    if focused.len() > 1 {
        return Err(format!("{} windows are focused at once", focused.len()));
    }
    if focused.first().copied() != state.focused_window_id {
        return Err(format!(
            "focused flag {:?} disagrees with focused id {:?}",
            focused.first(),
            state.focused_window_id
        ));
    }

    if let Some(window) = state.windows.values().find(|w| w.is_minimized && w.is_focused) {
        return Err(format!("{} is minimized and focused", window.id));
    }

    let mut z_indices: Vec<u64> = state.windows.values().map(|w| w.z_index).collect();
    z_indices.sort_unstable();
    if z_indices.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err("duplicate z-index".to_string());
    }
    if let Some(active) = state.active_window() {
        if Some(active.z_index) != state.top_z_index() {
            return Err(format!("focused {} is not on top", active.id));
        }
    }
    Ok(())
}

fn raise_and_focus(state: &mut WindowState, window_id: WindowId) -> Option<KernelEvent> {
    let top = state.top_z_index();
    let window = state.windows.get(&window_id)?;
    let already_top = window.is_focused && !window.is_minimized && Some(window.z_index) == top;

    for window in state.windows.values_mut() {
        window.is_focused = false;
    }
    let window = state.windows.get_mut(&window_id)?;
    window.is_focused = true;
    window.is_minimized = false;
    if !already_top {
        state.z_index_counter += 1;
        window.z_index = state.z_index_counter;
    }
    let z_index = window.z_index;
    state.focused_window_id = Some(window_id);
    state.focus_history.touch(window_id);
    Some(KernelEvent::WindowFocused { window_id, z_index })
}

fn refocus_from_history(state: &mut WindowState, departed: WindowId, events: &mut Vec<KernelEvent>) {
    let candidate = state
        .focus_history
        .as_slice()
        .iter()
        .rev()
        .copied()
        .find(|id| state.windows.get(id).is_some_and(|w| !w.is_minimized));
    match candidate {
        Some(next) => events.extend(raise_and_focus(state, next)),
        None => events.push(KernelEvent::FocusCleared {
            previous: Some(departed),
        }),
    }
}

fn unsupported(window_id: WindowId, transition: Transition) -> ReducerError {
    ReducerError::UnsupportedTransition {
        window_id,
        transition,
    }
}

fn ensure_exists(state: &WindowState, window_id: WindowId) -> Result<(), ReducerError> {
    find_window(state, window_id).map(|_| ())
}

fn find_window(state: &WindowState, window_id: WindowId) -> Result<&WindowRecord, ReducerError> {
    state
        .windows
        .get(&window_id)
        .ok_or(ReducerError::WindowNotFound(window_id))
}

fn find_window_mut(
    state: &mut WindowState,
    window_id: WindowId,
) -> Result<&mut WindowRecord, ReducerError> {
    state
        .windows
        .get_mut(&window_id)
        .ok_or(ReducerError::WindowNotFound(window_id))
}
