//! Shared contract types between the desktop window kernel and the UI code that drives it.
//!
//! Taskbar, window chrome, and mini-app wrappers depend on this crate only: identifiers,
//! geometry, capability flags, and the event vocabulary emitted by the kernel. The kernel's store
//! and transition logic live in `desktop_kernel`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identifier for a kernel-managed window.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct WindowId(pub u64);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Identifier of a process record owned by the external process manager.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ProcessId(pub u64);

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "process#{}", self.0)
    }
}

/// Stable identifier for a mini-application hosted in a window.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Returns an app identifier when `raw` conforms to the `segment.segment...` policy.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if is_valid_application_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!(
                "invalid application id `{raw}`; expected namespaced dotted segments"
            ))
        }
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creates an id without validation for trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_valid_application_id(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > 120 {
        return false;
    }

    let mut count = 0usize;
    for part in raw.split('.') {
        count += 1;
        if part.is_empty() || part.len() > 32 {
            return false;
        }
        let bytes = part.as_bytes();
        if !bytes[0].is_ascii_lowercase() {
            return false;
        }
        if !bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        {
            return false;
        }
        if part.ends_with('-') {
            return false;
        }
    }

    count >= 2
}

/// Top-left corner of a window in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset from the desktop origin.
    pub x: i32,
    /// Vertical offset from the desktop origin.
    pub y: i32,
}

impl Position {
    /// Creates a position from raw coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this position shifted by `dx`/`dy`, saturating at the `i32` bounds.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// Window extent in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    /// Width in logical pixels.
    pub width: i32,
    /// Height in logical pixels.
    pub height: i32,
}

impl Size {
    /// Creates a size from raw dimensions.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Clamps both dimensions into `[min, max]`.
    pub fn clamped(self, min: Size, max: Size) -> Self {
        Self {
            width: self.width.clamp(min.width, max.width.max(min.width)),
            height: self.height.clamp(min.height, max.height.max(min.height)),
        }
    }
}

/// Capability flags fixed at window creation from application configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowCapabilities {
    /// Whether resize gestures and `resize_window` are permitted.
    pub can_resize: bool,
    /// Whether the window may be minimized.
    pub can_minimize: bool,
    /// Whether the window may be maximized.
    pub can_maximize: bool,
}

impl Default for WindowCapabilities {
    fn default() -> Self {
        Self {
            can_resize: true,
            can_minimize: true,
            can_maximize: true,
        }
    }
}

/// Point-in-time resource usage reported by the process manager.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessResources {
    /// Resident memory in bytes.
    pub memory_bytes: u64,
    /// CPU usage as a percentage of one core.
    pub cpu_percent: f32,
}

/// Names of every event the kernel emits or forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KernelEventName {
    /// A window was created.
    WindowCreated,
    /// A window was closed and removed from the store.
    WindowClosed,
    /// A window received focus and was raised.
    WindowFocused,
    /// A window was dropped from focus history without closing.
    WindowBlurred,
    /// A window was minimized.
    WindowMinimized,
    /// A window was maximized.
    WindowMaximized,
    /// A window left the minimized or maximized state.
    WindowRestored,
    /// A window position changed.
    WindowMoved,
    /// A window size changed.
    WindowResized,
    /// The focused window id changed.
    FocusChanged,
    /// Focus was cleared without a replacement.
    FocusCleared,
    /// The process manager created a process.
    ProcessCreated,
    /// The process manager terminated a process.
    ProcessTerminated,
    /// The process manager suspended a process.
    ProcessSuspended,
    /// The process manager resumed a process.
    ProcessResumed,
    /// The process manager published new resource figures.
    ProcessResourcesUpdated,
}

impl KernelEventName {
    /// Every event name, in vocabulary order.
    pub const ALL: [KernelEventName; 16] = [
        Self::WindowCreated,
        Self::WindowClosed,
        Self::WindowFocused,
        Self::WindowBlurred,
        Self::WindowMinimized,
        Self::WindowMaximized,
        Self::WindowRestored,
        Self::WindowMoved,
        Self::WindowResized,
        Self::FocusChanged,
        Self::FocusCleared,
        Self::ProcessCreated,
        Self::ProcessTerminated,
        Self::ProcessSuspended,
        Self::ProcessResumed,
        Self::ProcessResourcesUpdated,
    ];

    /// Returns the stable string token used by UI subscribers.
    pub const fn token(self) -> &'static str {
        match self {
            Self::WindowCreated => "windowCreated",
            Self::WindowClosed => "windowClosed",
            Self::WindowFocused => "windowFocused",
            Self::WindowBlurred => "windowBlurred",
            Self::WindowMinimized => "windowMinimized",
            Self::WindowMaximized => "windowMaximized",
            Self::WindowRestored => "windowRestored",
            Self::WindowMoved => "windowMoved",
            Self::WindowResized => "windowResized",
            Self::FocusChanged => "focusChanged",
            Self::FocusCleared => "focusCleared",
            Self::ProcessCreated => "processCreated",
            Self::ProcessTerminated => "processTerminated",
            Self::ProcessSuspended => "processSuspended",
            Self::ProcessResumed => "processResumed",
            Self::ProcessResourcesUpdated => "processResourcesUpdated",
        }
    }

    /// Parses a stable token back into an event name.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.token() == token)
    }

    /// Returns `true` for events forwarded from the process manager.
    pub const fn is_process_event(self) -> bool {
        matches!(
            self,
            Self::ProcessCreated
                | Self::ProcessTerminated
                | Self::ProcessSuspended
                | Self::ProcessResumed
                | Self::ProcessResourcesUpdated
        )
    }
}

impl std::fmt::Display for KernelEventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Payloads delivered to kernel event subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum KernelEvent {
    /// A window was created.
    WindowCreated {
        /// New window.
        window_id: WindowId,
        /// Hosted application.
        application_id: ApplicationId,
        /// Correlated process.
        process_id: ProcessId,
    },
    /// A window was closed.
    WindowClosed {
        /// Closed window.
        window_id: WindowId,
        /// Process the window was correlated with.
        process_id: ProcessId,
    },
    /// A window received focus.
    WindowFocused {
        /// Focused window.
        window_id: WindowId,
        /// Stacking order assigned on focus.
        z_index: u64,
    },
    /// A window was dropped from focus history.
    WindowBlurred {
        /// Blurred window.
        window_id: WindowId,
    },
    /// A window was minimized.
    WindowMinimized {
        /// Minimized window.
        window_id: WindowId,
    },
    /// A window was maximized.
    WindowMaximized {
        /// Maximized window.
        window_id: WindowId,
    },
    /// A window was restored.
    WindowRestored {
        /// Restored window.
        window_id: WindowId,
    },
    /// A window moved.
    WindowMoved {
        /// Moved window.
        window_id: WindowId,
        /// New position.
        position: Position,
    },
    /// A window was resized.
    WindowResized {
        /// Resized window.
        window_id: WindowId,
        /// New size.
        size: Size,
    },
    /// The focused window id changed.
    FocusChanged {
        /// Previously focused window.
        previous: Option<WindowId>,
        /// Currently focused window.
        current: Option<WindowId>,
    },
    /// Focus was cleared without a replacement.
    FocusCleared {
        /// Window that held focus before clearing.
        previous: Option<WindowId>,
    },
    /// Forwarded process creation.
    ProcessCreated {
        /// Process id.
        process_id: ProcessId,
        /// Correlated window, when one is open.
        window_id: Option<WindowId>,
    },
    /// Forwarded process termination.
    ProcessTerminated {
        /// Process id.
        process_id: ProcessId,
        /// Correlated window, when one is open.
        window_id: Option<WindowId>,
    },
    /// Forwarded process suspension.
    ProcessSuspended {
        /// Process id.
        process_id: ProcessId,
        /// Correlated window, when one is open.
        window_id: Option<WindowId>,
    },
    /// Forwarded process resumption.
    ProcessResumed {
        /// Process id.
        process_id: ProcessId,
        /// Correlated window, when one is open.
        window_id: Option<WindowId>,
    },
    /// Forwarded resource figures.
    ProcessResourcesUpdated {
        /// Process id.
        process_id: ProcessId,
        /// Correlated window, when one is open.
        window_id: Option<WindowId>,
        /// Latest resource usage.
        resources: ProcessResources,
    },
}

impl KernelEvent {
    /// Returns the name this payload is published under.
    pub const fn name(&self) -> KernelEventName {
        match self {
            Self::WindowCreated { .. } => KernelEventName::WindowCreated,
            Self::WindowClosed { .. } => KernelEventName::WindowClosed,
            Self::WindowFocused { .. } => KernelEventName::WindowFocused,
            Self::WindowBlurred { .. } => KernelEventName::WindowBlurred,
            Self::WindowMinimized { .. } => KernelEventName::WindowMinimized,
            Self::WindowMaximized { .. } => KernelEventName::WindowMaximized,
            Self::WindowRestored { .. } => KernelEventName::WindowRestored,
            Self::WindowMoved { .. } => KernelEventName::WindowMoved,
            Self::WindowResized { .. } => KernelEventName::WindowResized,
            Self::FocusChanged { .. } => KernelEventName::FocusChanged,
            Self::FocusCleared { .. } => KernelEventName::FocusCleared,
            Self::ProcessCreated { .. } => KernelEventName::ProcessCreated,
            Self::ProcessTerminated { .. } => KernelEventName::ProcessTerminated,
            Self::ProcessSuspended { .. } => KernelEventName::ProcessSuspended,
            Self::ProcessResumed { .. } => KernelEventName::ProcessResumed,
            Self::ProcessResourcesUpdated { .. } => KernelEventName::ProcessResourcesUpdated,
        }
    }

    /// Returns the window this event concerns, when there is one.
    pub fn window_id(&self) -> Option<WindowId> {
        match self {
            Self::WindowCreated { window_id, .. }
            | Self::WindowClosed { window_id, .. }
            | Self::WindowFocused { window_id, .. }
            | Self::WindowBlurred { window_id }
            | Self::WindowMinimized { window_id }
            | Self::WindowMaximized { window_id }
            | Self::WindowRestored { window_id }
            | Self::WindowMoved { window_id, .. }
            | Self::WindowResized { window_id, .. } => Some(*window_id),
            Self::FocusChanged { current, .. } => *current,
            Self::FocusCleared { previous } => *previous,
            Self::ProcessCreated { window_id, .. }
            | Self::ProcessTerminated { window_id, .. }
            | Self::ProcessSuspended { window_id, .. }
            | Self::ProcessResumed { window_id, .. }
            | Self::ProcessResourcesUpdated { window_id, .. } => *window_id,
        }
    }

    /// Serializes the payload into the JSON envelope handed to script-side listeners.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the payload cannot be represented as JSON.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
