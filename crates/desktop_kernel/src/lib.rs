//! Window and focus lifecycle kernel for the desktop shell.
//!
//! [`WindowService`] owns the window store and publishes [`KernelEvent`]s on an [`EventBus`];
//! [`FocusManager`] layers most-recently-used focus policy over it. Leptos components reach both
//! through [`WindowKernelProvider`] and [`use_window_kernel`].

pub mod apps;
pub mod config;
pub mod error;
pub mod event_bus;
pub mod focus_manager;
pub mod gesture;
pub mod model;
pub mod placement;
pub mod process;
pub mod reducer;
pub mod runtime_context;
pub mod window_service;

pub use apps::{AppWindowConfig, ApplicationRegistry, PositionStrategy};
pub use config::KernelConfig;
pub use desktop_kernel_contract::{
    ApplicationId, KernelEvent, KernelEventName, Position, ProcessId, ProcessResources, Size,
    WindowCapabilities, WindowId,
};
pub use error::KernelError;
pub use event_bus::{EventBus, Listener};
pub use focus_manager::FocusManager;
pub use gesture::{GestureSession, PointerBus, PointerEventKind, ResizeEdge};
pub use model::{FocusHistory, SizeLimits, WindowRecord, WindowState};
pub use process::ProcessSignal;
pub use reducer::{reduce_window, Transition, WindowAction};
pub use runtime_context::{use_window_kernel, WindowKernel, WindowKernelContext, WindowKernelProvider};
pub use window_service::{CreateWindowRequest, KernelBus, KernelListener, WindowService};
