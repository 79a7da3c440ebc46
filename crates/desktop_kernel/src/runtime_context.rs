//! Kernel bundle and Leptos context wiring.
//!
//! One [`WindowKernel`] exists per running shell. [`WindowKernelProvider`] builds it, mirrors the
//! window list into reactive signals for taskbar and chrome components, and provides it to
//! descendants. Tests construct isolated kernels directly with [`WindowKernel::new`].

use std::rc::Rc;

use desktop_kernel_contract::{KernelEvent, KernelEventName, WindowId};
use leptos::*;

use crate::{
    apps::ApplicationRegistry,
    config::KernelConfig,
    focus_manager::FocusManager,
    gesture::PointerBus,
    model::WindowRecord,
    window_service::{KernelListener, WindowService},
};

#[derive(Clone)]
/// Window service, focus policy, and pointer bus sharing one store.
pub struct WindowKernel {
    /// Authoritative window store owner.
    pub windows: WindowService,
    /// MRU focus policy over [`Self::windows`].
    pub focus: FocusManager,
    /// Global pointer samples consumed by drag/resize gestures.
    pub pointer: PointerBus,
}

impl WindowKernel {
    pub fn new(registry: ApplicationRegistry, config: KernelConfig) -> Self {
        let windows = WindowService::new(registry, config);
        let focus = FocusManager::new(windows.clone());
        Self {
            windows,
            focus,
            pointer: PointerBus::new(),
        }
    }

    /// Registers `listener` for every window and focus event (process passthrough excluded).
    pub fn on_window_events(&self, listener: &KernelListener) {
        for name in window_event_names() {
            self.windows.bus().on(name, Rc::clone(listener));
        }
    }

    pub fn off_window_events(&self, listener: &KernelListener) {
        for name in window_event_names() {
            self.windows.unsubscribe(name, listener);
        }
    }
}

fn window_event_names() -> impl Iterator<Item = KernelEventName> {
    KernelEventName::ALL
        .into_iter()
        .filter(|name| !name.is_process_event())
}

#[derive(Clone, Copy)]
/// Leptos context for reading window state and reaching the kernel.
pub struct WindowKernelContext {
    /// The kernel instance for this shell.
    pub kernel: StoredValue<WindowKernel>,
    /// Open windows, bottom of the stack first.
    pub windows: RwSignal<Vec<WindowRecord>>,
    /// Currently focused window.
    pub active_window: RwSignal<Option<WindowId>>,
}

impl WindowKernelContext {
    /// Runs `f` against the kernel without tracking.
    pub fn with_kernel<T>(&self, f: impl FnOnce(&WindowKernel) -> T) -> T {
        self.kernel.with_value(f)
    }
}

/// Builds a listener that copies the store into the reactive mirrors after each window event.
pub fn mirror_listener(
    service: &WindowService,
    windows: RwSignal<Vec<WindowRecord>>,
    active_window: RwSignal<Option<WindowId>>,
) -> KernelListener {
    let service = service.clone();
    Rc::new(move |_: &KernelEvent| {
        windows.set(service.windows_by_z_order());
        active_window.set(service.get_active_window().map(|w| w.id));
    })
}

#[component]
/// Provides [`WindowKernelContext`] to descendant components.
pub fn WindowKernelProvider(
    /// App registry; the built-in manifest when omitted.
    #[prop(optional)]
    registry: Option<ApplicationRegistry>,
    /// Kernel configuration; defaults when omitted.
    #[prop(optional)]
    config: Option<KernelConfig>,
    children: Children,
) -> impl IntoView {
    let kernel = WindowKernel::new(
        registry.unwrap_or_else(ApplicationRegistry::builtin),
        config.unwrap_or_default(),
    );
    let windows = create_rw_signal(kernel.windows.windows_by_z_order());
    let active_window = create_rw_signal(kernel.windows.get_active_window().map(|w| w.id));

    let mirror = mirror_listener(&kernel.windows, windows, active_window);
    kernel.on_window_events(&mirror);
    {
        let kernel = kernel.clone();
        on_cleanup(move || kernel.off_window_events(&mirror));
    }

    provide_context(WindowKernelContext {
        kernel: store_value(kernel),
        windows,
        active_window,
    });

    children().into_view()
}

/// Returns the current [`WindowKernelContext`].
///
/// # Panics
///
/// Panics if called outside [`WindowKernelProvider`].
pub fn use_window_kernel() -> WindowKernelContext {
    use_context::<WindowKernelContext>().expect("WindowKernelContext not provided")
}
