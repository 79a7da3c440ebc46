//! The authoritative owner of the window store.
//!
//! Every public operation resolves its input, applies exactly one [`WindowAction`] inside a single
//! borrow of the store, releases the borrow, and only then publishes the resulting events. Event
//! listeners may therefore call back into the service; events caused by such nested calls are
//! queued behind the batch being delivered.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use desktop_kernel_contract::{
    ApplicationId, KernelEvent, KernelEventName, Position, ProcessId, Size, WindowCapabilities,
    WindowId,
};
use leptos::logging;

use crate::{
    apps::ApplicationRegistry,
    config::KernelConfig,
    error::KernelError,
    event_bus::{EventBus, Listener},
    model::{SizeLimits, WindowRecord, WindowState},
    placement,
    reducer::{reduce_window, validate_invariants, NewWindow, ReducerError, Transition, WindowAction},
};

/// Bus carrying kernel events.
pub type KernelBus = EventBus<KernelEventName, KernelEvent>;
/// Listener handle for [`KernelBus`].
pub type KernelListener = Listener<KernelEvent>;

/// Caller-facing window creation input. Unset fields come from the application registry.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateWindowRequest {
    pub title: Option<String>,
    pub application_id: ApplicationId,
    pub process_id: ProcessId,
    pub position: Option<Position>,
    pub size: Option<Size>,
    pub icon_id: Option<String>,
    pub can_resize: Option<bool>,
}

impl CreateWindowRequest {
    pub fn new(application_id: ApplicationId, process_id: ProcessId) -> Self {
        Self {
            title: None,
            application_id,
            process_id,
            position: None,
            size: None,
            icon_id: None,
            can_resize: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }
}

#[derive(Clone)]
pub struct WindowService {
    pub(crate) state: Rc<RefCell<WindowState>>,
    bus: KernelBus,
    outbox: Rc<RefCell<VecDeque<KernelEvent>>>,
    delivering: Rc<Cell<bool>>,
    registry: Rc<ApplicationRegistry>,
    config: Rc<KernelConfig>,
}

impl WindowService {
    pub fn new(registry: ApplicationRegistry, config: KernelConfig) -> Self {
        Self::with_bus(registry, config, KernelBus::new())
    }

    /// Builds a service publishing on an existing bus.
    pub fn with_bus(registry: ApplicationRegistry, config: KernelConfig, bus: KernelBus) -> Self {
        Self {
            state: Rc::new(RefCell::new(WindowState::default())),
            bus,
            outbox: Rc::new(RefCell::new(VecDeque::new())),
            delivering: Rc::new(Cell::new(false)),
            registry: Rc::new(registry),
            config: Rc::new(config),
        }
    }

    pub fn bus(&self) -> &KernelBus {
        &self.bus
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn registry(&self) -> &ApplicationRegistry {
        &self.registry
    }

    pub fn subscribe(
        &self,
        name: KernelEventName,
        callback: impl Fn(&KernelEvent) + 'static,
    ) -> KernelListener {
        self.bus.listen(name, callback)
    }

    pub fn unsubscribe(&self, name: KernelEventName, listener: &KernelListener) {
        self.bus.off(name, listener);
    }

    /// Opens a focused window on top of the stack and returns its id.
    ///
    /// A missing registry entry is not fatal: the default configuration is used.
    pub fn create_window(&self, request: CreateWindowRequest) -> WindowId {
        let app = self.registry.resolve(&request.application_id);
        let size_limits = SizeLimits {
            min: app.min_size,
            max: app.max_size.unwrap_or(SizeLimits::default().max),
        };
        let size = size_limits.clamp(request.size.unwrap_or(app.default_size));
        let capabilities = WindowCapabilities {
            can_resize: request.can_resize.unwrap_or(app.can_resize),
            can_minimize: app.can_minimize,
            can_maximize: app.can_maximize,
        };

        let (window_id, events) = {
            let mut state = self.state.borrow_mut();
            let position = request.position.unwrap_or_else(|| {
                placement::next_position(
                    state.last_created_position,
                    &app,
                    size,
                    self.config.viewport,
                    self.config.cascade_step,
                )
            });
            if let Some(existing) = state.window_for_process(request.process_id) {
                logging::warn!(
                    "{} is already correlated with {}; opening another window for it",
                    request.process_id,
                    existing.id
                );
            }
            let window_id = WindowId(state.next_window_id);
            let new_window = NewWindow {
                title: request.title.unwrap_or_else(|| app.title.clone()),
                icon_id: request.icon_id.unwrap_or_else(|| app.icon_id.clone()),
                application_id: request.application_id,
                process_id: request.process_id,
                position,
                size,
                capabilities,
                size_limits,
            };
            let events = reduce_window(&mut state, WindowAction::Create(new_window))
                .unwrap_or_else(|err| {
                    logging::error!("window create rejected: {err}");
                    Vec::new()
                });
            self.check_invariants(&state);
            (window_id, events)
        };

        self.publish_all(events);
        window_id
    }

    /// Closes a window; the most recently focused remaining window takes focus.
    pub fn close_window(&self, window_id: WindowId) {
        self.apply(WindowAction::Close { window_id });
    }

    /// Focuses, un-minimizes, and raises a window.
    pub fn focus_window(&self, window_id: WindowId) {
        self.apply(WindowAction::Focus { window_id });
    }

    /// # Errors
    ///
    /// Returns [`KernelError::UnsupportedTransition`] when the window cannot be minimized.
    pub fn minimize_window(&self, window_id: WindowId) -> Result<(), KernelError> {
        self.require(window_id, Transition::Minimize)?;
        self.dispatch(WindowAction::Minimize { window_id })
    }

    /// Marks the window maximized; the presentation layer fills the viewport.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::UnsupportedTransition`] when the window cannot be maximized.
    pub fn maximize_window(&self, window_id: WindowId) -> Result<(), KernelError> {
        self.require(window_id, Transition::Maximize)?;
        self.dispatch(WindowAction::Maximize { window_id })
    }

    /// Clears minimized and maximized flags. Does not focus the window.
    pub fn restore_window(&self, window_id: WindowId) {
        self.apply(WindowAction::Restore { window_id });
    }

    pub fn move_window(&self, window_id: WindowId, position: Position) {
        self.apply(WindowAction::Move {
            window_id,
            position,
        });
    }

    /// # Errors
    ///
    /// Returns [`KernelError::UnsupportedTransition`] when the window is not resizable.
    pub fn resize_window(&self, window_id: WindowId, size: Size) -> Result<(), KernelError> {
        self.require(window_id, Transition::Resize)?;
        self.dispatch(WindowAction::Resize { window_id, size })
    }

    pub fn can_resize(&self, window_id: WindowId) -> bool {
        self.capability(window_id, Transition::Resize)
    }

    pub fn can_minimize(&self, window_id: WindowId) -> bool {
        self.capability(window_id, Transition::Minimize)
    }

    pub fn can_maximize(&self, window_id: WindowId) -> bool {
        self.capability(window_id, Transition::Maximize)
    }

    pub fn get_window(&self, window_id: WindowId) -> Option<WindowRecord> {
        self.state.borrow().window(window_id).cloned()
    }

    /// All open windows in creation order.
    pub fn get_all_windows(&self) -> Vec<WindowRecord> {
        self.state.borrow().windows.values().cloned().collect()
    }

    pub fn get_active_window(&self) -> Option<WindowRecord> {
        self.state.borrow().active_window().cloned()
    }

    /// All open windows, bottom of the stack first.
    pub fn windows_by_z_order(&self) -> Vec<WindowRecord> {
        self.state
            .borrow()
            .windows_by_z_order()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn window_for_process(&self, process_id: ProcessId) -> Option<WindowRecord> {
        self.state.borrow().window_for_process(process_id).cloned()
    }

    /// Focus history, oldest first.
    pub fn focus_history(&self) -> Vec<WindowId> {
        self.state.borrow().focus_history.as_slice().to_vec()
    }

    /// Copy of the whole store.
    pub fn snapshot(&self) -> WindowState {
        self.state.borrow().clone()
    }

    /// The store as JSON, for devtools and debug overlays.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the store cannot be represented as JSON.
    pub fn snapshot_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&*self.state.borrow())
    }

    /// Applies an action whose only failure mode is a stale id.
    pub(crate) fn apply(&self, action: WindowAction) {
        if let Err(err) = self.dispatch(action) {
            logging::warn!("window action rejected: {err}");
        }
    }

    pub(crate) fn dispatch(&self, action: WindowAction) -> Result<(), KernelError> {
        let result = {
            let mut state = self.state.borrow_mut();
            let result = reduce_window(&mut state, action);
            self.check_invariants(&state);
            result
        };

        match result {
            Ok(events) => {
                self.publish_all(events);
                Ok(())
            }
            Err(ReducerError::WindowNotFound(window_id)) => {
                self.report_stale_id(window_id);
                Ok(())
            }
            Err(ReducerError::UnsupportedTransition {
                window_id,
                transition,
            }) => Err(KernelError::UnsupportedTransition {
                window_id,
                transition,
            }),
        }
    }

    pub(crate) fn publish(&self, event: KernelEvent) {
        self.publish_all(vec![event]);
    }

    /// Queues `events` and delivers the queue unless a delivery is already running further up
    /// the stack, in which case that loop picks them up.
    fn publish_all(&self, events: Vec<KernelEvent>) {
        self.outbox.borrow_mut().extend(events);
        if self.delivering.replace(true) {
            return;
        }
        loop {
            let next = self.outbox.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            self.bus.emit(event.name(), &event);
        }
        self.delivering.set(false);
    }

    fn capability(&self, window_id: WindowId, transition: Transition) -> bool {
        self.state
            .borrow()
            .window(window_id)
            .is_some_and(|window| allows(&window.capabilities, transition))
    }

    fn require(&self, window_id: WindowId, transition: Transition) -> Result<(), KernelError> {
        let allowed = self
            .state
            .borrow()
            .window(window_id)
            .map(|window| allows(&window.capabilities, transition));
        match allowed {
            Some(false) => Err(KernelError::UnsupportedTransition {
                window_id,
                transition,
            }),
            // Unknown ids fall through to the reducer, which reports them as stale.
            _ => Ok(()),
        }
    }

    fn report_stale_id(&self, window_id: WindowId) {
        if self.config.diagnostics.warn_on_stale_ids {
            logging::warn!("ignoring operation on unknown {window_id}");
        } else {
            logging::debug_warn!("ignoring operation on unknown {window_id}");
        }
    }

    fn check_invariants(&self, state: &WindowState) {
        if cfg!(debug_assertions) {
            if let Err(violation) = validate_invariants(state) {
                logging::error!("window store invariant violated: {violation}");
            }
        }
    }
}

fn allows(capabilities: &WindowCapabilities, transition: Transition) -> bool {
    match transition {
        Transition::Minimize => capabilities.can_minimize,
        Transition::Maximize => capabilities.can_maximize,
        Transition::Resize => capabilities.can_resize,
    }
}
