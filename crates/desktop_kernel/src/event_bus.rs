//! Synchronous publish/subscribe keyed by event name.
//!
//! Delivery happens inline during [`EventBus::emit`], in registration order, without buffering or
//! retries. Listeners registered twice are invoked twice. A panicking listener is logged and
//! skipped so the remaining listeners still run.

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
    panic::{catch_unwind, AssertUnwindSafe},
    rc::Rc,
};

use leptos::logging;

/// Shared listener handle. Keep the returned handle to unsubscribe later.
pub type Listener<P> = Rc<dyn Fn(&P)>;

/// Instance-scoped event bus; clones share the same listener table.
pub struct EventBus<K, P> {
    listeners: Rc<RefCell<HashMap<K, Vec<Listener<P>>>>>,
}

impl<K, P> Clone for EventBus<K, P> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<K, P> Default for EventBus<K, P> {
    fn default() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl<K, P> EventBus<K, P>
where
    K: Copy + Eq + Hash + Debug,
    P: 'static,
{
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `name` and returns it for later [`EventBus::off`] calls.
    pub fn on(&self, name: K, listener: Listener<P>) -> Listener<P> {
        self.listeners
            .borrow_mut()
            .entry(name)
            .or_default()
            .push(Rc::clone(&listener));
        listener
    }

    /// Wraps `callback` in a [`Listener`] and registers it.
    pub fn listen(&self, name: K, callback: impl Fn(&P) + 'static) -> Listener<P> {
        self.on(name, Rc::new(callback))
    }

    /// Removes the most recent registration of `listener` for `name`.
    ///
    /// Unknown listeners are ignored.
    pub fn off(&self, name: K, listener: &Listener<P>) {
        let mut table = self.listeners.borrow_mut();
        let Some(registered) = table.get_mut(&name) else {
            return;
        };
        if let Some(index) = registered
            .iter()
            .rposition(|candidate| same_listener(candidate, listener))
        {
            registered.remove(index);
        }
        if registered.is_empty() {
            table.remove(&name);
        }
    }

    /// Delivers `payload` to every listener registered for `name` at the time of the call.
    ///
    /// Returns the number of listeners that panicked.
    pub fn emit(&self, name: K, payload: &P) -> usize {
        // Snapshot first: listeners may subscribe, unsubscribe, or emit while we iterate.
        let snapshot: Vec<Listener<P>> = self
            .listeners
            .borrow()
            .get(&name)
            .cloned()
            .unwrap_or_default();

        let mut failures = 0;
        for listener in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(payload))).is_err() {
                failures += 1;
                logging::error!("event listener for {name:?} panicked; continuing delivery");
            }
        }
        failures
    }

    /// Number of registrations currently held for `name`.
    pub fn listener_count(&self, name: K) -> usize {
        self.listeners
            .borrow()
            .get(&name)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Drops every registration.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

fn same_listener<P>(a: &Listener<P>, b: &Listener<P>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}
