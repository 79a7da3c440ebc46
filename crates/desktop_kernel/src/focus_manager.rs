//! Most-recently-used focus policy layered over [`WindowService`].
//!
//! The history itself lives in the window store so that closing a window drops it from both the
//! window table and the history in one transition. This type owns the policy operations over it:
//! alt-tab style switching, blurring, and clearing focus. Unknown ids are ignored.

use desktop_kernel_contract::WindowId;

use crate::{model::WindowRecord, reducer::WindowAction, window_service::WindowService};

#[derive(Clone)]
pub struct FocusManager {
    service: WindowService,
}

impl FocusManager {
    pub fn new(service: WindowService) -> Self {
        Self { service }
    }

    /// Focuses `window_id` and moves it to the most-recent end of the history.
    pub fn focus(&self, window_id: WindowId) {
        self.service.focus_window(window_id);
    }

    /// Drops `window_id` from the history without changing which window the store has focused.
    pub fn blur(&self, window_id: WindowId) {
        self.service.apply(WindowAction::Blur { window_id });
    }

    /// Alternates between the two most recently focused windows.
    ///
    /// History `[A, B]` with `B` focused becomes `[B, A]` with `A` focused. No-op below two entries.
    pub fn switch_focus(&self) {
        self.service.apply(WindowAction::SwitchFocus);
    }

    /// Focuses the second most recent window, leaving older entries in place.
    pub fn focus_previous(&self) {
        self.service.apply(WindowAction::FocusPrevious);
    }

    /// Unfocuses the focused window without choosing a replacement.
    pub fn clear_focus(&self) {
        self.service.apply(WindowAction::ClearFocus);
    }

    pub fn get_focused_window(&self) -> Option<WindowRecord> {
        self.service.get_active_window()
    }

    /// Oldest first; the last entry is the most recently focused window.
    pub fn get_focus_history(&self) -> Vec<WindowId> {
        self.service.focus_history()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use desktop_kernel_contract::{ApplicationId, KernelEvent, KernelEventName, ProcessId};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{apps::ApplicationRegistry, config::KernelConfig, window_service::CreateWindowRequest};

    fn setup() -> (WindowService, FocusManager) {
        let service = WindowService::new(ApplicationRegistry::builtin(), KernelConfig::default());
        let focus = FocusManager::new(service.clone());
        (service, focus)
    }

    fn open(service: &WindowService, pid: u64) -> WindowId {
        service.create_window(CreateWindowRequest::new(
            ApplicationId::trusted("desktop.messenger"),
            ProcessId(pid),
        ))
    }

    #[test]
    fn focus_moves_window_to_end_of_history() {
        let (service, focus) = setup();
        let a = open(&service, 1);
        let b = open(&service, 2);
        let c = open(&service, 3);

        focus.focus(a);

        assert_eq!(focus.get_focus_history(), vec![b, c, a]);
        assert_eq!(focus.get_focused_window().map(|w| w.id), Some(a));
    }

    #[test]
    fn switch_focus_alternates_between_two_windows() {
        let (service, focus) = setup();
        let a = open(&service, 1);
        let b = open(&service, 2);

        focus.switch_focus();
        assert_eq!(focus.get_focus_history(), vec![b, a]);
        assert_eq!(focus.get_focused_window().map(|w| w.id), Some(a));

        focus.switch_focus();
        assert_eq!(focus.get_focus_history(), vec![a, b]);
        assert_eq!(focus.get_focused_window().map(|w| w.id), Some(b));
    }

    #[test]
    fn switch_focus_with_single_entry_is_a_noop() {
        let (service, focus) = setup();
        let only = open(&service, 1);
        let before = service.snapshot();

        focus.switch_focus();

        assert_eq!(service.snapshot(), before);
        assert_eq!(focus.get_focused_window().map(|w| w.id), Some(only));
    }

    #[test]
    fn focus_previous_keeps_older_entries_in_place() {
        let (service, focus) = setup();
        let a = open(&service, 1);
        let b = open(&service, 2);
        let c = open(&service, 3);

        focus.focus_previous();

        assert_eq!(focus.get_focus_history(), vec![a, c, b]);
        assert_eq!(focus.get_focused_window().map(|w| w.id), Some(b));
    }

    #[test]
    fn blur_removes_entry_without_refocusing() {
        let (service, focus) = setup();
        let a = open(&service, 1);
        let b = open(&service, 2);

        focus.blur(b);

        assert_eq!(focus.get_focus_history(), vec![a]);
        assert_eq!(focus.get_focused_window().map(|w| w.id), Some(b));
    }

    #[test]
    fn clear_focus_emits_focus_cleared() {
        let (service, focus) = setup();
        let only = open(&service, 1);
        let cleared = Rc::new(RefCell::new(Vec::new()));
        {
            let cleared = Rc::clone(&cleared);
            service.subscribe(KernelEventName::FocusCleared, move |event| {
                cleared.borrow_mut().push(event.clone())
            });
        }

        focus.clear_focus();

        assert_eq!(
            *cleared.borrow(),
            vec![KernelEvent::FocusCleared {
                previous: Some(only),
            }]
        );
        assert!(focus.get_focused_window().is_none());
        assert!(!service.get_window(only).unwrap().is_focused);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let (service, focus) = setup();
        open(&service, 1);
        let before = service.snapshot();

        focus.focus(WindowId(77));
        focus.blur(WindowId(77));

        assert_eq!(service.snapshot(), before);
    }
}
