use std::{cell::RefCell, rc::Rc};

use desktop_kernel::{
    ApplicationId, ApplicationRegistry, CreateWindowRequest, KernelConfig, KernelEvent,
    KernelEventName, ProcessId, ProcessSignal, WindowId, WindowKernel,
};
use pretty_assertions::assert_eq;

fn kernel() -> WindowKernel {
    WindowKernel::new(ApplicationRegistry::builtin(), KernelConfig::default())
}

fn open(kernel: &WindowKernel, app: &str, pid: u64) -> WindowId {
    kernel
        .windows
        .create_window(CreateWindowRequest::new(ApplicationId::trusted(app), ProcessId(pid)))
}

fn record_all(kernel: &WindowKernel) -> Rc<RefCell<Vec<KernelEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for name in KernelEventName::ALL {
        let log = Rc::clone(&log);
        kernel
            .windows
            .subscribe(name, move |event| log.borrow_mut().push(event.clone()));
    }
    log
}

fn focused(kernel: &WindowKernel) -> Option<WindowId> {
    kernel.windows.get_active_window().map(|w| w.id)
}

#[test]
fn three_window_session() {
    let kernel = kernel();
    let w1 = open(&kernel, "desktop.explorer", 1);
    let w2 = open(&kernel, "desktop.messenger", 2);
    let w3 = open(&kernel, "desktop.nft-auction", 3);

    let z = |id| kernel.windows.get_window(id).unwrap().z_index;
    assert!(z(w1) < z(w2) && z(w2) < z(w3));
    assert_eq!(focused(&kernel), Some(w3));

    kernel.focus.focus(w1);
    assert_eq!(focused(&kernel), Some(w1));
    assert_eq!(
        kernel.windows.windows_by_z_order().last().map(|w| w.id),
        Some(w1)
    );

    kernel.windows.close_window(w1);
    assert_eq!(focused(&kernel), Some(w3));
    let second = kernel.windows.get_window(w2).unwrap();
    assert!(!second.is_focused);

    kernel.windows.minimize_window(w3).unwrap();
    assert_eq!(focused(&kernel), Some(w2));
    assert_eq!(kernel.focus.get_focus_history(), vec![w2]);

    let before = kernel.windows.snapshot();
    kernel.focus.switch_focus();
    assert_eq!(kernel.windows.snapshot(), before);
}

#[test]
fn session_events_arrive_in_transition_order() {
    let kernel = kernel();
    let log = record_all(&kernel);

    let w1 = open(&kernel, "desktop.explorer", 1);
    let w2 = open(&kernel, "desktop.explorer", 2);
    kernel.windows.close_window(w2);

    let names: Vec<_> = log.borrow().iter().map(|e| e.name()).collect();
    assert_eq!(
        names,
        vec![
            KernelEventName::WindowCreated,
            KernelEventName::WindowFocused,
            KernelEventName::FocusChanged,
            KernelEventName::WindowCreated,
            KernelEventName::WindowFocused,
            KernelEventName::FocusChanged,
            KernelEventName::WindowClosed,
            KernelEventName::WindowFocused,
            KernelEventName::FocusChanged,
        ]
    );
    assert_eq!(
        log.borrow().last(),
        Some(&KernelEvent::FocusChanged {
            previous: Some(w2),
            current: Some(w1),
        })
    );
}

#[test]
fn every_create_yields_exactly_one_focused_window_on_top() {
    let kernel = kernel();
    let mut last_z = 0;

    for pid in 1..=8 {
        let id = open(&kernel, "desktop.explorer", pid);
        let windows = kernel.windows.get_all_windows();

        let focused: Vec<_> = windows.iter().filter(|w| w.is_focused).collect();
        assert_eq!(focused.len(), 1);
        assert_eq!(focused[0].id, id);
        assert!(focused[0].z_index > last_z);
        assert!(windows
            .iter()
            .filter(|w| w.id != id)
            .all(|w| w.z_index < focused[0].z_index));
        last_z = focused[0].z_index;
    }
}

#[test]
fn closing_the_last_window_clears_focus() {
    let kernel = kernel();
    let log = record_all(&kernel);
    let only = open(&kernel, "desktop.explorer", 1);

    kernel.windows.close_window(only);

    assert_eq!(focused(&kernel), None);
    assert!(kernel.focus.get_focus_history().is_empty());
    assert!(log
        .borrow()
        .contains(&KernelEvent::FocusCleared { previous: Some(only) }));
}

#[test]
fn focusing_a_minimized_window_restores_it() {
    let kernel = kernel();
    let w1 = open(&kernel, "desktop.explorer", 1);
    let w2 = open(&kernel, "desktop.explorer", 2);
    kernel.windows.minimize_window(w1).unwrap();

    kernel.focus.focus(w1);

    let window = kernel.windows.get_window(w1).unwrap();
    assert!(window.is_focused);
    assert!(!window.is_minimized);
    assert!(!kernel.windows.get_window(w2).unwrap().is_focused);
}

#[test]
fn process_termination_is_left_to_the_caller() {
    let kernel = kernel();
    let log = record_all(&kernel);
    let id = open(&kernel, "desktop.messenger", 40);
    let terminated = Rc::new(RefCell::new(None));
    {
        let terminated = Rc::clone(&terminated);
        let windows = kernel.windows.clone();
        kernel
            .windows
            .subscribe(KernelEventName::ProcessTerminated, move |event| {
                if let Some(window_id) = event.window_id() {
                    *terminated.borrow_mut() = Some(window_id);
                    windows.close_window(window_id);
                }
            });
    }

    kernel
        .windows
        .forward_process_event(ProcessId(40), ProcessSignal::Terminated);

    assert_eq!(*terminated.borrow(), Some(id));
    assert!(kernel.windows.get_window(id).is_none());
    assert!(log.borrow().contains(&KernelEvent::WindowClosed {
        window_id: id,
        process_id: ProcessId(40),
    }));
}
