//! Process-lifecycle passthrough.
//!
//! Processes are owned by the external process manager. The kernel only records the process id on
//! each window and republishes the manager's lifecycle signals on the kernel bus, tagged with the
//! correlated window when one is open.

use desktop_kernel_contract::{KernelEvent, ProcessId, ProcessResources, WindowId};
use serde::{Deserialize, Serialize};

use crate::window_service::WindowService;

/// Lifecycle signal reported by the process manager.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProcessSignal {
    Created,
    Terminated,
    Suspended,
    Resumed,
    ResourcesUpdated(ProcessResources),
}

/// Builds the kernel event that republishes `signal`.
pub fn process_event(
    process_id: ProcessId,
    window_id: Option<WindowId>,
    signal: ProcessSignal,
) -> KernelEvent {
    match signal {
        ProcessSignal::Created => KernelEvent::ProcessCreated {
            process_id,
            window_id,
        },
        ProcessSignal::Terminated => KernelEvent::ProcessTerminated {
            process_id,
            window_id,
        },
        ProcessSignal::Suspended => KernelEvent::ProcessSuspended {
            process_id,
            window_id,
        },
        ProcessSignal::Resumed => KernelEvent::ProcessResumed {
            process_id,
            window_id,
        },
        ProcessSignal::ResourcesUpdated(resources) => KernelEvent::ProcessResourcesUpdated {
            process_id,
            window_id,
            resources,
        },
    }
}

impl WindowService {
    /// Republishes a process-manager signal. Window state is never changed here; closing the
    /// window of a terminated process is the caller's decision.
    pub fn forward_process_event(&self, process_id: ProcessId, signal: ProcessSignal) {
        let window_id = self.state.borrow().window_for_process(process_id).map(|w| w.id);
        self.publish(process_event(process_id, window_id, signal));
    }

    /// Process correlated with `window_id`.
    pub fn process_for_window(&self, window_id: WindowId) -> Option<ProcessId> {
        self.state.borrow().window(window_id).map(|w| w.process_id)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use desktop_kernel_contract::{ApplicationId, KernelEventName};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{apps::ApplicationRegistry, config::KernelConfig, window_service::CreateWindowRequest};

    #[test]
    fn forwarded_events_carry_correlated_window() {
        let service = WindowService::new(ApplicationRegistry::builtin(), KernelConfig::default());
        let window_id = service.create_window(CreateWindowRequest::new(
            ApplicationId::trusted("desktop.nft-auction"),
            ProcessId(11),
        ));
        let seen = Rc::new(RefCell::new(Vec::new()));
        for name in [
            KernelEventName::ProcessSuspended,
            KernelEventName::ProcessResourcesUpdated,
        ] {
            let seen = Rc::clone(&seen);
            service.subscribe(name, move |event| seen.borrow_mut().push(event.clone()));
        }

        service.forward_process_event(ProcessId(11), ProcessSignal::Suspended);
        let resources = ProcessResources {
            memory_bytes: 4096,
            cpu_percent: 1.5,
        };
        service.forward_process_event(ProcessId(12), ProcessSignal::ResourcesUpdated(resources));

        assert_eq!(
            *seen.borrow(),
            vec![
                KernelEvent::ProcessSuspended {
                    process_id: ProcessId(11),
                    window_id: Some(window_id),
                },
                KernelEvent::ProcessResourcesUpdated {
                    process_id: ProcessId(12),
                    window_id: None,
                    resources,
                },
            ]
        );
        assert_eq!(service.process_for_window(window_id), Some(ProcessId(11)));
    }

    #[test]
    fn termination_does_not_close_the_window() {
        let service = WindowService::new(ApplicationRegistry::builtin(), KernelConfig::default());
        let window_id = service.create_window(CreateWindowRequest::new(
            ApplicationId::trusted("desktop.explorer"),
            ProcessId(5),
        ));

        service.forward_process_event(ProcessId(5), ProcessSignal::Terminated);

        assert!(service.get_window(window_id).is_some());
    }

    #[test]
    fn every_signal_maps_to_a_process_event() {
        let signals = [
            ProcessSignal::Created,
            ProcessSignal::Terminated,
            ProcessSignal::Suspended,
            ProcessSignal::Resumed,
            ProcessSignal::ResourcesUpdated(ProcessResources::default()),
        ];
        for signal in signals {
            let event = process_event(ProcessId(1), None, signal);
            assert!(event.name().is_process_event());
        }
    }
}
