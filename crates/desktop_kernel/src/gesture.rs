//! Drag and resize gestures.
//!
//! A gesture attaches temporary pointer listeners when it starts and removes them on pointer-up,
//! on pointer-leave, or when its [`GestureSession`] guard is dropped, whichever comes first. All
//! three exits run the same detach routine.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use desktop_kernel_contract::{Position, Size, WindowId};
use leptos::logging;
use serde::{Deserialize, Serialize};

use crate::{
    error::KernelError,
    event_bus::{EventBus, Listener},
    model::SizeLimits,
    reducer::Transition,
    window_service::WindowService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerEventKind {
    Move,
    Up,
    Leave,
}

/// Bus the presentation layer feeds with global pointer samples.
pub type PointerBus = EventBus<PointerEventKind, Position>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeEdge {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeEdge {
    fn moves_west_edge(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    fn moves_north_edge(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }
}

/// Applies a pointer delta to the frame for the dragged edge or corner, keeping the opposite
/// edges fixed after clamping to `limits`.
pub fn resize_frame(
    position: Position,
    size: Size,
    edge: ResizeEdge,
    dx: i32,
    dy: i32,
    limits: SizeLimits,
) -> (Position, Size) {
    let grow_x = |by: i32| size.width.saturating_add(by);
    let grow_y = |by: i32| size.height.saturating_add(by);
    let raw = match edge {
        ResizeEdge::East => Size::new(grow_x(dx), size.height),
        ResizeEdge::West => Size::new(grow_x(dx.saturating_neg()), size.height),
        ResizeEdge::South => Size::new(size.width, grow_y(dy)),
        ResizeEdge::North => Size::new(size.width, grow_y(dy.saturating_neg())),
        ResizeEdge::NorthEast => Size::new(grow_x(dx), grow_y(dy.saturating_neg())),
        ResizeEdge::NorthWest => {
            Size::new(grow_x(dx.saturating_neg()), grow_y(dy.saturating_neg()))
        }
        ResizeEdge::SouthEast => Size::new(grow_x(dx), grow_y(dy)),
        ResizeEdge::SouthWest => Size::new(grow_x(dx.saturating_neg()), grow_y(dy)),
    };
    let clamped = limits.clamp(raw);

    // Opposite edges stay fixed.
    let x = if edge.moves_west_edge() {
        position
            .x
            .saturating_add(size.width.saturating_sub(clamped.width))
    } else {
        position.x
    };
    let y = if edge.moves_north_edge() {
        position
            .y
            .saturating_add(size.height.saturating_sub(clamped.height))
    } else {
        position.y
    };
    (Position::new(x, y), clamped)
}

struct Attachment {
    pointer_bus: PointerBus,
    registrations: RefCell<Vec<(PointerEventKind, Listener<Position>)>>,
}

impl Attachment {
    fn detach(&self) {
        let registrations: Vec<_> = self.registrations.borrow_mut().drain(..).collect();
        for (kind, listener) in registrations {
            self.pointer_bus.off(kind, &listener);
        }
    }

    fn is_attached(&self) -> bool {
        !self.registrations.borrow().is_empty()
    }
}

/// Guard for an in-progress gesture. Dropping it detaches any listeners still attached.
#[must_use = "dropping the session ends the gesture"]
pub struct GestureSession {
    window_id: WindowId,
    attachment: Rc<Attachment>,
}

impl GestureSession {
    /// Starts dragging `window_id` from `pointer`. Focuses the window first.
    ///
    /// Returns `None` for unknown windows.
    pub fn begin_move(
        service: &WindowService,
        pointer_bus: &PointerBus,
        window_id: WindowId,
        pointer: Position,
    ) -> Option<Self> {
        let start = service.get_window(window_id)?.position;
        service.focus_window(window_id);

        let service = service.clone();
        Some(Self::attach(pointer_bus, window_id, move |current: &Position| {
            let maximized = service
                .get_window(window_id)
                .map(|w| w.is_maximized)
                .unwrap_or(true);
            if maximized {
                return;
            }
            let dx = current.x.saturating_sub(pointer.x);
            let dy = current.y.saturating_sub(pointer.y);
            service.move_window(window_id, start.offset(dx, dy));
        }))
    }

    /// Starts resizing `window_id` from `edge`. Focuses the window first.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::UnsupportedTransition`] for windows that are not resizable, before
    /// any listener is attached.
    pub fn begin_resize(
        service: &WindowService,
        pointer_bus: &PointerBus,
        window_id: WindowId,
        edge: ResizeEdge,
        pointer: Position,
    ) -> Result<Option<Self>, KernelError> {
        let Some(window) = service.get_window(window_id) else {
            return Ok(None);
        };
        if !window.capabilities.can_resize {
            return Err(KernelError::UnsupportedTransition {
                window_id,
                transition: Transition::Resize,
            });
        }
        service.focus_window(window_id);

        let service = service.clone();
        let (start_position, start_size, limits) =
            (window.position, window.size, window.size_limits);
        Ok(Some(Self::attach(
            pointer_bus,
            window_id,
            move |current: &Position| {
                let maximized = service
                    .get_window(window_id)
                    .map(|w| w.is_maximized)
                    .unwrap_or(true);
                if maximized {
                    return;
                }
                let (position, size) = resize_frame(
                    start_position,
                    start_size,
                    edge,
                    current.x.saturating_sub(pointer.x),
                    current.y.saturating_sub(pointer.y),
                    limits,
                );
                if edge.moves_west_edge() || edge.moves_north_edge() {
                    service.move_window(window_id, position);
                }
                if let Err(err) = service.resize_window(window_id, size) {
                    logging::warn!("resize gesture rejected: {err}");
                }
            },
        )))
    }

    fn attach(
        pointer_bus: &PointerBus,
        window_id: WindowId,
        on_move: impl Fn(&Position) + 'static,
    ) -> Self {
        let attachment = Rc::new(Attachment {
            pointer_bus: pointer_bus.clone(),
            registrations: RefCell::new(Vec::new()),
        });

        let mut registrations = vec![(
            PointerEventKind::Move,
            pointer_bus.listen(PointerEventKind::Move, on_move),
        )];
        for kind in [PointerEventKind::Up, PointerEventKind::Leave] {
            let weak: Weak<Attachment> = Rc::downgrade(&attachment);
            let listener = pointer_bus.listen(kind, move |_| {
                if let Some(attachment) = weak.upgrade() {
                    attachment.detach();
                }
            });
            registrations.push((kind, listener));
        }
        *attachment.registrations.borrow_mut() = registrations;

        Self {
            window_id,
            attachment,
        }
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    /// Whether pointer listeners are still attached.
    pub fn is_active(&self) -> bool {
        self.attachment.is_attached()
    }

    /// Ends the gesture immediately.
    pub fn end(self) {}
}

impl Drop for GestureSession {
    fn drop(&mut self) {
        self.attachment.detach();
    }
}

#[cfg(test)]
mod tests {
    use desktop_kernel_contract::{ApplicationId, ProcessId};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{apps::ApplicationRegistry, config::KernelConfig, window_service::CreateWindowRequest};

    fn setup(app: &str) -> (WindowService, PointerBus, WindowId) {
        let service = WindowService::new(ApplicationRegistry::builtin(), KernelConfig::default());
        let pointer_bus = PointerBus::new();
        let window_id = service.create_window(
            CreateWindowRequest::new(ApplicationId::trusted(app), ProcessId(1))
                .with_position(Position::new(100, 100))
                .with_size(Size::new(400, 300)),
        );
        (service, pointer_bus, window_id)
    }

    fn listener_total(bus: &PointerBus) -> usize {
        [
            PointerEventKind::Move,
            PointerEventKind::Up,
            PointerEventKind::Leave,
        ]
        .into_iter()
        .map(|kind| bus.listener_count(kind))
        .sum()
    }

    #[test]
    fn drag_moves_window_until_pointer_up() {
        let (service, bus, window_id) = setup("desktop.explorer");
        let session = GestureSession::begin_move(&service, &bus, window_id, Position::new(10, 10))
            .expect("window exists");

        bus.emit(PointerEventKind::Move, &Position::new(35, 50));
        assert_eq!(
            service.get_window(window_id).unwrap().position,
            Position::new(125, 140)
        );

        bus.emit(PointerEventKind::Up, &Position::new(35, 50));
        assert!(!session.is_active());
        assert_eq!(listener_total(&bus), 0);

        bus.emit(PointerEventKind::Move, &Position::new(500, 500));
        assert_eq!(
            service.get_window(window_id).unwrap().position,
            Position::new(125, 140)
        );
    }

    #[test]
    fn dropping_session_detaches_listeners() {
        let (service, bus, window_id) = setup("desktop.explorer");
        {
            let _session =
                GestureSession::begin_move(&service, &bus, window_id, Position::new(0, 0))
                    .expect("window exists");
            assert_eq!(listener_total(&bus), 3);
        }
        assert_eq!(listener_total(&bus), 0);
    }

    #[test]
    fn pointer_leave_ends_gesture() {
        let (service, bus, window_id) = setup("desktop.explorer");
        let session = GestureSession::begin_move(&service, &bus, window_id, Position::new(0, 0))
            .expect("window exists");

        bus.emit(PointerEventKind::Leave, &Position::new(0, 0));

        assert!(!session.is_active());
        assert_eq!(listener_total(&bus), 0);
        session.end();
    }

    #[test]
    fn maximized_window_does_not_follow_drag() {
        let (service, bus, window_id) = setup("desktop.explorer");
        service.maximize_window(window_id).unwrap();
        let _session = GestureSession::begin_move(&service, &bus, window_id, Position::new(0, 0))
            .expect("window exists");

        bus.emit(PointerEventKind::Move, &Position::new(50, 50));

        assert_eq!(
            service.get_window(window_id).unwrap().position,
            Position::new(100, 100)
        );
    }

    #[test]
    fn north_west_resize_keeps_opposite_corner_fixed() {
        let (service, bus, window_id) = setup("desktop.explorer");
        let _session = GestureSession::begin_resize(
            &service,
            &bus,
            window_id,
            ResizeEdge::NorthWest,
            Position::new(100, 100),
        )
        .unwrap()
        .expect("window exists");

        bus.emit(PointerEventKind::Move, &Position::new(80, 60));

        let window = service.get_window(window_id).unwrap();
        assert_eq!(window.position, Position::new(80, 60));
        assert_eq!(window.size, Size::new(420, 340));
    }

    #[test]
    fn resize_is_clamped_to_minimum_size() {
        let limits = SizeLimits::default();
        let (position, size) = resize_frame(
            Position::new(100, 100),
            Size::new(400, 300),
            ResizeEdge::West,
            350,
            0,
            limits,
        );
        assert_eq!(size, Size::new(limits.min.width, 300));
        assert_eq!(position, Position::new(100 + 400 - limits.min.width, 100));
    }

    #[test]
    fn extreme_pointer_deltas_saturate() {
        let limits = SizeLimits::default();
        let (position, size) = resize_frame(
            Position::new(100, 100),
            Size::new(400, 300),
            ResizeEdge::NorthWest,
            i32::MIN,
            i32::MIN,
            limits,
        );
        assert_eq!(size, Size::new(i32::MAX, i32::MAX));
        assert_eq!(position, Position::new(500 - i32::MAX, 400 - i32::MAX));
    }

    #[test]
    fn non_resizable_window_rejects_resize_gesture() {
        let (service, bus, window_id) = setup("desktop.pixel-art");

        let result = GestureSession::begin_resize(
            &service,
            &bus,
            window_id,
            ResizeEdge::SouthEast,
            Position::new(0, 0),
        );

        assert!(matches!(
            result,
            Err(KernelError::UnsupportedTransition {
                transition: Transition::Resize,
                ..
            })
        ));
        assert_eq!(listener_total(&bus), 0);
    }

    #[test]
    fn unknown_window_starts_no_gesture() {
        let (service, bus, _) = setup("desktop.explorer");
        assert!(
            GestureSession::begin_move(&service, &bus, WindowId(404), Position::new(0, 0))
                .is_none()
        );
        assert_eq!(listener_total(&bus), 0);
    }
}
