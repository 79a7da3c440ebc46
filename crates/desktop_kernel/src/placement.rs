//! Deterministic placement for newly created windows.
//!
//! Explicit coordinates win. Otherwise each new window cascades down-right from the previously
//! created one and wraps back to its application's anchor once it would cross the viewport edge.

use desktop_kernel_contract::{Position, Size};

use crate::apps::{AppWindowConfig, PositionStrategy};

/// Computes where a window of `size` opens.
pub fn next_position(
    last_created: Option<Position>,
    app: &AppWindowConfig,
    size: Size,
    viewport: Size,
    cascade_step: i32,
) -> Position {
    if let Some(explicit) = app.explicit_position() {
        return explicit;
    }

    let anchor = anchor_position(app, size, viewport);
    let Some(last) = last_created else {
        return anchor;
    };

    let candidate = last.offset(cascade_step, cascade_step);
    if fits_within(candidate, size, viewport) {
        candidate
    } else {
        anchor
    }
}

/// Resolves the strategy anchor, inset by the app margins and kept on-screen.
pub fn anchor_position(app: &AppWindowConfig, size: Size, viewport: Size) -> Position {
    let margin = app.margin;
    let right = viewport.width - size.width - margin.x;
    let bottom = viewport.height - size.height - margin.y;
    let anchor = match app.position {
        PositionStrategy::Center => Position::new(
            (viewport.width - size.width) / 2,
            (viewport.height - size.height) / 2,
        ),
        PositionStrategy::TopLeft => Position::new(margin.x, margin.y),
        PositionStrategy::TopRight => Position::new(right, margin.y),
        PositionStrategy::BottomLeft => Position::new(margin.x, bottom),
        PositionStrategy::BottomRight => Position::new(right, bottom),
        PositionStrategy::Explicit { x, y } => Position::new(x, y),
    };
    Position::new(anchor.x.max(0), anchor.y.max(0))
}

fn fits_within(position: Position, size: Size, viewport: Size) -> bool {
    position.x >= 0
        && position.y >= 0
        && position.x.saturating_add(size.width) <= viewport.width
        && position.y.saturating_add(size.height) <= viewport.height
}
