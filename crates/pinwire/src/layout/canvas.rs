//! Canvas sizing.
//!
//! The canvas tightly bounds the board, every placed device, and every
//! routed wire (rails can run right of the rightmost device), plus a fixed
//! margin. An optional legend panel stacks below the main drawing with a
//! fixed gap; no iteration or negotiation is involved.

use crate::{
    geometry::{Bounds, Point, Size},
    model::Diagram,
};

use super::{PlacedDevice, RoutedWire};

/// Vertical gap between the main drawing and a stacked legend panel
pub const PANEL_GAP: f32 = 12.0;

pub const LEGEND_ROW_HEIGHT: f32 = 16.0;
pub const LEGEND_HEADER_HEIGHT: f32 = 24.0;
pub const LEGEND_WIDTH: f32 = 220.0;

/// Returns the size of the legend panel listing a diagram's connections
pub fn legend_panel_size(diagram: &Diagram) -> Size {
    Size::new(
        LEGEND_WIDTH,
        LEGEND_HEADER_HEIGHT + diagram.connections().len() as f32 * LEGEND_ROW_HEIGHT,
    )
}

/// Computes the final canvas size.
///
/// Width is the rightmost of board edge, device right edges, and wire
/// waypoints, plus the margin; height is analogous over y. A `panel`
/// (e.g. the legend) adds its height below the main canvas plus
/// [`PANEL_GAP`].
pub fn compute_bounds(
    diagram: &Diagram,
    placed: &[PlacedDevice],
    wires: &[RoutedWire],
    margin: f32,
    panel: Option<Size>,
) -> Size {
    let board = diagram.board();
    let mut bounds = Bounds::from_origin(
        Point::new(0.0, 0.0),
        Size::new(board.width(), board.height()),
    );

    for placement in placed {
        let device = &diagram.devices()[placement.device()];
        bounds = bounds.merge(&Bounds::from_origin(
            placement.origin(),
            Size::new(device.width(), device.height()),
        ));
    }

    for wire in wires {
        for &point in wire.points() {
            bounds = bounds.include_point(point);
        }
    }

    let mut width = bounds.max_x() + margin;
    let mut height = bounds.max_y() + margin;

    if let Some(panel) = panel {
        height += PANEL_GAP + panel.height();
        width = width.max(panel.width() + margin);
    }

    Size::new(width, height)
}
