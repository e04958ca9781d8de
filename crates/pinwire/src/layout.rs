//! The layout engine.
//!
//! [`layout`] sequences the full pipeline: validate the diagram, build the
//! connection graph, compute device tiers, position devices, route wires,
//! and size the canvas. It is a pure function of `(diagram, config)`: the
//! same inputs always produce a structurally identical [`LayoutResult`],
//! with no I/O and no shared mutable state, so independent diagrams may be
//! laid out concurrently without coordination.

pub mod canvas;
pub mod placement;
pub mod routing;

pub use placement::PlacedDevice;
pub use routing::{ResolvedStyle, RoutedWire};

use log::{debug, info};

use crate::{
    config::LayoutConfig, error::Error, geometry::Size, graph::ConnectionGraph, model::Diagram,
};

/// The complete geometric output of one layout pass.
///
/// Owns every derived record; the rendering layer holds a reference and
/// never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    placed_devices: Vec<PlacedDevice>,
    routed_wires: Vec<RoutedWire>,
    canvas_size: Size,
}

impl LayoutResult {
    pub fn placed_devices(&self) -> &[PlacedDevice] {
        &self.placed_devices
    }

    pub fn routed_wires(&self) -> &[RoutedWire] {
        &self.routed_wires
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    /// Returns the placement record for a device index, if it exists
    pub fn placement(&self, device: usize) -> Option<&PlacedDevice> {
        self.placed_devices
            .iter()
            .find(|placed| placed.device() == device)
    }
}

/// Lays out a diagram: tiered device placement, rail-routed wires, and a
/// tightly bounding canvas.
///
/// # Errors
///
/// * [`Error::UnresolvedEndpoint`] if a connection references a pin that
///   does not exist.
/// * [`Error::CycleDetected`] if device-to-device connections form a loop
///   with no board anchor.
/// * [`Error::InvalidTierPlacement`] if a device survives tier propagation
///   without a tier (internal guard, unreachable given correct tiering).
///
/// No error is caught or downgraded here; the caller decides presentation.
pub fn layout(diagram: &Diagram, config: &LayoutConfig) -> Result<LayoutResult, Error> {
    diagram.validate()?;
    info!(
        devices = diagram.devices().len(),
        connections = diagram.connections().len();
        "Laying out diagram"
    );

    let graph = ConnectionGraph::from_diagram(diagram)?;
    let depths = graph.compute_depths(diagram)?;

    let placed_devices = placement::place_devices(diagram, &depths, config)?;
    let routed_wires = routing::route_wires(diagram, &placed_devices, config)?;

    let panel = diagram
        .show_legend()
        .then(|| canvas::legend_panel_size(diagram));
    let canvas_size = canvas::compute_bounds(
        diagram,
        &placed_devices,
        &routed_wires,
        config.margin,
        panel,
    );
    debug!(
        width = canvas_size.width(),
        height = canvas_size.height();
        "Canvas sized"
    );

    Ok(LayoutResult {
        placed_devices,
        routed_wires,
        canvas_size,
    })
}
