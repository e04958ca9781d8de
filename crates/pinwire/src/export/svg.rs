//! SVG rendering of layout results.
//!
//! Everything here is presentation: the layout result is pure geometry,
//! and this module decides colors, corner rounding, curve fitting, labels,
//! and the legend. Pin roles are consulted here and only here, to pick
//! default wire colors.

use std::{fs::File, io::Write as _, path::Path};

use log::{debug, error, info};
use svg::{
    Document,
    node::element::{Circle, Group, Path as SvgPath, Rectangle, Text},
};

use crate::{
    config::StyleConfig,
    export::{self, Exporter},
    geometry::Point,
    layout::{LayoutResult, PlacedDevice, ResolvedStyle, RoutedWire, canvas},
    model::{Board, Connection, Diagram, PinRef, PinRole},
};

const CORNER_RADIUS: f32 = 6.0;
const WIRE_WIDTH: f32 = 2.0;
const BOARD_FILL: &str = "#2d6a4f";
const DEVICE_FILL: &str = "#4a4e69";
const PIN_FILL: &str = "#ffd166";
const LABEL_COLOR: &str = "#f1faee";
const LEGEND_TEXT_COLOR: &str = "#343a40";

/// SVG exporter.
pub struct Svg {
    style: StyleConfig,
}

impl Default for Svg {
    fn default() -> Self {
        Self::new()
    }
}

impl Svg {
    pub fn new() -> Self {
        Self {
            style: StyleConfig::default(),
        }
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    /// Builds the SVG document for a laid-out diagram.
    pub fn render_document(&self, diagram: &Diagram, layout: &LayoutResult) -> Document {
        let size = layout.canvas_size();
        let mut document = Document::new()
            .set("width", size.width())
            .set("height", size.height())
            .set("viewBox", (0.0, 0.0, size.width(), size.height()));

        if let Some(color) = self.style.background_color() {
            document = document.add(
                Rectangle::new()
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", color),
            );
        }

        document = document.add(self.render_board(diagram.board()));

        for placement in layout.placed_devices() {
            document = document.add(self.render_device(diagram, placement));
        }

        for wire in layout.routed_wires() {
            document = document.add(self.render_wire(diagram, wire));
        }

        if diagram.show_legend() {
            document = document.add(self.render_legend(diagram, layout));
        }

        debug!("SVG document rendered");
        document
    }

    fn render_board(&self, board: &Board) -> Group {
        let mut group = Group::new().add(
            Rectangle::new()
                .set("x", 0.0)
                .set("y", 0.0)
                .set("width", board.width())
                .set("height", board.height())
                .set("rx", 4.0)
                .set("fill", BOARD_FILL),
        );

        group = group.add(
            Text::new(board.name())
                .set("x", 8.0)
                .set("y", 18.0)
                .set("font-family", "Arial")
                .set("font-size", 12)
                .set("fill", LABEL_COLOR),
        );

        for pin in board.pins() {
            let position = pin.position();
            group = group.add(
                Circle::new()
                    .set("cx", position.x())
                    .set("cy", position.y())
                    .set("r", 2.5)
                    .set("fill", PIN_FILL),
            );
            group = group.add(
                Text::new(pin.index().to_string())
                    .set("x", position.x() - 6.0)
                    .set("y", position.y() + 3.0)
                    .set("text-anchor", "end")
                    .set("font-family", "Arial")
                    .set("font-size", 8)
                    .set("fill", LABEL_COLOR),
            );
        }

        group
    }

    fn render_device(&self, diagram: &Diagram, placement: &PlacedDevice) -> Group {
        let device = &diagram.devices()[placement.device()];
        let origin = placement.origin();

        let mut group = Group::new().add(
            Rectangle::new()
                .set("x", origin.x())
                .set("y", origin.y())
                .set("width", device.width())
                .set("height", device.height())
                .set("rx", 3.0)
                .set("fill", device.color().unwrap_or(DEVICE_FILL)),
        );

        group = group.add(
            Text::new(device.name())
                .set("x", origin.x() + device.width() / 2.0)
                .set("y", origin.y() + device.height() / 2.0)
                .set("text-anchor", "middle")
                .set("dominant-baseline", "middle")
                .set("font-family", "Arial")
                .set("font-size", 10)
                .set("fill", LABEL_COLOR),
        );

        for pin in device.pins() {
            let position = placement.pin_position(pin);
            group = group.add(
                Circle::new()
                    .set("cx", position.x())
                    .set("cy", position.y())
                    .set("r", 2.0)
                    .set("fill", PIN_FILL),
            );
        }

        group
    }

    fn render_wire(&self, diagram: &Diagram, wire: &RoutedWire) -> SvgPath {
        let connection = &diagram.connections()[wire.connection()];
        let data = match wire.style() {
            ResolvedStyle::Orthogonal => orthogonal_path_data(wire.points()),
            ResolvedStyle::Curved => curved_path_data(wire.points()),
        };

        SvgPath::new()
            .set("d", data)
            .set("fill", "none")
            .set("stroke", wire_color(diagram, connection))
            .set("stroke-width", WIRE_WIDTH)
            .set("stroke-linecap", "round")
    }

    fn render_legend(&self, diagram: &Diagram, layout: &LayoutResult) -> Group {
        let panel = canvas::legend_panel_size(diagram);
        let top = layout.canvas_size().height() - panel.height();

        let mut group = Group::new()
            .add(
                Rectangle::new()
                    .set("x", 4.0)
                    .set("y", top)
                    .set("width", panel.width())
                    .set("height", panel.height())
                    .set("rx", 3.0)
                    .set("fill", "#e9ecef"),
            )
            .add(
                Text::new("Connections")
                    .set("x", 12.0)
                    .set("y", top + 16.0)
                    .set("font-family", "Arial")
                    .set("font-size", 11)
                    .set("font-weight", "bold")
                    .set("fill", LEGEND_TEXT_COLOR),
            );

        for (index, connection) in diagram.connections().iter().enumerate() {
            let y = top + canvas::LEGEND_HEADER_HEIGHT + index as f32 * canvas::LEGEND_ROW_HEIGHT;

            // Color swatch matching the drawn wire
            group = group.add(
                Rectangle::new()
                    .set("x", 12.0)
                    .set("y", y + 3.0)
                    .set("width", 10.0)
                    .set("height", 4.0)
                    .set("fill", wire_color(diagram, connection)),
            );
            group = group.add(
                Text::new(format!("{} \u{2192} {}", connection.from(), connection.to()))
                    .set("x", 28.0)
                    .set("y", y + 9.0)
                    .set("font-family", "Arial")
                    .set("font-size", 9)
                    .set("fill", LEGEND_TEXT_COLOR),
            );
        }

        group
    }

    /// Writes an SVG document to the specified file
    pub fn write_document(&self, document: Document, path: &Path) -> Result<(), export::Error> {
        info!(path = path.display().to_string(); "Creating SVG file");
        let file = match File::create(path) {
            Ok(file) => file,
            Err(err) => {
                error!(path = path.display().to_string(), err:err; "Failed to create SVG file");
                return Err(export::Error::Io(err));
            }
        };

        if let Err(err) = write!(&file, "{document}") {
            error!(path = path.display().to_string(), err:err; "Failed to write SVG content");
            return Err(export::Error::Io(err));
        }

        Ok(())
    }
}

impl Exporter for Svg {
    fn export_layout(
        &self,
        diagram: &Diagram,
        layout: &LayoutResult,
        path: &Path,
    ) -> Result<(), export::Error> {
        let document = self.render_document(diagram, layout);
        self.write_document(document, path)
    }
}

/// Picks the stroke color for a connection: its explicit color hint, or a
/// default derived from the source pin's role.
fn wire_color(diagram: &Diagram, connection: &Connection) -> String {
    if let Some(color) = connection.color() {
        return color.to_string();
    }

    let role = match diagram.resolve_endpoint(connection.from()) {
        Some(PinRef::Board(pin)) => pin.role(),
        Some(PinRef::Device { pin, .. }) => pin.role(),
        None => PinRole::Other,
    };
    role_color(role).to_string()
}

fn role_color(role: PinRole) -> &'static str {
    match role {
        PinRole::Power => "#d62828",
        PinRole::Ground => "#1d3557",
        PinRole::Gpio => "#2a9d8f",
        PinRole::I2c => "#7b2cbf",
        PinRole::Spi => "#e76f51",
        PinRole::Uart => "#ff9f1c",
        PinRole::Pwm => "#3a86ff",
        PinRole::Other => "#6c757d",
    }
}

/// Creates orthogonal path data with small rounded corners at each
/// interior waypoint. The router only emits straight-segment waypoints;
/// rounding is purely cosmetic.
pub fn orthogonal_path_data(points: &[Point]) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    let mut data = format!("M {} {}", first.x(), first.y());

    for window in points.windows(3) {
        let &[prev, corner, next] = window else {
            continue;
        };
        let approach = point_toward(corner, prev, corner_radius(prev, corner));
        let exit = point_toward(corner, next, corner_radius(corner, next));
        data.push_str(&format!(
            " L {} {} Q {} {}, {} {}",
            approach.x(),
            approach.y(),
            corner.x(),
            corner.y(),
            exit.x(),
            exit.y()
        ));
    }

    if points.len() > 1 {
        let last = points[points.len() - 1];
        data.push_str(&format!(" L {} {}", last.x(), last.y()));
    }
    data
}

/// Creates a smooth cubic path through the four routing waypoints, using
/// the rail entry and exit as control points.
pub fn curved_path_data(points: &[Point]) -> String {
    if let &[source, rail_in, rail_out, dest] = points {
        return format!(
            "M {} {} C {} {}, {} {}, {} {}",
            source.x(),
            source.y(),
            rail_in.x(),
            rail_in.y(),
            rail_out.x(),
            rail_out.y(),
            dest.x(),
            dest.y()
        );
    }

    // Fallback for unexpected waypoint counts: straight segments
    orthogonal_path_data(points)
}

fn corner_radius(a: Point, b: Point) -> f32 {
    let length = (b.x() - a.x()).hypot(b.y() - a.y());
    CORNER_RADIUS.min(length / 2.0)
}

fn point_toward(from: Point, to: Point, distance: f32) -> Point {
    let dx = to.x() - from.x();
    let dy = to.y() - from.y();
    let length = dx.hypot(dy);
    if length == 0.0 {
        from
    } else {
        Point::new(
            from.x() + dx / length * distance,
            from.y() + dy / length * distance,
        )
    }
}
