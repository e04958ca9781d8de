//! Wire routing.
//!
//! Every wire travels horizontally from its source, vertically along a
//! shared rail x-coordinate, then horizontally into its destination. Wires
//! sharing a source pin form a bundle routed side by side; rails of
//! distinct bundles that overlap vertically are pushed apart until they
//! clear each other. Processing order is fixed by the connection list, so
//! routing the same input twice yields identical rail assignments.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::warn;

use crate::{
    config::LayoutConfig,
    error::Error,
    geometry::Point,
    model::{Diagram, Endpoint, WireStyle},
};

use super::PlacedDevice;

/// Cap on collision shifts for a single wire. Pathological inputs
/// (thousands of wires stacked on one pin) settle far to the right instead
/// of hanging.
const MAX_RAIL_SHIFTS: usize = 1024;

/// The concrete drawing style resolved for a single wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedStyle {
    Orthogonal,
    Curved,
}

/// A connection plus its computed waypoint path.
///
/// Created fresh every layout pass and never mutated afterwards. The path
/// always holds four waypoints: source, rail entry, rail exit,
/// destination.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedWire {
    connection: usize,
    points: Vec<Point>,
    style: ResolvedStyle,
}

impl RoutedWire {
    /// Returns the index of the connection in the diagram's list
    pub fn connection(&self) -> usize {
        self.connection
    }

    /// Returns the waypoint path from source to destination
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the resolved drawing style
    pub fn style(&self) -> ResolvedStyle {
        self.style
    }

    /// Returns the absolute source coordinate
    pub fn start(&self) -> Point {
        self.points[0]
    }

    /// Returns the absolute destination coordinate
    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Returns the rail x-coordinate the wire travels along
    pub fn rail_x(&self) -> f32 {
        self.points[1].x()
    }

    /// Returns the inclusive vertical travel range at the rail
    pub fn y_range(&self) -> (f32, f32) {
        let source_y = self.points[1].y();
        let dest_y = self.points[2].y();
        (source_y.min(dest_y), source_y.max(dest_y))
    }
}

/// An accepted rail with its vertical extent, kept for collision checks
/// against later wires.
#[derive(Debug, Clone, Copy)]
struct Rail {
    x: f32,
    y_min: f32,
    y_max: f32,
    bundle: usize,
}

/// Identity of a wire's source pin, used to group connections into
/// bundles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SourceKey {
    Board(u32),
    Device(String, String),
}

impl SourceKey {
    fn from_endpoint(endpoint: &Endpoint) -> Self {
        match endpoint {
            Endpoint::Board { board_pin } => Self::Board(*board_pin),
            Endpoint::Device { device, device_pin } => {
                Self::Device(device.clone(), device_pin.clone())
            }
        }
    }
}

/// Routes every connection in the diagram.
///
/// Bundles are processed in the order their source pin first appears in
/// the connection list; wires within a bundle are processed in order of
/// destination y (ties broken by connection order). The returned wires are
/// ordered by connection index.
///
/// # Errors
///
/// Returns [`Error::UnresolvedEndpoint`] for endpoints that fail to
/// resolve, and [`Error::InvalidTierPlacement`] if a referenced device has
/// no placement record.
pub fn route_wires(
    diagram: &Diagram,
    placed: &[PlacedDevice],
    config: &LayoutConfig,
) -> Result<Vec<RoutedWire>, Error> {
    let origins: HashMap<usize, Point> = placed
        .iter()
        .map(|placement| (placement.device(), placement.origin()))
        .collect();

    // Resolve every connection's absolute span up front
    let mut spans = Vec::with_capacity(diagram.connections().len());
    for (index, connection) in diagram.connections().iter().enumerate() {
        let source = endpoint_position(diagram, &origins, index, connection.from())?;
        let dest = endpoint_position(diagram, &origins, index, connection.to())?;
        spans.push((source, dest));
    }

    // Bundle by source pin, in order of first appearance
    let mut bundles: IndexMap<SourceKey, Vec<usize>> = IndexMap::new();
    for (index, connection) in diagram.connections().iter().enumerate() {
        bundles
            .entry(SourceKey::from_endpoint(connection.from()))
            .or_default()
            .push(index);
    }

    let mut rails: Vec<Rail> = Vec::new();
    let mut routed: Vec<RoutedWire> = Vec::with_capacity(spans.len());

    for (bundle, members) in bundles.values().enumerate() {
        // Fan out monotonically: sort by destination y, ties by
        // connection order
        let mut members = members.clone();
        members.sort_by(|&a, &b| spans[a].1.y().total_cmp(&spans[b].1.y()).then(a.cmp(&b)));

        for (offset, &index) in members.iter().enumerate() {
            let (source, dest) = spans[index];
            let rail_x = place_rail(&mut rails, source, dest, offset, bundle, config);

            let style = resolve_style(
                diagram.connections()[index]
                    .style()
                    .unwrap_or(config.wire_style),
                source,
                dest,
            );

            routed.push(RoutedWire {
                connection: index,
                points: vec![
                    source,
                    Point::new(rail_x, source.y()),
                    Point::new(rail_x, dest.y()),
                    dest,
                ],
                style,
            });
        }
    }

    routed.sort_by_key(RoutedWire::connection);
    Ok(routed)
}

/// Picks a rail x for one wire and records it in the used-rail set.
///
/// The candidate starts at a fixed offset from the source plus a small
/// per-wire increment within the bundle, then shifts right past any
/// previously accepted rail whose vertical range overlaps and whose x is
/// too close. Each shift strictly increases x, and the shift count is
/// capped; at the cap the current position is accepted as-is.
fn place_rail(
    rails: &mut Vec<Rail>,
    source: Point,
    dest: Point,
    offset: usize,
    bundle: usize,
    config: &LayoutConfig,
) -> f32 {
    // A purely horizontal wire collapses the range to a point but still
    // participates in collision bookkeeping.
    let y_min = source.y().min(dest.y());
    let y_max = source.y().max(dest.y());

    let mut x = source.x() + config.rail_offset + offset as f32 * config.bundle_spacing;
    let mut shifts = 0;

    loop {
        let conflict = rails.iter().find(|rail| {
            let overlaps = rail.y_max >= y_min && rail.y_min <= y_max;
            overlaps && (x - rail.x).abs() < required_spacing(rail.bundle, bundle, config)
        });

        let Some(rail) = conflict else { break };
        x = rail.x + required_spacing(rail.bundle, bundle, config);

        shifts += 1;
        if shifts >= MAX_RAIL_SHIFTS {
            warn!(shifts; "Rail shift cap reached, accepting current position");
            break;
        }
    }

    rails.push(Rail {
        x,
        y_min,
        y_max,
        bundle,
    });
    x
}

fn required_spacing(existing_bundle: usize, bundle: usize, config: &LayoutConfig) -> f32 {
    if existing_bundle == bundle {
        config.bundle_spacing
    } else {
        config.wire_spacing
    }
}

/// Resolves a wire style hint to a concrete style.
///
/// `Mixed` wires with more vertical travel than horizontal get curved,
/// everything else stays orthogonal. Any fixed deterministic heuristic
/// satisfies the routing contract; this one keeps short hops crisp.
fn resolve_style(style: WireStyle, source: Point, dest: Point) -> ResolvedStyle {
    match style {
        WireStyle::Orthogonal => ResolvedStyle::Orthogonal,
        WireStyle::Curved => ResolvedStyle::Curved,
        WireStyle::Mixed => {
            if (dest.y() - source.y()).abs() > (dest.x() - source.x()).abs() {
                ResolvedStyle::Curved
            } else {
                ResolvedStyle::Orthogonal
            }
        }
    }
}

/// Resolves an endpoint to its absolute coordinate: board pins are in the
/// board's fixed frame, device pins are placed origin + relative position.
fn endpoint_position(
    diagram: &Diagram,
    origins: &HashMap<usize, Point>,
    connection: usize,
    endpoint: &Endpoint,
) -> Result<Point, Error> {
    let unresolved = || Error::UnresolvedEndpoint {
        connection,
        endpoint: endpoint.to_string(),
    };

    match endpoint {
        Endpoint::Board { board_pin } => diagram
            .board()
            .pin(*board_pin)
            .map(|pin| pin.position())
            .ok_or_else(unresolved),
        Endpoint::Device { device, device_pin } => {
            let (index, device) = diagram.device(device).ok_or_else(unresolved)?;
            let pin = device.pin(device_pin).ok_or_else(unresolved)?;
            let origin = origins
                .get(&index)
                .copied()
                .ok_or_else(|| Error::InvalidTierPlacement {
                    device: device.name().to_string(),
                })?;
            Ok(origin.add_point(pin.position()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Board, BoardPin, Connection, Device, DevicePin, PinRole};

    fn board_with_pins(pins: Vec<(u32, f32, f32)>) -> Board {
        Board::new(
            "b",
            100.0,
            80.0,
            pins.into_iter()
                .map(|(index, x, y)| BoardPin::new(index, PinRole::Gpio, Point::new(x, y)))
                .collect(),
        )
    }

    fn device_at_y(name: &str) -> Device {
        Device::new(
            name,
            30.0,
            20.0,
            None,
            vec![DevicePin::new("IN", PinRole::Other, Point::new(0.0, 10.0))],
        )
    }

    fn board_connection(pin: u32, device: &str) -> Connection {
        Connection::new(
            Endpoint::Board { board_pin: pin },
            Endpoint::Device {
                device: device.to_string(),
                device_pin: "IN".to_string(),
            },
        )
    }

    fn placements(origins: &[(usize, f32, f32)]) -> Vec<PlacedDevice> {
        origins
            .iter()
            .map(|&(device, x, y)| PlacedDevice::new(device, Point::new(x, y), 0))
            .collect()
    }

    #[test]
    fn test_wire_has_four_waypoints_through_rail() {
        let diagram = Diagram::new(
            board_with_pins(vec![(1, 98.0, 10.0)]),
            vec![device_at_y("led")],
            vec![board_connection(1, "led")],
        );
        let placed = placements(&[(0, 180.0, 40.0)]);
        let config = LayoutConfig::default();

        let wires = route_wires(&diagram, &placed, &config).unwrap();
        assert_eq!(wires.len(), 1);

        let wire = &wires[0];
        assert_eq!(wire.points().len(), 4);
        assert_eq!(wire.start(), Point::new(98.0, 10.0));
        assert_eq!(wire.end(), Point::new(180.0, 50.0));

        let rail = 98.0 + config.rail_offset;
        assert_eq!(wire.points()[1], Point::new(rail, 10.0));
        assert_eq!(wire.points()[2], Point::new(rail, 50.0));
    }

    #[test]
    fn test_bundle_fans_out_by_destination_y() {
        // Three wires from the same board pin to devices at increasing y.
        // Connections are listed in reverse y order to prove sorting wins.
        let diagram = Diagram::new(
            board_with_pins(vec![(1, 98.0, 40.0)]),
            vec![device_at_y("far"), device_at_y("mid"), device_at_y("near")],
            vec![
                board_connection(1, "far"),
                board_connection(1, "mid"),
                board_connection(1, "near"),
            ],
        );
        let placed = placements(&[(0, 180.0, 120.0), (1, 180.0, 60.0), (2, 180.0, 0.0)]);
        let config = LayoutConfig::default();

        let wires = route_wires(&diagram, &placed, &config).unwrap();

        // Sort routed wires by destination y and check rails are strictly
        // increasing, at least bundle_spacing apart
        let mut by_dest: Vec<&RoutedWire> = wires.iter().collect();
        by_dest.sort_by(|a, b| a.end().y().total_cmp(&b.end().y()));
        for pair in by_dest.windows(2) {
            assert!(pair[1].rail_x() - pair[0].rail_x() >= config.bundle_spacing);
        }
    }

    #[test]
    fn test_overlapping_bundles_push_rails_apart() {
        // Two bundles from adjacent board pins with overlapping vertical
        // travel; the second rail lands nearly on top of the first and
        // must shift right by wire_spacing.
        let diagram = Diagram::new(
            board_with_pins(vec![(1, 98.0, 10.0), (2, 99.0, 20.0)]),
            vec![device_at_y("a"), device_at_y("b")],
            vec![board_connection(1, "a"), board_connection(2, "b")],
        );
        let placed = placements(&[(0, 180.0, 60.0), (1, 180.0, 80.0)]);
        let config = LayoutConfig::default();

        let wires = route_wires(&diagram, &placed, &config).unwrap();

        let first = wires[0].rail_x();
        let second = wires[1].rail_x();
        assert!((second - first).abs() >= config.wire_spacing);
        assert_eq!(second, first + config.wire_spacing);
    }

    #[test]
    fn test_horizontal_wire_still_occupies_its_rail() {
        // First wire is purely horizontal (zero-height travel range); a
        // later wire crossing that y must still clear its rail.
        let diagram = Diagram::new(
            board_with_pins(vec![(1, 98.0, 50.0), (2, 99.0, 10.0)]),
            vec![device_at_y("flat"), device_at_y("tall")],
            vec![board_connection(1, "flat"), board_connection(2, "tall")],
        );
        // flat: pin at y=50 -> device pin at y=40+10=50, same y
        let placed = placements(&[(0, 180.0, 40.0), (1, 180.0, 80.0)]);
        let config = LayoutConfig::default();

        let wires = route_wires(&diagram, &placed, &config).unwrap();

        let flat = &wires[0];
        let (y_min, y_max) = flat.y_range();
        assert_eq!(y_min, y_max);

        // The tall wire spans y 10..90, crossing y=50, so its rail must
        // keep its distance from the flat wire's rail.
        let tall = &wires[1];
        assert!((tall.rail_x() - flat.rail_x()).abs() >= config.wire_spacing);
    }

    #[test]
    fn test_explicit_style_overrides_default() {
        let diagram = Diagram::new(
            board_with_pins(vec![(1, 98.0, 10.0)]),
            vec![device_at_y("led")],
            vec![board_connection(1, "led").with_style(WireStyle::Curved)],
        );
        let placed = placements(&[(0, 180.0, 0.0)]);

        let wires = route_wires(&diagram, &placed, &LayoutConfig::default()).unwrap();
        assert_eq!(wires[0].style(), ResolvedStyle::Curved);
    }

    #[test]
    fn test_mixed_style_heuristic() {
        // Mostly-horizontal wire stays orthogonal
        assert_eq!(
            resolve_style(WireStyle::Mixed, Point::new(0.0, 0.0), Point::new(100.0, 10.0)),
            ResolvedStyle::Orthogonal
        );
        // Mostly-vertical wire curves
        assert_eq!(
            resolve_style(WireStyle::Mixed, Point::new(0.0, 0.0), Point::new(10.0, 100.0)),
            ResolvedStyle::Curved
        );
    }

    #[test]
    fn test_routing_is_deterministic() {
        let diagram = Diagram::new(
            board_with_pins(vec![(1, 98.0, 10.0), (2, 98.0, 20.0)]),
            vec![device_at_y("a"), device_at_y("b")],
            vec![board_connection(1, "a"), board_connection(2, "b")],
        );
        let placed = placements(&[(0, 180.0, 0.0), (1, 180.0, 40.0)]);
        let config = LayoutConfig::default();

        let first = route_wires(&diagram, &placed, &config).unwrap();
        let second = route_wires(&diagram, &placed, &config).unwrap();
        assert_eq!(first, second);
    }
}
