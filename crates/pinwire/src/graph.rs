//! Connection graph construction and device tier computation.
//!
//! The graph is a transient structure derived from a [`Diagram`]: nodes are
//! pin endpoints (board pins and device pins), edges are connections. It
//! exists to classify each device by its hop distance from the board and to
//! reject device-to-device loops with no board anchor, and is discarded
//! once tiers are known.

use indexmap::IndexMap;
use log::{debug, trace};
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::{
    error::Error,
    model::{Diagram, Endpoint},
};

/// A pin endpoint node: a board pin by physical index, or a device pin by
/// (device index, pin index) into the diagram's device list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinNode {
    Board(u32),
    Device { device: usize, pin: usize },
}

impl PinNode {
    fn device_index(self) -> Option<usize> {
        match self {
            Self::Board(_) => None,
            Self::Device { device, .. } => Some(device),
        }
    }
}

/// Directed graph over pin endpoints with per-device adjacency derived
/// from it.
#[derive(Debug)]
pub struct ConnectionGraph {
    graph: DiGraph<PinNode, usize>,
    /// Per device, the set of devices it is directly wired to (ignoring
    /// the board). Symmetric: wiring direction does not matter for tiers.
    device_links: Vec<BTreeSet<usize>>,
    board_anchored: Vec<bool>,
}

impl ConnectionGraph {
    /// Builds the connection graph from a diagram.
    ///
    /// Each connection contributes one edge between its two resolved
    /// endpoints; edge weights are connection indices. Device-to-device
    /// edges feed the adjacency sets used for tiering, board-to-device
    /// edges mark their device as board-anchored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedEndpoint`] if an endpoint names a pin
    /// that does not exist.
    pub fn from_diagram(diagram: &Diagram) -> Result<Self, Error> {
        let mut graph = DiGraph::new();
        let mut node_indices: HashMap<PinNode, NodeIndex> = HashMap::new();

        for (index, connection) in diagram.connections().iter().enumerate() {
            let from = pin_node(diagram, connection.from(), index)?;
            let to = pin_node(diagram, connection.to(), index)?;

            let from_idx = *node_indices
                .entry(from)
                .or_insert_with(|| graph.add_node(from));
            let to_idx = *node_indices.entry(to).or_insert_with(|| graph.add_node(to));
            graph.add_edge(from_idx, to_idx, index);
        }

        // Classify edges into device adjacency and board anchors
        let mut device_links = vec![BTreeSet::new(); diagram.devices().len()];
        let mut board_anchored = vec![false; diagram.devices().len()];

        for edge in graph.edge_references() {
            let source = *graph
                .node_weight(edge.source())
                .expect("Edge source should exist");
            let target = *graph
                .node_weight(edge.target())
                .expect("Edge target should exist");

            match (source.device_index(), target.device_index()) {
                (Some(a), Some(b)) => {
                    if a != b {
                        device_links[a].insert(b);
                        device_links[b].insert(a);
                    }
                }
                (Some(device), None) | (None, Some(device)) => {
                    board_anchored[device] = true;
                }
                (None, None) => {}
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count();
            "Connection graph built"
        );

        Ok(Self {
            graph,
            device_links,
            board_anchored,
        })
    }

    /// Returns the devices directly wired to the given device, ignoring
    /// board connections.
    pub fn linked_devices(&self, device: usize) -> impl Iterator<Item = usize> + '_ {
        self.device_links[device].iter().copied()
    }

    /// Returns true if the device has at least one direct board connection
    pub fn has_board_anchor(&self, device: usize) -> bool {
        self.board_anchored[device]
    }

    /// Returns the number of distinct pin endpoints in the graph
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Computes the tier of every device: 0 for devices with a direct
    /// board connection (or no connections at all, kept visible by
    /// policy), otherwise one more than the nearest lower-tier device,
    /// resolved by breadth-first propagation outward from tier 0.
    ///
    /// The returned map is keyed by device index in diagram order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] naming the devices that cannot be
    /// assigned a finite tier: a closed loop of device-to-device
    /// connections with no board anchor breaking it.
    pub fn compute_depths(&self, diagram: &Diagram) -> Result<IndexMap<usize, usize>, Error> {
        let device_count = diagram.devices().len();
        let mut tiers: Vec<Option<usize>> = vec![None; device_count];
        let mut queue = VecDeque::new();

        for device in 0..device_count {
            if self.board_anchored[device] || self.device_links[device].is_empty() {
                tiers[device] = Some(0);
                queue.push_back(device);
            }
        }

        while let Some(device) = queue.pop_front() {
            let Some(tier) = tiers[device] else { continue };
            for linked in self.linked_devices(device) {
                if tiers[linked].is_none() {
                    tiers[linked] = Some(tier + 1);
                    queue.push_back(linked);
                }
            }
        }

        // Anything still unassigned is reachable only through other
        // unanchored devices, which means a loop somewhere in its chain.
        let stranded: Vec<String> = tiers
            .iter()
            .enumerate()
            .filter(|(_, tier)| tier.is_none())
            .map(|(device, _)| diagram.devices()[device].name().to_string())
            .collect();
        if !stranded.is_empty() {
            return Err(Error::CycleDetected { devices: stranded });
        }

        let depths: IndexMap<usize, usize> = tiers
            .iter()
            .enumerate()
            .filter_map(|(device, tier)| tier.map(|tier| (device, tier)))
            .collect();

        trace!(depths:?; "Device tiers assigned");
        Ok(depths)
    }
}

/// Resolves a connection endpoint into a graph node.
fn pin_node(diagram: &Diagram, endpoint: &Endpoint, connection: usize) -> Result<PinNode, Error> {
    let unresolved = || Error::UnresolvedEndpoint {
        connection,
        endpoint: endpoint.to_string(),
    };

    match endpoint {
        Endpoint::Board { board_pin } => diagram
            .board()
            .pin(*board_pin)
            .map(|pin| PinNode::Board(pin.index()))
            .ok_or_else(unresolved),
        Endpoint::Device { device, device_pin } => {
            let (device_index, device) = diagram.device(device).ok_or_else(unresolved)?;
            let pin_index = device
                .pins()
                .iter()
                .position(|pin| pin.name() == device_pin)
                .ok_or_else(unresolved)?;
            Ok(PinNode::Device {
                device: device_index,
                pin: pin_index,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::Point,
        model::{Board, BoardPin, Connection, Device, DevicePin, PinRole},
    };

    fn board() -> Board {
        Board::new(
            "test-board",
            100.0,
            60.0,
            vec![
                BoardPin::new(1, PinRole::Power, Point::new(98.0, 10.0)),
                BoardPin::new(2, PinRole::Ground, Point::new(98.0, 20.0)),
            ],
        )
    }

    fn device(name: &str) -> Device {
        Device::new(
            name,
            30.0,
            20.0,
            None,
            vec![
                DevicePin::new("IN", PinRole::Other, Point::new(0.0, 10.0)),
                DevicePin::new("OUT", PinRole::Other, Point::new(30.0, 10.0)),
            ],
        )
    }

    fn board_to(device_name: &str, pin: &str) -> Connection {
        Connection::new(
            Endpoint::Board { board_pin: 1 },
            Endpoint::Device {
                device: device_name.to_string(),
                device_pin: pin.to_string(),
            },
        )
    }

    fn device_to_device(from: &str, to: &str) -> Connection {
        Connection::new(
            Endpoint::Device {
                device: from.to_string(),
                device_pin: "OUT".to_string(),
            },
            Endpoint::Device {
                device: to.to_string(),
                device_pin: "IN".to_string(),
            },
        )
    }

    #[test]
    fn test_three_tier_chain() {
        let diagram = Diagram::new(
            board(),
            vec![device("regulator"), device("amp"), device("led")],
            vec![
                board_to("regulator", "IN"),
                device_to_device("regulator", "amp"),
                device_to_device("amp", "led"),
            ],
        );

        let graph = ConnectionGraph::from_diagram(&diagram).unwrap();
        let depths = graph.compute_depths(&diagram).unwrap();

        assert_eq!(depths[&0], 0);
        assert_eq!(depths[&1], 1);
        assert_eq!(depths[&2], 2);
    }

    #[test]
    fn test_board_anchor_wins_over_chain_depth() {
        // The led is two hops from the regulator but also wired to the
        // board directly, which pins it at tier 0.
        let diagram = Diagram::new(
            board(),
            vec![device("regulator"), device("led")],
            vec![
                board_to("regulator", "IN"),
                board_to("led", "IN"),
                device_to_device("regulator", "led"),
            ],
        );

        let graph = ConnectionGraph::from_diagram(&diagram).unwrap();
        let depths = graph.compute_depths(&diagram).unwrap();

        assert_eq!(depths[&0], 0);
        assert_eq!(depths[&1], 0);
    }

    #[test]
    fn test_isolated_device_gets_tier_zero() {
        let diagram = Diagram::new(board(), vec![device("orphan")], vec![]);

        let graph = ConnectionGraph::from_diagram(&diagram).unwrap();
        let depths = graph.compute_depths(&diagram).unwrap();

        assert_eq!(depths[&0], 0);
    }

    #[test]
    fn test_cycle_detected_names_participants() {
        let diagram = Diagram::new(
            board(),
            vec![device("alpha"), device("beta")],
            vec![
                device_to_device("alpha", "beta"),
                device_to_device("beta", "alpha"),
            ],
        );

        let graph = ConnectionGraph::from_diagram(&diagram).unwrap();
        match graph.compute_depths(&diagram) {
            Err(Error::CycleDetected { devices }) => {
                assert_eq!(devices, vec!["alpha".to_string(), "beta".to_string()]);
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_broken_by_board_anchor_is_fine() {
        let diagram = Diagram::new(
            board(),
            vec![device("alpha"), device("beta")],
            vec![
                board_to("alpha", "IN"),
                device_to_device("alpha", "beta"),
                device_to_device("beta", "alpha"),
            ],
        );

        let graph = ConnectionGraph::from_diagram(&diagram).unwrap();
        let depths = graph.compute_depths(&diagram).unwrap();
        assert_eq!(depths[&0], 0);
        assert_eq!(depths[&1], 1);
    }

    #[test]
    fn test_shared_pin_endpoints_are_deduplicated() {
        let diagram = Diagram::new(
            board(),
            vec![device("a"), device("b")],
            vec![board_to("a", "IN"), board_to("b", "IN")],
        );

        let graph = ConnectionGraph::from_diagram(&diagram).unwrap();
        // board pin 1, a.IN, b.IN
        assert_eq!(graph.node_count(), 3);
        assert!(graph.has_board_anchor(0));
        assert!(graph.has_board_anchor(1));
        assert_eq!(graph.linked_devices(0).count(), 0);
    }

    #[test]
    fn test_unresolved_endpoint_surfaces_connection_index() {
        let diagram = Diagram::new(board(), vec![device("a")], vec![board_to("ghost", "IN")]);

        match ConnectionGraph::from_diagram(&diagram) {
            Err(Error::UnresolvedEndpoint { connection, endpoint }) => {
                assert_eq!(connection, 0);
                assert_eq!(endpoint, "ghost.IN");
            }
            other => panic!("expected UnresolvedEndpoint, got {other:?}"),
        }
    }
}
