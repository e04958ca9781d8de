//! The semantic model for wiring diagrams.
//!
//! A [`Diagram`] is the aggregate root that the layout engine consumes: one
//! [`Board`], a list of [`Device`]s, and a list of [`Connection`]s between
//! pins. Boards and devices are immutable value objects once constructed;
//! positions assigned during layout live in derived records, never here.

use serde::Deserialize;
use std::fmt;

use crate::{error::Error, geometry::Point};

/// Electrical role of a pin.
///
/// Roles are presentation metadata: the exporter maps them to default wire
/// colors. The layout engine never consults them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinRole {
    Power,
    Ground,
    Gpio,
    I2c,
    Spi,
    Uart,
    Pwm,
    #[default]
    Other,
}

/// A numbered attachment point on a board.
///
/// Positions are in the board's own frame; the board origin is always
/// `(0, 0)` for layout purposes.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardPin {
    index: u32,
    #[serde(default)]
    role: PinRole,
    position: Point,
}

impl BoardPin {
    pub fn new(index: u32, role: PinRole, position: Point) -> Self {
        Self {
            index,
            role,
            position,
        }
    }

    /// Returns the physical pin index (1-based)
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the pin's role tag
    pub fn role(&self) -> PinRole {
        self.role
    }

    /// Returns the pin position in the board frame
    pub fn position(&self) -> Point {
        self.position
    }
}

/// A named rectangular board with a fixed pin geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct Board {
    name: String,
    width: f32,
    height: f32,
    pins: Vec<BoardPin>,
}

impl Board {
    pub fn new(name: impl Into<String>, width: f32, height: f32, pins: Vec<BoardPin>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            pins,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn pins(&self) -> &[BoardPin] {
        &self.pins
    }

    /// Looks up a board pin by its physical index
    pub fn pin(&self, index: u32) -> Option<&BoardPin> {
        self.pins.iter().find(|pin| pin.index == index)
    }
}

/// A named attachment point on a device, positioned relative to the
/// device's origin.
#[derive(Debug, Clone, Deserialize)]
pub struct DevicePin {
    name: String,
    #[serde(default)]
    role: PinRole,
    position: Point,
}

impl DevicePin {
    pub fn new(name: impl Into<String>, role: PinRole, position: Point) -> Self {
        Self {
            name: name.into(),
            role,
            position,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> PinRole {
        self.role
    }

    /// Returns the pin position relative to the owning device's origin
    pub fn position(&self) -> Point {
        self.position
    }
}

/// A named rectangular component with an ordered collection of pins.
///
/// A device definition carries no absolute position; placement is computed
/// per layout pass and stored in [`crate::layout::PlacedDevice`].
#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    name: String,
    width: f32,
    height: f32,
    #[serde(default)]
    color: Option<String>,
    pins: Vec<DevicePin>,
}

impl Device {
    pub fn new(
        name: impl Into<String>,
        width: f32,
        height: f32,
        color: Option<String>,
        pins: Vec<DevicePin>,
    ) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            color,
            pins,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Returns the display color hint, if any
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn pins(&self) -> &[DevicePin] {
        &self.pins
    }

    /// Looks up a device pin by name
    pub fn pin(&self, name: &str) -> Option<&DevicePin> {
        self.pins.iter().find(|pin| pin.name == name)
    }
}

/// Wire drawing style for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireStyle {
    Orthogonal,
    Curved,
    /// Pick orthogonal or curved per wire with a fixed heuristic.
    #[default]
    Mixed,
}

/// One end of a connection: either a numbered board pin or a named pin on
/// a named device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Board { board_pin: u32 },
    Device { device: String, device_pin: String },
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board { board_pin } => write!(f, "board pin {board_pin}"),
            Self::Device { device, device_pin } => write!(f, "{device}.{device_pin}"),
        }
    }
}

/// A wiring instruction between two pins.
///
/// The color and style fields are presentation hints passed through to the
/// exporter; routing ignores them apart from the style choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection {
    from: Endpoint,
    to: Endpoint,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    style: Option<WireStyle>,
}

impl Connection {
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self {
            from,
            to,
            color: None,
            style: None,
        }
    }

    pub fn with_style(mut self, style: WireStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn from(&self) -> &Endpoint {
        &self.from
    }

    pub fn to(&self) -> &Endpoint {
        &self.to
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn style(&self) -> Option<WireStyle> {
        self.style
    }
}

/// The aggregate root: one board, its devices, and the connections
/// between them.
#[derive(Debug, Clone, Deserialize)]
pub struct Diagram {
    board: Board,
    #[serde(default)]
    devices: Vec<Device>,
    #[serde(default)]
    connections: Vec<Connection>,
    #[serde(default)]
    show_legend: bool,
}

impl Diagram {
    pub fn new(board: Board, devices: Vec<Device>, connections: Vec<Connection>) -> Self {
        Self {
            board,
            devices,
            connections,
            show_legend: false,
        }
    }

    pub fn with_legend(mut self, show_legend: bool) -> Self {
        self.show_legend = show_legend;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn show_legend(&self) -> bool {
        self.show_legend
    }

    /// Looks up a device by name, returning its index in the device list
    pub fn device(&self, name: &str) -> Option<(usize, &Device)> {
        self.devices
            .iter()
            .enumerate()
            .find(|(_, device)| device.name() == name)
    }

    /// Resolves an endpoint to an absolute-position-independent pin
    /// reference, or `None` if it names a pin that does not exist.
    pub fn resolve_endpoint(&self, endpoint: &Endpoint) -> Option<PinRef<'_>> {
        match endpoint {
            Endpoint::Board { board_pin } => self.board.pin(*board_pin).map(PinRef::Board),
            Endpoint::Device { device, device_pin } => {
                let (index, device) = self.device(device)?;
                let pin = device.pin(device_pin)?;
                Some(PinRef::Device { index, pin })
            }
        }
    }

    /// Checks that every connection endpoint resolves to an existing board
    /// pin or (device, device pin) pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedEndpoint`] for the first endpoint that
    /// fails to resolve.
    pub fn validate(&self) -> Result<(), Error> {
        for (index, connection) in self.connections.iter().enumerate() {
            for endpoint in [connection.from(), connection.to()] {
                if self.resolve_endpoint(endpoint).is_none() {
                    return Err(Error::UnresolvedEndpoint {
                        connection: index,
                        endpoint: endpoint.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A resolved endpoint reference into a diagram.
#[derive(Debug, Clone, Copy)]
pub enum PinRef<'a> {
    Board(&'a BoardPin),
    Device { index: usize, pin: &'a DevicePin },
}
