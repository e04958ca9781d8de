//! Device positioning.
//!
//! Devices are grouped into columns by tier, columns advance left to right
//! away from the board, and devices stack top to bottom within a column in
//! diagram order. Every step is driven by input order and fixed spacing
//! constants, so identical inputs always yield identical positions.

use indexmap::IndexMap;

use crate::{
    config::LayoutConfig,
    error::Error,
    geometry::Point,
    model::{DevicePin, Diagram},
};

/// A device plus its computed absolute origin and tier.
///
/// References its device by index into the diagram's device list rather
/// than owning or mutating the definition, so the same device template can
/// appear in multiple diagrams without aliasing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedDevice {
    device: usize,
    origin: Point,
    tier: usize,
}

impl PlacedDevice {
    pub(crate) fn new(device: usize, origin: Point, tier: usize) -> Self {
        Self {
            device,
            origin,
            tier,
        }
    }

    /// Returns the index of the device in the diagram's device list
    pub fn device(&self) -> usize {
        self.device
    }

    /// Returns the absolute top-left origin assigned to the device
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Returns the tier column index
    pub fn tier(&self) -> usize {
        self.tier
    }

    /// Resolves a device pin to its absolute position
    pub fn pin_position(&self, pin: &DevicePin) -> Point {
        self.origin.add_point(pin.position())
    }
}

/// Assigns every device an absolute origin from its tier.
///
/// The tier 0 column starts right of the board with room for the first
/// rails; each subsequent column starts at the right edge of the previous
/// column's widest device plus a fixed gap. Output is ordered by device
/// index.
///
/// # Errors
///
/// Returns [`Error::InvalidTierPlacement`] if a device is missing from the
/// tier map. This is an internal guard; tier computation assigns every
/// device or fails outright.
pub fn place_devices(
    diagram: &Diagram,
    depths: &IndexMap<usize, usize>,
    config: &LayoutConfig,
) -> Result<Vec<PlacedDevice>, Error> {
    let devices = diagram.devices();
    if devices.is_empty() {
        return Ok(Vec::new());
    }

    let tier_count = depths.values().max().map_or(0, |tier| tier + 1);
    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); tier_count];
    for (index, device) in devices.iter().enumerate() {
        let tier = depths
            .get(&index)
            .copied()
            .ok_or_else(|| Error::InvalidTierPlacement {
                device: device.name().to_string(),
            })?;
        columns[tier].push(index);
    }

    let mut placements = Vec::with_capacity(devices.len());
    let mut column_x = diagram.board().width() + config.rail_offset + config.tier_gap;

    for (tier, column) in columns.iter().enumerate() {
        let mut y = 0.0_f32;
        let mut widest = 0.0_f32;

        for &index in column {
            let device = &devices[index];
            placements.push(PlacedDevice::new(index, Point::new(column_x, y), tier));
            y += device.height() + config.device_gap;
            widest = widest.max(device.width());
        }

        column_x += widest + config.tier_gap;
    }

    placements.sort_by_key(PlacedDevice::device);
    Ok(placements)
}
