use serde::Deserialize;

use crate::model::WireStyle;

/// Application configuration loaded from a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Style configuration section
    #[serde(default)]
    pub style: StyleConfig,
}

/// Spacing constants consumed by the layout engine.
///
/// All values are plain drawing-unit numbers; constructing a config has no
/// side effects, and the same config always produces the same layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal gap between a wire's source and its vertical rail
    pub rail_offset: f32,

    /// Minimum gap between rails of distinct bundles
    pub wire_spacing: f32,

    /// Gap between rails of wires sharing a source pin
    pub bundle_spacing: f32,

    /// Horizontal gap between device tier columns
    pub tier_gap: f32,

    /// Vertical gap between stacked devices within a tier
    pub device_gap: f32,

    /// Canvas padding around the outermost geometry
    pub margin: f32,

    /// Default wire style for connections without an explicit one
    pub wire_style: WireStyle,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rail_offset: 20.0,
            wire_spacing: 8.0,
            bundle_spacing: 4.0,
            tier_gap: 60.0,
            device_gap: 20.0,
            margin: 20.0,
            wire_style: WireStyle::default(),
        }
    }
}

/// Style configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Default background color for diagrams
    #[serde(default)]
    background_color: Option<String>,
}

impl StyleConfig {
    /// Get the background color from configuration
    /// Returns None if no background color is configured
    pub fn background_color(&self) -> Option<&str> {
        self.background_color.as_deref()
    }
}
