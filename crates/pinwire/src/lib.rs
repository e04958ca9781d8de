//! Pinwire - layout and wire routing for circuit-board wiring diagrams
//!
//! This library turns a declarative wiring diagram (a board, its devices,
//! and point-to-point connections) into a laid-out, collision-avoiding SVG
//! illustration. Devices are grouped into tiers by their connection depth
//! from the board, wires travel along deterministic vertical rails that
//! never overlap, and the result is pure geometry handed to a thin SVG
//! presentation layer.

pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod loader;
pub mod model;

pub use error::Error;

use config::AppConfig;
use export::svg::Svg;
use model::Diagram;

/// Builder for parsing and rendering wiring diagrams.
///
/// # Examples
///
/// ```rust,no_run
/// use pinwire::{DiagramRenderer, config::AppConfig};
///
/// let source = std::fs::read_to_string("diagram.yaml").unwrap();
///
/// let renderer = DiagramRenderer::new(AppConfig::default());
/// let diagram = renderer.parse(&source).expect("Failed to parse");
/// let svg = renderer.render_svg(&diagram).expect("Failed to render");
/// println!("{svg}");
/// ```
#[derive(Default)]
pub struct DiagramRenderer {
    config: AppConfig,
}

impl DiagramRenderer {
    /// Create a new renderer with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse YAML source into a validated diagram.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed input and
    /// [`Error::UnresolvedEndpoint`] for connections naming pins that do
    /// not exist.
    pub fn parse(&self, source: &str) -> Result<Diagram, Error> {
        loader::parse_diagram(source)
    }

    /// Lay out a diagram and render it to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns layout errors ([`Error::CycleDetected`] and friends)
    /// unchanged; rendering itself is infallible once layout succeeds.
    pub fn render_svg(&self, diagram: &Diagram) -> Result<String, Error> {
        let result = layout::layout(diagram, &self.config.layout)?;
        let exporter = Svg::new().with_style(self.config.style.clone());
        Ok(exporter.render_document(diagram, &result).to_string())
    }
}
