//! Command-line interface for rendering wiring diagrams to SVG.

use std::{fs, path::Path};

use clap::Parser;
use log::info;

use pinwire::{
    Error,
    config::AppConfig,
    export::{Exporter, svg::Svg},
    layout, loader,
};

/// Command-line configuration.
#[derive(Parser, Debug)]
#[command(
    name = "pinwire",
    version,
    about = "Render circuit-board wiring diagrams to SVG"
)]
pub struct Config {
    /// Input diagram file (YAML)
    pub file: String,

    /// Output SVG file
    #[arg(short, long, default_value = "diagram.svg")]
    pub output: String,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Optional TOML configuration file with layout and style sections
    #[arg(long)]
    pub config: Option<String>,
}

/// Runs the full pipeline: load diagram, lay it out, write the SVG.
pub fn run(cfg: &Config) -> Result<(), Error> {
    let app_config = match &cfg.config {
        Some(path) => {
            let source = fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&source).map_err(|err| Error::Parse(err.to_string()))?
        }
        None => AppConfig::default(),
    };

    let diagram = loader::load_diagram(&cfg.file)?;
    let result = layout::layout(&diagram, &app_config.layout)?;

    let exporter = Svg::new().with_style(app_config.style.clone());
    exporter.export_layout(&diagram, &result, Path::new(&cfg.output))?;

    info!(output = cfg.output; "Diagram rendered");
    Ok(())
}
