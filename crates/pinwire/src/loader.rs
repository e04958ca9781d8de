//! Diagram ingestion.
//!
//! Deserializes a YAML diagram description into the semantic model and
//! validates that every connection endpoint resolves before anything else
//! sees it. The layout engine relies on this guarantee and does not
//! re-validate pin existence.

use std::{fs, path::Path};

use log::{debug, info};

use crate::{error::Error, model::Diagram};

/// Parses a diagram from YAML source and validates it.
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed YAML and
/// [`Error::UnresolvedEndpoint`] for connections naming pins that do not
/// exist.
pub fn parse_diagram(source: &str) -> Result<Diagram, Error> {
    let diagram: Diagram =
        serde_yaml::from_str(source).map_err(|err| Error::Parse(err.to_string()))?;
    diagram.validate()?;
    debug!(
        devices = diagram.devices().len(),
        connections = diagram.connections().len();
        "Diagram parsed"
    );
    Ok(diagram)
}

/// Reads and parses a diagram file.
pub fn load_diagram(path: impl AsRef<Path>) -> Result<Diagram, Error> {
    let path = path.as_ref();
    info!(path = path.display().to_string(); "Loading diagram");
    let source = fs::read_to_string(path)?;
    parse_diagram(&source)
}
