pub mod svg;

use std::path::Path;

use crate::{layout::LayoutResult, model::Diagram};

/// An exporter turns a diagram plus its layout result into an output file.
///
/// The layout result is pure geometry; everything visual (colors, fonts,
/// legends) is the exporter's concern.
pub trait Exporter {
    fn export_layout(
        &self,
        diagram: &Diagram,
        layout: &LayoutResult,
        path: &Path,
    ) -> Result<(), Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
