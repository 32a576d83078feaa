//! Vector-path ingestion and storage.
//!
//! Converts SVG circle/path primitives into drivable polylines in scene
//! coordinates and holds the resulting shape set for nearest-point
//! queries. Ingestion replaces the whole set atomically; a malformed or
//! unsupported primitive is dropped with a [`ParseFailure`] while the
//! rest of the document still installs.

mod ingest;
mod library;
mod parser;

use thiserror::Error;

pub use ingest::{IngestOutcome, PathIngestor};
pub use library::{NearestPoint, PathLibrary, PathShape, ShapeKind};
pub use parser::{parse_document, parse_path_data, ViewBox, CIRCLE_SAMPLES, PATH_SAMPLES};

/// Why a single primitive failed to produce a shape.
///
/// Failures are recovered locally: the offending primitive is skipped
/// and ingestion continues with the rest of the file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// Path data contained a command outside the supported M/L/C/Z set
    #[error("unsupported path command '{0}'")]
    UnsupportedCommand(char),

    /// Path data could not be tokenized or had a bad parameter count
    #[error("malformed path data: {0}")]
    Malformed(String),

    /// A drawing command appeared before any move-to
    #[error("path command before any move-to")]
    MissingMove,

    /// The path parsed but produced no geometry to sample
    #[error("path produced no geometry")]
    EmptyPath,

    /// A circle element was missing a positive radius
    #[error("circle element missing a positive radius")]
    InvalidCircle,
}
