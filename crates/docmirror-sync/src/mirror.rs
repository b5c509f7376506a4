//! Document mirror: copies the source document into the public directory.

use std::path::PathBuf;

use crate::paths::MirrorPaths;

/// Mirror error.
///
/// The only failure kind is I/O; the variant records which side failed.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// The source document could not be read.
    #[error("Cannot read source document {}: {source}", path.display())]
    SourceUnreadable {
        /// Source path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The mirrored document could not be written.
    #[error("Cannot write mirrored document {}: {source}", path.display())]
    DestinationUnwritable {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl MirrorError {
    /// The underlying I/O error kind.
    #[must_use]
    pub fn io_kind(&self) -> std::io::ErrorKind {
        match self {
            Self::SourceUnreadable { source, .. } | Self::DestinationUnwritable { source, .. } => {
                source.kind()
            }
        }
    }
}

/// Copy the source document over the mirrored document.
///
/// The destination's parent directory must already exist. The destination is
/// overwritten in place (no temporary file), so a concurrent reader may see a
/// partially written file.
///
/// Returns the number of bytes copied.
///
/// # Errors
///
/// Returns [`MirrorError::SourceUnreadable`] if the source cannot be read and
/// [`MirrorError::DestinationUnwritable`] if the destination cannot be written.
pub fn mirror(paths: &MirrorPaths) -> Result<u64, MirrorError> {
    let content = std::fs::read(paths.source()).map_err(|source| MirrorError::SourceUnreadable {
        path: paths.source().to_path_buf(),
        source,
    })?;

    std::fs::write(paths.destination(), &content).map_err(|source| {
        MirrorError::DestinationUnwritable {
            path: paths.destination().to_path_buf(),
            source,
        }
    })?;

    tracing::debug!(
        source = %paths.source().display(),
        destination = %paths.destination().display(),
        bytes = content.len(),
        "Mirrored document"
    );

    Ok(content.len() as u64)
}
