//! Resolved source and destination paths.

use std::path::{Path, PathBuf};

use docmirror_config::DocumentConfig;

/// Resolved paths of the source document and its mirrored copy.
///
/// Built once from configuration and shared by the mirror and the notifier.
/// Both paths are compared verbatim against watcher events, so they should be
/// absolute and normalized before construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorPaths {
    source: PathBuf,
    destination: PathBuf,
}

impl MirrorPaths {
    /// Create from already-resolved paths.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Source document path.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Mirrored document path inside the public directory.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Directories a watcher must observe: the parents of both paths.
    ///
    /// Returns one directory when both files share a parent.
    #[must_use]
    pub fn watch_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = [&self.source, &self.destination]
            .into_iter()
            .filter_map(|p| p.parent())
            .map(Path::to_path_buf)
            .collect();
        dirs.dedup();
        dirs
    }
}

impl From<&DocumentConfig> for MirrorPaths {
    fn from(config: &DocumentConfig) -> Self {
        Self::new(config.source.clone(), config.mirrored_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_document_config() {
        let config = DocumentConfig {
            source: PathBuf::from("/project/readme.md"),
            public_dir: PathBuf::from("/project/app/public"),
            target: PathBuf::from("README.md"),
        };

        let paths = MirrorPaths::from(&config);

        assert_eq!(paths.source(), Path::new("/project/readme.md"));
        assert_eq!(
            paths.destination(),
            Path::new("/project/app/public/README.md")
        );
    }

    #[test]
    fn test_watch_dirs_distinct_parents() {
        let paths = MirrorPaths::new("/project/readme.md", "/project/app/public/README.md");

        assert_eq!(
            paths.watch_dirs(),
            vec![
                PathBuf::from("/project"),
                PathBuf::from("/project/app/public")
            ]
        );
    }

    #[test]
    fn test_watch_dirs_shared_parent() {
        let paths = MirrorPaths::new("/project/NOTES.md", "/project/README.md");

        assert_eq!(paths.watch_dirs(), vec![PathBuf::from("/project")]);
    }
}
