//! `docmirror build` command implementation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Args;
use docmirror_config::{CliSettings, Config};
use docmirror_sync::{MirrorPaths, mirror};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover docmirror.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source document to mirror (overrides config).
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Public directory the document is mirrored into (overrides config).
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Output directory for the build (default: dist/).
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source: self.source,
            public_dir: self.public_dir,
            out_dir: self.out_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let public_dir = &config.document_resolved.public_dir;
        let out_dir = &config.build_resolved.out_dir;
        if out_dir.starts_with(public_dir) || public_dir.starts_with(out_dir) {
            return Err(CliError::Validation(format!(
                "Output directory {} overlaps public directory {}",
                out_dir.display(),
                public_dir.display()
            )));
        }

        output.field("Source", config.document_resolved.source.display());
        output.field("Output", out_dir.display());

        fs::create_dir_all(public_dir)?;
        let paths = MirrorPaths::from(&config.document_resolved);
        let bytes = mirror(&paths)?;
        output.info(&format!(
            "Mirrored {} ({bytes} bytes)",
            paths.destination().display()
        ));

        let files = copy_dir_all(public_dir, out_dir)?;
        output.success(&format!(
            "Build complete: {files} files written to {}",
            out_dir.display()
        ));

        Ok(())
    }
}

/// Recursively copy `src` into `dst`, creating directories as needed.
///
/// Existing files in `dst` are overwritten. Returns the number of files copied.
fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<usize> {
    fs::create_dir_all(dst)?;

    let mut count = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            count += copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            tracing::debug!(path = %target.display(), "Copied");
            count += 1;
        }
    }
    Ok(count)
}
