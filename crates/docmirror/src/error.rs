//! CLI error types.

use docmirror_config::ConfigError;
use docmirror_server::StartupError;
use docmirror_sync::MirrorError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Mirror(#[from] MirrorError),

    #[error("{0}")]
    Startup(#[from] StartupError),

    #[error("{0}")]
    Validation(String),
}
