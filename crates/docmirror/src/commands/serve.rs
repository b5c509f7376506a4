//! `docmirror serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use docmirror_config::{CliSettings, Config};
use docmirror_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover docmirror.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source document to mirror (overrides config).
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Public directory the document is mirrored into (overrides config).
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output (request and watch logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable live reload (default: enabled).
    #[arg(long)]
    live_reload: Option<bool>,

    /// Disable live reload.
    #[arg(long, conflicts_with = "live_reload")]
    no_live_reload: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the startup mirror fails, or
    /// the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let live_reload_enabled = self.resolve_live_reload_enabled();
        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            source: self.source,
            public_dir: self.public_dir,
            live_reload_enabled,
            ..CliSettings::default()
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let document = &config.document_resolved;

        // The mirror never creates directories
        std::fs::create_dir_all(&document.public_dir)?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.field("Source", document.source.display());
        output.field("Mirror", document.mirrored_path().display());
        output.field("Route", document.route());
        if config.live_reload.enabled {
            output.field("Live reload", &config.live_reload.event);
        } else {
            output.info("Live reload: disabled");
        }

        let server_config = server_config_from_config(&config, version.to_owned(), self.verbose);
        run_server(server_config).await?;

        Ok(())
    }

    /// Resolve `live_reload_enabled` from --live-reload/--no-live-reload flags.
    fn resolve_live_reload_enabled(&self) -> Option<bool> {
        self.no_live_reload.then_some(false).or(self.live_reload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ServeArgs,
    }

    fn parse(args: &[&str]) -> ServeArgs {
        TestCli::parse_from(std::iter::once("serve").chain(args.iter().copied())).args
    }

    #[test]
    fn test_live_reload_defaults_to_config() {
        assert_eq!(parse(&[]).resolve_live_reload_enabled(), None);
    }

    #[test]
    fn test_no_live_reload_disables() {
        assert_eq!(
            parse(&["--no-live-reload"]).resolve_live_reload_enabled(),
            Some(false)
        );
    }

    #[test]
    fn test_live_reload_explicit_value() {
        assert_eq!(
            parse(&["--live-reload", "true"]).resolve_live_reload_enabled(),
            Some(true)
        );
    }

    #[test]
    fn test_parses_overrides() {
        let args = parse(&["--source", "docs/INTRO.md", "--public-dir", "static", "-p", "8080", "-v"]);

        assert_eq!(args.source, Some(PathBuf::from("docs/INTRO.md")));
        assert_eq!(args.public_dir, Some(PathBuf::from("static")));
        assert_eq!(args.port, Some(8080));
        assert!(args.verbose);
    }
}
