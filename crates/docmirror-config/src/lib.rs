//! Configuration management for docmirror.
//!
//! Parses `docmirror.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Path Resolution
//!
//! Relative paths in the config file are resolved once, against the directory
//! containing the config file (the project root). Without a config file the
//! current working directory is the project root. Resolved paths are absolute
//! and lexically normalized (`a/../b` becomes `b`); symbolic links are not
//! followed.
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! A bare `$` (as in `$HOME`) is not a reference and is kept literally.
//!
//! Expanded fields:
//! - `server.host`
//! - `document.source`
//! - `document.public_dir`
//! - `build.out_dir`

mod expand;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
/// Relative paths are resolved against the current working directory.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override the source document path.
    pub source: Option<PathBuf>,
    /// Override the public directory.
    pub public_dir: Option<PathBuf>,
    /// Override the build output directory.
    pub out_dir: Option<PathBuf>,
    /// Override live reload enabled flag.
    pub live_reload_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docmirror.toml";

/// Default live reload event name sent to clients.
const DEFAULT_EVENT: &str = "readme-update";

/// Bytes percent-encoded in a route segment (the set browsers encode in paths).
const ROUTE_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// URL paths the development server serves itself.
const RESERVED_ROUTES: &[&str] = &["api/config", "ws/live-reload", "__docmirror"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Document configuration (paths are relative strings from TOML).
    document: DocumentConfigRaw,
    /// Build configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,
    /// Live reload configuration.
    pub live_reload: LiveReloadConfig,

    /// Resolved document configuration (set after loading).
    #[serde(skip)]
    pub document_resolved: DocumentConfig,
    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

/// Raw document configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocumentConfigRaw {
    source: Option<String>,
    public_dir: Option<String>,
    target: Option<String>,
}

/// Resolved document configuration with absolute paths.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Source document (absolute).
    pub source: PathBuf,
    /// Public directory served by the server (absolute).
    pub public_dir: PathBuf,
    /// Mirrored file location, relative to the public directory.
    pub target: PathBuf,
}

impl DocumentConfig {
    /// Absolute path of the mirrored document inside the public directory.
    #[must_use]
    pub fn mirrored_path(&self) -> PathBuf {
        self.public_dir.join(&self.target)
    }

    /// URL path under which the mirrored document is served (e.g. `/README.md`).
    ///
    /// Segments are percent-encoded the way a browser requests them, so
    /// `My Notes.md` is served at `/My%20Notes.md`.
    #[must_use]
    pub fn route(&self) -> String {
        let segments: Vec<_> = self
            .target
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => {
                    Some(utf8_percent_encode(&s.to_string_lossy(), ROUTE_SEGMENT).to_string())
                }
                _ => None,
            })
            .collect();
        format!("/{}", segments.join("/"))
    }
}

/// Raw build configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    out_dir: Option<String>,
}

/// Resolved build configuration with absolute paths.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Output directory the public directory is copied into.
    pub out_dir: PathBuf,
}

/// Live reload configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LiveReloadConfig {
    /// Whether live reload is enabled.
    pub enabled: bool,
    /// Event name sent to clients when the mirrored document changes.
    pub event: String,
    /// Debounce window for file watch events, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for LiveReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            event: DEFAULT_EVENT.to_owned(),
            debounce_ms: 100,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`DOCS_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Make a path absolute and remove `.` and `..` components without touching the filesystem.
/// Check that `target` maps to a URL path the server can route.
///
/// Segments must be UTF-8 and must not start with `:` or `*` (path
/// parameter syntax). The target must not shadow a server route.
fn validate_target_route(target: &Path) -> Result<(), ConfigError> {
    let mut segments = Vec::new();
    for component in target.components() {
        let Some(segment) = component.as_os_str().to_str() else {
            return Err(ConfigError::Validation(format!(
                "document.target must be valid UTF-8: {}",
                target.display()
            )));
        };
        if segment.starts_with(':') || segment.starts_with('*') {
            return Err(ConfigError::Validation(format!(
                "document.target segment '{segment}' cannot start with ':' or '*'"
            )));
        }
        segments.push(segment);
    }

    let route = segments.join("/");
    if let Some(reserved) = RESERVED_ROUTES
        .iter()
        .find(|r| route == **r || route.starts_with(&format!("{r}/")))
    {
        return Err(ConfigError::Validation(format!(
            "document.target '{route}' conflicts with the reserved path /{reserved}"
        )));
    }

    Ok(())
}

fn normalize(path: &Path) -> PathBuf {
    // `Path::new("x").parent()` is the empty path
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `docmirror.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source) = &settings.source {
            self.document_resolved.source = normalize(source);
        }
        if let Some(public_dir) = &settings.public_dir {
            self.document_resolved.public_dir = normalize(public_dir);
        }
        if let Some(out_dir) = &settings.out_dir {
            self.build_resolved.out_dir = normalize(out_dir);
        }
        if let Some(live_reload_enabled) = settings.live_reload_enabled {
            self.live_reload.enabled = live_reload_enabled;
        }
    }

    /// Project root: the config file's directory, or the working directory.
    #[must_use]
    pub fn project_root(&self) -> PathBuf {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| normalize(Path::new(".")), normalize)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            server: ServerConfig::default(),
            document: DocumentConfigRaw::default(),
            build: BuildConfigRaw::default(),
            live_reload: LiveReloadConfig::default(),
            document_resolved: DocumentConfig::default(),
            build_resolved: BuildConfig::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file and after applying CLI settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_document()?;
        self.validate_live_reload()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate document configuration.
    fn validate_document(&self) -> Result<(), ConfigError> {
        let target = &self.document_resolved.target;

        let mut components = target.components().peekable();
        if components.peek().is_none() {
            return Err(ConfigError::Validation(
                "document.target cannot be empty".to_owned(),
            ));
        }
        if !components.all(|c| matches!(c, Component::Normal(_))) {
            return Err(ConfigError::Validation(
                "document.target must be a relative path inside document.public_dir".to_owned(),
            ));
        }
        validate_target_route(target)?;

        if self.document_resolved.source == self.document_resolved.mirrored_path() {
            return Err(ConfigError::Validation(
                "document.source and the mirrored document must be different files".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate live reload configuration.
    fn validate_live_reload(&self) -> Result<(), ConfigError> {
        const MAX_DEBOUNCE_MS: u64 = 10_000;

        require_non_empty(&self.live_reload.event, "live_reload.event")?;

        if self.live_reload.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Validation(format!(
                "live_reload.debounce_ms cannot exceed {MAX_DEBOUNCE_MS}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref source) = self.document.source {
            self.document.source = Some(expand::expand_env(source, "document.source")?);
        }
        if let Some(ref public_dir) = self.document.public_dir {
            self.document.public_dir =
                Some(expand::expand_env(public_dir, "document.public_dir")?);
        }
        if let Some(ref out_dir) = self.build.out_dir {
            self.build.out_dir = Some(expand::expand_env(out_dir, "build.out_dir")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve =
            |path: Option<&str>, default: &str| normalize(&config_dir.join(path.unwrap_or(default)));

        self.document_resolved = DocumentConfig {
            source: resolve(self.document.source.as_deref(), "README.md"),
            public_dir: resolve(self.document.public_dir.as_deref(), "public"),
            target: PathBuf::from(self.document.target.as_deref().unwrap_or("README.md")),
        };

        self.build_resolved = BuildConfig {
            out_dir: resolve(self.build.out_dir.as_deref(), "dist"),
        };
    }
}
