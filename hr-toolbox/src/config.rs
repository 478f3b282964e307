// Configuration loading and parsing (toolbox.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub draw: DrawConfig,
    pub grouping: GroupingConfig,
    pub naming: NamingConfig,
    pub export: ExportConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// toolbox.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire toolbox.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ToolboxFile {
    draw: DrawConfig,
    grouping: GroupingConfig,
    naming: NamingConfig,
    #[serde(default)]
    export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DrawConfig {
    /// Delay between suspense ticks, in milliseconds.
    pub tick_interval_ms: u64,
    /// Number of suspense ticks before the winner is revealed.
    pub tick_count: u32,
    /// Whether a participant may win more than once (initial toggle state).
    #[serde(default)]
    pub allow_duplicates: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupingConfig {
    pub default_group_size: usize,
    pub default_theme: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamingConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Upper bound on a naming request, after which fallback names apply.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    /// Directory for CSV exports. When unset, the user's download directory
    /// (or the working directory) is used.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/toolbox.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- toolbox.toml (required) ---
    let toolbox_path = config_dir.join("toolbox.toml");
    let toolbox_text = read_file(&toolbox_path)?;
    let toolbox: ToolboxFile =
        toml::from_str(&toolbox_text).map_err(|e| ConfigError::ParseError {
            path: toolbox_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        draw: toolbox.draw,
        grouping: toolbox.grouping,
        naming: toolbox.naming,
        export: toolbox.export,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Config files seeded from `defaults/` when missing. Credentials are never
/// seeded: the shipped template holds a placeholder key.
const SEEDED_FILES: &[&str] = &["toolbox.toml"];

/// Create any missing config file in `config/` from its copy in `defaults/`.
///
/// Only the files the loader reads are seeded; templates and anything else
/// in `defaults/` are left alone, and existing files are never overwritten.
/// Returns the files that were created.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if !config_dir.is_dir() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        debug!("No defaults/ in {}, using config/ as is", base_dir.display());
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for name in SEEDED_FILES {
        let source = defaults_dir.join(name);
        if !source.is_file() {
            warn!("defaults/{} is missing, nothing to seed", name);
            continue;
        }
        let target = config_dir.join(name);
        if seed_file(&source, &target)? {
            info!("Created {} from defaults", target.display());
            copied.push(target);
        }
    }

    if !config_dir.join("credentials.toml").exists()
        && defaults_dir.join("credentials.toml.example").is_file()
    {
        info!(
            "No config/credentials.toml; group naming is disabled until one is \
             created from defaults/credentials.toml.example"
        );
    }

    Ok(copied)
}

/// Copy `source` to `target` unless `target` already exists.
///
/// Returns whether the file was created.
fn seed_file(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(ConfigError::DefaultsCopyError {
                message: format!("failed to create {}: {e}", target.display()),
            });
        }
    };

    let content = std::fs::read(source).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read {}: {e}", source.display()),
    })?;
    std::io::Write::write_all(&mut dest, &content).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to write {}: {e}", target.display()),
    })?;
    Ok(true)
}

/// Load config relative to the current working directory, copying defaults
/// for any missing files first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let positive_fields: &[(&str, u64)] = &[
        ("draw.tick_interval_ms", config.draw.tick_interval_ms),
        ("draw.tick_count", u64::from(config.draw.tick_count)),
        (
            "grouping.default_group_size",
            config.grouping.default_group_size as u64,
        ),
        ("naming.max_tokens", u64::from(config.naming.max_tokens)),
        ("naming.timeout_secs", config.naming.timeout_secs),
    ];
    for (name, val) in positive_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    if config.naming.model.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "naming.model".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
