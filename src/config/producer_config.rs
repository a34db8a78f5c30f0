//! Runtime configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults;

// ============================================================================
// Top-level Config
// ============================================================================

/// Complete runtime configuration for one producer process.
///
/// Every section is optional in the file; missing values use [`defaults`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProducerConfig {
    pub input: InputConfig,
    pub broker: BrokerSettings,
    pub logging: LoggingConfig,
    pub admin: AdminConfig,
}

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` flag
    Explicit(PathBuf),
    /// `CELLSTREAM_CONFIG` environment variable
    Env(PathBuf),
    /// `./cellstream.toml`
    Local(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (--config)", p.display()),
            Self::Env(p) => write!(f, "{} ({})", p.display(), defaults::CONFIG_ENV_VAR),
            Self::Local(p) => write!(f, "{}", p.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Result of a successful load: the config, its origin, and any
/// unknown keys found in the file (reported as warnings, never fatal).
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ProducerConfig,
    pub source: ConfigSource,
    pub warnings: Vec<String>,
}

impl ProducerConfig {
    /// Resolve configuration using the standard search order.
    ///
    /// Unlike a missing `./cellstream.toml`, a path named explicitly (flag
    /// or env var) that cannot be read is an error.
    pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path)
                .map(|(config, warnings)| LoadedConfig {
                    config,
                    source: ConfigSource::Explicit(path.to_path_buf()),
                    warnings,
                });
        }

        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(path);
            let (config, warnings) = Self::load_from_file(&p)?;
            return Ok(LoadedConfig {
                config,
                source: ConfigSource::Env(p),
                warnings,
            });
        }

        let local = PathBuf::from(defaults::CONFIG_FILE);
        if local.exists() {
            let (config, warnings) = Self::load_from_file(&local)?;
            return Ok(LoadedConfig {
                config,
                source: ConfigSource::Local(local),
                warnings,
            });
        }

        Ok(LoadedConfig {
            config: Self::default(),
            source: ConfigSource::Defaults,
            warnings: Vec::new(),
        })
    }

    /// Load and validate a specific TOML file.
    ///
    /// Returns the config plus unknown-key warnings.
    pub fn load_from_file(path: &Path) -> Result<(Self, Vec<String>), ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(contents: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;

        let warnings = contents
            .parse::<toml::Value>()
            .map(|value| unknown_keys(&value))
            .unwrap_or_default()
            .into_iter()
            .map(|key| format!("Unknown config key '{key}' ignored"))
            .collect();

        Ok((config, warnings))
    }

    /// Check every setting; all problems are reported together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.input.path.as_os_str().is_empty() {
            errors.push("input.path must not be empty".to_string());
        }
        if self.input.pacing_ms > defaults::MAX_PACING_MS {
            errors.push(format!(
                "input.pacing_ms ({}) exceeds maximum of {} ms",
                self.input.pacing_ms,
                defaults::MAX_PACING_MS
            ));
        }
        if self.broker.host.trim().is_empty() {
            errors.push("broker.host must not be empty".to_string());
        }
        if self.broker.management_port == 0 {
            errors.push("broker.management_port must be non-zero".to_string());
        }
        if self.broker.vhost.is_empty() {
            errors.push("broker.vhost must not be empty".to_string());
        }
        if self.broker.request_timeout_secs == 0 {
            errors.push("broker.request_timeout_secs must be non-zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Dotted paths of keys in `value` that `ProducerConfig` does not know.
fn unknown_keys(value: &toml::Value) -> Vec<String> {
    const KNOWN: &[(&str, &[&str])] = &[
        ("input", &["path", "pacing_ms"]),
        (
            "broker",
            &["host", "management_port", "username", "password", "vhost", "request_timeout_secs"],
        ),
        ("logging", &["file", "level"]),
        ("admin", &["open_on_start", "url"]),
    ];

    let mut unknown = Vec::new();
    let Some(table) = value.as_table() else {
        return unknown;
    };

    for (section, entry) in table {
        let Some((_, fields)) = KNOWN.iter().find(|(name, _)| *name == section.as_str()) else {
            unknown.push(section.clone());
            continue;
        };
        if let Some(inner) = entry.as_table() {
            unknown.extend(
                inner
                    .keys()
                    .filter(|k| !fields.contains(&k.as_str()))
                    .map(|k| format!("{section}.{k}")),
            );
        }
    }
    unknown
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Sensor log with one header row
    pub path: PathBuf,
    /// Delay after each record (ms); 0 disables pacing
    pub pacing_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(defaults::INPUT_FILE),
            pacing_ms: defaults::PACING_MS,
        }
    }
}

/// Connection settings for the RabbitMQ management API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerSettings {
    pub host: String,
    pub management_port: u16,
    pub username: String,
    pub password: String,
    pub vhost: String,
    pub request_timeout_secs: u64,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            host: defaults::BROKER_HOST.to_string(),
            management_port: defaults::BROKER_MANAGEMENT_PORT,
            username: defaults::BROKER_USERNAME.to_string(),
            password: defaults::BROKER_PASSWORD.to_string(),
            vhost: defaults::BROKER_VHOST.to_string(),
            request_timeout_secs: defaults::BROKER_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl BrokerSettings {
    /// Base URL of the management API, e.g. `http://localhost:15672/`.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.management_port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Persistent log file; empty disables the file sink
    pub file: PathBuf,
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(defaults::LOG_FILE),
            level: defaults::LOG_LEVEL.to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn file_path(&self) -> Option<&Path> {
        if self.file.as_os_str().is_empty() {
            None
        } else {
            Some(&self.file)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub open_on_start: bool,
    pub url: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            open_on_start: true,
            url: defaults::ADMIN_URL.to_string(),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            Self::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            Self::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Tests
// ============================================================================
