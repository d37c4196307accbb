//! Configuration management for the lookup server.
//!
//! Two layers of configuration exist:
//!
//! - [`Config`]: process settings (listener, logging, where the driver file
//!   lives), populated from `FINGERPOST_*` environment variables.
//! - [`DriverSettings`]: the YAML driver file, selecting one backend and
//!   carrying its settings. Secrets may be given inline or read from a file.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::{Error, Result};
use super::transport::HttpConfig;
use crate::domains::drivers::IdentifierPolicy;

/// Default location of the driver configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/fingerpost/config.yml";

/// Main configuration structure for the server process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// HTTP listener configuration.
    pub transport: HttpConfig,

    /// Where the driver settings come from.
    pub source: SourceConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server, reported in logs and by the health endpoint.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Location and preprocessing of the driver settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the YAML driver settings.
    pub config_file: PathBuf,

    /// Expand `$VAR` and `${VAR}` in the file before decoding it.
    pub expand_env: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "fingerpost".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: HttpConfig::default(),
            source: SourceConfig {
                config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
                expand_env: false,
            },
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `FINGERPOST_`.
    /// For example: `FINGERPOST_PORT`, `FINGERPOST_LOG_LEVEL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("FINGERPOST_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("FINGERPOST_LOG_LEVEL") {
            config.logging.level = level;
        }

        match std::env::var("FINGERPOST_CONFIG_FILE") {
            Ok(path) if !path.is_empty() => config.source.config_file = PathBuf::from(path),
            _ => debug!(
                "no config file specified, using default config file path {}",
                DEFAULT_CONFIG_FILE
            ),
        }

        config.source.expand_env = std::env::var("FINGERPOST_EXPAND_ENV")
            .map(|v| !v.is_empty())
            .unwrap_or(false);

        config.transport = HttpConfig::from_env();

        config
    }

    /// Load the driver settings this configuration points at.
    pub fn load_driver_settings(&self) -> Result<DriverSettings> {
        DriverSettings::load(&self.source.config_file, self.source.expand_env)
    }
}

// ============================================================================
// Driver settings
// ============================================================================

/// The driver settings file: one discriminator plus one block per backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverSettings {
    /// Which backend to use: `file`, `ldap` or `sql`.
    pub driver: String,

    /// Identifier validation for the directory and SQL backends.
    #[serde(default)]
    pub identifier: IdentifierPolicy,

    /// Flat-file backend settings.
    #[serde(default)]
    pub file: Option<FileConfig>,

    /// Directory backend settings.
    #[serde(default)]
    pub ldap: Option<LdapConfig>,

    /// SQL backend settings.
    #[serde(default)]
    pub database: Option<SqlConfig>,
}

/// Flat-file backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Base directory holding one YAML document per identifier.
    pub directory: PathBuf,

    /// Whether documents may be symlinks pointing outside `directory`.
    ///
    /// When false, every document's real path must stay inside the base
    /// directory.
    #[serde(default = "default_true")]
    pub allow_symlinks: bool,
}

/// Directory (LDAP) backend settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct LdapConfig {
    /// Server URL, e.g. `ldaps://ldap.example.com`.
    pub url: String,

    /// DN used to bind before searching.
    #[serde(default)]
    pub bind_user: String,

    /// Bind password. Filled from `bind_pass_file` at load time.
    #[serde(default)]
    pub bind_pass: Option<String>,

    /// File holding the bind password.
    #[serde(default)]
    pub bind_pass_file: Option<PathBuf>,

    /// Search base.
    #[serde(rename = "basedn")]
    pub base_dn: String,

    /// Extra filter clause conjoined with the user filter.
    #[serde(default)]
    pub filter: Option<String>,

    /// Attribute matched against the identifier's user name.
    pub user_attr: String,

    /// Attributes fetched and handed to the template.
    #[serde(default)]
    pub attributes: Vec<String>,

    /// Path to the resource template.
    pub template: PathBuf,

    /// Connect and per-operation timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Relational (SQL) backend settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlConfig {
    /// Database flavour: `postgres`, `mysql` or `sqlite`.
    pub driver: String,

    /// Connection URL. Filled from `url_file` at load time.
    #[serde(default)]
    pub url: Option<String>,

    /// File holding the connection URL.
    #[serde(default)]
    pub url_file: Option<PathBuf>,

    /// Table to query.
    pub table: String,

    /// Column matched against the identifier's account.
    pub key_column: String,

    /// Columns fetched and handed to the template.
    pub column_names: Vec<String>,

    /// Path to the resource template.
    pub template: PathBuf,

    /// Upper bound on pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire and query timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_max_connections() -> u32 {
    5
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for LdapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapConfig")
            .field("url", &self.url)
            .field("bind_user", &self.bind_user)
            .field("bind_pass", &self.bind_pass.as_ref().map(|_| "[REDACTED]"))
            .field("bind_pass_file", &self.bind_pass_file)
            .field("base_dn", &self.base_dn)
            .field("filter", &self.filter)
            .field("user_attr", &self.user_attr)
            .field("attributes", &self.attributes)
            .field("template", &self.template)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for SqlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlConfig")
            .field("driver", &self.driver)
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("url_file", &self.url_file)
            .field("table", &self.table)
            .field("key_column", &self.key_column)
            .field("column_names", &self.column_names)
            .field("template", &self.template)
            .field("max_connections", &self.max_connections)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl DriverSettings {
    /// Read, decode and post-process a driver settings file.
    pub fn load(path: &Path, expand_env: bool) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded driver settings from {}", path.display());
        Self::from_yaml(&raw, expand_env)
    }

    /// Decode driver settings from YAML text and resolve secret files.
    pub fn from_yaml(raw: &str, expand_env: bool) -> Result<Self> {
        let text = if expand_env {
            Cow::Owned(expand_env_vars(raw))
        } else {
            Cow::Borrowed(raw)
        };

        let mut settings: Self = serde_yaml::from_str(&text)
            .map_err(|e| Error::config(format!("cannot decode driver settings YAML: {e}")))?;

        settings.resolve_secrets()?;
        Ok(settings)
    }

    /// Replace secret-file references with the secrets they hold.
    fn resolve_secrets(&mut self) -> Result<()> {
        if let Some(ldap) = self.ldap.as_mut() {
            let password = resolve_secret(
                ldap.bind_pass.take(),
                ldap.bind_pass_file.as_deref(),
                "bind_pass",
                "LDAP bind password",
            )?;
            ldap.bind_pass = Some(password);
        }

        if let Some(database) = self.database.as_mut() {
            let url = resolve_secret(
                database.url.take(),
                database.url_file.as_deref(),
                "url",
                "database URL",
            )?;
            database.url = Some(url);
        }

        Ok(())
    }
}

/// Pick the inline secret or read it from its file; exactly one must be set.
fn resolve_secret(
    inline: Option<String>,
    file: Option<&Path>,
    field: &str,
    description: &str,
) -> Result<String> {
    let inline = inline.filter(|v| !v.is_empty());
    let file = file.filter(|p| !p.as_os_str().is_empty());

    match (inline, file) {
        (Some(value), None) => Ok(value),
        (None, Some(path)) => read_secret_file(path)
            .map_err(|e| Error::config(format!("cannot read {description} file: {e}"))),
        _ => Err(Error::config(format!(
            "must specify either {field} or {field}_file"
        ))),
    }
}

/// Read a secret file, trimming surrounding whitespace.
fn read_secret_file(path: &Path) -> std::io::Result<String> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents.trim().to_string())
}

/// Expand `$VAR` and `${VAR}` references from the process environment.
///
/// Unset variables expand to the empty string. A `$` that does not start a
/// reference is kept as is.
pub fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        if name.is_empty() {
            out.push('$');
            rest = after;
            continue;
        }

        out.push_str(&std::env::var(name).unwrap_or_default());
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}
