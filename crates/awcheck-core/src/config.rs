//! Connection settings.
//!
//! Settings are layered with `figment`:
//! 1. built-in defaults (`db_port = 1433`, `db_trust_server_certificate = true`)
//! 2. an optional TOML file (`awcheck.toml` in the working directory, or an
//!    explicit path)
//! 3. environment variables `db_host`, `db_username`, `db_password`,
//!    `db_port` and `db_trust_server_certificate` (lower or upper case)
//!
//! The database name is not configurable: every check targets [`DATABASE`].
//!
//! Host, username and password are taken from the environment verbatim;
//! only the port and the certificate flag go through figment's value parser.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::error::{Error, Result};

/// The sample database every check runs against.
pub const DATABASE: &str = "AdventureWorks2012";

/// Settings file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "awcheck.toml";

/// Default SQL Server TCP port.
pub const DEFAULT_PORT: u16 = 1433;

/// Keys read from the environment as plain text.
const TEXT_ENV_KEYS: &[&str] = &["db_host", "db_username", "db_password"];

/// Keys parsed by figment (`db_port = 1433`, `..._certificate = false`).
const PARSED_ENV_KEYS: &[&str] = &["db_port", "db_trust_server_certificate"];

/// Server address and credentials.
#[derive(Clone, Deserialize)]
pub struct Settings {
    /// Server host name or IP address.
    #[serde(rename = "db_host")]
    pub host: String,
    /// SQL Server login.
    #[serde(rename = "db_username")]
    pub username: String,
    /// SQL Server password.
    #[serde(rename = "db_password")]
    pub password: String,
    /// TCP port.
    #[serde(rename = "db_port", default = "default_port")]
    pub port: u16,
    /// Accept the server certificate without validation.
    #[serde(rename = "db_trust_server_certificate", default = "default_trust")]
    pub trust_server_certificate: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_trust() -> bool {
    true
}

/// Text settings present in the environment, unparsed.
fn text_env() -> BTreeMap<&'static str, String> {
    TEXT_ENV_KEYS
        .iter()
        .filter_map(|key| {
            std::env::var(key)
                .or_else(|_| std::env::var(key.to_uppercase()))
                .ok()
                .map(|value| (*key, value))
        })
        .collect()
}

impl Settings {
    /// Build the provider chain without extracting.
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let file = config_file.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        Figment::new()
            .merge(Toml::file(file))
            .merge(Env::raw().only(PARSED_ENV_KEYS))
            .merge(Serialized::defaults(text_env()))
    }

    /// Load settings from the optional file and the environment.
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "settings file not found: {}",
                    path.display()
                )));
            }
        }

        let settings: Self = Self::figment(config_file).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("db_host is empty".to_string()));
        }
        if self.username.trim().is_empty() {
            return Err(Error::Config("db_username is empty".to_string()));
        }
        if self.port == 0 {
            return Err(Error::Config("db_port must be non-zero".to_string()));
        }
        Ok(())
    }

    /// `host:port` for the TCP connect.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Driver configuration targeting [`DATABASE`] with SQL Server authentication.
    #[must_use]
    pub fn tds_config(&self) -> tiberius::Config {
        let mut config = tiberius::Config::new();
        config.host(&self.host);
        config.port(self.port);
        config.database(DATABASE);
        config.authentication(tiberius::AuthMethod::sql_server(
            &self.username,
            &self.password,
        ));
        if self.trust_server_certificate {
            config.trust_cert();
        }
        config
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .finish()
    }
}
