//! Connection settings.
//!
//! ```toml
//! docs = "https://example.org/persisql"
//!
//! [connection]
//! dsn = "sqlite:/var/lib/app/data.db"
//! username = "app"
//! password = "secret"
//! ```
//!
//! Every key of the `connection` table is required. Environment variables
//! prefixed `PERSISQL` override file values, `__` separating nested keys
//! (`PERSISQL_CONNECTION__DSN`).

use std::str::FromStr;

use config::{Config, Environment, File, FileFormat};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::{PersisqlError, Result};

pub const DEFAULT_DOCS: &str = "https://github.com/persisql/persisql";
const ENV_PREFIX: &str = "PERSISQL";

lazy_static! {
    static ref DSN: Regex = Regex::new(r"^(?P<driver>[A-Za-z0-9_]+):(?P<target>.*)$").unwrap();
}

/// Where the gateway connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dsn {
    SqliteMemory,
    SqliteFile(String),
}

impl FromStr for Dsn {
    type Err = PersisqlError;
    fn from_str(dsn: &str) -> Result<Self> {
        let captures = DSN
            .captures(dsn.trim())
            .ok_or_else(|| PersisqlError::Config(format!("malformed dsn '{dsn}', expected 'driver:target'")))?;
        let target = &captures["target"];
        match &captures["driver"] {
            "sqlite" if target == ":memory:" => Ok(Dsn::SqliteMemory),
            "sqlite" if target.is_empty() => {
                Err(PersisqlError::Config("sqlite dsn needs a file path or ':memory:'".to_string()))
            }
            "sqlite" => Ok(Dsn::SqliteFile(target.to_string())),
            other => Err(PersisqlError::Config(format!(
                "unsupported driver '{other}' in dsn, only 'sqlite' is available"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionSettings {
    pub dsn: String,
    pub username: String,
    pub password: String,
}

impl ConnectionSettings {
    /// Read `base` (any format the config crate recognises by extension) layered
    /// with `PERSISQL_*` environment variables.
    pub fn load(base: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(base).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let docs = config
            .get_string("docs")
            .unwrap_or_else(|_| DEFAULT_DOCS.to_string());
        if config.get_table("connection").is_err() {
            return Err(PersisqlError::Config(format!(
                "'connection' config is missing, please check the docs: {docs}#connection"
            )));
        }
        let require = |key: &str| {
            config.get_string(&format!("connection.{key}")).map_err(|_| {
                PersisqlError::Config(format!(
                    "no '{key}' value set in connection config, please check the docs: {docs}#connection"
                ))
            })
        };
        Ok(Self {
            dsn: require("dsn")?,
            username: require("username")?,
            password: require("password")?,
        })
    }

    pub fn dsn(&self) -> Result<Dsn> {
        self.dsn.parse()
    }
}

impl FromStr for ConnectionSettings {
    type Err = PersisqlError;
    /// Settings given inline as TOML.
    fn from_str(toml: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::from_config(&config)
    }
}
