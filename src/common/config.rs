//! Configuration for rsinit
//!
//! Sources, lowest priority first: built-in defaults, an optional TOML
//! file, `RSINIT__*` environment variables. The CLI applies its flags on
//! top of the loaded value.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cluster::readiness::ReadinessPolicy;
use crate::cluster::topology::ClusterDescriptor;
use crate::common::utils::{parse_duration, split_host_port, DEFAULT_PORT};
use crate::common::{Error, Result};

/// Config file picked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "rsinit.toml";

/// Environment prefix (`RSINIT__READINESS__MAX_ATTEMPTS=10`)
pub const ENV_PREFIX: &str = "RSINIT";

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed node contacted for liveness and formation
    pub seed: SeedConfig,

    /// Replica set name
    pub replica_set: String,

    /// Member hosts in id order (`host:port`)
    pub members: Vec<String>,

    pub readiness: ReadinessConfig,

    pub formation: FormationConfig,

    pub loader: LoaderConfig,

    /// Logging level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: SeedConfig::default(),
            replica_set: "rs0".to_string(),
            members: vec![
                "mongo1:27017".to_string(),
                "mongo2:27017".to_string(),
                "mongo3:27017".to_string(),
            ],
            readiness: ReadinessConfig::default(),
            formation: FormationConfig::default(),
            loader: LoaderConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Seed override. Unset fields fall back to member 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub host: Option<String>,
    /// Defaults to 27017 when only `host` is set
    pub port: Option<u16>,
}

/// Polling budget for the readiness waiter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub max_attempts: u32,

    /// Fixed delay between attempts ("2s")
    pub interval: String,

    /// Upper bound on a single probe ("5s")
    pub probe_timeout: String,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: "2s".to_string(),
            probe_timeout: "5s".to_string(),
        }
    }
}

impl ReadinessConfig {
    pub fn policy(&self) -> Result<ReadinessPolicy> {
        ReadinessPolicy::new(
            self.max_attempts,
            parse_duration(&self.interval)?,
            parse_duration(&self.probe_timeout)?,
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    /// Fail the run on formation errors other than "already formed"
    pub strict: bool,

    /// Wait for a PRIMARY after formation
    pub await_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Connection string for data commands
    pub uri: String,

    pub database: String,

    /// Directory holding `<collection>.json` files
    pub data_dir: PathBuf,

    /// Datasets to load; each name is also the target collection
    pub collections: Vec<String>,

    /// Load datasets at the same time
    pub concurrent: bool,

    /// Server selection timeout for data connections ("10s")
    pub connect_timeout: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017/".to_string(),
            database: "codelens".to_string(),
            data_dir: PathBuf::from("./data"),
            collections: vec!["nodes".to_string(), "edges".to_string()],
            concurrent: false,
            connect_timeout: "10s".to_string(),
        }
    }
}

impl LoaderConfig {
    pub fn connect_timeout(&self) -> Result<Duration> {
        parse_duration(&self.connect_timeout)
    }
}

impl Config {
    /// Load configuration from an optional file plus the environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => ::config::File::from(path).required(true),
            None => ::config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: Config = ::config::Config::builder()
            .add_source(file)
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("members")
                    .with_list_parse_key("loader.collections"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.replica_set.is_empty() {
            return Err(Error::InvalidConfig("replica set name is empty".into()));
        }
        if self.loader.database.is_empty() {
            return Err(Error::InvalidConfig("database name is empty".into()));
        }
        self.readiness.policy()?;
        self.loader.connect_timeout()?;

        let seed = self.seed_addr()?;
        let descriptor = self.descriptor()?;
        if !descriptor.members().iter().any(|m| m.host == seed) {
            return Err(Error::InvalidConfig(format!(
                "seed {} is not a member of {}",
                seed, descriptor
            )));
        }
        Ok(())
    }

    /// `host:port` of the seed: the configured one, or member 0
    pub fn seed_addr(&self) -> Result<String> {
        match &self.seed.host {
            Some(host) if host.trim().is_empty() => {
                Err(Error::InvalidConfig("seed host is empty".into()))
            }
            Some(host) => Ok(format!(
                "{}:{}",
                host.trim(),
                self.seed.port.unwrap_or(DEFAULT_PORT)
            )),
            None => {
                let descriptor = self.descriptor()?;
                let (host, port) = split_host_port(&descriptor.seed().host)?;
                Ok(format!("{}:{}", host, self.seed.port.unwrap_or(port)))
            }
        }
    }

    /// Cluster descriptor built from the configured members
    pub fn descriptor(&self) -> Result<ClusterDescriptor> {
        ClusterDescriptor::from_hosts(&self.replica_set, &self.members)
    }
}
