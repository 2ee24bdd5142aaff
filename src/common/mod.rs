//! Common utilities and types shared across rsinit

pub mod config;
pub mod error;
pub mod utils;

pub use config::{Config, FormationConfig, LoaderConfig, ReadinessConfig, SeedConfig};
pub use error::{Error, Result};
pub use utils::{format_duration, parse_duration, split_host_port, with_default_port};
