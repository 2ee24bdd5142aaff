//! # rsinit
//!
//! Idempotent start-up tooling for a MongoDB replica set:
//! - Readiness waiter: fixed-interval polling of the seed node
//! - Formation initiator: one `replSetInitiate`, "already formed" is success
//! - Dataset loader: drop-then-insert of JSON datasets, one per collection
//!
//! ## Architecture
//!
//! ```text
//!  supervisor start-up                    on demand
//!  ┌──────────────────────────────┐       ┌─────────────────────┐
//!  │ rsinit bootstrap             │       │ rsinit load         │
//!  │  wait ── ping ──┐            │       │  nodes.json ─┐      │
//!  │  initiate ──────┤            │       │  edges.json ─┤      │
//!  └─────────────────┼────────────┘       └──────────────┼──────┘
//!                    │ direct connection                 │ uri
//!              ┌─────▼─────┐  ┌───────────┐  ┌───────────▼┐
//!              │ mongo1    │  │ mongo2    │  │ mongo3     │
//!              │ (seed, 0) │  │ (1)       │  │ (2)        │
//!              └───────────┘  └───────────┘  └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Wait for mongo1, then form rs0 from the three members
//! rsinit bootstrap --seed mongo1:27017 \
//!   --replica-set rs0 \
//!   --members mongo1:27017,mongo2:27017,mongo3:27017
//!
//! # Replace the nodes and edges collections from ./data/*.json
//! rsinit load --uri "mongodb://mongo1:27017/?replicaSet=rs0" --data-dir ./data
//!
//! # Connection check
//! rsinit status --node mongo1:27017
//! ```

pub mod cluster;
pub mod common;
pub mod mongo;
pub mod ops;

// Re-export commonly used types
pub use cluster::{bootstrap, ClusterDescriptor, FormationOutcome, SeedAdmin};
pub use common::{Config, Error, Result};
pub use ops::{load_all, DatasetSink, LoadReport};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build info
pub const BUILD_INFO: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CARGO_PKG_NAME"), ")");
