//! Replica set bootstrap
//!
//! - Topology: member and cluster descriptors
//! - Readiness: fixed-interval polling of the seed node
//! - Formation: one-shot `replSetInitiate` with "already formed" as success
//! - Bootstrap: the start-up sequence tying them together

pub mod admin;
pub mod bootstrap;
pub mod formation;
pub mod readiness;
pub mod status;
pub mod topology;

pub use admin::SeedAdmin;
pub use bootstrap::{bootstrap, BootstrapOptions, BootstrapReport};
pub use formation::{initiate, FormationOutcome};
pub use readiness::{wait_until_ready, ReadinessPolicy, SeedReady};
pub use status::{MemberStatus, ReplicaSetStatus};
pub use topology::{ClusterDescriptor, Member};
