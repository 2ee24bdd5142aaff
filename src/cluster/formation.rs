//! Cluster formation initiator

use std::future::Future;

use crate::cluster::readiness::SeedReady;
use crate::cluster::topology::ClusterDescriptor;
use crate::common::{Error, Result};

/// Successful outcomes of a formation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationOutcome {
    /// This run created the replica set configuration
    Formed,
    /// A previous run already did; nothing changed
    AlreadyFormed,
}

impl std::fmt::Display for FormationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormationOutcome::Formed => write!(f, "formed"),
            FormationOutcome::AlreadyFormed => write!(f, "already formed"),
        }
    }
}

/// Submit the descriptor once and classify the reply.
///
/// The `ready` token is required so this cannot run before the seed
/// answered its probe. Repeat runs are safe: the server rejects a second
/// initiate with "already initialized", which maps to
/// [`FormationOutcome::AlreadyFormed`]. Any other rejection is returned as
/// [`Error::Formation`] for the caller's policy to handle.
pub async fn initiate<F, Fut>(
    ready: &SeedReady,
    descriptor: &ClusterDescriptor,
    submit: F,
) -> Result<FormationOutcome>
where
    F: FnOnce(&ClusterDescriptor) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    descriptor.validate()?;

    tracing::info!(
        "Initiating replica set {} via {} ({} members)",
        descriptor.name(),
        ready.target(),
        descriptor.members().len()
    );

    match submit(descriptor).await {
        Ok(()) => {
            tracing::info!("✓ Replica set {} formed", descriptor.name());
            Ok(FormationOutcome::Formed)
        }
        Err(e) if e.is_already_formed() => {
            tracing::info!(
                "Replica set {} already has a configuration, nothing to do",
                descriptor.name()
            );
            Ok(FormationOutcome::AlreadyFormed)
        }
        Err(e) => {
            tracing::warn!("Replica set {} initiation rejected: {}", descriptor.name(), e);
            Err(Error::Formation(Box::new(e)))
        }
    }
}
