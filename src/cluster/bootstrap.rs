//! Start-up sequence: wait for the seed, form the set, optionally wait
//! for a primary.

use std::time::Duration;

use crate::cluster::admin::SeedAdmin;
use crate::cluster::formation::{initiate, FormationOutcome};
use crate::cluster::readiness::{poll_until, wait_until_ready, ReadinessPolicy};
use crate::cluster::topology::ClusterDescriptor;
use crate::common::{Error, Result};

#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub readiness: ReadinessPolicy,
    /// Fail on formation errors other than "already formed"
    pub strict: bool,
    /// Poll `replSetGetStatus` until a member is PRIMARY
    pub await_primary: bool,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            readiness: ReadinessPolicy::default(),
            strict: false,
            await_primary: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub target: String,
    /// Probe calls until the seed answered
    pub attempts: u32,
    pub waited: Duration,
    /// `None` when formation failed and the failure was tolerated
    pub outcome: Option<FormationOutcome>,
    pub formation_error: Option<String>,
    /// Member that reported PRIMARY, when awaited
    pub primary: Option<String>,
}

impl BootstrapReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Run the start-up sequence against `admin`.
///
/// Only an unreachable seed (or, with `strict`, a formation rejection) is
/// returned as an error. Everything else is logged and reported so the
/// whole sequence can be re-run by a supervisor.
pub async fn bootstrap<A: SeedAdmin + ?Sized>(
    admin: &A,
    descriptor: &ClusterDescriptor,
    options: &BootstrapOptions,
) -> Result<BootstrapReport> {
    let target = admin.target();
    tracing::info!("Bootstrapping {} through seed {}", descriptor, target);

    let ready = wait_until_ready(&target, move || admin.ping(), &options.readiness).await?;

    let (outcome, formation_error) =
        match initiate(&ready, descriptor, move |_| admin.initiate(descriptor)).await {
            Ok(outcome) => (Some(outcome), None),
            Err(e) if options.strict => return Err(e),
            Err(e) => {
                tracing::warn!(
                    "Continuing after formation error (a later run will retry): {}",
                    e
                );
                (None, Some(e.to_string()))
            }
        };

    let primary = if options.await_primary && outcome.is_some() {
        await_primary(admin, &target, &options.readiness).await?
    } else {
        None
    };

    Ok(BootstrapReport {
        target,
        attempts: ready.attempts(),
        waited: ready.waited(),
        outcome,
        formation_error,
        primary,
    })
}

async fn await_primary<A: SeedAdmin + ?Sized>(
    admin: &A,
    target: &str,
    policy: &ReadinessPolicy,
) -> Result<Option<String>> {
    tracing::info!("Waiting for a primary in the replica set");

    // The name comes from the same reply that showed the primary
    let probe = move || async move {
        let status = admin.status().await?;
        status
            .primary()
            .map(|m| m.name.clone())
            .ok_or_else(|| Error::NotReady("no primary elected yet".into()))
    };

    match poll_until(target, probe, policy).await {
        Ok((name, _)) => {
            tracing::info!("✓ Primary elected: {}", name);
            Ok(Some(name))
        }
        Err(Error::UnreachableTarget { attempts, .. }) => {
            tracing::warn!("No primary after {} attempts", attempts);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
