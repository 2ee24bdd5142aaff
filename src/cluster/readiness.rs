//! Readiness waiter
//!
//! Polls a target at a fixed interval until a probe succeeds or the
//! attempt budget runs out. There is no backoff: the worst-case wait is
//! `(max_attempts - 1) * interval` plus the time spent inside probes.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::common::{Error, Result};

/// Attempt budget for [`wait_until_ready`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    max_attempts: u32,
    interval: Duration,
    probe_timeout: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_secs(2),
            probe_timeout: Duration::from_secs(5),
        }
    }
}

impl ReadinessPolicy {
    pub fn new(max_attempts: u32, interval: Duration, probe_timeout: Duration) -> Result<Self> {
        if max_attempts == 0 {
            return Err(Error::InvalidConfig("max_attempts must be at least 1".into()));
        }
        if probe_timeout.is_zero() {
            return Err(Error::InvalidConfig("probe timeout must be non-zero".into()));
        }
        Ok(Self {
            max_attempts,
            interval,
            probe_timeout,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }
}

/// Proof that a target answered its probe.
///
/// Only [`wait_until_ready`] hands these out, so anything that takes a
/// `&SeedReady` cannot run before the seed was reachable.
#[derive(Debug, Clone)]
pub struct SeedReady {
    target: String,
    attempts: u32,
    waited: Duration,
}

impl SeedReady {
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Probe calls made, including the successful one
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn waited(&self) -> Duration {
        self.waited
    }
}

/// Poll `probe` until it succeeds.
///
/// A probe error or a probe exceeding `probe_timeout` counts as a failed
/// attempt. After `max_attempts` failures returns
/// [`Error::UnreachableTarget`].
pub async fn wait_until_ready<F, Fut>(
    target: &str,
    probe: F,
    policy: &ReadinessPolicy,
) -> Result<SeedReady>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let ((), ready) = poll_until(target, probe, policy).await?;
    Ok(ready)
}

/// Same loop as [`wait_until_ready`], keeping what the successful probe
/// returned
pub(crate) async fn poll_until<F, Fut, T>(
    target: &str,
    mut probe: F,
    policy: &ReadinessPolicy,
) -> Result<(T, SeedReady)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let started = Instant::now();
    let max = policy.max_attempts;

    for attempt in 1..=max {
        let failure = match tokio::time::timeout(policy.probe_timeout, probe()).await {
            Ok(Ok(value)) => {
                let waited = started.elapsed();
                tracing::info!(addr = %target, attempt, ?waited, "Target is ready");
                let ready = SeedReady {
                    target: target.to_string(),
                    attempts: attempt,
                    waited,
                };
                return Ok((value, ready));
            }
            Ok(Err(e)) => e,
            Err(_) => Error::Timeout(format!("probe exceeded {:?}", policy.probe_timeout)),
        };

        tracing::info!("Waiting for {}... ({}/{})", target, attempt, max);
        tracing::debug!(addr = %target, attempt, error = %failure, "Probe failed");

        if attempt < max {
            tokio::time::sleep(policy.interval).await;
        }
    }

    tracing::error!("{} did not become ready after {} attempts", target, max);
    Err(Error::UnreachableTarget {
        target: target.to_string(),
        attempts: max,
    })
}
