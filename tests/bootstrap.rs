//! Bootstrap sequence against an in-memory seed node

use async_trait::async_trait;
use rsinit::cluster::{
    bootstrap, initiate, wait_until_ready, BootstrapOptions, ClusterDescriptor, FormationOutcome,
    MemberStatus, ReadinessPolicy, ReplicaSetStatus, SeedAdmin,
};
use rsinit::{Error, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Behaves like a mongod that is still starting, then accepts one
/// replSetInitiate and refuses every later one.
struct FakeSeed {
    unreachable_pings: u32,
    reject_initiate: Option<(i32, &'static str)>,
    status_calls_before_primary: u32,
    /// Status calls answered before the connection drops
    status_calls_before_reset: Option<u32>,
    pings: AtomicU32,
    initiates: AtomicU32,
    status_calls: AtomicU32,
    config: Mutex<Option<ClusterDescriptor>>,
}

impl FakeSeed {
    fn new(unreachable_pings: u32) -> Self {
        Self {
            unreachable_pings,
            reject_initiate: None,
            status_calls_before_primary: 0,
            status_calls_before_reset: None,
            pings: AtomicU32::new(0),
            initiates: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            config: Mutex::new(None),
        }
    }

    fn pings(&self) -> u32 {
        self.pings.load(Ordering::SeqCst)
    }

    fn initiates(&self) -> u32 {
        self.initiates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SeedAdmin for FakeSeed {
    fn target(&self) -> String {
        "mongo1:27017".to_string()
    }

    async fn ping(&self) -> Result<()> {
        let n = self.pings.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.unreachable_pings {
            Err(Error::Timeout("server selection timed out".into()))
        } else {
            Ok(())
        }
    }

    async fn initiate(&self, descriptor: &ClusterDescriptor) -> Result<()> {
        self.initiates.fetch_add(1, Ordering::SeqCst);
        if let Some((code, code_name)) = self.reject_initiate {
            return Err(Error::Command {
                code,
                code_name: code_name.to_string(),
                message: "rejected".to_string(),
            });
        }

        let mut config = self.config.lock().unwrap();
        if config.is_some() {
            return Err(Error::Command {
                code: 23,
                code_name: "AlreadyInitialized".to_string(),
                message: "already initialized".to_string(),
            });
        }
        *config = Some(descriptor.clone());
        Ok(())
    }

    async fn status(&self) -> Result<ReplicaSetStatus> {
        let config = self.config.lock().unwrap().clone();
        let Some(config) = config else {
            return Err(Error::Command {
                code: 94,
                code_name: "NotYetInitialized".to_string(),
                message: "no replset config has been received".to_string(),
            });
        };

        let n = self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.status_calls_before_reset.is_some_and(|limit| n >= limit) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )));
        }
        let elected = n >= self.status_calls_before_primary;
        Ok(ReplicaSetStatus {
            set: config.name().to_string(),
            members: config
                .members()
                .iter()
                .map(|m| MemberStatus {
                    id: m.id as i32,
                    name: m.host.clone(),
                    health: 1.0,
                    state: match (m.id, elected) {
                        (0, true) => "PRIMARY".to_string(),
                        (_, true) => "SECONDARY".to_string(),
                        _ => "STARTUP2".to_string(),
                    },
                })
                .collect(),
        })
    }
}

fn descriptor() -> ClusterDescriptor {
    ClusterDescriptor::from_hosts("rs0", &["mongo1:27017", "mongo2:27017", "mongo3:27017"])
        .unwrap()
}

fn options(max_attempts: u32) -> BootstrapOptions {
    BootstrapOptions {
        readiness: ReadinessPolicy::new(
            max_attempts,
            Duration::from_secs(2),
            Duration::from_secs(5),
        )
        .unwrap(),
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn first_run_waits_for_seed_then_forms() {
    let seed = FakeSeed::new(2);

    let report = bootstrap(&seed, &descriptor(), &options(60)).await.unwrap();

    assert_eq!(seed.pings(), 3);
    assert_eq!(report.attempts, 3);
    assert_eq!(report.waited, Duration::from_secs(4));
    assert_eq!(report.outcome, Some(FormationOutcome::Formed));
    assert!(report.succeeded());
    assert_eq!(seed.initiates(), 1);
    assert_eq!(seed.config.lock().unwrap().as_ref(), Some(&descriptor()));
}

#[tokio::test(start_paused = true)]
async fn rerun_against_formed_set_is_success() {
    let seed = FakeSeed::new(0);

    let first = bootstrap(&seed, &descriptor(), &options(60)).await.unwrap();
    let second = bootstrap(&seed, &descriptor(), &options(60)).await.unwrap();

    assert_eq!(first.outcome, Some(FormationOutcome::Formed));
    assert_eq!(second.outcome, Some(FormationOutcome::AlreadyFormed));
    assert!(second.formation_error.is_none());
    assert_eq!(seed.initiates(), 2);
    // the stored configuration is the one from the first run
    assert_eq!(seed.config.lock().unwrap().as_ref(), Some(&descriptor()));
}

#[tokio::test(start_paused = true)]
async fn initiate_twice_yields_formed_then_already_formed() {
    let seed = FakeSeed::new(0);
    let d = descriptor();
    let ready = wait_until_ready("mongo1:27017", || seed.ping(), &ReadinessPolicy::default())
        .await
        .unwrap();

    let first = initiate(&ready, &d, |_| seed.initiate(&d)).await.unwrap();
    let second = initiate(&ready, &d, |_| seed.initiate(&d)).await.unwrap();

    assert_eq!(first, FormationOutcome::Formed);
    assert_eq!(second, FormationOutcome::AlreadyFormed);
}

#[tokio::test(start_paused = true)]
async fn unreachable_seed_is_fatal_and_never_initiates() {
    let seed = FakeSeed::new(u32::MAX);

    let err = bootstrap(&seed, &descriptor(), &options(5)).await.unwrap_err();

    match &err {
        Error::UnreachableTarget { target, attempts } => {
            assert_eq!(target, "mongo1:27017");
            assert_eq!(*attempts, 5);
        }
        other => panic!("expected UnreachableTarget, got {:?}", other),
    }
    assert_ne!(err.exit_code(), 0);
    assert_eq!(seed.pings(), 5);
    assert_eq!(seed.initiates(), 0);
}

#[tokio::test(start_paused = true)]
async fn formation_rejection_is_logged_and_tolerated() {
    let mut seed = FakeSeed::new(0);
    seed.reject_initiate = Some((93, "InvalidReplicaSetConfig"));

    let report = bootstrap(&seed, &descriptor(), &options(3)).await.unwrap();

    assert_eq!(report.outcome, None);
    assert!(!report.succeeded());
    let error = report.formation_error.unwrap();
    assert!(error.contains("InvalidReplicaSetConfig"), "{}", error);
}

#[tokio::test(start_paused = true)]
async fn strict_mode_fails_on_formation_rejection() {
    let mut seed = FakeSeed::new(0);
    seed.reject_initiate = Some((93, "InvalidReplicaSetConfig"));
    let options = BootstrapOptions {
        strict: true,
        ..options(3)
    };

    let err = bootstrap(&seed, &descriptor(), &options).await.unwrap_err();
    assert!(matches!(err, Error::Formation(_)));
}

#[tokio::test(start_paused = true)]
async fn strict_mode_still_accepts_already_formed() {
    let seed = FakeSeed::new(0);
    let options = BootstrapOptions {
        strict: true,
        ..options(3)
    };

    bootstrap(&seed, &descriptor(), &options).await.unwrap();
    let report = bootstrap(&seed, &descriptor(), &options).await.unwrap();
    assert_eq!(report.outcome, Some(FormationOutcome::AlreadyFormed));
}

#[tokio::test(start_paused = true)]
async fn await_primary_polls_until_elected() {
    let mut seed = FakeSeed::new(0);
    seed.status_calls_before_primary = 2;
    let options = BootstrapOptions {
        await_primary: true,
        ..options(10)
    };

    let report = bootstrap(&seed, &descriptor(), &options).await.unwrap();

    assert_eq!(report.primary.as_deref(), Some("mongo1:27017"));
    // two polls without a primary, then the one that saw it
    assert_eq!(seed.status_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn primary_seen_once_is_kept_when_status_fails_afterwards() {
    let mut seed = FakeSeed::new(0);
    seed.status_calls_before_reset = Some(1);
    let options = BootstrapOptions {
        await_primary: true,
        ..options(10)
    };

    let report = bootstrap(&seed, &descriptor(), &options).await.unwrap();

    assert_eq!(report.outcome, Some(FormationOutcome::Formed));
    assert_eq!(report.primary.as_deref(), Some("mongo1:27017"));
    assert_eq!(seed.status_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn await_primary_gives_up_without_failing() {
    let mut seed = FakeSeed::new(0);
    seed.status_calls_before_primary = u32::MAX;
    let options = BootstrapOptions {
        await_primary: true,
        ..options(3)
    };

    let report = bootstrap(&seed, &descriptor(), &options).await.unwrap();

    assert_eq!(report.outcome, Some(FormationOutcome::Formed));
    assert_eq!(report.primary, None);
}
