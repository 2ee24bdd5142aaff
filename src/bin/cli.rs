//! rsinit CLI: replica set bootstrap and dataset loading

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rsinit::cluster::{bootstrap, wait_until_ready, BootstrapOptions, SeedAdmin};
use rsinit::common::{format_duration, split_host_port, Config};
use rsinit::mongo::{MongoSeed, MongoSink};
use rsinit::ops::{inspect_server, load_all, DatasetSource};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rsinit")]
#[command(about = "MongoDB replica set bootstrap and dataset loader")]
#[command(version = rsinit::VERSION)]
struct Cli {
    /// Config file (TOML); defaults to ./rsinit.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SeedArgs {
    /// Seed node (host[:port]); must be one of the members. Defaults to
    /// the first member.
    #[arg(long)]
    seed: Option<String>,

    /// Probe attempts before giving up
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Delay between attempts (e.g. 2s, 500ms)
    #[arg(long)]
    interval: Option<String>,

    /// Upper bound on a single probe
    #[arg(long)]
    probe_timeout: Option<String>,
}

impl SeedArgs {
    fn apply(self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(seed) = self.seed {
            let (host, port) = split_host_port(&seed)?;
            config.seed.host = Some(host);
            config.seed.port = Some(port);
        }
        if let Some(max_attempts) = self.max_attempts {
            config.readiness.max_attempts = max_attempts;
        }
        if let Some(interval) = self.interval {
            config.readiness.interval = interval;
        }
        if let Some(probe_timeout) = self.probe_timeout {
            config.readiness.probe_timeout = probe_timeout;
        }
        Ok(())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Wait until the seed node answers ping
    Wait {
        #[command(flatten)]
        seed: SeedArgs,
    },

    /// Wait for the seed, then form the replica set
    Bootstrap {
        #[command(flatten)]
        seed: SeedArgs,

        /// Replica set name
        #[arg(long)]
        replica_set: Option<String>,

        /// Member hosts in id order (comma-separated)
        #[arg(long, value_delimiter = ',')]
        members: Vec<String>,

        /// Fail on formation errors other than "already formed"
        #[arg(long)]
        strict: bool,

        /// Wait for a primary after formation
        #[arg(long)]
        await_primary: bool,
    },

    /// Replace collections with the contents of JSON dataset files
    Load {
        /// Connection string
        #[arg(long)]
        uri: Option<String>,

        /// Target database
        #[arg(long)]
        database: Option<String>,

        /// Directory holding <collection>.json files
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Datasets to load (comma-separated)
        #[arg(long, value_delimiter = ',')]
        collections: Vec<String>,

        /// Load datasets concurrently
        #[arg(long)]
        concurrent: bool,
    },

    /// Check the connection and show server contents
    Status {
        /// Node to inspect (host[:port]); defaults to the seed
        #[arg(long)]
        node: Option<String>,

        /// Database to list collections for
        #[arg(long)]
        database: Option<String>,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn seed_of(config: &Config) -> anyhow::Result<MongoSeed> {
    let (host, port) = split_host_port(&config.seed_addr()?)?;
    let policy = config.readiness.policy()?;
    Ok(MongoSeed::new(host, port, policy.probe_timeout()))
}

async fn run(command: Commands, mut config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Wait { seed } => {
            seed.apply(&mut config)?;
            config.validate()?;
            let policy = config.readiness.policy()?;
            let admin = &seed_of(&config)?;
            let ready = wait_until_ready(&admin.target(), move || admin.ping(), &policy).await?;
            println!(
                "{} ready after {} attempts ({})",
                ready.target(),
                ready.attempts(),
                format_duration(ready.waited())
            );
        }

        Commands::Bootstrap {
            seed,
            replica_set,
            members,
            strict,
            await_primary,
        } => {
            seed.apply(&mut config)?;
            if let Some(name) = replica_set {
                config.replica_set = name;
            }
            if !members.is_empty() {
                config.members = members;
            }
            config.formation.strict |= strict;
            config.formation.await_primary |= await_primary;
            config.validate()?;

            let descriptor = config.descriptor()?;
            let options = BootstrapOptions {
                readiness: config.readiness.policy()?,
                strict: config.formation.strict,
                await_primary: config.formation.await_primary,
            };
            let admin = seed_of(&config)?;

            let report = bootstrap(&admin, &descriptor, &options).await?;
            println!("Bootstrap report:");
            println!("  Seed: {}", report.target);
            println!("  Probe attempts: {}", report.attempts);
            println!("  Waited: {}", format_duration(report.waited));
            match (&report.outcome, &report.formation_error) {
                (Some(outcome), _) => println!("  Replica set {}: {}", descriptor.name(), outcome),
                (None, Some(e)) => println!("  Formation error (ignored): {}", e),
                (None, None) => {}
            }
            if let Some(primary) = &report.primary {
                println!("  Primary: {}", primary);
            }
        }

        Commands::Load {
            uri,
            database,
            data_dir,
            collections,
            concurrent,
        } => {
            if let Some(uri) = uri {
                config.loader.uri = uri;
            }
            if let Some(database) = database {
                config.loader.database = database;
            }
            if let Some(dir) = data_dir {
                config.loader.data_dir = dir;
            }
            if !collections.is_empty() {
                config.loader.collections = collections;
            }
            config.loader.concurrent |= concurrent;
            config.validate()?;

            let loader = &config.loader;
            let sink = MongoSink::new(loader.database.clone(), loader.connect_timeout()?);
            let sources = DatasetSource::in_dir(&loader.data_dir, &loader.collections);

            let report = load_all(&sources, &loader.uri, &sink, loader.concurrent).await;
            println!("Load report ({}):", loader.database);
            for outcome in &report.datasets {
                match &outcome.result {
                    Ok(count) => println!("  {}: {} records", outcome.name, count),
                    Err(e) => println!(
                        "  {}: FAILED ({} attempted): {}",
                        outcome.name, outcome.attempted, e
                    ),
                }
            }
            println!("  Total inserted: {}", report.total_inserted());
        }

        Commands::Status { node, database } => {
            if let Some(database) = database {
                config.loader.database = database;
            }
            config.validate()?;

            let admin = match node {
                Some(node) => {
                    let (host, port) = split_host_port(&node)?;
                    MongoSeed::new(host, port, config.readiness.policy()?.probe_timeout())
                }
                None => seed_of(&config)?,
            };
            let inventory = inspect_server(&admin, &config.loader.database)
                .await
                .with_context(|| format!("connection to {} failed", admin.target()))?;
            print!("{}", inventory.render());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(64);
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    tracing::debug!("rsinit {}", rsinit::BUILD_INFO);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<rsinit::Error>()
                .map(|e| e.exit_code())
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}
