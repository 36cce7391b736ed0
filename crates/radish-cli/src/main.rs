//! turnip - Radish のデモ
//!
//! Registers four probabilistic turnip tasks, enqueues a batch of jobs,
//! optionally rescales the worker pool halfway through, logs the status every
//! few seconds and shuts down once everything has finished (or on Ctrl-C).

mod tasks;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use radish_core::impls::InMemoryMetrics;
use radish_core::{Config, Radish, RadishError};
use rand::seq::SliceRandom;
use tracing::{info, trace, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::tasks::{Progress, Turnip};

#[derive(Parser, Debug)]
#[command(name = "turnip")]
#[command(about = "Run a batch of mock turnip tasks through radish")]
#[command(version)]
struct Args {
    /// Number of workers to start with (0 = available parallelism)
    #[arg(long, short, env = "TURNIP_WORKERS", default_value_t = 0)]
    workers: i64,

    /// Capacity of the task queue (0 = 5000)
    #[arg(long, short = 'q', env = "TURNIP_QUEUE_SIZE", default_value_t = 5000)]
    queue_size: i64,

    /// trace, debug, info, status, warn or silent
    #[arg(long, short = 'L', env = "TURNIP_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log repeated task failures once every this many (0 = 50)
    #[arg(long, env = "TURNIP_CAUTION_THRESHOLD", default_value_t = 50)]
    caution_threshold: u32,

    /// Do not collect metrics
    #[arg(long = "no-metrics", env = "TURNIP_SUPPRESS_METRICS")]
    suppress_metrics: bool,

    /// Number of jobs to enqueue
    #[arg(long, short = 'n', env = "TURNIP_JOBS", default_value_t = 100)]
    jobs: usize,

    /// Rescale to this many workers after half the jobs are enqueued
    #[arg(long, env = "TURNIP_SCALE_TO")]
    scale_to: Option<i64>,

    /// Divide every task delay by this factor
    #[arg(long, env = "TURNIP_SPEED", default_value_t = 10.0)]
    speed: f64,

    /// Seconds between status lines
    #[arg(long, env = "TURNIP_STATUS_INTERVAL", default_value_t = 2)]
    status_interval: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    ensure!(args.speed > 0.0, "--speed must be positive, got {}", args.speed);
    ensure!(args.status_interval > 0, "--status-interval must be positive");
    ensure!(
        args.scale_to.is_none_or(|n| n >= 0),
        "--scale-to cannot be negative"
    );

    let config = Config {
        workers: args.workers,
        queue_size: args.queue_size,
        log_level: args.log_level.clone(),
        caution_threshold: args.caution_threshold,
        suppress_metrics: args.suppress_metrics,
    };
    let settings = config.validate().context("invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(settings.log_level.as_filter().into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let progress = Arc::new(Progress::default());
    let metrics = Arc::new(InMemoryMetrics::new());

    let mut builder = Radish::builder(config);
    for task in Turnip::patch(args.speed, &progress) {
        builder = builder.register(task);
    }
    if !args.suppress_metrics {
        builder = builder.metrics(metrics.clone());
    }
    let radish = builder.build().await.context("could not start radish")?;

    let producer = tokio::spawn(produce(radish.clone(), args.jobs, args.scale_to));

    let mut ticker = tokio::time::interval(Duration::from_secs(args.status_interval));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, draining queue");
                break;
            }
            _ = progress.wait_for(args.jobs) => {
                info!(jobs = args.jobs, "all jobs finished");
                break;
            }
            _ = ticker.tick() => {
                let status = serde_json::to_string(&radish.status().await)?;
                info!(%status, finished = progress.finished(), "status");
            }
        }
    }

    radish.shutdown().await;
    match producer.await? {
        Ok(()) => {}
        // shut down before every job was enqueued
        Err(err) => warn!(error = %err, "producer stopped early"),
    }

    info!(
        succeeded = progress.succeeded(),
        failed = progress.failed(),
        "turnip done"
    );
    if !args.suppress_metrics {
        println!("{}", serde_json::to_string_pretty(&metrics.snapshot())?);
    }
    Ok(())
}

/// Enqueue `jobs` futures for randomly picked turnips.
async fn produce(radish: Radish, jobs: usize, scale_to: Option<i64>) -> Result<(), RadishError> {
    let names = radish.status().await.tasks;

    for i in 0..jobs {
        if i == jobs / 2
            && let Some(n) = scale_to
        {
            radish.set_workers(n).await?;
            info!(workers = n, "rescaled");
        }

        let Some(name) = names.choose(&mut rand::thread_rng()).cloned() else {
            return Ok(());
        };
        let id = radish.delay(&name, "", "", "").await?;
        trace!(%id, task = %name, "delayed");
    }

    info!(jobs, "all jobs enqueued");
    Ok(())
}
