use crate::config::Config;
use crate::error::{ReviewError, ValidationError};
use crate::output::Aggregator;
use crate::provider::{EndpointPool, ReviewClient};
use crate::review::{validate, ReviewOutcome, ReviewUnit};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::dispatcher::Dispatcher;

/// Terminal result for one unit. The unit's content is dropped by now.
#[derive(Debug)]
pub struct UnitReport {
    pub path: PathBuf,
    pub size: u64,
    pub outcome: ReviewOutcome,
    pub duration: Duration,
}

/// Everything a unit task needs, shared across all tasks of one run.
struct TaskContext {
    dispatcher: Dispatcher,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
    max_file_size: u64,
}

pub struct Orchestrator {
    ctx: Arc<TaskContext>,
    concurrency: usize,
    launch_delay: Duration,
}

impl Orchestrator {
    pub fn new(config: &Config, client: Arc<dyn ReviewClient>, cancel: CancellationToken) -> Self {
        let pool = Arc::new(EndpointPool::from_config(config));
        let concurrency = config.concurrency.max(1);

        Self {
            ctx: Arc::new(TaskContext {
                dispatcher: Dispatcher::new(pool, client),
                semaphore: Arc::new(Semaphore::new(concurrency)),
                cancel,
                max_file_size: config.max_file_size,
            }),
            concurrency,
            launch_delay: Duration::from_millis(config.launch_delay_ms),
        }
    }

    pub fn endpoints(&self) -> &[String] {
        self.ctx.dispatcher.pool().effective_endpoints()
    }

    /// Review every unit, returning one report per unit in completion order.
    ///
    /// All units are spawned up front; the semaphore caps how many are talking
    /// to an endpoint at once. Each report is recorded into `aggregator` by the
    /// task that produced it.
    pub async fn run_all<W>(
        &self,
        units: Vec<ReviewUnit>,
        aggregator: Arc<Aggregator<W>>,
    ) -> Vec<UnitReport>
    where
        W: Write + Send + 'static,
    {
        info!(
            "Reviewing {} units with concurrency {} across {} endpoint(s)",
            units.len(),
            self.concurrency,
            self.endpoints().len()
        );

        let total = units.len();
        let mut futures = FuturesUnordered::new();

        for (idx, unit) in units.into_iter().enumerate() {
            // Small delay between launches to avoid burst rate limits
            if idx > 0 && self.launch_delay > Duration::ZERO {
                sleep(self.launch_delay).await;
            }

            let path = unit.path.clone();
            let size = unit.size;
            let ctx = self.ctx.clone();
            let task_aggregator = aggregator.clone();

            let handle = tokio::spawn(async move {
                let report = review_unit(&ctx, unit).await;
                record_blocking(task_aggregator, report).await
            });

            let aggregator = aggregator.clone();
            futures.push(async move {
                match handle.await {
                    Ok(report) => report,
                    Err(e) => {
                        warn!("Task for {} did not complete: {}", path.display(), e);
                        let mut report = UnitReport {
                            path,
                            size,
                            outcome: Err(ReviewError::Panicked(e.to_string())),
                            duration: Duration::ZERO,
                        };
                        record(&aggregator, &mut report);
                        report
                    }
                }
            });
        }

        let mut reports = Vec::with_capacity(total);
        while let Some(report) = futures.next().await {
            reports.push(report);
        }
        reports
    }
}

async fn review_unit(ctx: &TaskContext, unit: ReviewUnit) -> UnitReport {
    let start = Instant::now();

    let outcome = AssertUnwindSafe(process_unit(ctx, &unit))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(ReviewError::Panicked(panic_message(panic.as_ref()))));

    match &outcome {
        Ok(review) => info!("Reviewed {} via {}", unit.path.display(), review.endpoint),
        Err(e) => warn!("Failed to review {}: {}", unit.path.display(), e),
    }

    UnitReport {
        path: unit.path,
        size: unit.size,
        outcome,
        duration: start.elapsed(),
    }
}

async fn process_unit(ctx: &TaskContext, unit: &ReviewUnit) -> ReviewOutcome {
    if unit.size > ctx.max_file_size {
        return Err(ValidationError::ExceedsMaxSize {
            size: unit.size,
            limit: ctx.max_file_size,
        }
        .into());
    }
    validate(&unit.content)?;

    // Held until this function returns or unwinds
    let _permit = tokio::select! {
        _ = ctx.cancel.cancelled() => {
            return Err(ReviewError::Cancelled { attempts: Vec::new() });
        }
        permit = ctx.semaphore.clone().acquire_owned() => match permit {
            Ok(p) => p,
            Err(_) => return Err(ReviewError::Cancelled { attempts: Vec::new() }),
        },
    };

    info!("Reviewing: {}", unit.path.display());
    ctx.dispatcher.review(unit, &ctx.cancel).await
}

/// Record on the blocking pool, since the sink may stall on a slow reader.
async fn record_blocking<W>(aggregator: Arc<Aggregator<W>>, mut report: UnitReport) -> UnitReport
where
    W: Write + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        record(&aggregator, &mut report);
        report
    })
    .await
    .unwrap_or_else(|e| std::panic::resume_unwind(e.into_panic()))
}

fn record<W: Write>(aggregator: &Aggregator<W>, report: &mut UnitReport) {
    if let Err(e) = aggregator.record(report) {
        warn!("Failed to write report for {}: {}", report.path.display(), e);
        report.outcome = Err(ReviewError::Unwritten(e.to_string()));
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
