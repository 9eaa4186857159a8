use crate::cli::RunArgs;
use crate::config::Config;
use crate::discovery::scan_units;
use crate::output::{write_summary, Aggregator};
use crate::provider::{create_client, EndpointPool};
use crate::review::ReviewUnit;
use crate::runner::Orchestrator;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    if config.requires_api_key() && config.api_key.is_none() {
        warn!("This API endpoint likely requires an API key");
        eprintln!("Warning: the configured API endpoint likely requires an API key.");
        eprintln!("Use --api-key flag or set AIREVIEW_API_KEY environment variable.\n");
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("configuration error: {}", e))?;

    eprintln!("Scanning directory: {}", config.target.display());
    let diff_base = args.diff_base.clone().or_else(|| config.diff_base.clone());
    let units = scan_units(&config, diff_base.as_deref())
        .map_err(|e| anyhow::anyhow!("failed to scan files: {}", e))?;

    if units.is_empty() {
        eprintln!("No files found to review");
        return Ok(());
    }
    eprintln!("Found {} files to review", units.len());

    if args.dry_run {
        info!("DRY RUN - no endpoint calls will be made");
        print_execution_plan(&config, &units);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight reviews");
            interrupt.cancel();
        }
    });

    let sink: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };
    let aggregator = Arc::new(Aggregator::new(sink));

    let client = create_client(&config)?;
    let orchestrator = Orchestrator::new(&config, client, cancel);

    let start = Instant::now();
    let reports = orchestrator.run_all(units, aggregator.clone()).await;
    let summary = match Arc::try_unwrap(aggregator) {
        Ok(aggregator) => {
            let (summary, mut sink) = aggregator.into_parts();
            sink.flush()?;
            summary
        }
        Err(shared) => shared.summary(),
    };

    info!(
        "Completed in {:.1}s: {}",
        start.elapsed().as_secs_f64(),
        summary.status_message()
    );

    if let Some(path) = &args.summary_json {
        match write_summary(
            path,
            &reports,
            &summary,
            &config.target,
            orchestrator.endpoints(),
            start.elapsed(),
        ) {
            Ok(()) => info!("Wrote summary: {}", path.display()),
            Err(e) => warn!("Failed to write summary {}: {}", path.display(), e),
        }
    }

    if !summary.is_success() {
        eprintln!("\nEncountered {} errors during review:", summary.failed);
        for failure in &summary.failures {
            eprintln!("- {}", failure);
        }
        anyhow::bail!("review completed with {} errors ({})", summary.failed, summary.status_message());
    }

    eprintln!("\nReview completed successfully for {} files", summary.total);
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(path) = &args.path {
        config.target = path.clone();
    }
    if let Some(url) = &args.url {
        config.api_url = url.clone();
    }
    if let Some(urls) = &args.urls {
        config.api_urls = urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
    }
    if let Some(key) = args.api_key.as_ref().filter(|k| !k.is_empty()) {
        config.api_key = Some(key.clone());
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(max_size) = args.max_size {
        config.max_file_size = max_size;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_sec = timeout;
    }
}

fn print_execution_plan(config: &Config, units: &[ReviewUnit]) {
    let pool = EndpointPool::from_config(config);

    println!("\n=== Execution Plan ===\n");
    println!("Target: {}", config.target.display());
    println!("Model: {}", config.model);
    println!("Concurrency: {}", config.concurrency);
    println!("Timeout: {}s", config.timeout_sec);

    println!("\nEndpoints (round-robin with failover):");
    for endpoint in pool.effective_endpoints() {
        println!("  - {}", endpoint);
    }

    println!("\nFiles to review:");
    for unit in units {
        println!("  - {} ({} bytes)", unit.path.display(), unit.size);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_overrides_win_over_config() {
        let mut config = Config::default();
        let args = RunArgs {
            path: Some(PathBuf::from("/src")),
            urls: Some(vec![" http://a ".to_string(), String::new(), "http://b".to_string()]),
            api_key: Some(String::new()),
            concurrency: Some(8),
            ..Default::default()
        };

        apply_overrides(&mut config, &args);

        assert_eq!(config.target, PathBuf::from("/src"));
        assert_eq!(config.api_urls, vec!["http://a", "http://b"]);
        assert_eq!(config.api_key, None);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.model, "devstral-small-2507-mlx");
    }
}
