use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::time::Instant;
use tracing::{info, warn};

use greeter_core::config::{RunnerConfig, load_config};
use greeter_core::errors;
use greeter_core::telemetry::{InvocationReport, init_tracing};
use greeter_core::{Greeting, say_hello_within};

/// Invokes the greeter locally, one JSON event per file, outside of Lambda.
#[derive(Parser, Debug)]
#[command(name = "greeter-local", version)]
struct Opts {
    /// YAML configuration file. Falls back to `GREETER_CONFIG`, then defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print each greeting instead of one JSON document per line.
    #[arg(long)]
    pretty: bool,

    /// Event files to invoke. `-` or no files reads a single event from stdin.
    events: Vec<PathBuf>,
}

/// Parses an event document. Blank input is an absent event.
fn parse_event(content: &str) -> errors::Result<Option<Value>> {
    if content.trim().is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str(content)?)
}

async fn read_event(path: &Path) -> Result<Option<Value>> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read event from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read event file {}", path.display()))?
    };
    parse_event(&content).with_context(|| format!("Invalid event in {}", path.display()))
}

/// Runs every event concurrently, at most `max_concurrency` at a time.
/// Greetings come back in input order.
async fn run_events(
    events: Vec<Option<Value>>,
    runner: &RunnerConfig,
) -> errors::Result<(Vec<Greeting>, InvocationReport)> {
    let start = Instant::now();
    let timeout = runner.timeout_ms.map(Duration::from_millis);

    let greetings: Vec<Greeting> = stream::iter(events)
        .map(|event| say_hello_within(event, timeout))
        .buffered(runner.max_concurrency)
        .try_collect()
        .await?;

    let mut report = InvocationReport::default();
    for greeting in &greetings {
        report.record(greeting);
    }
    report.finish(start.elapsed());
    Ok((greetings, report))
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();
    let config = load_config(opts.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.telemetry);

    let paths = if opts.events.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        opts.events
    };
    if paths.iter().filter(|p| p.as_path() == Path::new("-")).count() > 1 {
        warn!("stdin listed more than once, later reads will see an empty event");
    }

    let mut events = Vec::with_capacity(paths.len());
    for path in &paths {
        events.push(read_event(path).await?);
    }

    let (greetings, report) = run_events(events, &config.runner)
        .await
        .context("Invocation failed")?;

    for greeting in &greetings {
        let line = if opts.pretty {
            serde_json::to_string_pretty(greeting)?
        } else {
            serde_json::to_string(greeting)?
        };
        println!("{line}");
    }
    info!(
        invocations = report.invocations,
        fallbacks = report.fallbacks,
        elapsed_ms = report.elapsed_ms,
        "local run completed"
    );
    Ok(())
}
