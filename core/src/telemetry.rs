use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogFormat, TelemetryConfig};
use crate::delay::millis;
use crate::greeter::Greeting;

/// Installs the global subscriber. `RUST_LOG` wins over `config.filter`.
pub fn init_tracing(config: &TelemetryConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Plain => registry
            .with(tracing_subscriber::fmt::layer().with_ansi(config.ansi))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_ansi(false))
            .init(),
    }
}

/// Summary of a batch of local invocations.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct InvocationReport {
    pub invocations: usize,
    pub fallbacks: usize,
    pub elapsed_ms: u64,
}

impl InvocationReport {
    pub fn record(&mut self, greeting: &Greeting) {
        self.invocations += 1;
        if greeting.is_fallback() {
            self.fallbacks += 1;
        }
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.elapsed_ms = millis(elapsed);
    }
}
