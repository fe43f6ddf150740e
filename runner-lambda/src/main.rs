use std::time::Duration;

use greeter_core::config::{GreeterConfig, load_config};
use greeter_core::telemetry::init_tracing;
use greeter_core::{Greeting, say_hello_within};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{debug, info};

/// Greets the invocation payload, bounded by `timeout` when one is set.
pub async fn lambda_handler(
    event: LambdaEvent<Option<Value>>,
    timeout: Option<Duration>,
) -> Result<Greeting, Error> {
    let (payload, context) = event.into_parts();
    debug!(request_id = %context.request_id, "invocation received");

    Ok(say_hello_within(payload, timeout).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config: GreeterConfig = load_config(None)?;
    init_tracing(&config.telemetry);

    let timeout = config.runner.timeout_ms.map(Duration::from_millis);
    info!(?timeout, "starting greeter lambda runtime");

    lambda_runtime::run(service_fn(move |event| lambda_handler(event, timeout))).await
}
