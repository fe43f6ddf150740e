use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::delay::{just_wait, millis};
use crate::errors::{GreeterError, Result};

pub const FALLBACK_MESSAGE: &str = "Missing a name property in the event's JSON body";

/// The handler's output: always exactly one `hello` field.
///
/// `hello` stays a raw JSON value because a truthy `name` is echoed back
/// unchanged, whatever its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Greeting {
    pub hello: Value,
    /// Set when no usable name was found. Never serialized.
    #[serde(skip)]
    fallback: bool,
}

impl Greeting {
    pub fn named(name: Value) -> Self {
        Self {
            hello: name,
            fallback: false,
        }
    }

    pub fn fallback() -> Self {
        Self {
            hello: Value::String(FALLBACK_MESSAGE.to_string()),
            fallback: true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.hello.as_str()
    }

    /// Whether the fallback branch produced this greeting, regardless of
    /// what `hello` holds.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Waits for the fixed delay, then greets `event.name` or falls back.
///
/// `None` and `Some(Value::Null)` are both treated as an absent event.
pub async fn say_hello(event: Option<Value>) -> Greeting {
    just_wait().await;

    let greeting = match pick_name(event.as_ref()) {
        Some(name) => Greeting::named(name.clone()),
        None => Greeting::fallback(),
    };
    debug!(fallback = greeting.is_fallback(), "greeting produced");
    greeting
}

/// [`say_hello`] bounded by `timeout`; `None` leaves the call unbounded.
pub async fn say_hello_within(
    event: Option<Value>,
    timeout: Option<Duration>,
) -> Result<Greeting> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, say_hello(event))
            .await
            .map_err(|_| GreeterError::Timeout {
                after_ms: millis(limit),
            }),
        None => Ok(say_hello(event).await),
    }
}

/// Returns `event.name` when the event is truthy and `name` is truthy.
///
/// Only objects carry properties; any other event shape has no `name`.
pub fn pick_name(event: Option<&Value>) -> Option<&Value> {
    event
        .filter(|event| is_truthy(event))
        .and_then(Value::as_object)
        .and_then(|object| object.get("name"))
        .filter(|name| is_truthy(name))
}

/// Loose truthiness: `null`, `false`, zero and `""` are falsy, everything
/// else (including empty arrays and objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
