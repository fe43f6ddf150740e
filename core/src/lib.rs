pub mod config;
pub mod delay;
pub mod errors;
pub mod greeter;
pub mod telemetry;

pub use config::GreeterConfig;
pub use errors::{GreeterError, Result};
pub use greeter::{FALLBACK_MESSAGE, Greeting, say_hello, say_hello_within};
