use thiserror::Error;

#[derive(Error, Debug)]
pub enum GreeterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invocation timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Failed to load configuration from {origin}: {error}")]
    LoadFailed {
        origin: String,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization failed: {reason}")]
    Json { reason: String },

    #[error("YAML serialization failed: {reason}")]
    Yaml { reason: String },
}

pub type Result<T> = std::result::Result<T, GreeterError>;

impl From<serde_json::Error> for GreeterError {
    fn from(err: serde_json::Error) -> Self {
        GreeterError::Serialization(SerializationError::Json {
            reason: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for GreeterError {
    fn from(err: serde_yaml::Error) -> Self {
        GreeterError::Serialization(SerializationError::Yaml {
            reason: err.to_string(),
        })
    }
}

impl GreeterError {
    pub fn is_retryable(&self) -> bool {
        match self {
            GreeterError::Timeout { .. } => true,
            GreeterError::Io(_) => true,
            GreeterError::Config(_) => false,
            GreeterError::Serialization(_) => false,
            GreeterError::Generic(_) => false,
        }
    }
}
