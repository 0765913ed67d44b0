use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Backend provisioning errors.
///
/// These are fatal for a single start attempt but never for the
/// reconciliation loop; the server stays down and is retried next cycle.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to spawn worker process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to build worker image: {0}")]
    ImageBuild(String),

    #[error("container runtime error: {0}")]
    Container(String),

    #[error("container backend requested but no container runtime is configured")]
    ContainerUnavailable,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("unsupported scheme '{scheme}': only http and https can be probed")]
    UnsupportedScheme { scheme: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("registry error: {0}")]
    Registry(String),
}

impl Error {
    /// Whether this error is a deployment/configuration defect.
    ///
    /// Fatal errors abort the orchestrator with a non-zero exit; everything
    /// else is retried on the next reconciliation cycle.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_) | Error::UnsupportedScheme { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
