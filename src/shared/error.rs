//! Error Types
//!
//! Bootstrap failures are fatal and end startup. Extension failures are
//! absorbed by the lifecycle wrapper and only ever reach the log.

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("{0} not set in .env file. Set it.")]
    MissingVar(&'static str),

    #[error("{0} must not be empty")]
    EmptyValue(&'static str),

    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

/// Fatal error raised while bringing the process up
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database URI must not be empty")]
    EmptyUri,

    #[error("Failed to connect to database: {0}")]
    Pool(#[from] sqlx::Error),

    #[error("Failed to create pool, pool was absent!")]
    PoolAbsent,

    #[error("Failed to build HTTP session: {0}")]
    Session(#[from] reqwest::Error),

    #[error("Failed to create bot instance: {0}")]
    Client(#[from] serenity::Error),
}

/// Error produced by a raw extension lifecycle operation
#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    #[error("Extension {0:?} could not be found")]
    NotFound(String),

    #[error("Extension {0:?} is already loaded")]
    AlreadyLoaded(String),

    #[error("Extension {0:?} has not been loaded")]
    NotLoaded(String),

    #[error("Invalid extension name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Extension {name:?} raised an error: {source:#}")]
    Failed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ExtensionError {
    /// Fully qualified name of the extension the error concerns.
    pub fn extension_name(&self) -> &str {
        match self {
            ExtensionError::NotFound(name)
            | ExtensionError::AlreadyLoaded(name)
            | ExtensionError::NotLoaded(name) => name,
            ExtensionError::InvalidName { name, .. } | ExtensionError::Failed { name, .. } => name,
        }
    }
}
