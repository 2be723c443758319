//! Run configuration errors

/// Errors raised while loading the run configuration.
///
/// All of them are fatal: the run aborts before any transaction is dispatched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} environment variable not set")]
    MissingVariable { name: String },

    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },

    #[error("Invalid private key format: {message}")]
    InvalidPrivateKey { message: String },

    #[error("Invalid endpoint URL for {name}: {url}")]
    InvalidUrl { name: String, url: String },
}
