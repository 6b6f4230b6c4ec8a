use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown invariant key '{0}'")]
    UnknownInvariant(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
