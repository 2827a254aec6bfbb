use thiserror::Error;
use waylay_config::ConfigError;

#[derive(Debug, Error)]
pub enum InterceptError {
    #[error("{0} not found on this system")]
    NotFound(String),

    #[error("{0} is already intercepted")]
    AlreadyIntercepted(String),

    #[error("{0} is not intercepted")]
    NotIntercepted(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
