use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration found for {0}")]
    NotFound(String),

    #[error("configuration for {name} is invalid: {reason}")]
    Invalid { name: String, reason: String },

    #[error("alias chain for {0} is cyclic or too deep")]
    AliasLoop(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn invalid(name: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
