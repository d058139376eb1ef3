use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures that can escape a tool. The dispatch layer flattens all of these
/// to text before they reach the model.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum AgentError {
    #[error("{0}")]
    ExecutionError(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{env_var} environment variable is required")]
    MissingEnvVar { env_var: String },

    #[error("Invalid value for {env_var}: {reason}")]
    Invalid { env_var: String, reason: String },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Map a settings field name back to the environment variable that sets it
pub fn to_env_var(field: &str) -> String {
    field.to_uppercase()
}
