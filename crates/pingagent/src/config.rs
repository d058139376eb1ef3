use config::{Config, Environment};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{to_env_var, ConfigError};
use crate::persona::Persona;
use crate::providers::configs::OpenAiProviderConfig;
use crate::tools::ToolSettings;

/// Process-wide settings, sourced from the environment.
///
/// Field names are the lowercased environment variable names, so
/// `OPENAI_MODEL=gpt-4o` lands in `openai_model`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_model")]
    pub openai_model: String,
    #[serde(default = "default_persona")]
    pub agent_persona: String,
    #[serde(default = "default_max_context_length")]
    pub max_context_length: usize,
    #[serde(default = "default_max_tool_timeout")]
    pub max_tool_timeout: u64,
    #[serde(default = "default_ping_count")]
    pub default_ping_count: u32,
    #[serde(default = "default_ping_timeout")]
    pub default_ping_timeout: u32,
    #[serde(default = "default_traceroute_hops")]
    pub default_traceroute_hops: u32,
    #[serde(default = "default_max_iterations")]
    pub agent_max_iterations: usize,
    #[serde(default = "default_tool_log_file")]
    pub tool_log_file: PathBuf,
}

impl Settings {
    /// Load settings from the process environment and validate them
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default().try_parsing(true))
    }

    pub fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("openai_base_url", default_base_url())?
            .set_default("openai_model", default_model())?
            .set_default("agent_persona", default_persona())?
            .add_source(environment)
            .build()?;

        let settings: Settings = config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            match &err {
                config::ConfigError::NotFound(field) => ConfigError::MissingEnvVar {
                    env_var: to_env_var(field),
                },
                _ => ConfigError::Other(err),
            }
        })?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai_api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar {
                env_var: to_env_var("openai_api_key"),
            });
        }

        let positive = [
            ("max_tool_timeout", self.max_tool_timeout as usize),
            ("default_ping_count", self.default_ping_count as usize),
            ("default_ping_timeout", self.default_ping_timeout as usize),
            ("default_traceroute_hops", self.default_traceroute_hops as usize),
            ("agent_max_iterations", self.agent_max_iterations),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    env_var: to_env_var(field),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn persona(&self) -> Persona {
        Persona::from_name(&self.agent_persona)
    }

    pub fn provider_config(&self) -> OpenAiProviderConfig {
        OpenAiProviderConfig {
            host: self.openai_base_url.clone(),
            api_key: self.openai_api_key.clone(),
            model: self.openai_model.clone(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            default_ping_count: self.default_ping_count,
            default_ping_timeout: self.default_ping_timeout,
            default_traceroute_hops: self.default_traceroute_hops,
            max_tool_timeout: Duration::from_secs(self.max_tool_timeout),
            ..ToolSettings::default()
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ping Agent Configuration:")?;
        writeln!(f, "  Base URL: {}", self.openai_base_url)?;
        writeln!(f, "  Model: {}", self.openai_model)?;
        writeln!(f, "  Persona: {}", self.agent_persona)?;
        writeln!(f, "  Max Context Length: {}", self.max_context_length)?;
        writeln!(f, "  Max Tool Timeout: {}s", self.max_tool_timeout)?;
        writeln!(f, "  Default Ping Count: {}", self.default_ping_count)?;
        writeln!(f, "  Default Ping Timeout: {}s", self.default_ping_timeout)?;
        writeln!(f, "  Default Traceroute Hops: {}", self.default_traceroute_hops)?;
        writeln!(f, "  Max Iterations: {}", self.agent_max_iterations)?;
        writeln!(f, "  Tool Log File: {}", self.tool_log_file.display())?;
        write!(
            f,
            "  OpenAI API Key: {}",
            if self.openai_api_key.is_empty() {
                "not set"
            } else {
                "set"
            }
        )
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_persona() -> String {
    Persona::NetworkSpecialist.name().to_string()
}

fn default_max_context_length() -> usize {
    10
}

fn default_max_tool_timeout() -> u64 {
    60
}

fn default_ping_count() -> u32 {
    4
}

fn default_ping_timeout() -> u32 {
    3
}

fn default_traceroute_hops() -> u32 {
    15
}

fn default_max_iterations() -> usize {
    10
}

fn default_tool_log_file() -> PathBuf {
    PathBuf::from("tool_calls.log")
}
