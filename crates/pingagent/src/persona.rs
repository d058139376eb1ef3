use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString};

/// The system prompt the agent runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Persona {
    HelpfulAssistant,
    NetworkSpecialist,
    Minimal,
}

impl Persona {
    /// Resolve a configured persona name, falling back to the helpful assistant
    pub fn from_name(name: &str) -> Self {
        name.trim().parse().unwrap_or(Persona::HelpfulAssistant)
    }

    pub fn name(&self) -> &str {
        self.as_ref()
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Persona::HelpfulAssistant => "You are a helpful assistant with access to network tools. You help users check network connectivity and diagnose connection issues.",
            Persona::NetworkSpecialist => "You are a network diagnostics specialist. You use ping and other network tools to help troubleshoot connectivity problems.",
            Persona::Minimal => "You are an AI assistant that can use tools when needed.",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Persona::HelpfulAssistant => {
                "A helpful assistant with network tools for general connectivity checks"
            }
            Persona::NetworkSpecialist => {
                "A network diagnostics specialist for troubleshooting connectivity problems"
            }
            Persona::Minimal => "A minimal AI assistant that uses tools when needed",
        }
    }

    pub fn all() -> Vec<Persona> {
        Persona::iter().collect()
    }
}
