use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use pingagent::agent::Agent;
use pingagent::config::Settings;
use pingagent::logging::init_tracing;
use pingagent::providers::openai::OpenAiProvider;
use pingagent::tools::ToolRegistry;

mod commands;
mod render;
mod session;
mod spinner;

use session::Session;
use spinner::SpinnerTheme;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model to use (overrides OPENAI_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Persona to run under: helpful_assistant, network_specialist or minimal
    /// (overrides AGENT_PERSONA)
    #[arg(long)]
    persona: Option<String>,

    /// Answer a single message and exit
    #[arg(short, long)]
    message: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut settings = Settings::new().context("Failed to load configuration")?;
    if let Some(model) = cli.model {
        settings.openai_model = model;
    }
    if let Some(persona) = cli.persona {
        settings.agent_persona = persona;
    }

    let _guard = init_tracing(&settings)?;
    cliclack::set_theme(SpinnerTheme);

    let provider = OpenAiProvider::new(settings.provider_config())?;
    let registry = Arc::new(ToolRegistry::with_default_tools(&settings.tool_settings()));
    let agent = Agent::new(
        Box::new(provider),
        registry,
        settings.persona(),
        settings.agent_max_iterations,
    );
    tracing::debug!(
        model = %settings.openai_model,
        persona = settings.persona().name(),
        "agent ready"
    );

    match cli.message {
        Some(message) => {
            Session::new(agent, settings)
                .without_progress()
                .headless(&message)
                .await
        }
        None => Session::new(agent, settings).start().await?,
    }
    Ok(())
}
