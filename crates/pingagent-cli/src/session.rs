use anyhow::Result;
use console::style;
use std::io;

use pingagent::agent::Agent;
use pingagent::config::Settings;
use pingagent::models::message::Message;
use pingagent::persona::Persona;
use pingagent::providers::catalog::{ProviderInfo, KNOWN_PROVIDERS};
use pingagent::tools::logged::excerpt;

use crate::commands::Command;
use crate::render::render;
use crate::spinner::Spinner;

const CONTEXT_PREVIEW_CHARS: usize = 100;
const PROVIDERS_SHOWN: usize = 10;

/// What the shell should do after handling a line
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Exit,
    Ignore,
    /// Shell output, printed as-is
    Notice(String),
    /// The agent's answer, rendered as Markdown
    Answer(String),
}

/// An interactive conversation with one agent
pub struct Session {
    agent: Agent,
    settings: Settings,
    show_progress: bool,
}

impl Session {
    pub fn new(agent: Agent, settings: Settings) -> Self {
        Session {
            agent,
            settings,
            show_progress: true,
        }
    }

    /// Disable the spinner, for non-interactive output
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub async fn start(&mut self) -> Result<()> {
        print_banner();

        loop {
            let line: String = match cliclack::input("You:")
                .placeholder("")
                .required(false)
                .interact()
            {
                Ok(line) => line,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    println!("\nGoodbye! 👋");
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            match self.handle(Command::parse(&line)).await {
                Reply::Exit => {
                    println!("Goodbye! 👋");
                    break;
                }
                Reply::Ignore => continue,
                Reply::Notice(text) => println!("{}", text),
                Reply::Answer(text) => {
                    println!("{}", style("Agent:").green().bold());
                    render(&text);
                }
            }
        }
        Ok(())
    }

    /// Answer a single message and return
    pub async fn headless(&mut self, message: &str) {
        let answer = self.ask(message).await;
        render(&answer);
    }

    pub async fn handle(&mut self, command: Command) -> Reply {
        match command {
            Command::Quit => Reply::Exit,
            Command::Empty => Reply::Ignore,
            Command::Reset => {
                self.agent.reset();
                Reply::Notice("Context reset. Starting fresh conversation.".to_string())
            }
            Command::Context => Reply::Notice(format_context(self.agent.conversation().messages())),
            Command::Providers => Reply::Notice(format_providers(KNOWN_PROVIDERS)),
            Command::Config => Reply::Notice(format_config(&self.settings, self.agent.persona())),
            Command::Message(text) => Reply::Answer(self.ask(&text).await),
        }
    }

    async fn ask(&mut self, text: &str) -> String {
        let spinner = self.show_progress.then(Spinner::start);
        let answer = self.agent.process(text).await;
        if let Some(spinner) = spinner {
            spinner.stop().await;
        }

        let dropped = self.agent.trim_history(self.settings.max_context_length);
        if dropped > 0 {
            tracing::debug!(dropped, "trimmed conversation history");
        }
        answer
    }
}

fn print_banner() {
    println!("🏓 Ping Agent - Network Diagnostics Assistant");
    println!(
        "{}",
        style("Commands: 'quit' to exit, 'reset' to clear context, 'context' to view history, 'providers' to see supported APIs, 'config' to show settings").dim()
    );
    println!("{}", "-".repeat(50));
}

pub fn format_context(messages: &[Message]) -> String {
    let mut lines = vec!["Current context:".to_string()];
    for (index, message) in messages.iter().enumerate() {
        let content = if message.content.is_empty() && message.has_tool_calls() {
            let names: Vec<&str> = message
                .tool_calls
                .iter()
                .map(|r| r.tool_call.name.as_str())
                .collect();
            format!("(tool calls: {})", names.join(", "))
        } else {
            excerpt(&message.content, CONTEXT_PREVIEW_CHARS)
        };
        lines.push(format!("{}. [{}] {}", index + 1, message.role, content));
    }
    lines.join("\n")
}

pub fn format_providers(providers: &[ProviderInfo]) -> String {
    let mut lines = vec!["🌐 Supported OpenAI-Compatible Providers:".to_string()];
    for provider in providers.iter().take(PROVIDERS_SHOWN) {
        lines.push(format!("  📍 {}: {}", provider.name, provider.base_url));
    }
    if providers.len() > PROVIDERS_SHOWN {
        lines.push(format!(
            "  ... and {} more providers",
            providers.len() - PROVIDERS_SHOWN
        ));
    }
    lines.join("\n")
}

pub fn format_config(settings: &Settings, active: Persona) -> String {
    let mut lines = vec![settings.to_string(), String::new(), "Personas:".to_string()];
    for persona in Persona::all() {
        let marker = if persona == active { "*" } else { " " };
        lines.push(format!(
            "  {} {}: {}",
            marker,
            persona.name(),
            persona.description()
        ));
    }
    lines.join("\n")
}
