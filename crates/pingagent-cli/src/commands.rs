/// A line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Reset,
    Context,
    Providers,
    Config,
    /// A blank line; ask again
    Empty,
    /// Anything else is sent to the agent as-is
    Message(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Command::Empty,
            "quit" | "exit" => Command::Quit,
            "reset" => Command::Reset,
            "context" => Command::Context,
            "providers" => Command::Providers,
            "config" => Command::Config,
            _ => Command::Message(trimmed.to_string()),
        }
    }
}
