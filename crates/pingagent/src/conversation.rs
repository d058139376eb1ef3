use crate::models::message::Message;
use crate::models::role::Role;

/// The ordered dialogue history sent to the model on every request.
///
/// Always starts with exactly one system message. The agent core only ever
/// appends; `trim_turns` exists for callers that enforce a length policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new<S: Into<String>>(system_prompt: S) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Replace the whole history with a single fresh system message
    pub fn reset<S: Into<String>>(&mut self, system_prompt: S) {
        self.messages = vec![Message::system(system_prompt)];
    }

    /// An owned copy of the history; changes to it never reach the live state
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Number of user turns currently held
    pub fn user_turns(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }

    /// Drop the oldest user turns until at most `max_user_turns` remain.
    ///
    /// A turn is a user message plus everything up to the next user message,
    /// so an assistant tool request is never separated from its results.
    /// Returns the number of messages removed.
    pub fn trim_turns(&mut self, max_user_turns: usize) -> usize {
        let excess = self.user_turns().saturating_sub(max_user_turns);
        if excess == 0 {
            return 0;
        }

        // Index of the first user message we keep, or the end if none are kept
        let cut = self
            .messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.role == Role::User)
            .nth(excess)
            .map(|(i, _)| i)
            .unwrap_or(self.messages.len());

        let start = self
            .messages
            .iter()
            .position(|m| m.role != Role::System)
            .unwrap_or(self.messages.len());

        if cut <= start {
            return 0;
        }
        self.messages.drain(start..cut).count()
    }
}
