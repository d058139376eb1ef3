use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, warn};

use crate::conversation::Conversation;
use crate::models::message::Message;
use crate::models::tool::ToolCall;
use crate::persona::Persona;
use crate::providers::base::Provider;
use crate::tools::ToolRegistry;

/// Model calls allowed per `process` before giving up on a final answer
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Agent drives a conversation between the user, the model and the network
/// tools until the model answers without requesting further tools
pub struct Agent {
    provider: Box<dyn Provider>,
    registry: Arc<ToolRegistry>,
    persona: Persona,
    conversation: Conversation,
    max_iterations: usize,
}

impl Agent {
    pub fn new(
        provider: Box<dyn Provider>,
        registry: Arc<ToolRegistry>,
        persona: Persona,
        max_iterations: usize,
    ) -> Self {
        Self {
            provider,
            registry,
            persona,
            conversation: Conversation::new(persona.prompt()),
            max_iterations: max_iterations.max(1),
        }
    }

    /// Handle one user input and return the final answer.
    ///
    /// Never fails: provider errors and the iteration limit both end the turn
    /// with an `Error: ` answer that is also recorded in the conversation.
    pub async fn process(&mut self, input: &str) -> String {
        self.conversation.push(Message::user(input));
        let tools = self.registry.schemas();

        for iteration in 1..=self.max_iterations {
            let (response, usage) = match self
                .provider
                .complete(self.conversation.messages(), &tools)
                .await
            {
                Ok(completion) => completion,
                Err(e) => {
                    warn!(error = %e, "model request failed");
                    return self.finish(format!("Error: {:#}", e));
                }
            };
            debug!(
                iteration,
                tool_calls = response.tool_calls.len(),
                total_tokens = ?usage.total_tokens,
                "model responded"
            );

            if !response.has_tool_calls() {
                return self.finish(response.content);
            }

            let requests = response.tool_calls.clone();
            self.conversation.push(response);

            for request in requests {
                let result = self.dispatch_tool_call(&request.tool_call).await;
                self.conversation
                    .push(Message::tool(request.id, request.tool_call.name, result));
            }
        }

        warn!(max_iterations = self.max_iterations, "no final answer");
        self.finish(format!(
            "Error: max iterations reached ({}) without a final answer",
            self.max_iterations
        ))
    }

    fn finish(&mut self, answer: String) -> String {
        self.conversation.push(Message::assistant(answer.clone()));
        answer
    }

    /// Run one requested tool and render its outcome as the text the model
    /// will see
    async fn dispatch_tool_call(&self, call: &ToolCall) -> String {
        let args = parse_arguments(call);

        let Some(tool) = self.registry.by_name(&call.name) else {
            warn!(tool = %call.name, "model requested an unknown tool");
            return format!("Unknown tool: {}", call.name);
        };

        // A panicking tool must not take the conversation down with it
        match tokio::spawn(async move { tool.execute(&args).await }).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => format!("Error executing {}: {}", call.name, e),
            Err(e) => format!("Error executing {}: {}", call.name, join_error_message(e)),
        }
    }

    /// Start over with only the persona's system message
    pub fn reset(&mut self) {
        self.conversation.reset(self.persona.prompt());
    }

    /// A detached copy of the conversation
    pub fn snapshot(&self) -> Vec<Message> {
        self.conversation.snapshot()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    /// Apply a length policy of at most `max_user_turns` user turns. Returns
    /// the number of messages dropped.
    pub fn trim_history(&mut self, max_user_turns: usize) -> usize {
        self.conversation.trim_turns(max_user_turns)
    }
}

/// Decode the raw argument text. Anything that is not a JSON object becomes
/// an empty argument set so the tool can report what is missing.
fn parse_arguments(call: &ToolCall) -> Value {
    match serde_json::from_str::<Value>(&call.arguments) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) | Err(_) if call.arguments.trim().is_empty() => json!({}),
        Ok(other) => {
            warn!(tool = %call.name, arguments = %other, "tool arguments are not an object");
            json!({})
        }
        Err(e) => {
            warn!(tool = %call.name, error = %e, "malformed tool arguments");
            json!({})
        }
    }
}

fn join_error_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload: Box<dyn Any + Send> = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}
