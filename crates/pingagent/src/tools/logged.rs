use async_trait::async_trait;
use chrono::Local;
use serde_json::Value;
use std::time::Instant;

use super::NetworkTool;
use crate::errors::AgentResult;
use crate::logging::TOOL_CALLS_TARGET;

const RESULT_EXCERPT_CHARS: usize = 100;

/// Records start, duration and outcome of every call to the wrapped tool.
///
/// Only observes: the result is returned untouched.
pub struct Logged<T> {
    inner: T,
}

impl<T: NetworkTool> Logged<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: NetworkTool> NetworkTool for Logged<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn parameters(&self) -> Value {
        self.inner.parameters()
    }

    async fn execute(&self, args: &Value) -> AgentResult<String> {
        let tool = self.name();
        let started = Instant::now();
        tracing::info!(
            target: TOOL_CALLS_TARGET,
            tool,
            arguments = %args,
            started_at = %Local::now().format("%Y-%m-%d %H:%M:%S"),
            "calling tool"
        );

        let result = self.inner.execute(args).await;
        let elapsed = format!("{:.2}s", started.elapsed().as_secs_f64());

        match &result {
            Ok(output) => tracing::info!(
                target: TOOL_CALLS_TARGET,
                tool,
                elapsed = %elapsed,
                result = %excerpt(output, RESULT_EXCERPT_CHARS),
                "tool completed"
            ),
            Err(e) => tracing::error!(
                target: TOOL_CALLS_TARGET,
                tool,
                elapsed = %elapsed,
                error = %e,
                "tool failed"
            ),
        }

        result
    }
}

/// The first `max_chars` characters of `text`, with `...` when cut
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
