use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Provider, Usage};
use super::configs::OpenAiProviderConfig;
use super::utils::{
    check_openai_context_length_error, messages_to_openai_spec, openai_response_to_message,
    tools_to_openai_spec,
};
use crate::models::message::Message;
use crate::models::tool::Tool;

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Usage {
        let Some(usage) = data.get("usage") else {
            return Usage::default();
        };

        let input_tokens = usage
            .get("prompt_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let output_tokens = usage
            .get("completion_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let total_tokens = usage
            .get("total_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32)
            .or_else(|| match (input_tokens, output_tokens) {
                (Some(input), Some(output)) => Some(input + output),
                _ => None,
            });

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!(
            "{}/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        // The body usually carries an `error` object worth surfacing
        if let Ok(data) = serde_json::from_str::<Value>(&body) {
            if let Some(error) = data.get("error") {
                if let Some(err) = check_openai_context_length_error(error) {
                    return Err(err.into());
                }
                let detail = error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(String::from)
                    .unwrap_or_else(|| error.to_string());
                return Err(anyhow!("Request failed with status {}: {}", status, detail));
            }
        }
        Err(anyhow!("Request failed with status {}: {}", status, body))
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, messages: &[Message], tools: &[Tool]) -> Result<(Message, Usage)> {
        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_to_openai_spec(messages),
        });

        if !tools.is_empty() {
            payload["tools"] = json!(tools_to_openai_spec(tools)?);
            payload["tool_choice"] = json!("auto");
        }
        if let Some(temp) = self.config.temperature {
            payload["temperature"] = json!(temp);
        }
        if let Some(tokens) = self.config.max_tokens {
            payload["max_tokens"] = json!(tokens);
        }

        let response = self.post(payload).await?;

        // Some compatible servers report errors with a 200 status
        if let Some(error) = response.get("error") {
            if let Some(err) = check_openai_context_length_error(error) {
                return Err(err.into());
            }
            return Err(anyhow!("OpenAI API error: {}", error));
        }

        let message = openai_response_to_message(&response)?;
        let usage = Self::get_usage(&response);
        tracing::debug!(
            model = %self.config.model,
            input_tokens = ?usage.input_tokens,
            output_tokens = ?usage.output_tokens,
            tool_calls = message.tool_calls.len(),
            "completion received"
        );

        Ok((message, usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tool::ToolCall;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> OpenAiProviderConfig {
        OpenAiProviderConfig {
            host: format!("{}/v1", server.uri()),
            api_key: "test_api_key".to_string(),
            model: "gpt-4".to_string(),
            temperature: None,
            max_tokens: None,
        }
    }

    async fn setup_mock_server(response: ResponseTemplate) -> (MockServer, OpenAiProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test_api_key"))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        let provider = OpenAiProvider::new(config_for(&mock_server)).unwrap();
        (mock_server, provider)
    }

    fn ping_tool() -> Tool {
        Tool::new(
            "ping",
            "Ping a host",
            json!({"type": "object", "properties": {"host": {"type": "string"}}, "required": ["host"]}),
        )
    }

    #[tokio::test]
    async fn test_complete_basic() -> Result<()> {
        let response_body = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Hello! How can I assist you today?",
                    "tool_calls": null
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 12,
                "completion_tokens": 15,
                "total_tokens": 27
            }
        });

        let (_server, provider) =
            setup_mock_server(ResponseTemplate::new(200).set_body_json(response_body)).await;

        let messages = vec![Message::system("persona"), Message::user("Hello?")];
        let (message, usage) = provider.complete(&messages, &[]).await?;

        assert_eq!(message.content, "Hello! How can I assist you today?");
        assert!(!message.has_tool_calls());
        assert_eq!(usage, Usage::new(Some(12), Some(15), Some(27)));
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_tool_request() -> Result<()> {
        let response_body = json!({
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_123",
                        "type": "function",
                        "function": {
                            "name": "ping",
                            "arguments": "{\"host\":\"8.8.8.8\",\"count\":4,\"timeout\":3}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });

        let (_server, provider) =
            setup_mock_server(ResponseTemplate::new(200).set_body_json(response_body)).await;

        let messages = vec![Message::system("persona"), Message::user("ping 8.8.8.8")];
        let (message, usage) = provider.complete(&messages, &[ping_tool()]).await?;

        assert_eq!(message.tool_calls.len(), 1);
        assert_eq!(message.tool_calls[0].id, "call_123");
        assert_eq!(
            message.tool_calls[0].tool_call,
            ToolCall::new("ping", "{\"host\":\"8.8.8.8\",\"count\":4,\"timeout\":3}")
        );
        assert_eq!(usage, Usage::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_request_carries_tools_and_tool_choice() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "model": "gpt-4",
                "tool_choice": "auto",
                "tools": [{"type": "function", "function": {"name": "ping"}}],
                "messages": [{"role": "system", "content": "persona"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "ok"}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OpenAiProvider::new(config_for(&mock_server))?;
        let (message, _) = provider
            .complete(&[Message::system("persona")], &[ping_tool()])
            .await?;
        assert_eq!(message.content, "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let (_server, provider) = setup_mock_server(
            ResponseTemplate::new(429)
                .set_body_json(json!({"error": {"message": "Rate limit reached"}})),
        )
        .await;

        let err = provider
            .complete(&[Message::user("hi")], &[])
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("Rate limit reached"));
    }

    #[tokio::test]
    async fn test_context_length_error() {
        let (_server, provider) = setup_mock_server(ResponseTemplate::new(400).set_body_json(
            json!({"error": {"code": "context_length_exceeded", "message": "too long"}}),
        ))
        .await;

        let err = provider
            .complete(&[Message::user("hi")], &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Context length exceeded. Message: too long");
    }

    #[tokio::test]
    async fn test_malformed_body_is_error() {
        let (_server, provider) =
            setup_mock_server(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
                .await;

        let result = provider.complete(&[Message::user("hi")], &[]).await;
        assert!(result.is_err());
    }
}
