use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::command::{self, CommandOutcome};
use super::{int_arg, is_safe_target, string_arg, NetworkTool, ToolSettings};
use crate::errors::AgentResult;

const TRACEROUTE_TIMEOUT: Duration = Duration::from_secs(60);

/// Shows the hops between this machine and a host
pub struct TracerouteTool {
    settings: ToolSettings,
}

impl TracerouteTool {
    pub fn new(settings: ToolSettings) -> Self {
        Self { settings }
    }
}

fn traceroute_command(host: &str, max_hops: u32) -> (&'static str, Vec<String>) {
    if cfg!(windows) {
        ("tracert", vec!["-h".to_string(), max_hops.to_string(), host.to_string()])
    } else {
        ("traceroute", vec!["-m".to_string(), max_hops.to_string(), host.to_string()])
    }
}

#[async_trait]
impl NetworkTool for TracerouteTool {
    fn name(&self) -> &str {
        "traceroute"
    }

    fn description(&self) -> &str {
        "Trace the network path to a host showing intermediate hops. Useful for diagnosing network routing issues."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "host": {
                    "type": "string",
                    "description": "The hostname or IP address to trace"
                },
                "max_hops": {
                    "type": "integer",
                    "description": format!("Maximum number of hops to trace (default: {})", self.settings.default_traceroute_hops),
                    "default": self.settings.default_traceroute_hops,
                    "minimum": 1,
                    "maximum": 30
                }
            },
            "required": ["host"]
        })
    }

    async fn execute(&self, args: &Value) -> AgentResult<String> {
        let Some(host) = string_arg(args, "host") else {
            return Ok("Error: Host is required for traceroute command".to_string());
        };
        if !is_safe_target(host) {
            return Ok(format!("Error: Invalid host '{}'", host));
        }
        let max_hops = int_arg(args, "max_hops", self.settings.default_traceroute_hops, 1, 30);

        let (program, program_args) = traceroute_command(host, max_hops);
        let limit = self.settings.cap(TRACEROUTE_TIMEOUT);

        let text = match command::run(program, &program_args, limit).await {
            Ok(CommandOutcome::Completed(output)) if output.status.success() => {
                format!("Traceroute to {}:\n{}", host, command::stdout_text(&output))
            }
            Ok(CommandOutcome::Completed(output)) => format!(
                "Traceroute failed for {}: {}",
                host,
                command::failure_detail(&output)
            ),
            Ok(CommandOutcome::TimedOut(_)) => format!("Traceroute timeout for {}", host),
            Ok(CommandOutcome::NotFound) => {
                "Traceroute command not found. This tool may not be available on your system."
                    .to_string()
            }
            Err(e) => format!("Error with traceroute to {}: {}", host, e),
        };
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traceroute_command() {
        let (program, args) = traceroute_command("example.com", 12);
        if cfg!(windows) {
            assert_eq!(program, "tracert");
            assert_eq!(args, vec!["-h", "12", "example.com"]);
        } else {
            assert_eq!(program, "traceroute");
            assert_eq!(args, vec!["-m", "12", "example.com"]);
        }
    }

    #[tokio::test]
    async fn test_missing_host() {
        let tool = TracerouteTool::new(ToolSettings::default());
        let output = tool.execute(&json!({})).await.unwrap();
        assert_eq!(output, "Error: Host is required for traceroute command");
    }

    #[test]
    fn test_schema() {
        let schema = TracerouteTool::new(ToolSettings::default()).schema();
        assert_eq!(schema.parameters["properties"]["max_hops"]["default"], 15);
        assert_eq!(schema.parameters["properties"]["max_hops"]["maximum"], 30);
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial_test::serial]
    async fn test_missing_utility() {
        let _path = crate::tools::fake_path::FakePath::with_scripts(&[]);
        let tool = TracerouteTool::new(ToolSettings::default());

        let output = tool.execute(&json!({"host": "example.com"})).await.unwrap();

        assert_eq!(
            output,
            "Traceroute command not found. This tool may not be available on your system."
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial_test::serial]
    async fn test_hung_traceroute_times_out() {
        let _path = crate::tools::fake_path::FakePath::with_scripts(&[(
            "traceroute",
            "exec /bin/sleep 30",
        )]);
        let tool = TracerouteTool::new(ToolSettings {
            max_tool_timeout: Duration::from_secs(1),
            ..ToolSettings::default()
        });

        let output = tool.execute(&json!({"host": "example.com"})).await.unwrap();

        assert_eq!(output, "Traceroute timeout for example.com");
    }
}
