use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use std::time::Duration;

use super::command::{self, CommandOutcome};
use super::{int_arg, is_safe_target, string_arg, NetworkTool, ToolSettings};
use crate::errors::AgentResult;

lazy_static! {
    static ref REPLY_TIME: Regex = Regex::new(r"time[=<](\d+\.?\d*)\s*ms").unwrap();
}

/// Checks reachability of a host with the platform `ping` utility
pub struct PingTool {
    settings: ToolSettings,
}

impl PingTool {
    pub fn new(settings: ToolSettings) -> Self {
        Self { settings }
    }
}

/// Command line for the host platform: `-n`/`-w` (milliseconds) on Windows,
/// `-c`/`-W` (seconds) elsewhere.
fn ping_args(host: &str, count: u32, timeout: u32) -> Vec<String> {
    if cfg!(windows) {
        vec![
            "-n".to_string(),
            count.to_string(),
            "-w".to_string(),
            (timeout * 1000).to_string(),
            host.to_string(),
        ]
    } else {
        vec![
            "-c".to_string(),
            count.to_string(),
            "-W".to_string(),
            timeout.to_string(),
            host.to_string(),
        ]
    }
}

/// Summarise successful ping output: the first reply's round-trip time, or
/// failing that the packet summary, the rtt line, or a bare success notice.
pub fn parse_ping_output(output: &str, host: &str) -> String {
    let mut packet_info = None;
    let mut rtt_info = None;

    for line in output.lines() {
        let lower = line.to_lowercase();
        if lower.contains("packets transmitted") {
            packet_info = Some(line.trim());
        }
        if lower.contains("rtt min/avg/max") || lower.contains("round-trip") {
            rtt_info = Some(line.trim());
        }
        if (lower.contains("bytes from") || lower.contains("reply from")) && lower.contains("ttl=") {
            if let Some(captures) = REPLY_TIME.captures(line) {
                return format!("✅ {} is reachable - Response time: {}ms", host, &captures[1]);
            }
        }
    }

    match (packet_info, rtt_info) {
        (Some(packets), _) => format!("✅ {} is reachable - {}", host, packets),
        (None, Some(rtt)) => format!("✅ {} is reachable - {}", host, rtt),
        (None, None) => format!("✅ {} is reachable - Ping successful", host),
    }
}

#[async_trait]
impl NetworkTool for PingTool {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Ping a host to check network connectivity. Returns ping statistics including packet loss, latency, and response time."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "host": {
                    "type": "string",
                    "description": "The hostname or IP address to ping"
                },
                "count": {
                    "type": "integer",
                    "description": format!("Number of ping packets to send (default: {})", self.settings.default_ping_count),
                    "default": self.settings.default_ping_count,
                    "minimum": 1,
                    "maximum": 10
                },
                "timeout": {
                    "type": "integer",
                    "description": format!("Timeout in seconds for each ping (default: {})", self.settings.default_ping_timeout),
                    "default": self.settings.default_ping_timeout,
                    "minimum": 1,
                    "maximum": 30
                }
            },
            "required": ["host"]
        })
    }

    async fn execute(&self, args: &Value) -> AgentResult<String> {
        let Some(host) = string_arg(args, "host") else {
            return Ok("Error: Host is required for ping command".to_string());
        };
        if !is_safe_target(host) {
            return Ok(format!("Error: Invalid host '{}'", host));
        }
        let count = int_arg(args, "count", self.settings.default_ping_count, 1, 10);
        let timeout = int_arg(args, "timeout", self.settings.default_ping_timeout, 1, 30);

        let limit = self
            .settings
            .cap(Duration::from_secs(u64::from(timeout) + 10));

        let text = match command::run("ping", &ping_args(host, count, timeout), limit).await {
            Ok(CommandOutcome::Completed(output)) if output.status.success() => {
                parse_ping_output(&command::stdout_text(&output), host)
            }
            Ok(CommandOutcome::Completed(output)) => {
                format!("Ping failed for {}: {}", host, command::failure_detail(&output))
            }
            Ok(CommandOutcome::TimedOut(limit)) => {
                format!("Ping timeout for {} after {} seconds", host, limit.as_secs())
            }
            Ok(CommandOutcome::NotFound) => {
                format!("Error pinging {}: ping command not found", host)
            }
            Err(e) => format!("Error pinging {}: {}", host, e),
        };
        Ok(text)
    }
}
