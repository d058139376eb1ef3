use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::net::IpAddr;
use std::time::Duration;
use sysinfo::System;

use super::command::{self, CommandOutcome};
use super::{NetworkTool, ToolSettings};
use crate::errors::AgentResult;

const PUBLIC_IP_TIMEOUT: Duration = Duration::from_secs(5);
const INTERFACE_TIMEOUT: Duration = Duration::from_secs(10);

/// Reports the local hostname, local and public addresses, and the IPv4
/// interface summary
pub struct NetworkInfoTool {
    settings: ToolSettings,
    client: Client,
}

impl NetworkInfoTool {
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            settings,
            client: Client::new(),
        }
    }

    async fn public_ip(&self) -> Option<String> {
        let response = self
            .client
            .get(&self.settings.public_ip_url)
            .timeout(self.settings.cap(PUBLIC_IP_TIMEOUT))
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "public ip lookup failed");
            return None;
        }
        let body = response.text().await.ok()?;
        let ip = body.trim();
        (!ip.is_empty()).then(|| ip.to_string())
    }

    async fn interfaces(&self) -> Option<Vec<String>> {
        let limit = self.settings.cap(INTERFACE_TIMEOUT);
        let output = if cfg!(windows) {
            command::run("ipconfig", &[] as &[&str], limit).await
        } else {
            match command::run("ifconfig", &[] as &[&str], limit).await {
                Ok(CommandOutcome::NotFound) => command::run("ip", &["-4", "addr"], limit).await,
                other => other,
            }
        };

        match output {
            Ok(CommandOutcome::Completed(output)) if output.status.success() => {
                Some(interface_lines(&command::stdout_text(&output)))
            }
            _ => None,
        }
    }
}

async fn local_ip(hostname: &str) -> Option<IpAddr> {
    let addresses: Vec<IpAddr> = tokio::net::lookup_host((hostname, 0))
        .await
        .ok()?
        .map(|a| a.ip())
        .collect();
    addresses
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addresses.first())
        .copied()
}

/// Keep only the IPv4 address lines of `ifconfig`, `ip addr` or `ipconfig`
/// output
pub fn interface_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.contains("inet ") || line.contains("IPv4"))
        .map(|line| format!("  {}", line.trim()))
        .collect()
}

#[async_trait]
impl NetworkTool for NetworkInfoTool {
    fn name(&self) -> &str {
        "network_info"
    }

    fn description(&self) -> &str {
        "Get local network information including IP addresses, interfaces, and connection details."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _args: &Value) -> AgentResult<String> {
        let mut lines = Vec::new();

        let hostname = System::host_name().unwrap_or_else(|| "localhost".to_string());
        lines.push(format!("Local hostname: {}", hostname));
        match local_ip(&hostname).await {
            Some(ip) => lines.push(format!("Local IP: {}", ip)),
            None => lines.push("Local IP: Could not determine".to_string()),
        }

        match self.public_ip().await {
            Some(ip) => lines.push(format!("Public IP: {}", ip)),
            None => lines.push("Public IP: Could not determine".to_string()),
        }

        if let Some(interfaces) = self.interfaces().await {
            if !interfaces.is_empty() {
                lines.push("\nNetwork interfaces:".to_string());
                lines.extend(interfaces);
            }
        }

        Ok(lines.join("\n"))
    }
}
