use async_trait::async_trait;
use serde_json::{json, Value};
use std::net::IpAddr;
use std::time::Duration;

use super::command::{self, CommandOutcome};
use super::{is_safe_target, string_arg, NetworkTool, ToolSettings};
use crate::errors::AgentResult;

const DNS_TIMEOUT: Duration = Duration::from_secs(30);
const RECORD_TYPES: [&str; 6] = ["A", "AAAA", "MX", "TXT", "CNAME", "NS"];

/// Resolves domain names with `dig`/`nslookup`, or the system resolver when
/// neither is installed
pub struct DnsLookupTool {
    settings: ToolSettings,
}

impl DnsLookupTool {
    pub fn new(settings: ToolSettings) -> Self {
        Self { settings }
    }
}

fn dns_command(domain: &str, record_type: &str) -> (&'static str, Vec<String>) {
    if cfg!(windows) {
        ("nslookup", vec![domain.to_string()])
    } else {
        ("dig", vec![domain.to_string(), record_type.to_string()])
    }
}

/// Resolve through the operating system, preferring an IPv4 address
async fn resolve(domain: &str) -> String {
    match tokio::net::lookup_host((domain, 0)).await {
        Ok(addresses) => {
            let ips: Vec<IpAddr> = addresses.map(|a| a.ip()).collect();
            match ips.iter().find(|ip| ip.is_ipv4()).or_else(|| ips.first()) {
                Some(ip) => format!("✅ {} resolves to {}", domain, ip),
                None => format!("Could not resolve {}: no addresses found", domain),
            }
        }
        Err(e) => format!("Could not resolve {}: {}", domain, e),
    }
}

#[async_trait]
impl NetworkTool for DnsLookupTool {
    fn name(&self) -> &str {
        "dns_lookup"
    }

    fn description(&self) -> &str {
        "Perform DNS lookup to resolve domain names to IP addresses and get DNS information."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "domain": {
                    "type": "string",
                    "description": "The domain name to look up"
                },
                "record_type": {
                    "type": "string",
                    "description": "DNS record type (A, AAAA, MX, TXT, etc.)",
                    "enum": RECORD_TYPES,
                    "default": "A"
                }
            },
            "required": ["domain"]
        })
    }

    async fn execute(&self, args: &Value) -> AgentResult<String> {
        let Some(domain) = string_arg(args, "domain") else {
            return Ok("Error: Domain is required for DNS lookup".to_string());
        };
        if !is_safe_target(domain) {
            return Ok(format!("Error: Invalid domain '{}'", domain));
        }
        let record_type = string_arg(args, "record_type")
            .unwrap_or("A")
            .to_uppercase();
        if !RECORD_TYPES.contains(&record_type.as_str()) {
            return Ok(format!(
                "Error: Unsupported record type '{}'. Use one of: {}",
                record_type,
                RECORD_TYPES.join(", ")
            ));
        }

        let (program, program_args) = dns_command(domain, &record_type);
        let limit = self.settings.cap(DNS_TIMEOUT);

        let text = match command::run(program, &program_args, limit).await {
            Ok(CommandOutcome::Completed(output)) if output.status.success() => format!(
                "DNS lookup for {} ({} record):\n{}",
                domain,
                record_type,
                command::stdout_text(&output)
            ),
            Ok(CommandOutcome::Completed(output)) => format!(
                "DNS lookup failed for {}: {}",
                domain,
                command::failure_detail(&output)
            ),
            Ok(CommandOutcome::TimedOut(_)) => format!("DNS lookup timeout for {}", domain),
            Ok(CommandOutcome::NotFound) => {
                tracing::debug!(program, "lookup utility missing, using system resolver");
                resolve(domain).await
            }
            Err(e) => format!("Error with DNS lookup for {}: {}", domain, e),
        };
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dns_command() {
        let (program, args) = dns_command("example.com", "MX");
        if cfg!(windows) {
            assert_eq!(program, "nslookup");
            assert_eq!(args, vec!["example.com"]);
        } else {
            assert_eq!(program, "dig");
            assert_eq!(args, vec!["example.com", "MX"]);
        }
    }

    #[tokio::test]
    async fn test_missing_domain() {
        let tool = DnsLookupTool::new(ToolSettings::default());
        let output = tool.execute(&json!({"record_type": "A"})).await.unwrap();
        assert_eq!(output, "Error: Domain is required for DNS lookup");
    }

    #[tokio::test]
    async fn test_unsupported_record_type() {
        let tool = DnsLookupTool::new(ToolSettings::default());
        let output = tool
            .execute(&json!({"domain": "example.com", "record_type": "SRV"}))
            .await
            .unwrap();
        assert_eq!(
            output,
            "Error: Unsupported record type 'SRV'. Use one of: A, AAAA, MX, TXT, CNAME, NS"
        );
    }

    #[tokio::test]
    async fn test_resolve_localhost() {
        let output = resolve("localhost").await;
        assert!(output.starts_with("✅ localhost resolves to "), "{}", output);
    }

    #[test]
    fn test_schema_enum() {
        let schema = DnsLookupTool::new(ToolSettings::default()).schema();
        assert_eq!(
            schema.parameters["properties"]["record_type"]["enum"],
            json!(["A", "AAAA", "MX", "TXT", "CNAME", "NS"])
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial_test::serial]
    async fn test_missing_utility_falls_back_to_resolver() {
        let _path = crate::tools::fake_path::FakePath::with_scripts(&[]);
        let tool = DnsLookupTool::new(ToolSettings::default());

        let output = tool.execute(&json!({"domain": "localhost"})).await.unwrap();

        assert!(output.starts_with("✅ localhost resolves to "), "{}", output);
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial_test::serial]
    async fn test_hung_lookup_times_out() {
        let _path =
            crate::tools::fake_path::FakePath::with_scripts(&[("dig", "exec /bin/sleep 30")]);
        let tool = DnsLookupTool::new(ToolSettings {
            max_tool_timeout: Duration::from_secs(1),
            ..ToolSettings::default()
        });

        let output = tool
            .execute(&json!({"domain": "example.com", "record_type": "mx"}))
            .await
            .unwrap();

        assert_eq!(output, "DNS lookup timeout for example.com");
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial_test::serial]
    async fn test_lookup_output_is_returned() {
        let _path = crate::tools::fake_path::FakePath::with_scripts(&[(
            "dig",
            "echo \"example.com. 300 IN A 93.184.216.34\"",
        )]);
        let tool = DnsLookupTool::new(ToolSettings::default());

        let output = tool.execute(&json!({"domain": "example.com"})).await.unwrap();

        assert_eq!(
            output,
            "DNS lookup for example.com (A record):\nexample.com. 300 IN A 93.184.216.34\n"
        );
    }
}
