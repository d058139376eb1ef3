use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::AgentResult;
use crate::models::tool::Tool;

pub mod command;
pub mod dns_lookup;
pub mod logged;
pub mod network_info;
pub mod ping;
pub mod traceroute;

pub use dns_lookup::DnsLookupTool;
pub use logged::Logged;
pub use network_info::NetworkInfoTool;
pub use ping::PingTool;
pub use traceroute::TracerouteTool;

/// A diagnostic capability the model can invoke.
///
/// `execute` reports expected failures (missing host, timeouts, missing
/// utilities) as descriptive `Ok` text. An `Err` is reserved for failures the
/// tool did not anticipate; the agent flattens those to text as well.
#[async_trait]
pub trait NetworkTool: Send + Sync {
    /// Unique identifier used for dispatch and in the schema
    fn name(&self) -> &str;

    /// Shown to the model to guide when the tool is used
    fn description(&self) -> &str;

    /// JSON schema of the accepted arguments
    fn parameters(&self) -> Value;

    async fn execute(&self, args: &Value) -> AgentResult<String>;

    fn schema(&self) -> Tool {
        Tool::new(self.name(), self.description(), self.parameters())
    }
}

/// Defaults and limits shared by the built-in tools
#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub default_ping_count: u32,
    pub default_ping_timeout: u32,
    pub default_traceroute_hops: u32,
    /// Upper bound on any single subprocess or HTTP call a tool makes
    pub max_tool_timeout: Duration,
    pub public_ip_url: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            default_ping_count: 4,
            default_ping_timeout: 3,
            default_traceroute_hops: 15,
            max_tool_timeout: Duration::from_secs(60),
            public_ip_url: "https://api.ipify.org".to_string(),
        }
    }
}

impl ToolSettings {
    /// Clamp a tool's own timeout to the configured maximum
    pub fn cap(&self, timeout: Duration) -> Duration {
        timeout.min(self.max_tool_timeout)
    }
}

/// The fixed, ordered set of tools offered to the model.
///
/// Every registered tool is wrapped in [`Logged`]. Lookups are exact and
/// case-sensitive.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn NetworkTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_tools(settings: &ToolSettings) -> Self {
        let mut registry = Self::new();
        registry
            .register(PingTool::new(settings.clone()))
            .register(TracerouteTool::new(settings.clone()))
            .register(DnsLookupTool::new(settings.clone()))
            .register(NetworkInfoTool::new(settings.clone()));
        registry
    }

    /// Add a tool. A tool whose name is already taken replaces the earlier one
    /// in place.
    pub fn register<T: NetworkTool + 'static>(&mut self, tool: T) -> &mut Self {
        let tool: Arc<dyn NetworkTool> = Arc::new(Logged::new(tool));
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(index) => self.tools[index] = tool,
            None => self.tools.push(tool),
        }
        self
    }

    pub fn all(&self) -> &[Arc<dyn NetworkTool>] {
        &self.tools
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<dyn NetworkTool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn schemas(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// A required string argument; blank strings count as missing
pub(crate) fn string_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// An integer argument clamped to `[min, max]`. Numeric strings are accepted;
/// anything else falls back to `default`.
pub(crate) fn int_arg(args: &Value, key: &str, default: u32, min: u32, max: u32) -> u32 {
    let value = match args.get(key) {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    value
        .unwrap_or(default as i64)
        .clamp(min as i64, max as i64) as u32
}

/// Hosts are passed straight to a command line, so reject anything that could
/// be read as an option.
pub(crate) fn is_safe_target(target: &str) -> bool {
    !target.starts_with('-') && !target.chars().any(char::is_whitespace)
}

/// Swaps `PATH` for the duration of a test so tools find scripted stand-ins
/// for the system utilities. Tests using it, or spawning any subprocess,
/// must be `#[serial]`.
#[cfg(all(test, unix))]
pub(crate) mod fake_path {
    use std::ffi::OsString;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    pub struct FakePath {
        _dir: TempDir,
        original: Option<OsString>,
    }

    impl FakePath {
        /// Only the given scripts are on `PATH`
        pub fn with_scripts(scripts: &[(&str, &str)]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            for (name, body) in scripts {
                let path = dir.path().join(name);
                fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
                fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            }

            let original = std::env::var_os("PATH");
            std::env::set_var("PATH", dir.path());
            Self {
                _dir: dir,
                original,
            }
        }
    }

    impl Drop for FakePath {
        fn drop(&mut self) {
            match &self.original {
                Some(path) => std::env::set_var("PATH", path),
                None => std::env::remove_var("PATH"),
            }
        }
    }
}
