//! Shell tool — execute commands with an allowlist and a timeout.

use async_trait::async_trait;
use openpaw_core::error::ToolError;
use openpaw_core::tool::Tool;
use tokio::process::Command;
use tracing::{debug, warn};

/// Execute shell commands with safety constraints.
pub struct ShellTool {
    /// If non-empty, only these base commands are allowed.
    allowed_commands: Vec<String>,
    timeout_secs: u64,
}

impl ShellTool {
    pub fn new(allowed_commands: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            allowed_commands,
            timeout_secs,
        }
    }

    fn is_command_allowed(&self, command: &str) -> bool {
        if self.allowed_commands.is_empty() {
            return true;
        }
        let base_cmd = command.split_whitespace().next().unwrap_or("").trim();
        self.allowed_commands.iter().any(|a| a == base_cmd)
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return stdout/stderr. Use this for running programs, checking files, git operations, etc."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                }
            },
            "required": ["command"]
        })
    }

    fn is_unsafe(&self) -> bool {
        true
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let command = arguments["command"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'command' argument".into()))?;

        if !self.is_command_allowed(command) {
            return Err(ToolError::PermissionDenied {
                tool_name: "shell".into(),
                reason: format!(
                    "Command '{}' not in allowlist",
                    command.split_whitespace().next().unwrap_or("")
                ),
            });
        }

        debug!(command = %command, "executing shell command");

        let run = Command::new("sh").args(["-c", command]).output();
        let output = tokio::time::timeout(std::time::Duration::from_secs(self.timeout_secs), run)
            .await
            .map_err(|_| ToolError::Timeout {
                tool_name: "shell".into(),
                timeout_secs: self.timeout_secs,
            })?
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "shell".into(),
                reason: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        let result_text = if output.status.success() {
            if stderr.is_empty() {
                stdout
            } else {
                format!("{stdout}\n[stderr]: {stderr}")
            }
        } else {
            let code = output.status.code().unwrap_or(-1);
            warn!(command = %command, exit_code = code, "command failed");
            format!("[exit code: {code}]\n{stdout}\n{stderr}")
        };

        Ok(result_text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlist_check() {
        let tool = ShellTool::new(vec!["ls".into(), "cat".into(), "git".into()], 30);
        assert!(tool.is_command_allowed("ls -la"));
        assert!(tool.is_command_allowed("git status"));
        assert!(!tool.is_command_allowed("rm -rf /"));
        assert!(!tool.is_command_allowed("sudo something"));
    }

    #[test]
    fn empty_allowlist_allows_all() {
        let tool = ShellTool::new(vec![], 30);
        assert!(tool.is_command_allowed("anything goes"));
        assert!(tool.is_unsafe());
    }

    #[tokio::test]
    async fn execute_echo() {
        let tool = ShellTool::new(vec![], 30);
        let result = tool
            .execute(serde_json::json!({"command": "echo hello"}))
            .await
            .unwrap();
        assert!(result.contains("hello"));
    }

    #[tokio::test]
    async fn failing_command_reports_exit_code() {
        let tool = ShellTool::new(vec![], 30);
        let result = tool
            .execute(serde_json::json!({"command": "exit 3"}))
            .await
            .unwrap();
        assert!(result.contains("[exit code: 3]"));
    }

    #[tokio::test]
    async fn blocked_command() {
        let tool = ShellTool::new(vec!["ls".into()], 30);
        let result = tool.execute(serde_json::json!({"command": "rm -rf /"})).await;
        assert!(matches!(result, Err(ToolError::PermissionDenied { .. })));
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let tool = ShellTool::new(vec![], 1);
        let result = tool.execute(serde_json::json!({"command": "sleep 5"})).await;
        assert!(matches!(result, Err(ToolError::Timeout { .. })));
    }
}
