//! File write tool — unsafe, requires approval when the gate is enabled.

use std::path::PathBuf;

use async_trait::async_trait;
use openpaw_core::error::ToolError;
use openpaw_core::tool::Tool;

use crate::workspace::resolve_in_workspace;

/// Write a text file inside the agent workspace.
pub struct FileWriteTool {
    workspace_dir: PathBuf,
}

impl FileWriteTool {
    pub fn new(workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file in the agent workspace. Creates the file if it doesn't exist, overwrites if it does."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "fileName": {
                    "type": "string",
                    "description": "Name or relative path of the file to write"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write"
                }
            },
            "required": ["fileName", "content"]
        })
    }

    fn is_unsafe(&self) -> bool {
        true
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let file_name = arguments["fileName"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'fileName' argument".into()))?;
        let content = arguments["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'content' argument".into()))?;

        let path = resolve_in_workspace(&self.workspace_dir, file_name).map_err(|reason| {
            ToolError::PermissionDenied {
                tool_name: "write_file".into(),
                reason,
            }
        })?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool_name: "write_file".into(),
                    reason: format!("failed to create directory: {e}"),
                })?;
        }

        tokio::fs::write(&path, content)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "write_file".into(),
                reason: format!("failed to write '{file_name}': {e}"),
            })?;

        Ok(format!(
            "Successfully wrote {} bytes to {file_name}",
            content.len()
        ))
    }
}
