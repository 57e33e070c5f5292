//! File read tool — workspace-scoped.

use std::path::PathBuf;

use async_trait::async_trait;
use openpaw_core::error::ToolError;
use openpaw_core::tool::Tool;

use crate::workspace::resolve_in_workspace;

const MAX_READ_BYTES: u64 = 256 * 1024;

/// Read a text file from inside the agent workspace.
pub struct FileReadTool {
    workspace_dir: PathBuf,
}

impl FileReadTool {
    pub fn new(workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a text file from the agent workspace."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "fileName": {
                    "type": "string",
                    "description": "Name or relative path of the file to read"
                }
            },
            "required": ["fileName"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let file_name = arguments["fileName"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'fileName' argument".into()))?;

        let path = resolve_in_workspace(&self.workspace_dir, file_name).map_err(|reason| {
            ToolError::PermissionDenied {
                tool_name: "read_file".into(),
                reason,
            }
        })?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "read_file".into(),
                reason: format!("cannot access '{file_name}': {e}"),
            })?;

        if metadata.len() > MAX_READ_BYTES {
            return Err(ToolError::ExecutionFailed {
                tool_name: "read_file".into(),
                reason: format!(
                    "'{file_name}' is {} bytes, larger than the {MAX_READ_BYTES} byte limit",
                    metadata.len()
                ),
            });
        }

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "read_file".into(),
                reason: format!("failed to read '{file_name}': {e}"),
            })
    }
}
