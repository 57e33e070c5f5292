//! Current time tool.

use async_trait::async_trait;
use openpaw_core::error::ToolError;
use openpaw_core::tool::Tool;

/// Report the current local date and time.
pub struct TimeTool;

#[async_trait]
impl Tool for TimeTool {
    fn name(&self) -> &str {
        "get_current_time"
    }

    fn description(&self) -> &str {
        "Get the current local date and time."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        let now = chrono::Local::now();
        Ok(format!(
            "Current date and time: {}",
            now.format("%A, %B %e, %Y %H:%M:%S")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_definition() {
        let tool = TimeTool;
        assert_eq!(tool.name(), "get_current_time");
        assert!(!tool.is_unsafe());
    }

    #[tokio::test]
    async fn returns_a_timestamp() {
        let tool = TimeTool;
        let result = tool.execute(serde_json::json!({})).await.unwrap();
        assert!(result.starts_with("Current date and time:"));
    }
}
