//! Tool trait and registry — the abstraction over agent capabilities.
//!
//! A tool is a capability with a name, a JSON parameter schema, an unsafe
//! flag, and an execute function. Tools flagged unsafe are gated behind
//! human approval by the agent loop; the flag never reaches the model.

use crate::error::ToolError;
use crate::model::ToolDeclaration;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// The core Tool trait.
///
/// Each capability (shell, read_file, write_file, read_web_page, ...)
/// implements this trait and is registered once at startup. Arguments
/// arrive as a raw JSON object the tool decodes itself.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "shell", "read_file").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Whether executing this tool requires explicit user approval.
    fn is_unsafe(&self) -> bool {
        false
    }

    /// Execute the tool with the given arguments. Internal failures
    /// surface as `ToolError`; the dispatcher turns them into result text.
    async fn execute(&self, args: serde_json::Value) -> std::result::Result<String, ToolError>;

    /// The model-facing declaration. Never includes the unsafe flag.
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// Lookup is case-insensitive; registration is last-write-wins on name
/// collision. Shared read-only across sessions after startup.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_lowercase(), tool);
    }

    /// Get a tool by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(&name.to_lowercase()).cloned()
    }

    /// All declarations, for advertising capabilities to the model.
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools.values().map(|t| t.declaration()).collect()
    }

    /// All registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.values().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }
        async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError> {
            Ok(args["text"].as_str().unwrap_or("").to_string())
        }
    }

    struct LoudEchoTool;

    #[async_trait]
    impl Tool for LoudEchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input, uppercased"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({ "type": "object", "properties": {} })
        }
        async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError> {
            Ok(args["text"].as_str().unwrap_or("").to_uppercase())
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("ECHO").is_some());
        assert!(registry.get("Echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn registration_is_last_write_wins() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry.register(Arc::new(LoudEchoTool));
        assert_eq!(registry.len(), 1);
        let tool = registry.get("echo").unwrap();
        assert_eq!(tool.description(), "Echoes back the input, uppercased");
    }

    #[test]
    fn declarations_expose_only_model_facing_fields() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        let decls = registry.declarations();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "echo");
        let json = serde_json::to_string(&decls[0]).unwrap();
        assert!(!json.contains("unsafe"));
    }

    #[tokio::test]
    async fn execute_through_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        let tool = registry.get("echo").unwrap();
        let out = tool
            .execute(serde_json::json!({"text": "hello world"}))
            .await
            .unwrap();
        assert_eq!(out, "hello world");
    }
}
