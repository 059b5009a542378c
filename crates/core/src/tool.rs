//! Tool trait and dispatch boundary.
//!
//! Tools are the agent's only way of acting on the task store. The
//! registry is also the failure boundary: argument validation errors and
//! handler faults are converted into structured outcomes here and never
//! propagate to the orchestrator.

use crate::error::ToolError;
use crate::provider::ToolSchema;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// A tool directive with its arguments already parsed into JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id, carried through to the result message.
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// The structured result of a tool execution.
///
/// Exactly one of `message` / `error` carries the user-facing
/// explanation: `message` on success, `error` on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub success: bool,

    /// Optional structured payload (e.g. the listed tasks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutcome {
    /// A successful outcome with a user-facing message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }

    /// A successful outcome carrying structured data.
    pub fn ok_with_data(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
        }
    }

    /// A failed outcome with a user-facing error text.
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }

    /// The explanation to show the user, whichever field carries it.
    pub fn explanation(&self) -> &str {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or("Operation completed successfully!")
    }

    /// Serialize for the `role = tool` message content on the wire.
    pub fn wire_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{\"success\":false}".into())
    }
}

/// One capability the agent can exercise against the store.
///
/// Implementations live in the tools crate, one per task operation.
/// A tool is constructed for a specific owner, so its handler cannot
/// reach another user's data no matter what arguments arrive.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Registry key and the function name the model calls.
    fn name(&self) -> &str;

    /// What the model is told this tool does.
    fn description(&self) -> &str;

    /// JSON Schema for the arguments. The schema's `required` array is
    /// enforced by the registry before the handler ever runs.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Run the tool against the store.
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolOutcome, ToolError>;

    /// How this tool appears in the catalogue sent to the model.
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Named tools plus the dispatch failure boundary.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// The full tool catalogue, for the model-facing request.
    pub fn catalogue(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Execute a tool call, absorbing every failure into the outcome.
    ///
    /// Validates the schema's required arguments before invoking the
    /// handler; a missing argument means the handler never runs and no
    /// mutation is partially applied.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolOutcome {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool = %call.name, "Dispatch requested for unknown tool");
            return ToolOutcome::fail(format!("Unknown tool: {}", call.name));
        };

        if let Some(missing) = missing_required_arg(&tool.parameters_schema(), &call.arguments) {
            warn!(tool = %call.name, argument = %missing, "Missing required tool argument");
            return ToolOutcome::fail(format!(
                "Missing required argument '{}' for tool '{}'",
                missing, call.name
            ));
        }

        match tool.execute(call.arguments.clone()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                ToolOutcome::fail(format!("Error executing tool {}: {e}", call.name))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Return the first field from the schema's `required` array that is
/// absent from `arguments`, if any. A field set to JSON `null` counts
/// as absent.
fn missing_required_arg(schema: &serde_json::Value, arguments: &serde_json::Value) -> Option<String> {
    let required = schema.get("required")?.as_array()?;
    for field in required {
        let Some(name) = field.as_str() else { continue };
        let present = arguments.get(name).is_some_and(|v| !v.is_null());
        if !present {
            return Some(name.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shouts its `text` argument back, for exercising the registry.
    struct ShoutTool;

    #[async_trait]
    impl Tool for ShoutTool {
        fn name(&self) -> &str {
            "shout"
        }
        fn description(&self) -> &str {
            "Returns the input text uppercased"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
        ) -> std::result::Result<ToolOutcome, ToolError> {
            let text = arguments["text"].as_str().unwrap_or("");
            Ok(ToolOutcome::ok(text.to_uppercase()))
        }
    }

    /// A tool whose handler always errors.
    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn name(&self) -> &str {
            "broken"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }
        async fn execute(
            &self,
            _arguments: serde_json::Value,
        ) -> std::result::Result<ToolOutcome, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "broken".into(),
                reason: "boom".into(),
            })
        }
    }

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "call_1".into(),
            name: name.into(),
            arguments,
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(ShoutTool));
        registry
    }

    #[test]
    fn lookup_by_name() {
        let registry = registry();
        assert!(registry.get("shout").is_some());
        assert!(registry.get("whisper").is_none());
    }

    #[test]
    fn catalogue_lists_registered_schemas() {
        let catalogue = registry().catalogue();
        assert_eq!(catalogue.len(), 1);
        assert_eq!(catalogue[0].name, "shout");
        assert_eq!(catalogue[0].parameters["required"][0], "text");
    }

    #[tokio::test]
    async fn dispatch_runs_the_handler() {
        let outcome = registry()
            .dispatch(&call("shout", serde_json::json!({"text": "hello"})))
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("HELLO"));
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_is_error_outcome() {
        let outcome = registry()
            .dispatch(&call("whisper", serde_json::json!({})))
            .await;
        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap().contains("whisper"));
    }

    #[tokio::test]
    async fn dispatch_rejects_missing_required_argument() {
        let outcome = registry().dispatch(&call("shout", serde_json::json!({}))).await;
        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap().contains("text"));
    }

    #[tokio::test]
    async fn dispatch_treats_null_argument_as_missing() {
        let outcome = registry()
            .dispatch(&call("shout", serde_json::json!({"text": null})))
            .await;
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn dispatch_absorbs_handler_fault() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(BrokenTool));

        let outcome = registry.dispatch(&call("broken", serde_json::json!({}))).await;
        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap().contains("boom"));
    }

    #[test]
    fn outcome_explanation_reads_whichever_side_is_set() {
        assert_eq!(ToolOutcome::ok("done").explanation(), "done");
        assert_eq!(ToolOutcome::fail("nope").explanation(), "nope");
    }

    #[test]
    fn outcome_wire_json_roundtrip() {
        let outcome = ToolOutcome::ok_with_data("2 tasks", serde_json::json!({"count": 2}));
        let parsed: ToolOutcome = serde_json::from_str(&outcome.wire_json()).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.data.unwrap()["count"], 2);
    }
}
