use crate::llm::{CompletionClient, CompletionParams, CompletionRequest};
use crate::tools::builtin_tools;
use ethicist_core::{EthicistError, ToolDefinition, ToolResult, ToolSummary};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// A validated, rendered tool call that has not been sent anywhere yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCall {
    pub tool: &'static str,
    pub system: String,
    pub prompt: String,
    /// Reference annotation, if the tool defines one.
    pub reference: Option<String>,
}

// ============================================================================
// ToolDispatcher
// ============================================================================

pub struct ToolDispatcher {
    tools: Vec<ToolDefinition>,
    client: Arc<dyn CompletionClient>,
    params: CompletionParams,
}

impl ToolDispatcher {
    /// Dispatcher over the five built-in tools.
    pub fn new(client: Arc<dyn CompletionClient>, params: CompletionParams) -> Self {
        Self {
            tools: builtin_tools(),
            client,
            params,
        }
    }

    /// Dispatcher over an explicit tool table. Names must be unique.
    pub fn with_tools(
        tools: Vec<ToolDefinition>,
        client: Arc<dyn CompletionClient>,
        params: CompletionParams,
    ) -> Result<Self, EthicistError> {
        for (i, tool) in tools.iter().enumerate() {
            if tools[..i].iter().any(|t| t.name == tool.name) {
                return Err(EthicistError::DuplicateTool(tool.name.to_string()));
            }
        }
        Ok(Self {
            tools,
            client,
            params,
        })
    }

    pub fn list_tools(&self) -> Vec<ToolSummary> {
        self.tools.iter().map(|t| t.summary()).collect()
    }

    fn find(&self, name: &str) -> Result<&ToolDefinition, EthicistError> {
        self.tools
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| EthicistError::UnknownTool(name.to_string()))
    }

    /// Validate and render without contacting the provider.
    pub fn prepare(&self, name: &str, arguments: &Value) -> Result<PreparedCall, EthicistError> {
        let tool = self.find(name)?;
        let args = tool.schema.validate(arguments)?;
        Ok(PreparedCall {
            tool: tool.name,
            system: tool.system_instruction.to_string(),
            prompt: (tool.render)(&args),
            reference: tool.reference.map(|f| f(&args)),
        })
    }

    /// Validate, render, run one completion and wrap the answer.
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> Result<ToolResult, EthicistError> {
        let started = Instant::now();
        let outcome = self.execute(name, arguments).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(_) => tracing::info!(tool = %name, outcome = "success", elapsed_ms, "Tool call finished"),
            Err(e) => tracing::warn!(
                tool = %name,
                outcome = "failure",
                kind = e.kind(),
                elapsed_ms,
                "Tool call failed: {}",
                e
            ),
        }
        outcome
    }

    async fn execute(&self, name: &str, arguments: &Value) -> Result<ToolResult, EthicistError> {
        let prepared = self.prepare(name, arguments)?;
        tracing::debug!("Prompt for {}: {} chars", prepared.tool, prepared.prompt.len());

        let completion = self
            .client
            .complete(CompletionRequest {
                system: prepared.system,
                prompt: prepared.prompt,
                params: self.params.clone(),
            })
            .await?;

        let result = ToolResult::text(completion.text);
        Ok(match prepared.reference {
            Some(reference) => result.with_text(reference),
            None => result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockProvider;
    use serde_json::json;

    fn dispatcher() -> ToolDispatcher {
        ToolDispatcher::new(Arc::new(MockProvider::new("m")), CompletionParams::default())
    }

    #[test]
    fn test_duplicate_tool_rejected() {
        let mut tools = builtin_tools();
        tools.push(tools[0].clone());
        let err = ToolDispatcher::with_tools(
            tools,
            Arc::new(MockProvider::new("m")),
            CompletionParams::default(),
        )
        .err()
        .unwrap();
        assert_eq!(
            err,
            EthicistError::DuplicateTool("analyze_ethical_scenario".into())
        );
    }

    #[test]
    fn test_list_tools_schema() {
        let tools = dispatcher().list_tools();
        assert_eq!(tools.len(), 5);
        let bias = tools.iter().find(|t| t.name == "check_bias").unwrap();
        assert_eq!(bias.input_schema.required, vec!["context".to_string()]);
        assert_eq!(
            bias.input_schema.properties["bias_types"]["items"]["enum"],
            json!(["selection", "confirmation", "algorithmic", "representation", "measurement"])
        );
    }

    #[test]
    fn test_prepare_is_dry_run() {
        let prepared = dispatcher()
            .prepare("check_bias", &json!({"context": "hiring data"}))
            .unwrap();
        assert_eq!(prepared.tool, "check_bias");
        assert!(prepared.system.starts_with("You are"));
        assert!(prepared.prompt.contains("Context: hiring data"));
        assert!(prepared.reference.is_some());
    }

    #[tokio::test]
    async fn test_call_tool_appends_reference_block() {
        let result = dispatcher()
            .call_tool("evaluate_ai_system", &json!({"system_description": "s", "use_case": "u"}))
            .await
            .unwrap();
        assert_eq!(result.content.len(), 2);
        assert!(!result.is_error);
        assert!(result.joined_text().contains("# Ethical Guidelines Assessment"));
    }
}
