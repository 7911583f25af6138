//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern for agent behavior.
//! Each iteration renders the prompt template with the scratchpad so far,
//! asks the provider for a completion, and either runs the requested tool
//! or returns the final answer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::prompt::PromptTemplate;
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{Reference, ToolCall, ToolRegistry, ToolResult};

const TOOL_FENCE: &str = "```tool";
const FENCE_END: &str = "```";

/// Pseudo tool name recorded for steps where the model's tool call could not be parsed
pub const EXCEPTION_TOOL: &str = "_Exception";

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt placed in the first template slot
    pub system_prompt: String,

    /// Maximum reasoning iterations before giving up
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Whether to append tool descriptions to system prompt
    pub inject_tool_descriptions: bool,

    /// Feed malformed tool calls back to the model instead of failing
    pub handle_parsing_errors: bool,

    /// Include the tool calls and observations in the output
    pub return_intermediate_steps: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 15,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
            handle_parsing_errors: true,
            return_intermediate_steps: true,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r"You are a helpful AI assistant.

After receiving tool results, synthesize them into a helpful response.
If you can answer directly without tools, do so.
Be concise and accurate.";

/// Input for a single agent invocation
#[derive(Clone, Debug, Default)]
pub struct AgentInput {
    /// The current human turn
    pub input: String,
    /// Prior turns, oldest first
    pub chat_history: Vec<Message>,
}

/// A tool call together with what it returned
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentStep {
    pub action: ToolCall,
    pub observation: String,
}

/// Final result of an invocation
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AgentOutput {
    pub output: String,
    #[serde(default)]
    pub intermediate_steps: Vec<AgentStep>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

/// What the model asked for in one completion
#[derive(Debug)]
enum Decision {
    Finish(String),
    Act(ToolCall),
    Malformed(String),
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
    template: PromptTemplate,
}

impl Agent {
    /// Create a new agent
    pub fn new(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        let template = PromptTemplate::agent(Self::build_system_prompt(&config, &tools));
        Self {
            provider,
            tools,
            config,
            template,
        }
    }

    /// Build the full system prompt including tool descriptions
    fn build_system_prompt(config: &AgentConfig, tools: &ToolRegistry) -> String {
        let mut prompt = config.system_prompt.clone();

        if config.inject_tool_descriptions && !tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&tools.generate_prompt_section());
        }

        prompt
    }

    /// Run the agent once on the given input and history
    pub async fn invoke(&self, input: AgentInput) -> Result<AgentOutput> {
        let mut scratchpad: Vec<Message> = Vec::new();
        let mut steps: Vec<AgentStep> = Vec::new();
        let mut references: Vec<Reference> = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            let messages = self
                .template
                .render(&input.input, &input.chat_history, &scratchpad);

            let completion = self
                .provider
                .complete(&messages, &self.config.generation)
                .await?;

            tracing::debug!(
                provider = self.provider.name(),
                model = %completion.model,
                iteration,
                total_tokens = completion.usage.as_ref().map(|u| u.total_tokens),
                "Completion received"
            );

            match Self::decide(&completion.content) {
                Decision::Finish(output) => {
                    if !self.config.return_intermediate_steps {
                        steps.clear();
                    }
                    return Ok(AgentOutput {
                        output,
                        intermediate_steps: steps,
                        references,
                    });
                }
                Decision::Act(call) => {
                    tracing::debug!(tool = %call.name, "Executing tool");

                    let result = self.execute_tool(&call).await;
                    for reference in &result.references {
                        if !references.contains(reference) {
                            references.push(reference.clone());
                        }
                    }

                    let observation = Self::format_tool_result(&result);
                    scratchpad.push(Message::assistant(&completion.content));
                    scratchpad.push(Message::tool(&observation, &call.name, call.id.clone()));
                    steps.push(AgentStep {
                        action: call,
                        observation,
                    });
                }
                Decision::Malformed(error) => {
                    if !self.config.handle_parsing_errors {
                        return Err(AgentError::Parse(error));
                    }
                    tracing::warn!(%error, "Recovering from malformed tool call");

                    let observation = format!(
                        "Invalid or incomplete tool call: {error}. Respond with a single valid ```tool block, or answer in plain text."
                    );
                    scratchpad.push(Message::assistant(&completion.content));
                    scratchpad.push(Message::tool(&observation, EXCEPTION_TOOL, None));
                    steps.push(AgentStep {
                        action: ToolCall::new(EXCEPTION_TOOL).with_argument(
                            "raw",
                            serde_json::Value::String(completion.content.clone()),
                        ),
                        observation,
                    });
                }
            }
        }

        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    /// Classify a completion as a final answer, a tool call or a broken tool call
    fn decide(content: &str) -> Decision {
        if let Some(start_idx) = content.find(TOOL_FENCE) {
            let after_marker = &content[start_idx + TOOL_FENCE.len()..];
            let Some(end_idx) = after_marker.find(FENCE_END) else {
                return Decision::Malformed("unterminated tool block".into());
            };

            let json_str = after_marker[..end_idx].trim();
            return match serde_json::from_str::<ToolCall>(json_str) {
                Ok(call) => Decision::Act(Self::with_call_id(call)),
                Err(e) => Decision::Malformed(format!("could not parse tool block: {e}")),
            };
        }

        Self::parse_inline_tool_call(content)
            .map_or_else(|| Decision::Finish(content.trim().to_string()), Decision::Act)
    }

    /// Parse an unfenced tool call; the whole completion must be the JSON object
    fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
        let trimmed = content.trim();
        if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
            return None;
        }

        serde_json::from_str::<ToolCall>(trimmed)
            .ok()
            .map(Self::with_call_id)
    }

    fn with_call_id(mut call: ToolCall) -> ToolCall {
        if call.id.is_none() {
            call.id = Some(uuid::Uuid::new_v4().to_string());
        }
        call
    }

    /// Execute a tool call; failures become observations instead of errors
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        match self.tools.execute(call).await {
            Ok(mut result) => {
                result.id.clone_from(&call.id);
                result
            }
            Err(AgentError::ToolNotFound(name)) => ToolResult {
                name: name.clone(),
                id: call.id.clone(),
                success: false,
                output: format!(
                    "{name} is not a valid tool, try one of [{}].",
                    self.tools.names().join(", ")
                ),
                references: Vec::new(),
            },
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool failed");
                ToolResult {
                    name: call.name.clone(),
                    id: call.id.clone(),
                    success: false,
                    output: format!("Error: {e}"),
                    references: Vec::new(),
                }
            }
        }
    }

    /// Format tool result for the scratchpad
    fn format_tool_result(result: &ToolResult) -> String {
        if result.success {
            format!("[Tool '{}' returned]\n{}", result.name, result.output)
        } else {
            format!("[Tool '{}' failed]\n{}", result.name, result.output)
        }
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Name of the provider this agent is bound to
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn generation(mut self, options: GenerationOptions) -> Self {
        self.config.generation = options;
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    #[must_use]
    pub const fn handle_parsing_errors(mut self, enabled: bool) -> Self {
        self.config.handle_parsing_errors = enabled;
        self
    }

    #[must_use]
    pub const fn return_intermediate_steps(mut self, enabled: bool) -> Self {
        self.config.return_intermediate_steps = enabled;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::mock::ScriptedProvider;
    use crate::tool::{ParameterSchema, Tool, ToolSchema};
    use async_trait::async_trait;
    use serde_json::json;

    struct LookupTool;

    #[async_trait]
    impl Tool for LookupTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "lookup".into(),
                description: "Look something up".into(),
                parameters: vec![ParameterSchema::required_string("query", "What to look up")],
                category: None,
            }
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            let query = call.str_arg("query").unwrap_or_default();
            let mut reference = Reference::new();
            reference.insert("title".into(), json!(query));
            reference.insert("url".into(), json!(format!("https://example.org/{query}")));
            Ok(ToolResult::success("lookup", format!("facts about {query}"))
                .with_references(vec![reference]))
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "broken".into(),
                description: "Always fails".into(),
                parameters: Vec::new(),
                category: None,
            }
        }

        async fn execute(&self, _call: &ToolCall) -> Result<ToolResult> {
            Err(AgentError::ToolExecution("network down".into()))
        }
    }

    fn agent_with(provider: Arc<ScriptedProvider>) -> Agent {
        let mut tools = ToolRegistry::new();
        tools.register(LookupTool);
        tools.register(BrokenTool);
        AgentBuilder::new()
            .provider(provider)
            .tools(tools)
            .system_prompt("You are a test agent.")
            .generation(GenerationOptions::deterministic("gpt-4o"))
            .build()
            .unwrap()
    }

    fn input(text: &str) -> AgentInput {
        AgentInput {
            input: text.into(),
            chat_history: Vec::new(),
        }
    }

    #[test]
    fn test_decide_fenced_tool_call() {
        let content = r#"Let me check that for you.
```tool
{"tool": "lookup", "arguments": {"query": "wolves"}}
```"#;
        match Agent::decide(content) {
            Decision::Act(call) => {
                assert_eq!(call.name, "lookup");
                assert_eq!(call.str_arg("query"), Some("wolves"));
                assert!(call.id.is_some());
            }
            other => panic!("expected tool call, got {other:?}"),
        }
    }

    #[test]
    fn test_decide_plain_answer() {
        assert!(matches!(
            Agent::decide("  Wolves are apex predators.  "),
            Decision::Finish(text) if text == "Wolves are apex predators."
        ));
    }

    #[test]
    fn test_decide_inline_json_only_when_whole_reply() {
        match Agent::decide("  {\"tool\": \"lookup\", \"arguments\": {\"query\": \"otters\"}}\n") {
            Decision::Act(call) => assert_eq!(call.str_arg("query"), Some("otters")),
            other => panic!("expected tool call, got {other:?}"),
        }

        let prose = r#"To search you would write {"tool": "lookup", "arguments": {"query": "otters"}} yourself."#;
        assert!(matches!(
            Agent::decide(prose),
            Decision::Finish(text) if text == prose
        ));
    }

    #[test]
    fn test_decide_malformed_block() {
        assert!(matches!(
            Agent::decide("```tool\n{\"tool\": lookup}\n```"),
            Decision::Malformed(_)
        ));
        assert!(matches!(
            Agent::decide("```tool\n{\"tool\": \"lookup\"}"),
            Decision::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let provider = Arc::new(ScriptedProvider::new(["A keystone species holds an ecosystem together."]));
        let agent = agent_with(provider.clone());

        let output = agent.invoke(input("What is a keystone species?")).await.unwrap();
        assert_eq!(output.output, "A keystone species holds an ecosystem together.");
        assert!(output.intermediate_steps.is_empty());
        assert!(output.references.is_empty());

        let prompts = provider.prompts().await;
        assert_eq!(prompts.len(), 1);
        let (messages, options) = &prompts[0];
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("### lookup"));
        assert_eq!(messages.last().unwrap().content, "What is a keystone species?");
        assert!(options.temperature.abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_tool_step_and_references() {
        let provider = Arc::new(ScriptedProvider::new([
            "```tool\n{\"tool\": \"lookup\", \"arguments\": {\"query\": \"otters\"}}\n```",
            "Sea otters control urchin populations.",
        ]));
        let agent = agent_with(provider.clone());

        let output = agent.invoke(input("Why do otters matter?")).await.unwrap();
        assert_eq!(output.output, "Sea otters control urchin populations.");
        assert_eq!(output.intermediate_steps.len(), 1);
        assert_eq!(output.intermediate_steps[0].action.name, "lookup");
        assert!(output.intermediate_steps[0].observation.contains("facts about otters"));
        assert_eq!(output.references.len(), 1);
        assert_eq!(output.references[0]["url"], json!("https://example.org/otters"));

        let prompts = provider.prompts().await;
        let (second, _) = &prompts[1];
        let last = second.last().unwrap();
        assert_eq!(last.role, Role::Tool);
        assert!(last.content.starts_with("[Tool 'lookup' returned]"));
    }

    #[tokio::test]
    async fn test_parsing_error_is_recovered() {
        let provider = Arc::new(ScriptedProvider::new([
            "```tool\nnot json\n```",
            "Recovered answer.",
        ]));
        let agent = agent_with(provider);

        let output = agent.invoke(input("q")).await.unwrap();
        assert_eq!(output.output, "Recovered answer.");
        assert_eq!(output.intermediate_steps.len(), 1);
        assert_eq!(output.intermediate_steps[0].action.name, EXCEPTION_TOOL);
    }

    #[tokio::test]
    async fn test_parsing_error_fails_when_not_handled() {
        let provider = Arc::new(ScriptedProvider::new(["```tool\nnot json\n```"]));
        let agent = AgentBuilder::new()
            .provider(provider)
            .handle_parsing_errors(false)
            .build()
            .unwrap();

        let err = agent.invoke(input("q")).await.unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[tokio::test]
    async fn test_tool_failures_become_observations() {
        let provider = Arc::new(ScriptedProvider::new([
            "```tool\n{\"tool\": \"broken\"}\n```",
            "```tool\n{\"tool\": \"missing\"}\n```",
            "Done anyway.",
        ]));
        let agent = agent_with(provider);

        let output = agent.invoke(input("q")).await.unwrap();
        assert_eq!(output.output, "Done anyway.");
        assert!(output.intermediate_steps[0].observation.contains("network down"));
        assert!(output.intermediate_steps[1]
            .observation
            .contains("missing is not a valid tool, try one of [broken, lookup]"));
    }

    #[tokio::test]
    async fn test_max_iterations() {
        let looping = "```tool\n{\"tool\": \"lookup\", \"arguments\": {\"query\": \"x\"}}\n```";
        let provider = Arc::new(ScriptedProvider::new([looping, looping, looping]));
        let agent = AgentBuilder::new()
            .provider(provider)
            .max_iterations(2)
            .build()
            .unwrap();

        let err = agent.invoke(input("q")).await.unwrap_err();
        assert!(matches!(err, AgentError::MaxIterations(2)));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(ScriptedProvider::new(Vec::<String>::new()));
        let agent = agent_with(provider);

        let err = agent.invoke(input("q")).await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(_)));
    }

    #[test]
    fn test_builder_requires_provider() {
        assert!(matches!(
            AgentBuilder::new().build(),
            Err(AgentError::Config(_))
        ));
    }
}
