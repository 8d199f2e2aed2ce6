//! The decision-model boundary. `ModelProvider` is the seam the decision
//! node and fast-path node call through exactly once per event; everything
//! downstream treats a provider failure as "fall back to silent", never as
//! a crash.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::director::error::DirectorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Silent,
    Speak,
    Intervene,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedToolCall {
    pub tool: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    pub intent: Intent,
    pub targets: Vec<String>,
    pub escalation: f32,
    pub rationale: String,
    pub narrative: Option<String>,
    pub plan: Vec<ProposedToolCall>,
}

impl ModelResponse {
    pub fn silent(rationale: impl Into<String>) -> Self {
        Self { intent: Intent::Silent, targets: Vec::new(), escalation: 0.0, rationale: rationale.into(), narrative: None, plan: Vec::new() }
    }
}

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn decide(&self, request: &ModelRequest) -> Result<ModelResponse, DirectorError>;
}

/// Live provider backed by `openai_dive`'s chat-completions client, asking
/// for a single forced tool call whose arguments are the decision record —
/// the same function-calling shape the corpus's asset-generation tool uses.
pub struct OpenAiModelProvider {
    client: openai_dive::v1::api::Client,
    model: String,
}

impl OpenAiModelProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { client: openai_dive::v1::api::Client::new(api_key.into()), model: model.into() }
    }

    fn decision_tool() -> openai_dive::v1::resources::chat::ChatCompletionTool {
        use openai_dive::v1::resources::chat::{ChatCompletionFunction, ChatCompletionTool, ChatCompletionToolType};
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: ChatCompletionFunction {
                name: "emit_decision".to_string(),
                description: Some("Emit the director's decision for this event.".to_string()),
                parameters: json!({
                    "type": "object",
                    "required": ["intent", "targets", "escalation", "rationale"],
                    "properties": {
                        "intent": {"type": "string", "enum": ["silent", "speak", "intervene"]},
                        "targets": {"type": "array", "items": {"type": "string"}},
                        "escalation": {"type": "number"},
                        "rationale": {"type": "string"},
                        "narrative": {"type": "string"},
                        "plan": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["tool", "arguments"],
                                "properties": {"tool": {"type": "string"}, "arguments": {"type": "object"}}
                            }
                        }
                    }
                }),
            },
        }
    }
}

#[async_trait]
impl ModelProvider for OpenAiModelProvider {
    async fn decide(&self, request: &ModelRequest) -> Result<ModelResponse, DirectorError> {
        use openai_dive::v1::resources::chat::{ChatCompletionParameters, ChatMessage, ChatMessageContent};

        let params = ChatCompletionParameters {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::System {
                    content: ChatMessageContent::Text(request.system_prompt.clone()),
                    name: None,
                },
                ChatMessage::User {
                    content: ChatMessageContent::Text(request.user_prompt.clone()),
                    name: None,
                },
            ],
            tools: Some(vec![Self::decision_tool()]),
            temperature: Some(request.temperature),
            ..Default::default()
        };

        let response = self
            .client
            .chat()
            .create(params)
            .await
            .map_err(|e| DirectorError::TransientUnavailable(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DirectorError::TransientUnavailable("empty model response".into()))?;

        let tool_calls = match choice.message {
            openai_dive::v1::resources::chat::ChatMessage::Assistant { tool_calls, .. } => tool_calls,
            _ => None,
        };

        let call = tool_calls
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| DirectorError::SchemaViolation("model did not call emit_decision".into()))?;

        serde_json::from_str::<ModelResponse>(&call.function.arguments)
            .map_err(|e| DirectorError::SchemaViolation(format!("malformed decision payload: {e}")))
    }
}

/// Deterministic, rule-based stand-in used by the scenario runner — this is
/// what keeps the synthetic world language-model-free while still
/// exercising the exact same pipeline code path a live decision node uses.
pub struct ScriptedModelProvider;

#[async_trait]
impl ModelProvider for ScriptedModelProvider {
    async fn decide(&self, request: &ModelRequest) -> Result<ModelResponse, DirectorError> {
        let prompt = request.user_prompt.to_lowercase();
        if prompt.contains("chat:") {
            return Ok(ModelResponse {
                intent: Intent::Speak,
                targets: Vec::new(),
                escalation: 0.1,
                rationale: "acknowledging chat".into(),
                narrative: Some("The director listens.".into()),
                plan: Vec::new(),
            });
        }
        if prompt.contains("dragon kill") {
            return Ok(ModelResponse {
                intent: Intent::Speak,
                targets: Vec::new(),
                escalation: 0.9,
                rationale: "celebrating a dragon kill".into(),
                narrative: Some("The sky splits with triumph.".into()),
                plan: vec![ProposedToolCall { tool: "launch_firework".into(), arguments: json!({"x": 0.0, "y": 64.0, "z": 0.0}) }],
            });
        }
        if prompt.contains("death:") {
            return Ok(ModelResponse {
                intent: Intent::Intervene,
                targets: Vec::new(),
                escalation: 0.6,
                rationale: "softening a death".into(),
                narrative: Some("A second chance, quietly given.".into()),
                plan: vec![ProposedToolCall { tool: "modify_aura".into(), arguments: json!({"target": "unknown", "delta": -5}) }],
            });
        }
        Ok(ModelResponse::silent("nothing notable"))
    }
}

/// Always fails, matching `DirectorError::TransientUnavailable` — used by
/// the "model outage" scenario.
pub struct FailingModelProvider;

#[async_trait]
impl ModelProvider for FailingModelProvider {
    async fn decide(&self, _request: &ModelRequest) -> Result<ModelResponse, DirectorError> {
        Err(DirectorError::TransientUnavailable("model outage".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_provider_intervenes_on_death() {
        let provider = ScriptedModelProvider;
        let request = ModelRequest { system_prompt: String::new(), user_prompt: "death: fall damage".into(), temperature: 0.7 };
        let response = provider.decide(&request).await.unwrap();
        assert_eq!(response.intent, Intent::Intervene);
    }

    #[tokio::test]
    async fn failing_provider_always_errors() {
        let provider = FailingModelProvider;
        let request = ModelRequest { system_prompt: String::new(), user_prompt: String::new(), temperature: 0.7 };
        assert!(provider.decide(&request).await.is_err());
    }
}
