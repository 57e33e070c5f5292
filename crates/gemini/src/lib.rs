//! Gemini model client — maps protocol turns onto the `generateContent`
//! wire shape and back.
//!
//! The request carries {system_instruction, contents, tools:
//! [{function_declarations}]}; the response's first candidate is parsed
//! into free text and/or function calls. Every functionCall part of the
//! candidate is collected, so a multi-call response comes back as one
//! `ModelResponse` and replays as one model turn.

use async_trait::async_trait;
use openpaw_core::error::ProviderError;
use openpaw_core::model::{ModelClient, ModelResponse, ToolDeclaration};
use openpaw_core::turn::{ConversationTurn, FunctionCall, Part, TurnRole};
use serde::Serialize;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a proactive autonomous assistant with access to tools.

Behavior guidelines:
- Always explain what you plan to do BEFORE doing it.
- After completing an action, report what happened clearly.
- Chain tools when needed, and be transparent about errors and limitations.
- Some tools require user approval before they run; respect a denial and \
do not retry the same action without being asked.";

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    system_prompt: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Point the client at a different endpoint (testing, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the built-in system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Append an owner guide (e.g. `~/.openpaw/guide.md`) to the system
    /// prompt. Missing or unreadable files are skipped.
    pub fn with_guide_file(mut self, path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(guide) if !guide.trim().is_empty() => {
                self.system_prompt = format!(
                    "{}\n\n## Owner's guide (follow these rules)\n{}",
                    self.system_prompt, guide
                );
            }
            Ok(_) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "could not read guide file"),
        }
        self
    }

    /// Build the request body for a turn sequence plus declarations.
    fn build_request(
        &self,
        turns: &[ConversationTurn],
        tools: &[ToolDeclaration],
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "system_instruction": { "parts": [{ "text": self.system_prompt }] },
            "contents": to_api_contents(turns),
        });
        if !tools.is_empty() {
            body["tools"] = serde_json::json!([{ "function_declarations": tools }]);
        }
        body
    }
}

/// Serialize turns into the API's `contents` array.
fn to_api_contents(turns: &[ConversationTurn]) -> Vec<ApiContent> {
    turns
        .iter()
        .map(|turn| ApiContent {
            role: match turn.role {
                TurnRole::User => "user",
                TurnRole::Model => "model",
                TurnRole::Function => "function",
            },
            parts: turn.parts.iter().map(to_api_part).collect(),
        })
        .collect()
}

fn to_api_part(part: &Part) -> ApiPart {
    match part {
        Part::Text(text) => ApiPart {
            text: Some(text.clone()),
            ..ApiPart::default()
        },
        Part::FunctionCall(call) => ApiPart {
            function_call: Some(ApiFunctionCall {
                name: call.name.clone(),
                args: call.args.clone(),
            }),
            ..ApiPart::default()
        },
        Part::FunctionResponse { name, response } => ApiPart {
            function_response: Some(ApiFunctionResponse {
                name: name.clone(),
                response: response.clone(),
            }),
            ..ApiPart::default()
        },
        Part::InlineImage { mime_type, data } => ApiPart {
            inline_data: Some(ApiInlineData {
                mime_type: mime_type.clone(),
                data: data.clone(),
            }),
            ..ApiPart::default()
        },
    }
}

/// Parse a `generateContent` response body into a `ModelResponse`.
fn parse_response(body: &serde_json::Value) -> Result<ModelResponse, ProviderError> {
    let candidates = body["candidates"]
        .as_array()
        .ok_or_else(|| ProviderError::MalformedResponse("missing candidates".into()))?;
    let candidate = candidates
        .first()
        .ok_or_else(|| ProviderError::MalformedResponse("no response candidates".into()))?;
    let parts = candidate["content"]["parts"]
        .as_array()
        .ok_or_else(|| ProviderError::MalformedResponse("candidate has no parts".into()))?;

    let mut text = String::new();
    let mut function_calls = Vec::new();

    for part in parts {
        if let Some(t) = part["text"].as_str() {
            text.push_str(t);
        }
        if let Some(call) = part.get("functionCall") {
            let name = call["name"].as_str().unwrap_or("unknown").to_string();
            let args = call.get("args").cloned().unwrap_or(serde_json::json!({}));
            function_calls.push(FunctionCall::new(name, args));
        }
    }

    if text.is_empty() && function_calls.is_empty() {
        return Err(ProviderError::MalformedResponse(
            "candidate had neither text nor function calls".into(),
        ));
    }

    Ok(ModelResponse {
        text: if text.is_empty() { None } else { Some(text) },
        function_calls,
    })
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        turns: &[ConversationTurn],
        tools: &[ToolDeclaration],
    ) -> Result<ModelResponse, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "GEMINI_API_KEY is not set".into(),
            ));
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = self.build_request(turns, tools);

        debug!(model = %self.model, turns = turns.len(), "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }
        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini returned error");
            return Err(ProviderError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("failed to parse response: {e}"))
        })?;

        parse_response(&json)
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/models?key={}", self.base_url, self.api_key);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("failed to parse model list: {e}"))
        })?;

        let models = body["models"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|m| m["name"].as_str())
                    .filter(|name| name.contains("gemini") && !name.contains("embedding"))
                    .map(|name| name.trim_start_matches("models/").to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }
}

// ── Wire types ──

#[derive(Debug, Serialize)]
struct ApiContent {
    role: &'static str,
    parts: Vec<ApiPart>,
}

#[derive(Debug, Default, Serialize)]
struct ApiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(rename = "functionCall", skip_serializing_if = "Option::is_none")]
    function_call: Option<ApiFunctionCall>,

    #[serde(rename = "functionResponse", skip_serializing_if = "Option::is_none")]
    function_response: Option<ApiFunctionResponse>,

    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<ApiInlineData>,
}

#[derive(Debug, Serialize)]
struct ApiFunctionCall {
    name: String,
    args: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ApiFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ApiInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_serialize_with_api_field_names() {
        let turns = vec![
            ConversationTurn::user_text("what time"),
            ConversationTurn::model_calls(&[FunctionCall::new(
                "get_current_time",
                serde_json::json!({}),
            )]),
            ConversationTurn::function_responses(&[(
                "get_current_time".into(),
                "10:00".into(),
            )]),
        ];
        let json = serde_json::to_value(to_api_contents(&turns)).unwrap();

        assert_eq!(json[0]["role"], "user");
        assert_eq!(json[0]["parts"][0]["text"], "what time");
        assert_eq!(json[1]["role"], "model");
        assert_eq!(json[1]["parts"][0]["functionCall"]["name"], "get_current_time");
        assert_eq!(json[2]["role"], "function");
        assert_eq!(
            json[2]["parts"][0]["functionResponse"]["response"]["result"],
            "10:00"
        );
        // unused part fields must be absent, not null
        assert!(json[0]["parts"][0].get("functionCall").is_none());
    }

    #[test]
    fn inline_image_uses_mime_type_key() {
        let turn = ConversationTurn {
            role: TurnRole::User,
            parts: vec![Part::InlineImage {
                mime_type: "image/png".into(),
                data: "aGVsbG8=".into(),
            }],
        };
        let json = serde_json::to_value(to_api_contents(std::slice::from_ref(&turn))).unwrap();
        assert_eq!(json[0]["parts"][0]["inlineData"]["mimeType"], "image/png");
    }

    #[test]
    fn request_includes_system_prompt_and_declarations() {
        let client = GeminiClient::new("key", "gemini-2.0-flash").with_system_prompt("be brief");
        let tools = vec![ToolDeclaration {
            name: "read_file".into(),
            description: "Read a file".into(),
            parameters: serde_json::json!({"type": "object"}),
        }];
        let body = client.build_request(&[ConversationTurn::user_text("hi")], &tools);

        assert_eq!(body["system_instruction"]["parts"][0]["text"], "be brief");
        assert_eq!(
            body["tools"][0]["function_declarations"][0]["name"],
            "read_file"
        );
    }

    #[test]
    fn request_omits_tools_when_none_declared() {
        let client = GeminiClient::new("key", "gemini-2.0-flash");
        let body = client.build_request(&[ConversationTurn::user_text("hi")], &[]);
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn parse_text_candidate() {
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hello!" }] } }]
        });
        let resp = parse_response(&body).unwrap();
        assert!(resp.is_text_only());
        assert_eq!(resp.text.as_deref(), Some("Hello!"));
    }

    #[test]
    fn parse_single_function_call() {
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [
                { "functionCall": { "name": "write_file", "args": { "fileName": "a.txt" } } }
            ] } }]
        });
        let resp = parse_response(&body).unwrap();
        assert_eq!(resp.function_calls.len(), 1);
        assert_eq!(resp.function_calls[0].name, "write_file");
        assert_eq!(resp.function_calls[0].args["fileName"], "a.txt");
    }

    #[test]
    fn parse_multiple_calls_in_one_candidate() {
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [
                { "functionCall": { "name": "read_file", "args": { "path": "a" } } },
                { "functionCall": { "name": "get_current_time" } }
            ] } }]
        });
        let resp = parse_response(&body).unwrap();
        assert_eq!(resp.function_calls.len(), 2);
        assert_eq!(resp.function_calls[1].name, "get_current_time");
        assert_eq!(resp.function_calls[1].args, serde_json::json!({}));
    }

    #[test]
    fn parse_text_alongside_calls_keeps_both() {
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Let me check." },
                { "functionCall": { "name": "get_current_time", "args": {} } }
            ] } }]
        });
        let resp = parse_response(&body).unwrap();
        assert_eq!(resp.text.as_deref(), Some("Let me check."));
        assert_eq!(resp.function_calls.len(), 1);
    }

    #[test]
    fn parse_rejects_missing_candidates() {
        assert!(matches!(
            parse_response(&serde_json::json!({})),
            Err(ProviderError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_response(&serde_json::json!({"candidates": []})),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn missing_api_key_is_not_configured() {
        let client = GeminiClient::new("", "gemini-2.0-flash");
        let err = client
            .generate(&[ConversationTurn::user_text("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
