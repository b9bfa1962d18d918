//! Anthropic-native adapter.
//!
//! Implements the single-turn slice of the Anthropic Messages API that
//! routine recommendations need: one user message in, one text reply out.

use serde_json::Value;

use crate::traits::{GenerateRequest, GenerateResponse, TextProvider};
use crate::util::{from_reqwest, resolve_api_key};
use sg_domain::config::AdvisorConfig;
use sg_domain::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const ANTHROPIC_VERSION: &str = "2023-06-01";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A text provider adapter for the Anthropic Messages API.
pub struct AnthropicProvider {
    base_url: String,
    api_key: String,
    default_model: String,
    default_max_tokens: u32,
    default_temperature: f32,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Create a new provider from the deserialized advisor config.
    pub fn from_config(cfg: &AdvisorConfig) -> Result<Self> {
        let api_key = resolve_api_key(&cfg.api_key_env)?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            default_model: cfg.model.clone(),
            default_max_tokens: cfg.max_tokens,
            default_temperature: cfg.temperature,
            client,
        })
    }

    fn build_body(&self, req: &GenerateRequest) -> Value {
        let model = req
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());

        serde_json::json!({
            "model": model,
            "max_tokens": req.max_tokens.unwrap_or(self.default_max_tokens),
            "temperature": req.temperature.unwrap_or(self.default_temperature),
            "messages": [
                {"role": "user", "content": [{"type": "text", "text": req.prompt}]}
            ],
        })
    }
}

/// Extract the concatenated text blocks from a Messages API response body.
fn parse_response_text(body: &Value) -> String {
    body.get("content")
        .and_then(|v| v.as_array())
        .map(|blocks| {
            blocks
                .iter()
                .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
                .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl TextProvider for AnthropicProvider {
    async fn generate(&self, req: GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = self.build_body(&req);

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let payload: Value = resp.json().await.map_err(from_reqwest)?;

        if !status.is_success() {
            let message = payload
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("request failed")
                .to_string();
            return Err(Error::Provider {
                provider: "anthropic".into(),
                message: format!("{status}: {message}"),
            });
        }

        let content = parse_response_text(&payload);
        let model = payload
            .get("model")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.default_model)
            .to_string();

        Ok(GenerateResponse { content, model })
    }

    fn provider_id(&self) -> &str {
        "anthropic"
    }
}
