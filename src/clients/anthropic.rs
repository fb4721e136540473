//! Anthropic messages API client. The schema is sent as the input schema of a
//! single tool that the model is forced to call.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use super::traits::{FeatureModel, ModelError};
use super::{ModelSettings, build_http_client, send_with_retry};
use crate::prompts::Prompt;
use crate::schemas::{FeatureSchema, SCHEMA_DESCRIPTION, SCHEMA_TITLE, StructuredAnswer};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

pub struct AnthropicClient {
    name: String,
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    prompt: Arc<Prompt>,
    max_retries: u32,
}

impl AnthropicClient {
    pub fn new(
        name: String,
        base_url: &str,
        api_key: String,
        model: String,
        settings: &ModelSettings,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            name,
            client: build_http_client(settings)?,
            endpoint: format!("{}/messages", base_url.trim_end_matches('/')),
            api_key,
            model,
            temperature: settings.temperature,
            prompt: settings.prompt.clone(),
            max_retries: settings.max_retries,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub(crate) fn build_body(&self, text: &str, schema: &FeatureSchema) -> Value {
        json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": self.temperature,
            "tools": [{
                "name": SCHEMA_TITLE,
                "description": SCHEMA_DESCRIPTION,
                "input_schema": schema.to_json_schema()
            }],
            "tool_choice": {"type": "tool", "name": SCHEMA_TITLE},
            "messages": [
                {"role": "user", "content": self.prompt.render(text, None)}
            ]
        })
    }
}

/// Take the input of the first `tool_use` block.
pub(crate) fn parse_tool_use(response: &Value) -> Result<StructuredAnswer, ModelError> {
    let blocks = response["content"]
        .as_array()
        .ok_or_else(|| ModelError::Parse("response has no content blocks".into()))?;
    let input = blocks
        .iter()
        .find(|b| b["type"] == "tool_use")
        .map(|b| &b["input"])
        .ok_or(ModelError::EmptyResponse)?;
    StructuredAnswer::from_json(input)
        .ok_or_else(|| ModelError::Parse("tool input is not an object".into()))
}

#[async_trait]
impl FeatureModel for AnthropicClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        text: &str,
        schema: &FeatureSchema,
    ) -> Result<StructuredAnswer, ModelError> {
        debug!("Calling {} (chars={})", self.name, text.len());
        let body = self.build_body(text, schema);
        let response = send_with_retry(self.max_retries, || {
            self.client
                .post(&self.endpoint)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body)
        })
        .await?;
        parse_tool_use(&response)
    }
}
