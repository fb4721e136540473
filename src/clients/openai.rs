//! OpenAI-compatible chat-completions client (OpenAI, OpenRouter, Groq, Google).

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use super::traits::{FeatureModel, ModelError};
use super::{ModelSettings, build_http_client, extract_json_object, send_with_retry};
use crate::prompts::Prompt;
use crate::schemas::{FeatureSchema, SCHEMA_TITLE, StructuredAnswer};

/// How the schema reaches the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    /// `response_format: json_schema`
    JsonSchema,
    /// Schema rendered into the prompt; the reply is scanned for a JSON object.
    FormatInstructions,
}

pub struct OpenAiCompatibleClient {
    name: String,
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    prompt: Arc<Prompt>,
    style: OutputStyle,
    max_retries: u32,
}

impl OpenAiCompatibleClient {
    pub fn new(
        name: String,
        base_url: &str,
        api_key: String,
        model: String,
        style: OutputStyle,
        settings: &ModelSettings,
    ) -> Result<Self, ModelError> {
        let endpoint = if base_url.ends_with("/chat/completions") {
            base_url.to_string()
        } else {
            format!("{}/chat/completions", base_url.trim_end_matches('/'))
        };
        Ok(Self {
            name,
            client: build_http_client(settings)?,
            endpoint,
            api_key,
            model,
            temperature: settings.temperature,
            prompt: settings.prompt.clone(),
            style,
            max_retries: settings.max_retries,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub(crate) fn build_body(&self, text: &str, schema: &FeatureSchema) -> Value {
        match self.style {
            OutputStyle::JsonSchema => json!({
                "model": self.model,
                "temperature": self.temperature,
                "messages": [
                    {"role": "user", "content": self.prompt.render(text, None)}
                ],
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {
                        "name": SCHEMA_TITLE,
                        "schema": schema.to_json_schema()
                    }
                }
            }),
            OutputStyle::FormatInstructions => {
                let instructions = schema.format_instructions();
                json!({
                    "model": self.model,
                    "temperature": self.temperature,
                    "messages": [
                        {"role": "user", "content": self.prompt.render(text, Some(&instructions))}
                    ]
                })
            }
        }
    }
}

/// Pull the structured answer out of a chat-completions response.
pub(crate) fn parse_chat_completion(response: &Value) -> Result<StructuredAnswer, ModelError> {
    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .unwrap_or("");
    if content.is_empty() {
        return Err(ModelError::EmptyResponse);
    }
    let object = extract_json_object(content)?;
    StructuredAnswer::from_json(&object).ok_or(ModelError::EmptyResponse)
}

#[async_trait]
impl FeatureModel for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        text: &str,
        schema: &FeatureSchema,
    ) -> Result<StructuredAnswer, ModelError> {
        debug!(
            "Calling {} (style={:?}, chars={})",
            self.name,
            self.style,
            text.len()
        );
        let body = self.build_body(text, schema);
        let response = send_with_retry(self.max_retries, || {
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
        })
        .await?;
        parse_chat_completion(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{CollectionPolicy, FeatureDescriptor, build_feature_set};
    use crate::prompts::PromptRegistry;

    fn client(style: OutputStyle) -> OpenAiCompatibleClient {
        let settings = ModelSettings::new(PromptRegistry::new().get("basic").unwrap());
        OpenAiCompatibleClient::new(
            "openai:gpt-4o".into(),
            "https://api.openai.com/v1/",
            "sk-test".into(),
            "gpt-4o".into(),
            style,
            &settings,
        )
        .unwrap()
    }

    fn schema() -> FeatureSchema {
        build_feature_set(&[FeatureDescriptor::builtin("MOOD", CollectionPolicy::RawLabel)])
            .unwrap()
            .1
    }

    #[test]
    fn endpoint_gets_chat_completions_path() {
        assert_eq!(
            client(OutputStyle::JsonSchema).endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn json_schema_style_sends_response_format() {
        let body = client(OutputStyle::JsonSchema).build_body("It rained.", &schema());
        assert_eq!(body["temperature"], json!(0.0));
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(
            body["response_format"]["json_schema"]["schema"]["required"],
            json!(["mood"])
        );
        let prompt = body["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.contains("It rained."));
        assert!(!prompt.contains("JSON schema"));
    }

    #[test]
    fn instruction_style_embeds_schema_in_prompt() {
        let body = client(OutputStyle::FormatInstructions).build_body("It rained.", &schema());
        assert!(body.get("response_format").is_none());
        let prompt = body["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.contains("DynamicFeatureModel"));
        assert!(prompt.contains("It rained."));
    }

    #[test]
    fn parses_content_with_surrounding_prose() {
        let response = json!({
            "choices": [{"message": {"content": "Here you go:\n```json\n{\"mood\": \"sad\"}\n```"}}]
        });
        let answer = parse_chat_completion(&response).unwrap();
        assert_eq!(answer.get("mood"), Some("sad"));
    }

    #[test]
    fn empty_content_is_an_error() {
        let response = json!({"choices": [{"message": {"content": ""}}]});
        assert!(matches!(
            parse_chat_completion(&response),
            Err(ModelError::EmptyResponse)
        ));
        let response = json!({"choices": [{"message": {"content": "no json here"}}]});
        assert!(matches!(
            parse_chat_completion(&response),
            Err(ModelError::Parse(_))
        ));
    }
}
