pub mod anthropic;
pub mod openai;
pub mod traits;

pub use anthropic::AnthropicClient;
pub use openai::{OpenAiCompatibleClient, OutputStyle};
pub use traits::{FeatureModel, ModelError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::prompts::Prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Anthropic,
    OpenRouter,
    Groq,
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::OpenRouter => "openrouter",
            Provider::Groq => "groq",
            Provider::Google => "google",
        }
    }

    /// Environment variable holding the provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
            Provider::Google => "GOOGLE_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Anthropic => anthropic::ANTHROPIC_BASE_URL,
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::Google => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "openrouter" => Ok(Provider::OpenRouter),
            "groq" => Ok(Provider::Groq),
            "google" | "gemini" => Ok(Provider::Google),
            other => Err(ModelError::UnknownProvider(other.to_string())),
        }
    }
}

/// A provider plus model name, written `provider:model` on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub provider: String,
    pub name: String,
}

impl ModelSpec {
    pub fn new(provider: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            name: name.into(),
        }
    }

    pub fn provider(&self) -> Result<Provider, ModelError> {
        self.provider.parse()
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.name)
    }
}

impl FromStr for ModelSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((provider, name)) if !provider.trim().is_empty() && !name.trim().is_empty() => {
                Ok(Self::new(provider.trim(), name.trim()))
            }
            _ => Err(format!("expected provider:model, got '{}'", s)),
        }
    }
}

/// Settings shared by every client of a run.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub prompt: Arc<Prompt>,
    pub temperature: f32,
    pub request_timeout: Option<Duration>,
    pub base_url: Option<String>,
    pub max_retries: u32,
}

impl ModelSettings {
    pub fn new(prompt: Arc<Prompt>) -> Self {
        Self {
            prompt,
            temperature: 0.0,
            request_timeout: None,
            base_url: None,
            max_retries: 2,
        }
    }

    /// Settings for a triangulation client. `base_url` belongs to the primary
    /// model only; secondaries talk to their own provider's endpoint.
    pub fn for_triangulation(&self) -> Self {
        Self {
            base_url: None,
            ..self.clone()
        }
    }

    /// Endpoint root used for `provider`.
    pub fn base_url_for(&self, provider: Provider) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(provider.default_base_url())
    }
}

/// Build a client for `provider`.
pub fn create_model(
    provider: Provider,
    model: &str,
    api_key: Option<String>,
    settings: &ModelSettings,
) -> Result<Box<dyn FeatureModel>, ModelError> {
    let api_key = api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ModelError::MissingApiKey {
            env_var: provider.api_key_env().to_string(),
        })?;
    let base_url = settings.base_url_for(provider);
    let name = format!("{}:{}", provider, model);
    info!("Creating model client {} ({})", name, base_url);

    let client: Box<dyn FeatureModel> = match provider {
        Provider::OpenAi => Box::new(OpenAiCompatibleClient::new(
            name,
            base_url,
            api_key,
            model.to_string(),
            OutputStyle::JsonSchema,
            settings,
        )?),
        Provider::OpenRouter | Provider::Groq | Provider::Google => {
            Box::new(OpenAiCompatibleClient::new(
                name,
                base_url,
                api_key,
                model.to_string(),
                OutputStyle::FormatInstructions,
                settings,
            )?)
        }
        Provider::Anthropic => Box::new(AnthropicClient::new(
            name,
            base_url,
            api_key,
            model.to_string(),
            settings,
        )?),
    };
    Ok(client)
}

pub(crate) fn build_http_client(settings: &ModelSettings) -> Result<reqwest::Client, ModelError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = settings.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| ModelError::Http(format!("failed to build HTTP client: {}", e)))
}

/// Send a JSON request, retrying transport failures, 429 and 5xx with exponential backoff.
pub(crate) async fn send_with_retry<F>(max_retries: u32, build: F) -> Result<Value, ModelError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_err = ModelError::EmptyResponse;
    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay_ms = 200u64 * (1u64 << (attempt - 1).min(6));
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        let response = match build().send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request attempt {} failed: {}", attempt + 1, e);
                last_err = e.into();
                continue;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ModelError::Api {
                status: status.as_u16(),
                body,
            };
            if status.as_u16() == 429 || status.is_server_error() {
                warn!("Request attempt {} failed: {}", attempt + 1, err);
                last_err = err;
                continue;
            }
            return Err(err);
        }

        return response
            .json::<Value>()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()));
    }
    Err(last_err)
}

/// Parse the span from the first `{` to the last `}` of a model reply.
pub(crate) fn extract_json_object(text: &str) -> Result<Value, ModelError> {
    let start = text.find('{');
    let end = text.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&text[start..=end])
            .map_err(|e| ModelError::Parse(format!("invalid JSON in reply: {}", e))),
        _ => Err(ModelError::Parse("no JSON object in reply".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::PromptRegistry;

    #[test]
    fn providers_parse_case_insensitively() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!("gemini".parse::<Provider>().unwrap(), Provider::Google);
        assert!(matches!(
            "mistral".parse::<Provider>(),
            Err(ModelError::UnknownProvider(ref p)) if p == "mistral"
        ));
    }

    #[test]
    fn model_spec_parses_provider_and_model() {
        let spec: ModelSpec = "anthropic:claude-3-5-sonnet-20240620".parse().unwrap();
        assert_eq!(spec.provider().unwrap(), Provider::Anthropic);
        assert_eq!(spec.name, "claude-3-5-sonnet-20240620");
        assert_eq!(spec.to_string(), "anthropic:claude-3-5-sonnet-20240620");
        assert!("gpt-4o".parse::<ModelSpec>().is_err());
        assert!("openai:".parse::<ModelSpec>().is_err());
    }

    #[test]
    fn openrouter_model_names_keep_their_slash() {
        let spec: ModelSpec = "openrouter:meta-llama/llama-3.1-70b-instruct".parse().unwrap();
        assert_eq!(spec.name, "meta-llama/llama-3.1-70b-instruct");
    }

    #[test]
    fn missing_api_key_is_reported_with_env_var() {
        let settings = ModelSettings::new(PromptRegistry::new().get("basic").unwrap());
        let err = create_model(Provider::Groq, "llama3-70b-8192", None, &settings)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ModelError::MissingApiKey { ref env_var } if env_var == "GROQ_API_KEY"
        ));
    }

    #[test]
    fn create_model_names_client() {
        let settings = ModelSettings::new(PromptRegistry::new().get("basic").unwrap());
        let model = create_model(
            Provider::OpenAi,
            "gpt-4o-mini",
            Some("sk-test".into()),
            &settings,
        )
        .unwrap();
        assert_eq!(model.name(), "openai:gpt-4o-mini");
    }

    #[test]
    fn triangulation_clients_ignore_primary_base_url() {
        let mut settings = ModelSettings::new(PromptRegistry::new().get("basic").unwrap());
        settings.base_url = Some("http://127.0.0.1:8080/v1".into());
        assert_eq!(
            settings.base_url_for(Provider::OpenAi),
            "http://127.0.0.1:8080/v1"
        );

        let secondary = settings.for_triangulation();
        assert_eq!(secondary.base_url, None);
        assert_eq!(secondary.max_retries, settings.max_retries);
        assert_eq!(
            secondary.base_url_for(Provider::Anthropic),
            Provider::Anthropic.default_base_url()
        );

        let client = AnthropicClient::new(
            "anthropic:claude".into(),
            secondary.base_url_for(Provider::Anthropic),
            "key".into(),
            "claude".into(),
            &secondary,
        )
        .unwrap();
        assert_eq!(client.endpoint(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn json_object_is_found_inside_prose() {
        let value = extract_json_object("Result: {\"pace\": \"slow\"} done").unwrap();
        assert_eq!(value["pace"], "slow");
        assert!(extract_json_object("} {").is_err());
        assert!(extract_json_object("{not json}").is_err());
    }
}
