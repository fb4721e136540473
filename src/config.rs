use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::clients::{ModelSettings, ModelSpec, Provider};
use crate::error::{FeatureExtractorError, Result};
use crate::export::DEFAULT_CSV_FILE;
use crate::extraction::{ExtractionMode, ExtractionSettings};
use crate::features::{CollectionPolicy, FeatureDescriptor, build_feature_set};
use crate::prompts::{DEFAULT_PROMPT, PromptRegistry};

pub const DEFAULT_CONFIG_FILE: &str = "feature_config.toml";

/// Main configuration structure loaded from feature_config.toml and environment variables
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub features: Vec<FeatureConfig>,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub mode: ExtractionMode,
    pub paragraph_min_words: usize,
    pub section_min_words: usize,
    /// Wait for Enter after each section in paragraph mode
    pub pause_between_sections: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let settings = ExtractionSettings::default();
        Self {
            mode: ExtractionMode::Paragraph,
            paragraph_min_words: settings.paragraph_min_words,
            section_min_words: settings.section_min_words,
            pause_between_sections: true,
        }
    }
}

/// Primary model, prompt and triangulation models
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: String,
    pub name: String,
    pub prompt: String,
    pub temperature: f32,
    pub request_timeout_secs: Option<u64>,
    pub base_url: Option<String>,
    pub max_retries: u32,
    pub triangulation: Vec<ModelSpec>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            name: "gpt-4o-mini".to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            temperature: 0.0,
            request_timeout_secs: None,
            base_url: None,
            max_retries: 2,
            triangulation: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub csv_file: PathBuf,
    pub save: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_file: PathBuf::from(DEFAULT_CSV_FILE),
            save: false,
        }
    }
}

/// One `[[features]]` entry. Without `customizations` the name must be a built-in feature.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeatureConfig {
    pub name: String,
    #[serde(default = "default_policy")]
    pub result_collection_mode: CollectionPolicy,
    #[serde(default)]
    pub customizations: Option<FeatureCustomizations>,
}

fn default_policy() -> CollectionPolicy {
    CollectionPolicy::OrdinalIndex
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeatureCustomizations {
    #[serde(default)]
    pub levels: Vec<String>,
    #[serde(default)]
    pub color_map: BTreeMap<String, String>,
    pub display_label: Option<String>,
    pub description: Option<String>,
}

impl FeatureConfig {
    pub fn to_descriptor(&self) -> Result<FeatureDescriptor> {
        match &self.customizations {
            None => Ok(FeatureDescriptor::builtin(
                self.name.trim(),
                self.result_collection_mode,
            )),
            Some(custom) => {
                let mut descriptor = FeatureDescriptor::custom(
                    self.name.trim(),
                    custom.levels.iter().cloned(),
                    custom.color_map.clone(),
                    self.result_collection_mode,
                )?;
                if let Some(label) = &custom.display_label {
                    descriptor = descriptor.with_display_label(label.clone());
                }
                if let Some(description) = &custom.description {
                    descriptor = descriptor.with_description(description.clone());
                }
                Ok(descriptor)
            }
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub log_level: String,
    pub model_provider: Option<String>,
    pub model_name: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            openrouter_api_key: None,
            groq_api_key: None,
            google_api_key: None,
            log_level: "writing_feature_extractor=info".to_string(),
            model_provider: None,
            model_name: None,
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            openrouter_api_key: std::env::var("OPENROUTER_API_KEY").ok(),
            groq_api_key: std::env::var("GROQ_API_KEY").ok(),
            google_api_key: std::env::var("GOOGLE_API_KEY").ok(),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "writing_feature_extractor=info".to_string()),
            model_provider: std::env::var("WFE_MODEL_PROVIDER").ok(),
            model_name: std::env::var("WFE_MODEL_NAME").ok(),
        }
    }

    pub fn api_key_for(&self, provider: Provider) -> Option<String> {
        match provider {
            Provider::OpenAi => self.openai_api_key.clone(),
            Provider::Anthropic => self.anthropic_api_key.clone(),
            Provider::OpenRouter => self.openrouter_api_key.clone(),
            Provider::Groq => self.groq_api_key.clone(),
            Provider::Google => self.google_api_key.clone(),
        }
    }
}

/// Load `.env` from WFE_ENV_FILE if set, otherwise ./.env. A missing file is ignored.
pub fn load_env_file() {
    if let Ok(env_path) = std::env::var("WFE_ENV_FILE") {
        let _ = dotenvy::from_path(env_path);
    } else {
        let _ = dotenvy::from_path(".env");
    }
}

impl Config {
    /// Load and validate configuration from a TOML file and environment variables.
    /// The path is `path`, else WFE_CONFIG, else "feature_config.toml".
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::load_unvalidated(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`] but leaves validation to the caller, so command
    /// line overrides can be applied first.
    pub fn load_unvalidated(path: Option<&Path>) -> Result<Self> {
        load_env_file();

        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var("WFE_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
        };

        let mut config = Self::from_file(&config_path)?;
        config.runtime = RuntimeConfig::load_from_env();
        config.apply_runtime_overrides();
        Ok(config)
    }

    /// Read and parse one file. The environment is not consulted and nothing is validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FeatureExtractorError::config(format!(
                "cannot read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            FeatureExtractorError::config(format!("invalid TOML in {}: {}", path.display(), e))
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration text without touching the environment.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Env-first: WFE_MODEL_PROVIDER and WFE_MODEL_NAME replace the file's model.
    pub fn apply_runtime_overrides(&mut self) {
        if let Some(provider) = &self.runtime.model_provider {
            tracing::debug!("WFE_MODEL_PROVIDER env override applied");
            self.model.provider = provider.clone();
        }
        if let Some(name) = &self.runtime.model_name {
            tracing::debug!("WFE_MODEL_NAME env override applied");
            self.model.name = name.clone();
        }
    }

    /// Validate the configuration. Builds the feature set once so every
    /// feature error surfaces before any model is called.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.paragraph_min_words == 0 || self.extraction.section_min_words == 0 {
            return Err(FeatureExtractorError::config(
                "minimum word counts must be at least 1",
            ));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(FeatureExtractorError::config(format!(
                "temperature {} must be between 0.0 and 2.0",
                self.model.temperature
            )));
        }
        self.primary_provider()?;
        for spec in &self.model.triangulation {
            spec.provider()
                .map_err(|e| FeatureExtractorError::config(format!("triangulation: {}", e)))?;
        }
        PromptRegistry::new().resolve(&self.model.prompt)?;
        build_feature_set(&self.feature_descriptors()?)?;
        Ok(())
    }

    pub fn primary_provider(&self) -> Result<Provider> {
        self.model
            .provider
            .parse()
            .map_err(|e| FeatureExtractorError::config(format!("model: {}", e)))
    }

    pub fn feature_descriptors(&self) -> Result<Vec<FeatureDescriptor>> {
        if self.features.is_empty() {
            return Err(FeatureExtractorError::NoFeatures);
        }
        self.features.iter().map(FeatureConfig::to_descriptor).collect()
    }

    pub fn extraction_settings(&self) -> ExtractionSettings {
        ExtractionSettings {
            paragraph_min_words: self.extraction.paragraph_min_words,
            section_min_words: self.extraction.section_min_words,
        }
    }

    pub fn model_settings(&self) -> Result<ModelSettings> {
        let prompt = PromptRegistry::new().resolve(&self.model.prompt)?;
        Ok(ModelSettings {
            prompt,
            temperature: self.model.temperature,
            request_timeout: self.model.request_timeout_secs.map(Duration::from_secs),
            base_url: self.model.base_url.clone(),
            max_retries: self.model.max_retries,
        })
    }
}
