use async_trait::async_trait;
use thiserror::Error;

use crate::schemas::{FeatureSchema, StructuredAnswer};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("missing API key: set {env_var}")]
    MissingApiKey { env_var: String },
    #[error("http error: {0}")]
    Http(String),
    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("model returned no structured answer")]
    EmptyResponse,
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        ModelError::Http(err.to_string())
    }
}

/// A model that classifies one text unit against the run's schema.
#[async_trait]
pub trait FeatureModel: Send + Sync {
    /// `provider:model`, used in logs.
    fn name(&self) -> &str;

    async fn invoke(
        &self,
        text: &str,
        schema: &FeatureSchema,
    ) -> Result<StructuredAnswer, ModelError>;
}
