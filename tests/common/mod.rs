#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use writing_feature_extractor::clients::{FeatureModel, ModelError};
use writing_feature_extractor::{FeatureSchema, StructuredAnswer};

/// Model that replays a fixed script of answers, one per call.
pub struct ScriptedModel {
    name: String,
    script: Mutex<VecDeque<Result<StructuredAnswer, ModelError>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedModel {
    pub fn new(name: &str, script: Vec<Result<StructuredAnswer, ModelError>>) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(script.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter, readable after the model is boxed.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl FeatureModel for ScriptedModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        _text: &str,
        _schema: &FeatureSchema,
    ) -> Result<StructuredAnswer, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ModelError::EmptyResponse))
    }
}

/// Model that gives the same answer every time.
pub struct FixedModel {
    answer: StructuredAnswer,
}

impl FixedModel {
    pub fn new(answer: StructuredAnswer) -> Self {
        Self { answer }
    }
}

#[async_trait]
impl FeatureModel for FixedModel {
    fn name(&self) -> &str {
        "fixed:model"
    }

    async fn invoke(
        &self,
        _text: &str,
        _schema: &FeatureSchema,
    ) -> Result<StructuredAnswer, ModelError> {
        Ok(self.answer.clone())
    }
}

pub fn answer(pairs: &[(&str, &str)]) -> StructuredAnswer {
    pairs
        .iter()
        .fold(StructuredAnswer::new(), |a, (k, v)| a.with(*k, *v))
}

pub fn api_failure() -> Result<StructuredAnswer, ModelError> {
    Err(ModelError::Api {
        status: 500,
        body: "upstream failure".into(),
    })
}
