//! Prompt registry for feature extraction calls
//!
//! Every prompt has two renderings: one for providers with native structured
//! output (tool calls or JSON schema response formats), and one that embeds the
//! schema as format instructions for providers without it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{FeatureExtractorError, Result};

pub const DEFAULT_PROMPT: &str = "detailed";

/// A named prompt template with `{{input}}` and optional `{{format_instructions}}` slots
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Stable identifier used in configuration
    pub id: String,
    /// Short one-liner description
    pub one_liner: String,
    /// Template used when the provider enforces the schema itself
    pub template: String,
    /// Template used when the schema travels inside the prompt
    pub instructed_template: String,
}

impl Prompt {
    pub fn new(
        id: impl Into<String>,
        one_liner: impl Into<String>,
        template: impl Into<String>,
        instructed_template: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            one_liner: one_liner.into(),
            template: template.into(),
            instructed_template: instructed_template.into(),
        }
    }

    /// Fill in the unit text, plus format instructions when given.
    pub fn render(&self, input: &str, format_instructions: Option<&str>) -> String {
        match format_instructions {
            Some(instructions) => self
                .instructed_template
                .replace("{{format_instructions}}", instructions)
                .replace("{{input}}", input),
            None => self.template.replace("{{input}}", input),
        }
    }
}

/// Registry of all known prompts
#[derive(Debug, Default)]
pub struct PromptRegistry {
    prompts: HashMap<String, Arc<Prompt>>,
}

impl PromptRegistry {
    /// Create new registry with core prompts
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_core_prompts();
        registry
    }

    pub fn register(&mut self, prompt: Prompt) {
        self.prompts.insert(prompt.id.clone(), Arc::new(prompt));
    }

    pub fn get(&self, id: &str) -> Option<Arc<Prompt>> {
        self.prompts.get(id).cloned()
    }

    /// Like `get`, but an unknown id is a configuration error.
    pub fn resolve(&self, id: &str) -> Result<Arc<Prompt>> {
        self.get(id).ok_or_else(|| {
            let mut known: Vec<&str> = self.prompts.keys().map(String::as_str).collect();
            known.sort_unstable();
            FeatureExtractorError::config(format!(
                "unknown prompt '{}' (available: {})",
                id,
                known.join(", ")
            ))
        })
    }

    pub fn list(&self) -> Vec<Arc<Prompt>> {
        let mut prompts: Vec<_> = self.prompts.values().cloned().collect();
        prompts.sort_by(|a, b| a.id.cmp(&b.id));
        prompts
    }

    fn register_core_prompts(&mut self) {
        self.register(Prompt::new(
            "basic",
            "Minimal extraction request",
            BASIC,
            format!("{}{}", BASIC, FORMAT_BLOCK),
        ));
        self.register(Prompt::new(
            "detailed",
            "Literary analyst persona with accuracy rules",
            DETAILED_TOOLING,
            DETAILED_INSTRUCTED,
        ));
        self.register(Prompt::new(
            "aesthemos",
            "Study participant answering the AESTHEMOS survey",
            format!("{}{}", AESTHEMOS_PREAMBLE, AESTHEMOS_PASSAGE),
            format!("{}{}{}", AESTHEMOS_PREAMBLE, FORMAT_BLOCK, AESTHEMOS_PASSAGE),
        ));
    }
}

const FORMAT_BLOCK: &str = "\nYou must adhere to the following format:\n-----\n{{format_instructions}}\n-----\n";

const BASIC: &str = "Extract features from the following creative writing:\n-----\n{{input}}\n-----\n";

const DETAILED_TOOLING: &str = r#"You are an expert literary analyst. Your task is to extract specific features from the following piece of creative writing. Analyze the text carefully and provide your assessment for each requested feature.

Remember:
1. Be as accurate and objective as possible in your analysis.
2. For subjective features, base your assessment on textual evidence and common literary interpretation techniques.
3. Provide only the requested structured output without additional explanations.

Creative writing sample with specified output format:
-----
{{input}}
-----
"#;

const DETAILED_INSTRUCTED: &str = r#"You are an expert literary analyst. Your task is to extract specific features from the following piece of creative writing. Analyze the text carefully and provide your assessment for each requested feature.

Remember:
1. Be as accurate and objective as possible in your analysis.
2. For subjective features, base your assessment on textual evidence and common literary interpretation techniques.
3. Provide only the requested structured output without additional explanations.

Please provide your structured analysis based on the given schema.
-----
{{format_instructions}}
-----

Creative writing sample:
-----
{{input}}
-----
"#;

const AESTHEMOS_PREAMBLE: &str = r#"Context: You will act in the role of a participant in this study.
Thank you for taking part in this study. You will be reading several passages of text and then responding to a survey about your emotional reactions to each passage. Please follow these instructions carefully:

Read the provided passage of text thoroughly. Take your time to absorb the content and pay attention to your emotional reactions as you read.
After reading each passage, you will complete a survey based on the AESTHEMOS (Aesthetic Emotions) scale. This survey measures seven different dimensions of emotional responses to aesthetic experiences.
For each dimension, you will be presented with a question. Rate your response using one of these options:
- Not at all
- Slightly
- Moderately
- Strongly
- Very strongly
The survey will cover the following dimensions:
a) Negative Emotions: "To what extent did this passage make you feel uncomfortable or distressed?"
b) Prototypical Aesthetic Emotions: "How strongly did you experience a sense of beauty or being moved by this passage?"
c) Epistemic Emotions: "How much did this passage spark your curiosity or make you feel intellectually challenged?"
d) Animation: "Did this passage energize you or make you feel more lively?"
e) Nostalgia/Relaxation: "Did the passage evoke feelings of nostalgia or help you feel relaxed?"
f) Sadness: "To what degree did this passage make you feel melancholic or sad?"
g) Amusement: "How amused or entertained did you feel while reading this passage?"
Repeat this process for each passage of text provided.
Please answer as honestly as possible. There are no right or wrong answers; we are interested in your genuine emotional responses to the text.

Thank you for your participation in this study. Your responses will contribute to our understanding of emotional responses to written text.
"#;

const AESTHEMOS_PASSAGE: &str = "\nFollowing is the passage to which you will respond:\n-----\n{{input}}\n-----\n";
