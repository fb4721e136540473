//! Extraction driver: walks the text units of a manuscript, asks the models,
//! and appends one reconciled value per feature per unit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::aggregation::reconcile;
use crate::clients::FeatureModel;
use crate::error::{FeatureExtractorError, Result};
use crate::features::{FeatureCollector, FeatureValue};
use crate::schemas::{FeatureSchema, StructuredAnswer};
use crate::text::{TextStatistics, merge_short_units, split_into_units};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Each paragraph is a unit; results are checkpointed after every section.
    #[default]
    Paragraph,
    /// Each section is a unit.
    Section,
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::Paragraph => f.write_str("paragraph"),
            ExtractionMode::Section => f.write_str("section"),
        }
    }
}

impl FromStr for ExtractionMode {
    type Err = FeatureExtractorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "paragraph" => Ok(ExtractionMode::Paragraph),
            "section" => Ok(ExtractionMode::Section),
            other => Err(FeatureExtractorError::config(format!(
                "Invalid mode: {}. Must be 'paragraph' or 'section'",
                other
            ))),
        }
    }
}

/// Minimum word counts used when merging short units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSettings {
    pub paragraph_min_words: usize,
    pub section_min_words: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            paragraph_min_words: 8,
            section_min_words: 50,
        }
    }
}

/// Snapshot handed to a [`SectionHook`] after a section finishes in paragraph mode.
#[derive(Debug)]
pub struct RunProgress<'a> {
    /// Zero-based index of the completed section.
    pub section_index: usize,
    pub section_count: usize,
    pub collectors: &'a [FeatureCollector],
    pub text_units: &'a [String],
    pub text_metrics: &'a [Option<TextStatistics>],
}

/// Checkpoint called between sections in paragraph mode. Implementations may
/// persist intermediate results and block until the user confirms.
#[async_trait]
pub trait SectionHook: Send {
    async fn section_complete(&mut self, _progress: &RunProgress<'_>) -> Result<()> {
        Ok(())
    }
}

/// Hook that does nothing.
pub struct NoopHook;

impl SectionHook for NoopHook {}

/// Everything a run produced, indexed by unit.
#[derive(Debug)]
pub struct ExtractionReport {
    pub collectors: Vec<FeatureCollector>,
    pub text_units: Vec<String>,
    pub text_metrics: Vec<Option<TextStatistics>>,
}

pub struct FeatureExtractor {
    primary: Box<dyn FeatureModel>,
    triangulation: Vec<Box<dyn FeatureModel>>,
    schema: FeatureSchema,
    settings: ExtractionSettings,
}

impl FeatureExtractor {
    pub fn new(primary: Box<dyn FeatureModel>, schema: FeatureSchema) -> Self {
        Self {
            primary,
            triangulation: Vec::new(),
            schema,
            settings: ExtractionSettings::default(),
        }
    }

    pub fn with_triangulation(mut self, models: Vec<Box<dyn FeatureModel>>) -> Self {
        self.triangulation = models;
        self
    }

    pub fn with_settings(mut self, settings: ExtractionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Run extraction over `sections`. Collector results from earlier runs are discarded.
    pub async fn extract(
        &self,
        sections: &[String],
        mode: ExtractionMode,
        mut collectors: Vec<FeatureCollector>,
        hook: &mut dyn SectionHook,
    ) -> ExtractionReport {
        for collector in collectors.iter_mut() {
            collector.clear_results();
        }
        info!(
            "Starting {} mode extraction with {} (triangulation: {})",
            mode,
            self.primary.name(),
            self.triangulation.len()
        );

        let report = match mode {
            ExtractionMode::Paragraph => self.paragraph_mode(sections, collectors, hook).await,
            ExtractionMode::Section => self.section_mode(sections, collectors).await,
        };

        debug!("Number of text units processed: {}", report.text_units.len());
        debug!(
            "Number of results in each feature collector: {:?}",
            report.collectors.iter().map(|c| c.len()).collect::<Vec<_>>()
        );
        report
    }

    async fn paragraph_mode(
        &self,
        sections: &[String],
        mut collectors: Vec<FeatureCollector>,
        hook: &mut dyn SectionHook,
    ) -> ExtractionReport {
        let mut text_units = Vec::new();
        let mut text_metrics = Vec::new();

        for (section_index, section) in sections.iter().enumerate() {
            let paragraphs =
                merge_short_units(&split_into_units(section), self.settings.paragraph_min_words);
            info!(
                "Processing section {} of {} ({} paragraphs)",
                section_index + 1,
                sections.len(),
                paragraphs.len()
            );
            for paragraph in paragraphs {
                let unit = text_units.len() + 1;
                self.process_unit(&paragraph, &mut collectors)
                    .instrument(info_span!("unit", unit))
                    .await;
                text_metrics.push(TextStatistics::compute(&paragraph));
                text_units.push(paragraph);
            }

            let progress = RunProgress {
                section_index,
                section_count: sections.len(),
                collectors: &collectors,
                text_units: &text_units,
                text_metrics: &text_metrics,
            };
            if let Err(e) = hook.section_complete(&progress).await {
                error!("Section checkpoint failed: {}", e);
            }
        }

        ExtractionReport {
            collectors,
            text_units,
            text_metrics,
        }
    }

    async fn section_mode(
        &self,
        sections: &[String],
        mut collectors: Vec<FeatureCollector>,
    ) -> ExtractionReport {
        let mut text_units = Vec::new();
        let mut text_metrics = Vec::new();

        for section in merge_short_units(sections, self.settings.section_min_words) {
            let unit = text_units.len() + 1;
            info!("Processing section number {}", unit);
            self.process_unit(&section, &mut collectors)
                .instrument(info_span!("unit", unit))
                .await;
            text_metrics.push(TextStatistics::compute(&section));
            text_units.push(section);
        }

        ExtractionReport {
            collectors,
            text_units,
            text_metrics,
        }
    }

    /// Classify one unit and append exactly one value to every collector.
    async fn process_unit(&self, text: &str, collectors: &mut [FeatureCollector]) {
        let primary = match self.primary.invoke(text, &self.schema).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(model = self.primary.name(), "Primary model failed: {}", e);
                for collector in collectors.iter_mut() {
                    collector.push(FeatureValue::Error);
                }
                return;
            }
        };
        debug!("Primary answer: {:?}", primary);

        let secondaries = self.triangulate(text).await;

        for collector in collectors.iter_mut() {
            let identity = collector.identity().to_string();
            let secondary: Vec<&str> = secondaries
                .iter()
                .filter_map(|answer| answer.get(&identity))
                .collect();
            let value = reconcile(collector.descriptor(), primary.get(&identity), &secondary);
            if value == FeatureValue::Missing {
                warn!(
                    feature = %identity,
                    "No usable answer (primary answered {:?})",
                    primary.get(&identity)
                );
            }
            debug!(feature = %identity, "Adding result {}", value);
            collector.push(value);
        }
    }

    /// Answers from every triangulation model that responded.
    async fn triangulate(&self, text: &str) -> Vec<StructuredAnswer> {
        let mut answers = Vec::with_capacity(self.triangulation.len());
        for model in &self.triangulation {
            match model.invoke(text, &self.schema).await {
                Ok(answer) => {
                    debug!(model = model.name(), "Triangulation answer: {:?}", answer);
                    answers.push(answer);
                }
                Err(e) => warn!(model = model.name(), "Triangulation model failed: {}", e),
            }
        }
        answers
    }
}
