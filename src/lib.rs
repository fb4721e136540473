pub mod aggregation;
pub mod clients;
pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod features;
pub mod prompts;
pub mod schemas;
pub mod text;

pub use config::Config;
pub use error::{FeatureExtractorError, Result};
pub use extraction::{ExtractionMode, ExtractionReport, FeatureExtractor, SectionHook};
pub use features::{FeatureCollector, FeatureDescriptor, FeatureValue, build_feature_set};
pub use schemas::{FeatureSchema, StructuredAnswer};
