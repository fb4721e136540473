//! Per-run accumulators of feature results.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::descriptor::{CollectionPolicy, FeatureDescriptor, LevelSet};

/// One stored result for one text unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureValue {
    /// Zero-based position in the feature's level set.
    Index(usize),
    /// Label stored verbatim.
    Label(String),
    /// The answer could not be resolved against the level set.
    Missing,
    /// The primary model produced no answer for the unit.
    Error,
}

impl FeatureValue {
    pub const MISSING: &'static str = "MISSING";
    pub const ERROR: &'static str = "ERROR";

    /// True for `Missing` and `Error`.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, FeatureValue::Missing | FeatureValue::Error)
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            FeatureValue::Index(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            FeatureValue::Label(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Index(i) => write!(f, "{}", i),
            FeatureValue::Label(l) => write!(f, "{}", l),
            FeatureValue::Missing => f.write_str(Self::MISSING),
            FeatureValue::Error => f.write_str(Self::ERROR),
        }
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Index(i) => serializer.serialize_u64(*i as u64),
            other => serializer.collect_str(other),
        }
    }
}

/// Live accumulator for a single feature. `results[i]` belongs to text unit `i`.
#[derive(Debug, Clone)]
pub struct FeatureCollector {
    descriptor: FeatureDescriptor,
    results: Vec<FeatureValue>,
}

impl FeatureCollector {
    pub fn new(descriptor: FeatureDescriptor) -> Self {
        Self {
            descriptor,
            results: Vec::new(),
        }
    }

    pub fn descriptor(&self) -> &FeatureDescriptor {
        &self.descriptor
    }

    pub fn identity(&self) -> &str {
        self.descriptor.identity()
    }

    pub fn display_label(&self) -> &str {
        self.descriptor.display_label()
    }

    pub fn levels(&self) -> &LevelSet {
        self.descriptor.levels()
    }

    pub fn colors(&self) -> &BTreeMap<String, String> {
        self.descriptor.colors()
    }

    pub fn policy(&self) -> CollectionPolicy {
        self.descriptor.policy()
    }

    pub fn results(&self) -> &[FeatureValue] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn push(&mut self, value: FeatureValue) {
        self.results.push(value);
    }

    /// Normalize a single raw answer and append it.
    pub fn add_answer(&mut self, raw: &str) {
        let value = crate::aggregation::normalize(&self.descriptor, raw);
        self.results.push(value);
    }

    /// Drop results from a previous run.
    pub fn clear_results(&mut self) {
        self.results.clear();
    }

    // Graph metadata

    /// Tick positions for the y axis of an ordinal graph.
    pub fn y_ticks(&self) -> Vec<usize> {
        (0..self.levels().len()).collect()
    }

    pub fn y_tick_labels(&self) -> Vec<&str> {
        self.levels().iter().collect()
    }

    pub fn y_axis_label(&self) -> &str {
        self.display_label()
    }

    /// Level label a stored value stands for, if any.
    pub fn label_for<'a>(&'a self, value: &'a FeatureValue) -> Option<&'a str> {
        match value {
            FeatureValue::Index(i) => self.levels().get(*i),
            FeatureValue::Label(l) => Some(l.as_str()),
            FeatureValue::Missing | FeatureValue::Error => None,
        }
    }

    /// Color for a stored value: keyed by index for ordinal features, by label otherwise.
    pub fn color_for(&self, value: &FeatureValue) -> Option<&str> {
        let key = match value {
            FeatureValue::Index(i) => i.to_string(),
            FeatureValue::Label(l) => l.clone(),
            _ => return None,
        };
        self.colors().get(&key).map(String::as_str)
    }
}
