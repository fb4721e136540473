//! Feature descriptors: the immutable description of one configured writing feature.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{FeatureExtractorError, Result};

/// How answers for a feature are stored in its collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionPolicy {
    /// Store the zero-based position of the chosen level.
    #[serde(
        rename = "ordinal_index",
        alias = "ORDINAL_INDEX",
        alias = "NUMBER_REPRESENTATION",
        alias = "number_representation"
    )]
    OrdinalIndex,
    /// Store the chosen label verbatim (unordered categorical features).
    #[serde(
        rename = "raw_label",
        alias = "RAW_LABEL",
        alias = "FIELD_NAME",
        alias = "field_name"
    )]
    RawLabel,
}

impl fmt::Display for CollectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionPolicy::OrdinalIndex => write!(f, "ordinal_index"),
            CollectionPolicy::RawLabel => write!(f, "raw_label"),
        }
    }
}

/// Where a descriptor's levels come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureOrigin {
    /// Levels come from the built-in feature table.
    Builtin,
    /// Levels come from configuration.
    Custom,
}

/// Ordered, duplicate-free set of level labels. Index 0 is the baseline level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelSet {
    levels: Vec<String>,
}

impl LevelSet {
    /// Build a level set for `feature`, rejecting blank and repeated labels.
    pub fn new<I, S>(feature: &str, levels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collected: Vec<String> = Vec::new();
        for level in levels {
            let level = level.into();
            if level.trim().is_empty() {
                return Err(FeatureExtractorError::config(format!(
                    "feature '{}' has a blank level",
                    feature
                )));
            }
            if collected.contains(&level) {
                return Err(FeatureExtractorError::DuplicateLevel {
                    feature: feature.to_string(),
                    level,
                });
            }
            collected.push(level);
        }
        Ok(Self { levels: collected })
    }

    /// Exact-match position of `label`.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.levels.iter().position(|l| l == label)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.levels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.levels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.levels
    }
}

/// Immutable description of one writing feature.
///
/// Descriptors produced by configuration may still be unresolved: a built-in
/// descriptor carries only its configuration key and policy until the registry
/// fills in the level table, identity and description.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDescriptor {
    identity: String,
    display_label: String,
    description: Option<String>,
    levels: LevelSet,
    colors: BTreeMap<String, String>,
    policy: CollectionPolicy,
    origin: FeatureOrigin,
}

impl FeatureDescriptor {
    /// Reference a built-in feature by key (`EMOTIONAL_INTENSITY`) or identity (`emotional_intensity`).
    pub fn builtin(name: impl Into<String>, policy: CollectionPolicy) -> Self {
        let name = name.into();
        Self {
            identity: name.clone(),
            display_label: name,
            description: None,
            levels: LevelSet::default(),
            colors: BTreeMap::new(),
            policy,
            origin: FeatureOrigin::Builtin,
        }
    }

    /// A configured feature. The identity is derived from `name`; levels may be
    /// empty here, in which case building the feature set fails.
    pub fn custom<I, S>(
        name: impl Into<String>,
        levels: I,
        colors: BTreeMap<String, String>,
        policy: CollectionPolicy,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let levels = LevelSet::new(&name, levels)?;
        Ok(Self {
            identity: identity_from_name(&name),
            display_label: name,
            description: None,
            levels,
            colors,
            policy,
            origin: FeatureOrigin::Custom,
        })
    }

    pub fn with_display_label(mut self, label: impl Into<String>) -> Self {
        self.display_label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_colors(mut self, colors: BTreeMap<String, String>) -> Self {
        self.colors = colors;
        self
    }

    /// Schema field name and export key.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn display_label(&self) -> &str {
        &self.display_label
    }

    /// Field documentation handed to the model.
    pub fn description(&self) -> String {
        self.description.clone().unwrap_or_else(|| {
            format!("Level of {} in the text.", self.display_label.to_lowercase())
        })
    }

    /// Description set by configuration, without the generated fallback.
    pub(crate) fn configured_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn levels(&self) -> &LevelSet {
        &self.levels
    }

    pub fn colors(&self) -> &BTreeMap<String, String> {
        &self.colors
    }

    pub fn policy(&self) -> CollectionPolicy {
        self.policy
    }

    pub fn origin(&self) -> FeatureOrigin {
        self.origin
    }

    /// Fully resolved descriptor with its final level table.
    pub(crate) fn resolved(
        identity: &str,
        display_label: &str,
        description: &str,
        levels: LevelSet,
        colors: BTreeMap<String, String>,
        policy: CollectionPolicy,
        origin: FeatureOrigin,
    ) -> Self {
        Self {
            identity: identity.to_string(),
            display_label: display_label.to_string(),
            description: Some(description.to_string()),
            levels,
            colors,
            policy,
            origin,
        }
    }
}

/// "Custom Feature" -> "custom_feature"
pub fn identity_from_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_descriptor_derives_identity_and_description() {
        let feature = FeatureDescriptor::custom(
            "Test Feature",
            ["low", "medium", "high"],
            BTreeMap::new(),
            CollectionPolicy::OrdinalIndex,
        )
        .unwrap();

        assert_eq!(feature.identity(), "test_feature");
        assert_eq!(feature.display_label(), "Test Feature");
        assert_eq!(feature.description(), "Level of test feature in the text.");
        assert_eq!(feature.origin(), FeatureOrigin::Custom);
    }

    #[test]
    fn level_set_rejects_duplicates() {
        let err = LevelSet::new("Tension", ["low", "high", "low"]).unwrap_err();
        assert!(matches!(
            err,
            FeatureExtractorError::DuplicateLevel { ref level, .. } if level == "low"
        ));
    }

    #[test]
    fn level_set_keeps_insertion_order() {
        let levels = LevelSet::new("Tension", ["none", "low", "medium", "high"]).unwrap();
        assert_eq!(levels.position("none"), Some(0));
        assert_eq!(levels.position("high"), Some(3));
        assert_eq!(levels.position("High"), None);
        assert_eq!(levels.get(2), Some("medium"));
    }

    #[test]
    fn policy_accepts_legacy_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: CollectionPolicy,
        }
        let w: Wrapper = toml::from_str("mode = \"NUMBER_REPRESENTATION\"").unwrap();
        assert_eq!(w.mode, CollectionPolicy::OrdinalIndex);
        let w: Wrapper = toml::from_str("mode = \"FIELD_NAME\"").unwrap();
        assert_eq!(w.mode, CollectionPolicy::RawLabel);
        let w: Wrapper = toml::from_str("mode = \"raw_label\"").unwrap();
        assert_eq!(w.mode, CollectionPolicy::RawLabel);
    }
}
