//! Builds the runtime feature set: one collector per descriptor plus the
//! structured-output schema shared by every model call of a run.

use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use super::builtin;
use super::collector::FeatureCollector;
use super::descriptor::{FeatureDescriptor, FeatureOrigin, LevelSet};
use crate::error::{FeatureExtractorError, Result};
use crate::schemas::FeatureSchema;

/// Resolve every descriptor, then build collectors and the schema.
///
/// Fails fast: no collectors or schema are returned if any descriptor is invalid.
pub fn build_feature_set(
    descriptors: &[FeatureDescriptor],
) -> Result<(Vec<FeatureCollector>, FeatureSchema)> {
    if descriptors.is_empty() {
        return Err(FeatureExtractorError::NoFeatures);
    }

    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let feature = resolve(descriptor)?;
        if !seen.insert(feature.identity().to_string()) {
            return Err(FeatureExtractorError::DuplicateFeature {
                identity: feature.identity().to_string(),
            });
        }
        info!(
            "Adding feature '{}' ({}, {} levels)",
            feature.identity(),
            feature.policy(),
            feature.levels().len()
        );
        resolved.push(feature);
    }

    let schema = FeatureSchema::from_descriptors(&resolved);
    debug!("Built schema with fields {:?}", schema.field_names());
    let collectors = resolved.into_iter().map(FeatureCollector::new).collect();
    Ok((collectors, schema))
}

/// Fill in the level table, identity and description of one descriptor.
pub fn resolve(descriptor: &FeatureDescriptor) -> Result<FeatureDescriptor> {
    match descriptor.origin() {
        FeatureOrigin::Builtin => {
            let entry = builtin::lookup(descriptor.identity()).ok_or_else(|| {
                FeatureExtractorError::UnknownFeature {
                    name: descriptor.identity().to_string(),
                }
            })?;
            let levels = LevelSet::new(entry.identity, entry.levels.iter().copied())?;
            let colors = if descriptor.colors().is_empty() {
                entry
                    .colors
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            } else {
                descriptor.colors().clone()
            };
            // A builtin reference carries its key as the label unless one was configured.
            let display_label = if descriptor.display_label() == descriptor.identity() {
                entry.display_label
            } else {
                descriptor.display_label()
            };
            let description = descriptor
                .configured_description()
                .unwrap_or(entry.description);
            Ok(FeatureDescriptor::resolved(
                entry.identity,
                display_label,
                description,
                levels,
                colors,
                descriptor.policy(),
                FeatureOrigin::Builtin,
            ))
        }
        FeatureOrigin::Custom => {
            if descriptor.levels().is_empty() {
                return Err(FeatureExtractorError::MissingLevels {
                    name: descriptor.display_label().to_string(),
                });
            }
            Ok(FeatureDescriptor::resolved(
                descriptor.identity(),
                descriptor.display_label(),
                &descriptor.description(),
                descriptor.levels().clone(),
                descriptor.colors().clone(),
                descriptor.policy(),
                FeatureOrigin::Custom,
            ))
        }
    }
}

/// Color map of every collector keyed by display label, as exported alongside results.
pub fn color_maps(collectors: &[FeatureCollector]) -> BTreeMap<String, BTreeMap<String, String>> {
    collectors
        .iter()
        .map(|c| (c.display_label().to_string(), c.colors().clone()))
        .collect()
}
