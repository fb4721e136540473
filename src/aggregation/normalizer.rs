use crate::features::{CollectionPolicy, FeatureDescriptor, FeatureValue};

/// Convert one raw answer into the feature's stored representation.
///
/// Ordinal features need an exact match in the level set; anything else is `Missing`.
pub fn normalize(feature: &FeatureDescriptor, raw_answer: &str) -> FeatureValue {
    match feature.policy() {
        CollectionPolicy::OrdinalIndex => feature
            .levels()
            .position(raw_answer)
            .map(FeatureValue::Index)
            .unwrap_or(FeatureValue::Missing),
        CollectionPolicy::RawLabel => FeatureValue::Label(raw_answer.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::builtin::BUILTIN_FEATURES;
    use crate::features::registry::resolve;
    use std::collections::BTreeMap;

    #[test]
    fn every_builtin_level_maps_to_its_position() {
        for entry in BUILTIN_FEATURES {
            let descriptor = resolve(&FeatureDescriptor::builtin(
                entry.key,
                CollectionPolicy::OrdinalIndex,
            ))
            .unwrap();
            for (i, level) in descriptor.levels().iter().enumerate() {
                assert_eq!(normalize(&descriptor, level), FeatureValue::Index(i));
            }
        }
    }

    #[test]
    fn unmatched_ordinal_answer_is_missing() {
        let descriptor = FeatureDescriptor::custom(
            "Tension",
            ["none", "low", "medium", "high"],
            BTreeMap::new(),
            CollectionPolicy::OrdinalIndex,
        )
        .unwrap();
        assert_eq!(normalize(&descriptor, "High"), FeatureValue::Missing);
        assert_eq!(normalize(&descriptor, "extreme"), FeatureValue::Missing);
        assert_eq!(normalize(&descriptor, ""), FeatureValue::Missing);
    }

    #[test]
    fn raw_label_passes_through() {
        let descriptor = FeatureDescriptor::custom(
            "Mood",
            ["positive", "sad"],
            BTreeMap::new(),
            CollectionPolicy::RawLabel,
        )
        .unwrap();
        assert_eq!(
            normalize(&descriptor, "wistful"),
            FeatureValue::Label("wistful".into())
        );
    }
}
