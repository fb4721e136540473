mod common;

use common::{FixedModel, ScriptedModel, answer, api_failure};
use writing_feature_extractor::aggregation::reconcile;
use writing_feature_extractor::clients::FeatureModel;
use writing_feature_extractor::extraction::{ExtractionSettings, NoopHook};
use writing_feature_extractor::features::CollectionPolicy;
use writing_feature_extractor::{
    ExtractionMode, FeatureDescriptor, FeatureExtractor, FeatureValue, build_feature_set,
};

fn vote(pairs: &[(&str, &str)]) -> Box<dyn FeatureModel> {
    Box::new(FixedModel::new(answer(pairs)))
}

#[tokio::test]
async fn panel_of_models_is_reconciled_per_feature() {
    let (collectors, schema) = build_feature_set(&[
        FeatureDescriptor::builtin("AESTHEMOS_BEAUTY", CollectionPolicy::OrdinalIndex),
        FeatureDescriptor::builtin("MOOD", CollectionPolicy::RawLabel),
    ])
    .unwrap();

    let primary = vote(&[("beauty", "Slightly"), ("mood", "sad")]);
    let panel = vec![
        vote(&[("beauty", "Very strongly"), ("mood", "positive")]),
        Box::new(ScriptedModel::new("flaky", vec![api_failure()])) as Box<dyn FeatureModel>,
        vote(&[("beauty", "Strongly"), ("mood", "positive")]),
    ];

    let extractor = FeatureExtractor::new(primary, schema)
        .with_triangulation(panel)
        .with_settings(ExtractionSettings {
            paragraph_min_words: 1,
            section_min_words: 1,
        });
    let report = extractor
        .extract(
            &["The garden glowed under the late light.".to_string()],
            ExtractionMode::Section,
            collectors,
            &mut NoopHook,
        )
        .await;

    // floor((1 + 4 + 3) / 3) = 2
    assert_eq!(report.collectors[0].results(), &[FeatureValue::Index(2)]);
    assert_eq!(
        report.collectors[0].label_for(&report.collectors[0].results()[0]),
        Some("Moderately")
    );
    // "positive" outvotes the primary's "sad"
    assert_eq!(
        report.collectors[1].results(),
        &[FeatureValue::Label("positive".into())]
    );
}

#[test]
fn unresolvable_secondary_answers_do_not_count() {
    let (collectors, _) = build_feature_set(&[FeatureDescriptor::builtin(
        "EMOTIONAL_INTENSITY",
        CollectionPolicy::OrdinalIndex,
    )])
    .unwrap();
    let feature = collectors[0].descriptor();
    let levels: Vec<&str> = feature.levels().iter().collect();

    assert_eq!(
        reconcile(feature, Some(levels[2]), &["off the charts", levels[0]]),
        FeatureValue::Index(1)
    );
    assert_eq!(
        reconcile(feature, Some("nonsense"), &["also nonsense"]),
        FeatureValue::Missing
    );
    assert_eq!(
        reconcile(feature, None, &[levels[3]]),
        FeatureValue::Index(3)
    );
}

#[test]
fn label_ties_go_to_the_first_answer_seen() {
    let (collectors, _) =
        build_feature_set(&[FeatureDescriptor::builtin("MOOD", CollectionPolicy::RawLabel)])
            .unwrap();
    let feature = collectors[0].descriptor();

    assert_eq!(
        reconcile(feature, Some("neutral"), &["angry", "angry", "neutral"]),
        FeatureValue::Label("neutral".into())
    );
    assert_eq!(
        reconcile(feature, None, &["angry", "sad"]),
        FeatureValue::Label("angry".into())
    );
}
