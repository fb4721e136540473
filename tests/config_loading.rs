use std::fs;
use tempfile::TempDir;

use writing_feature_extractor::features::CollectionPolicy;
use writing_feature_extractor::{Config, ExtractionMode, build_feature_set};

const CONFIG: &str = r##"
[extraction]
mode = "paragraph"
paragraph_min_words = 12
pause_between_sections = false

[model]
provider = "openai"
name = "gpt-4o-mini"
prompt = "basic"

[output]
csv_file = "out/results.csv"
save = true

[[features]]
name = "PACING"
result_collection_mode = "NUMBER_REPRESENTATION"

[[features]]
name = "HUMOR_LEVEL"
result_collection_mode = "ordinal_index"
[features.customizations]
display_label = "Humour"
levels = ["dry", "playful", "slapstick"]

[[features]]
name = "Melancholy"
result_collection_mode = "FIELD_NAME"
[features.customizations]
levels = ["absent", "wistful", "bleak"]
description = "How melancholy the passage feels."
"##;

#[test]
fn configuration_file_builds_a_feature_set() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("features.toml");
    fs::write(&path, CONFIG).unwrap();

    let config = Config::from_file(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.extraction.mode, ExtractionMode::Paragraph);
    assert!(!config.extraction.pause_between_sections);
    assert!(config.output.save);
    assert_eq!(config.extraction_settings().paragraph_min_words, 12);
    assert_eq!(config.extraction_settings().section_min_words, 50);

    let (collectors, schema) = build_feature_set(&config.feature_descriptors().unwrap()).unwrap();
    assert_eq!(schema.field_names(), vec!["pace", "humor_level", "melancholy"]);
    assert_eq!(collectors[1].display_label(), "Humour");
    assert_eq!(collectors[1].levels().len(), 3);
    assert_eq!(collectors[2].policy(), CollectionPolicy::RawLabel);
    assert_eq!(
        schema.field("melancholy").unwrap().description,
        "How melancholy the passage feels."
    );
}

#[test]
fn malformed_file_is_reported_with_its_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[[features]\nname = \"PACING\"\n").unwrap();

    let err = Config::from_file(&path).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn invalid_values_fail_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("zero.toml");
    fs::write(
        &path,
        "[extraction]\nsection_min_words = 0\n[[features]]\nname = \"PACING\"\n",
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert!(config.validate().unwrap_err().is_configuration());
}

#[test]
fn customized_builtin_name_must_list_its_own_levels() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("relabel.toml");
    fs::write(
        &path,
        "[[features]]\nname = \"HUMOR_LEVEL\"\n[features.customizations]\ndisplay_label = \"Humour\"\n",
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert!(config.validate().unwrap_err().to_string().contains("no levels"));
}

#[test]
fn bad_provider_in_file_can_be_overridden_before_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("override.toml");
    fs::write(
        &path,
        "[model]\nprovider = \"mistral\"\nprompt = \"sonnet\"\n[[features]]\nname = \"PACING\"\n",
    )
    .unwrap();

    let mut config = Config::from_file(&path).unwrap();
    assert!(config.validate().unwrap_err().is_configuration());

    config.model.provider = "groq".into();
    config.model.prompt = "basic".into();
    config.validate().unwrap();
}
