use std::path::Path;

use crate::error::{FeatureExtractorError, Result};

/// Delimiter between sections of a manuscript.
pub const SECTION_DELIMITER: &str = "***";

pub fn load_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| {
        FeatureExtractorError::file(format!("failed to read {}: {}", path.display(), e))
    })
}

/// Split on the section delimiter. Pieces are not trimmed.
pub fn split_into_sections(text: &str) -> Vec<String> {
    text.split(SECTION_DELIMITER).map(str::to_string).collect()
}

/// Split a section into paragraph candidates, one per line.
pub fn split_into_units(section: &str) -> Vec<String> {
    section.split('\n').map(str::to_string).collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Join consecutive short units until each output has at least `minimum_words` words.
///
/// Units are trimmed and blank ones dropped. A final remainder shorter than the
/// minimum is still emitted.
pub fn merge_short_units<S: AsRef<str>>(units: &[S], minimum_words: usize) -> Vec<String> {
    let mut merged = Vec::new();
    let mut current = String::new();
    let mut current_words = 0;

    for unit in units {
        let unit = unit.as_ref().trim();
        if unit.is_empty() {
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(unit);
        current_words += word_count(unit);

        if current_words >= minimum_words {
            merged.push(std::mem::take(&mut current));
            current_words = 0;
        }
    }
    if !current.is_empty() {
        merged.push(current);
    }
    merged
}
