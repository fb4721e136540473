//! CSV persistence of run results, one row per text unit.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{error, info};

use crate::error::{FeatureExtractorError, Result};
use crate::features::{FeatureCollector, color_maps};
use crate::text::{TextStatistics, word_count};

pub const DEFAULT_CSV_FILE: &str = "feature_results.csv";

/// Write results to `path`, replacing any existing file.
pub fn save_results_to_csv(
    path: impl AsRef<Path>,
    collectors: &[FeatureCollector],
    text_units: &[String],
    text_metrics: &[Option<TextStatistics>],
) -> Result<()> {
    let path = path.as_ref();
    let outcome = File::create(path)
        .map_err(|e| {
            FeatureExtractorError::file(format!("Failed to create {}: {}", path.display(), e))
        })
        .and_then(|file| write_results(file, collectors, text_units, text_metrics));
    match &outcome {
        Ok(()) => info!("Results saved to {}", path.display()),
        Err(e) => error!("Error saving results to CSV: {}", e),
    }
    outcome
}

/// Columns: Unit, Length, one per feature display label, the text statistics, ColorMaps.
///
/// Results and metrics are zipped by position with `text_units`; a collector
/// holding fewer entries than there are units leaves the rest blank.
pub fn write_results<W: Write>(
    writer: W,
    collectors: &[FeatureCollector],
    text_units: &[String],
    text_metrics: &[Option<TextStatistics>],
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["Unit".to_string(), "Length".to_string()];
    header.extend(collectors.iter().map(|c| c.display_label().to_string()));
    header.extend(TextStatistics::COLUMNS.iter().map(|c| c.to_string()));
    header.push("ColorMaps".to_string());
    csv.write_record(&header)?;

    let colors = serde_json::to_string(&color_maps(collectors))?;
    let blank_metrics = vec![String::new(); TextStatistics::COLUMNS.len()];

    for (i, text) in text_units.iter().enumerate() {
        let mut row = vec![(i + 1).to_string(), word_count(text).to_string()];
        for collector in collectors {
            row.push(
                collector
                    .results()
                    .get(i)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        match text_metrics.get(i).and_then(Option::as_ref) {
            Some(stats) => row.extend(stats.column_values()),
            None => row.extend(blank_metrics.iter().cloned()),
        }
        row.push(colors.clone());
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}
