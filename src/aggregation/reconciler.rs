use tracing::{debug, info};

use super::normalize;
use crate::features::{CollectionPolicy, FeatureDescriptor, FeatureValue};

/// Combine the primary answer with secondary answers into one stored value.
///
/// Ordinal features take the floored mean of every resolvable index. Raw-label
/// features take the most frequent label; ties go to the label seen first, and
/// the primary is always seen first. With no usable answer the result is `Missing`.
pub fn reconcile(
    feature: &FeatureDescriptor,
    primary: Option<&str>,
    secondaries: &[&str],
) -> FeatureValue {
    let own = primary
        .map(|p| normalize(feature, p))
        .unwrap_or(FeatureValue::Missing);
    if secondaries.is_empty() {
        return own;
    }

    let answers: Vec<&str> = primary.into_iter().chain(secondaries.iter().copied()).collect();
    let reconciled = match feature.policy() {
        CollectionPolicy::OrdinalIndex => mean_index(feature, &answers),
        CollectionPolicy::RawLabel => mode_label(&answers),
    };

    if reconciled != own {
        info!(
            feature = feature.identity(),
            "Triangulation changed value from {} to {} (answers: {:?})",
            own,
            reconciled,
            answers
        );
    } else {
        debug!(feature = feature.identity(), "Triangulation agreed on {}", own);
    }
    reconciled
}

fn mean_index(feature: &FeatureDescriptor, answers: &[&str]) -> FeatureValue {
    let indices: Vec<usize> = answers
        .iter()
        .filter_map(|a| normalize(feature, a).as_index())
        .collect();
    if indices.is_empty() {
        return FeatureValue::Missing;
    }
    let mean = indices.iter().sum::<usize>() / indices.len();
    match feature.levels().get(mean) {
        Some(_) => FeatureValue::Index(mean),
        None => FeatureValue::Missing,
    }
}

fn mode_label(answers: &[&str]) -> FeatureValue {
    // Vec keeps first-appearance order for the tie-break.
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for &answer in answers {
        match counts.iter_mut().find(|(label, _)| *label == answer) {
            Some((_, count)) => *count += 1,
            None => counts.push((answer, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| FeatureValue::Label(label.to_string()))
        .unwrap_or(FeatureValue::Missing)
}
