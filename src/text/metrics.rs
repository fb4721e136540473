//! Readability and dialogue statistics for a text unit.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static DIALOGUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]*""#).unwrap());
static SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStatistics {
    pub dialogue_percentage: String,
    pub readability_ease: f64,
    pub readability_grade: f64,
    pub sentence_count: usize,
    pub word_count: usize,
    pub syllable_count: usize,
    pub average_words_per_sentence: f64,
    pub average_syllables_per_word: f64,
}

impl TextStatistics {
    /// Export column names, in `column_values` order.
    pub const COLUMNS: [&'static str; 8] = [
        "dialogue_percentage",
        "readability_ease",
        "readability_grade",
        "sentence_count",
        "word_count",
        "syllable_count",
        "average_words_per_sentence",
        "average_syllables_per_word",
    ];

    /// Statistics for `text`, or `None` when it has no words.
    pub fn compute(text: &str) -> Option<Self> {
        let words: Vec<&str> = text
            .split_whitespace()
            .filter(|w| w.chars().any(char::is_alphanumeric))
            .collect();
        if words.is_empty() {
            return None;
        }

        let word_count = words.len();
        let sentence_count = count_sentences(text).max(1);
        let syllable_count: usize = words.iter().map(|w| count_syllables(w)).sum();

        let words_per_sentence = word_count as f64 / sentence_count as f64;
        let syllables_per_word = syllable_count as f64 / word_count as f64;

        Some(Self {
            dialogue_percentage: calculate_dialogue_percentage(text),
            readability_ease: round2(
                206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word,
            ),
            readability_grade: round2(
                0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59,
            ),
            sentence_count,
            word_count,
            syllable_count,
            average_words_per_sentence: round2(words_per_sentence),
            average_syllables_per_word: round2(syllables_per_word),
        })
    }

    pub fn column_values(&self) -> Vec<String> {
        vec![
            self.dialogue_percentage.clone(),
            format!("{:.2}", self.readability_ease),
            format!("{:.2}", self.readability_grade),
            self.sentence_count.to_string(),
            self.word_count.to_string(),
            self.syllable_count.to_string(),
            format!("{:.2}", self.average_words_per_sentence),
            format!("{:.2}", self.average_syllables_per_word),
        ]
    }
}

/// Share of characters inside double-quoted spans, e.g. `"27.94%"`.
pub fn calculate_dialogue_percentage(text: &str) -> String {
    let total = text.chars().count();
    if total == 0 {
        return "0.00%".to_string();
    }
    let dialogue: usize = DIALOGUE_RE
        .find_iter(text)
        .map(|m| m.as_str().chars().count())
        .sum();
    format!("{:.2}%", dialogue as f64 / total as f64 * 100.0)
}

fn count_sentences(text: &str) -> usize {
    SENTENCE_END_RE
        .split(text)
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .count()
}

/// Vowel-group estimate with a silent trailing "e"; at least one per word.
pub fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if letters.is_empty() {
        return 0;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0;
    let mut previous_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    let n = letters.len();
    if count > 1 && letters[n - 1] == 'e' && !(n >= 2 && letters[n - 2] == 'l') {
        count -= 1;
    }
    count.max(1)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
