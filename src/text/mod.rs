pub mod metrics;
pub mod segmentation;

pub use metrics::{TextStatistics, calculate_dialogue_percentage};
pub use segmentation::{
    SECTION_DELIMITER, load_text, merge_short_units, split_into_sections, split_into_units,
    word_count,
};
