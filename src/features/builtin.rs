//! Built-in writing features.
//!
//! Each entry is a static descriptor literal: configuration refers to it by
//! key (`LEVEL_OF_SUSPENSE`) or identity (`level_of_suspense`) and gets its
//! fixed level scale, description and default colors.

/// Static definition of a built-in feature.
#[derive(Debug)]
pub struct BuiltinFeature {
    pub key: &'static str,
    pub identity: &'static str,
    pub display_label: &'static str,
    pub description: &'static str,
    pub levels: &'static [&'static str],
    pub colors: &'static [(&'static str, &'static str)],
}

const NONE_TO_HIGH: &[&str] = &["none", "low", "medium", "high"];

const AESTHEMOS_RATING: &[&str] = &[
    "Not at all",
    "Slightly",
    "Moderately",
    "Strongly",
    "Very strongly",
];

const AESTHEMOS_COLORS: &[(&str, &str)] = &[
    ("0", "#FFFFFF"),
    ("1", "#FF9999"),
    ("2", "#FF3333"),
    ("3", "#CC0000"),
    ("4", "#990000"),
];

const PURPLE_SCALE: &[(&str, &str)] = &[
    ("0", "#FFFFFF"),
    ("1", "#CC99CC"),
    ("2", "#CC99CC"),
    ("3", "#800080"),
];

const ORANGE_SCALE: &[(&str, &str)] = &[
    ("0", "#FFFFFF"),
    ("1", "#FFE5CC"),
    ("2", "#FFB266"),
    ("3", "#FF8C00"),
];

pub static BUILTIN_FEATURES: &[BuiltinFeature] = &[
    BuiltinFeature {
        key: "PACING",
        identity: "pace",
        display_label: "Pace",
        description: "Pace/speed of the narrative.",
        levels: &[
            "very slow",
            "slow",
            "medium slow",
            "medium",
            "medium fast",
            "fast",
            "very fast",
        ],
        colors: &[
            ("0", "#FFCCCC"),
            ("1", "#FF9999"),
            ("2", "#FF6666"),
            ("3", "#FF3333"),
            ("4", "#FF0000"),
            ("5", "#CC0000"),
            ("6", "#990000"),
        ],
    },
    BuiltinFeature {
        key: "MOOD",
        identity: "mood",
        display_label: "Mood",
        description: "Mood of the text. The mood MUST be one of these selections. If the mood is not listed, choose the closest semantic match.",
        levels: &["positive", "sad", "angry", "suspenseful", "neutral"],
        colors: &[
            ("positive", "#FFFF00"),
            ("sad", "#00008B"),
            ("angry", "#FF0000"),
            ("suspenseful", "#7328AA"),
            ("neutral", "#D3D3D3"),
        ],
    },
    BuiltinFeature {
        key: "EMOTIONAL_INTENSITY",
        identity: "emotional_intensity",
        display_label: "Emotional Intensity",
        description: "Strength or intensity of emotions expressed in the text",
        levels: &[
            "none",
            "very low",
            "low",
            "medium low",
            "medium",
            "medium high",
            "high",
            "very high",
        ],
        colors: &[],
    },
    BuiltinFeature {
        key: "LEVEL_OF_SUSPENSE",
        identity: "level_of_suspense",
        display_label: "Level of Suspense",
        description: "Level of suspense and tension in the text.",
        levels: NONE_TO_HIGH,
        colors: PURPLE_SCALE,
    },
    BuiltinFeature {
        key: "MYSTERY_LEVEL",
        identity: "mystery_level",
        display_label: "Mystery Level",
        description: "Level of mystery in the text. Can be 'low', 'medium', 'high', or 'none'.",
        levels: NONE_TO_HIGH,
        colors: PURPLE_SCALE,
    },
    BuiltinFeature {
        key: "HUMOR_LEVEL",
        identity: "humor_level",
        display_label: "Humor Level",
        description: "Level of humor in the text.",
        levels: NONE_TO_HIGH,
        colors: ORANGE_SCALE,
    },
    BuiltinFeature {
        key: "DESCRIPTIVE_DETAIL_LEVEL",
        identity: "descriptive_detail_level",
        display_label: "Descriptive Detail Level",
        description: "Level of descriptive detail in the text. Can be 'none', 'low', 'medium', 'high'.",
        levels: NONE_TO_HIGH,
        colors: ORANGE_SCALE,
    },
    BuiltinFeature {
        key: "ROMANCE_LEVEL",
        identity: "romance_level",
        display_label: "Romance Level",
        description: "Level of romance in the text.",
        levels: NONE_TO_HIGH,
        colors: PURPLE_SCALE,
    },
    // AESTHEMOS five-point scale (aesthetic emotions survey items)
    BuiltinFeature {
        key: "AESTHEMOS_SADNESS",
        identity: "sadness",
        display_label: "AESTHEMOS_SADNESS",
        description: "To what degree did this passage make you feel melancholic or sad?",
        levels: AESTHEMOS_RATING,
        colors: AESTHEMOS_COLORS,
    },
    BuiltinFeature {
        key: "AESTHEMOS_AMUSEMENT",
        identity: "amusement",
        display_label: "AESTHEMOS_AMUSEMENT",
        description: "How amused or entertained did you feel while reading this passage?",
        levels: AESTHEMOS_RATING,
        colors: AESTHEMOS_COLORS,
    },
    BuiltinFeature {
        key: "AESTHEMOS_ANIMATION",
        identity: "energized_lively",
        display_label: "AESTHEMOS_ANIMATION",
        description: "Did this passage energize you or make you feel more lively?",
        levels: AESTHEMOS_RATING,
        colors: AESTHEMOS_COLORS,
    },
    BuiltinFeature {
        key: "AESTHEMOS_BEAUTY",
        identity: "beauty",
        display_label: "AESTHEMOS_BEAUTY",
        description: "How strongly did you experience a sense of beauty or being moved by this passage?",
        levels: AESTHEMOS_RATING,
        colors: AESTHEMOS_COLORS,
    },
    BuiltinFeature {
        key: "AESTHEMOS_CURIOSITY",
        identity: "curiosity",
        display_label: "AESTHEMOS_CURIOSITY",
        description: "How much did this passage spark your curiosity or interest?",
        levels: AESTHEMOS_RATING,
        colors: AESTHEMOS_COLORS,
    },
    BuiltinFeature {
        key: "AESTHEMOS_DISTRESSED",
        identity: "distressed",
        display_label: "AESTHEMOS_DISTRESSED",
        description: "To what extent did this passage make you feel uncomfortable or distressed?",
        levels: AESTHEMOS_RATING,
        colors: AESTHEMOS_COLORS,
    },
    BuiltinFeature {
        key: "AESTHEMOS_RELAXATION",
        identity: "relaxation",
        display_label: "AESTHEMOS_RELAXATION",
        description: "Did the passage evoke feelings of nostalgia or help you feel relaxed?",
        levels: AESTHEMOS_RATING,
        colors: AESTHEMOS_COLORS,
    },
];

/// Find a built-in feature by key or identity, ignoring case.
pub fn lookup(name: &str) -> Option<&'static BuiltinFeature> {
    let name = name.trim();
    BUILTIN_FEATURES.iter().find(|f| {
        f.key.eq_ignore_ascii_case(name) || f.identity.eq_ignore_ascii_case(name)
    })
}
