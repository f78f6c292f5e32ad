// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Keyword inference for tokens missing from the static tables
//!
//! Names are normalised (lowercase, `_` and `-` become spaces) and padded
//! with a space on each side, so a keyword written with surrounding spaces
//! only matches a whole word. Keyword sets are scanned in priority order and
//! the first set with a hit decides.

use super::SignCategory;

/// Rule text used when no keyword matches
pub const DEFAULT_RULES: &str = "Follow this traffic sign's instructions for safe driving.";

const REGULATORY_KEYWORDS: &[&str] = &[
    " forb ",
    " mand ",
    "stop",
    "yield",
    "speed limit",
    "no entry",
    "no parking",
    "no u turn",
    "no turn",
    "no left turn",
    "no right turn",
    "one way",
    "do not",
    "prohibited",
    "priority",
    "limit",
    "restrict",
    "no overtaking",
    "no horn",
];

const WARNING_KEYWORDS: &[&str] = &[
    " warn ",
    "warning",
    "caution",
    "ahead",
    "crossing",
    "curve",
    "turn",
    "slippery",
    "bump",
    "children",
    "school",
    "pedestrian",
    "animal",
    "deer",
    "cattle",
    "road work",
    "construction",
    "danger",
    "slope",
    "hill",
    "narrow",
    "merge",
];

const GUIDE_KEYWORDS: &[&str] = &[
    " info ",
    " end ",
    "hospital",
    "parking",
    "information",
    "direction",
    "route",
    "exit",
    "entrance",
    "service",
    "food",
    "fuel",
    " gas ",
    " rest ",
];

const CONSTRUCTION_KEYWORDS: &[&str] = &["work", "construction", "detour", "closed"];

/// Ordered keyword -> rule text table
const RULE_KEYWORDS: &[(&[&str], &str)] = &[
    (&["stop"], "Come to a complete stop. Check all directions before proceeding."),
    (&["yield"], "Slow down and give way to other traffic. Stop if necessary."),
    (&["speed", "limit"], "Do not exceed the posted speed limit in this zone."),
    (&["no entry", "do not enter"], "Entry is prohibited. Do not enter this road."),
    (&["no parking"], "Parking is not allowed. Vehicles may be towed."),
    (&["no u turn"], "U-turns are prohibited at this location."),
    (&["pedestrian", "crossing"], "Watch for pedestrians. Slow down and be prepared to stop."),
    (&["curve", "turn"], "Road curves ahead. Reduce speed before the curve."),
    (&["construction", "work"], "Construction zone ahead. Reduce speed and watch for workers."),
    (&["school", "children"], "School zone. Watch for children and reduce speed."),
    (&["hospital"], "Hospital nearby. Follow signs for hospital access."),
];

/// Lowercase, separators to spaces, padded for whole-word keywords
fn normalize(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len() + 2);
    normalized.push(' ');
    for c in name.chars() {
        match c {
            '_' | '-' => normalized.push(' '),
            c => normalized.extend(c.to_lowercase()),
        }
    }
    normalized.push(' ');
    normalized
}

fn matches_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| normalized.contains(kw))
}

/// Infer a category from a label or display name
///
/// Precedence is regulatory, warning, guide, construction; a name with no
/// known keyword is `Unknown`.
pub fn infer_category(name: &str) -> SignCategory {
    let normalized = normalize(name);

    if matches_any(&normalized, REGULATORY_KEYWORDS) {
        SignCategory::Regulatory
    } else if matches_any(&normalized, WARNING_KEYWORDS) {
        SignCategory::Warning
    } else if matches_any(&normalized, GUIDE_KEYWORDS) {
        SignCategory::Guide
    } else if matches_any(&normalized, CONSTRUCTION_KEYWORDS) {
        SignCategory::Construction
    } else {
        SignCategory::Unknown
    }
}

/// Infer driving guidance from a label or display name
pub fn infer_rules(name: &str) -> &'static str {
    let normalized = normalize(name);

    RULE_KEYWORDS
        .iter()
        .find(|(keywords, _)| matches_any(&normalized, keywords))
        .map(|(_, rules)| *rules)
        .unwrap_or(DEFAULT_RULES)
}

/// Readable display name for a raw model label
///
/// `forb_no_horn_zone` becomes `No Horn Zone`, `warn_ice` becomes
/// `Warning: Ice`, `mand_` prefixes are dropped.
pub fn pretty_name(label: &str) -> String {
    let spaced = label.trim().replace('_', " ");
    let mut words: Vec<&str> = spaced.split_whitespace().collect();

    let prefix = match words.first().map(|w| w.to_ascii_lowercase()) {
        Some(first) if first == "forb" => {
            words.remove(0);
            // "forb no x" already reads as a prohibition
            match words.first() {
                Some(next) if next.eq_ignore_ascii_case("no") => None,
                _ => Some("No"),
            }
        }
        Some(first) if first == "warn" => {
            words.remove(0);
            Some("Warning:")
        }
        Some(first) if first == "mand" => {
            words.remove(0);
            None
        }
        _ => None,
    };

    prefix
        .into_iter()
        .map(str::to_string)
        .chain(words.into_iter().map(title_case))
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
