// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Traffic-sign class taxonomy
//!
//! Maps a model's native class token (an integer index or a raw string
//! label) to a [`SignRecord`]. Lookup hits a static table first; anything
//! unmapped goes through the shared keyword fallback, so `resolve` is total.

pub mod keywords;
pub mod tables;

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use keywords::{infer_category, infer_rules, pretty_name, DEFAULT_RULES};
use tables::{TableEntry, INDEX_TABLE, LABEL_TABLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignCategory {
    Regulatory,
    Warning,
    Guide,
    Construction,
    Unknown,
}

impl SignCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignCategory::Regulatory => "regulatory",
            SignCategory::Warning => "warning",
            SignCategory::Guide => "guide",
            SignCategory::Construction => "construction",
            SignCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SignCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic description of one sign class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRecord {
    pub name: String,
    pub category: SignCategory,
    pub description: String,
    pub rules: String,
}

impl From<&TableEntry> for SignRecord {
    fn from(entry: &TableEntry) -> Self {
        Self {
            name: entry.name.to_string(),
            category: entry.category,
            description: entry.description.to_string(),
            rules: entry.rules.to_string(),
        }
    }
}

/// A model-native class key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassToken {
    Index(u32),
    Label(String),
}

impl ClassToken {
    /// Token for a model output: its label when the model has one, else its index
    pub fn for_class(class_id: u32, label: Option<&str>) -> Self {
        match label {
            Some(label) if !label.trim().is_empty() => ClassToken::Label(label.to_string()),
            _ => ClassToken::Index(class_id),
        }
    }
}

impl From<u32> for ClassToken {
    fn from(index: u32) -> Self {
        ClassToken::Index(index)
    }
}

impl From<&str> for ClassToken {
    fn from(label: &str) -> Self {
        ClassToken::Label(label.to_string())
    }
}

impl fmt::Display for ClassToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassToken::Index(index) => write!(f, "#{}", index),
            ClassToken::Label(label) => f.write_str(label),
        }
    }
}

/// Entry of the integer table, as listed by `/classes`
#[derive(Debug, Clone, Serialize)]
pub struct IndexedSign {
    pub class_id: u32,
    #[serde(flatten)]
    pub record: SignRecord,
}

/// Read-only view over the static tables
#[derive(Debug, Clone, Copy, Default)]
pub struct Taxonomy;

fn label_index() -> &'static HashMap<&'static str, &'static TableEntry> {
    static LABELS: OnceLock<HashMap<&'static str, &'static TableEntry>> = OnceLock::new();
    LABELS.get_or_init(|| LABEL_TABLE.iter().map(|(token, entry)| (*token, entry)).collect())
}

impl Taxonomy {
    pub fn new() -> Self {
        Self
    }

    /// Resolve any token to a record; never fails
    pub fn resolve(&self, token: &ClassToken) -> SignRecord {
        match token {
            ClassToken::Index(index) => match self.lookup_index(*index) {
                Some(entry) => entry.into(),
                None => Self::infer(format!("Traffic Sign {}", index)),
            },
            ClassToken::Label(label) => match label_index().get(label.as_str()) {
                Some(entry) => (*entry).into(),
                None => Self::infer_from_label(label),
            },
        }
    }

    /// Exact integer-table lookup
    pub fn lookup_index(&self, index: u32) -> Option<&'static TableEntry> {
        INDEX_TABLE.get(index as usize)
    }

    /// Whether the token has a static entry
    pub fn contains(&self, token: &ClassToken) -> bool {
        match token {
            ClassToken::Index(index) => self.lookup_index(*index).is_some(),
            ClassToken::Label(label) => label_index().contains_key(label.as_str()),
        }
    }

    /// The integer table in class-id order
    pub fn index_entries(&self) -> Vec<IndexedSign> {
        INDEX_TABLE
            .iter()
            .enumerate()
            .map(|(class_id, entry)| IndexedSign {
                class_id: class_id as u32,
                record: entry.into(),
            })
            .collect()
    }

    pub fn index_len(&self) -> usize {
        INDEX_TABLE.len()
    }

    pub fn label_len(&self) -> usize {
        LABEL_TABLE.len()
    }

    /// Uniformly random entry of the integer table
    pub fn random_index_entry<R: Rng>(&self, rng: &mut R) -> (u32, SignRecord) {
        let class_id = rng.gen_range(0..INDEX_TABLE.len());
        (class_id as u32, (&INDEX_TABLE[class_id]).into())
    }

    fn infer_from_label(label: &str) -> SignRecord {
        let name = pretty_name(label);
        let name = if name.is_empty() {
            "Traffic Sign".to_string()
        } else {
            name
        };
        // Prefixes like "forb"/"warn" carry category; infer from the raw label too
        let category = match infer_category(label) {
            SignCategory::Unknown => infer_category(&name),
            category => category,
        };
        SignRecord {
            description: format!("Traffic sign detected: {}", name),
            rules: infer_rules(&name).to_string(),
            category,
            name,
        }
    }

    fn infer(name: String) -> SignRecord {
        SignRecord {
            description: format!("Traffic sign detected: {}", name),
            rules: infer_rules(&name).to_string(),
            category: infer_category(&name),
            name,
        }
    }
}
