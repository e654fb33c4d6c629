//! Column-mapping settings for the hierarchy index
//!
//! All fields have compiled defaults; callers override only what their
//! source schema deviates in. Settings are plain data, deserializable so
//! a host can embed them in its own config file.

use serde::{Deserialize, Serialize};

/// Maps record-source columns onto the hierarchy model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HierarchySettings {
    /// Column holding the entry id
    pub id_column_name: String,
    /// Column holding the display label (may carry the ancestor path)
    pub text_column_name: String,
    /// Column holding the parent id, empty or null for roots
    pub relationship_column_name: String,
    /// Separator between ancestor-path segments inside the label
    pub text_separator: String,
    /// Suffixes of extra columns to merge into each entry. The source
    /// column key is `text_column_name` + suffix, a convention of the
    /// upstream schema.
    pub additional_columns: Vec<String>,
}

impl Default for HierarchySettings {
    fn default() -> Self {
        Self {
            id_column_name: "id".to_string(),
            text_column_name: "text".to_string(),
            relationship_column_name: "parent".to_string(),
            text_separator: "|".to_string(),
            additional_columns: Vec::new(),
        }
    }
}

impl HierarchySettings {
    pub fn with_id_column(mut self, name: impl Into<String>) -> Self {
        self.id_column_name = name.into();
        self
    }

    pub fn with_text_column(mut self, name: impl Into<String>) -> Self {
        self.text_column_name = name.into();
        self
    }

    pub fn with_relationship_column(mut self, name: impl Into<String>) -> Self {
        self.relationship_column_name = name.into();
        self
    }

    pub fn with_text_separator(mut self, separator: impl Into<String>) -> Self {
        self.text_separator = separator.into();
        self
    }

    pub fn with_additional_columns<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additional_columns = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Source column key for an extra-column suffix.
    pub fn extra_column_key(&self, suffix: &str) -> String {
        format!("{}{}", self.text_column_name, suffix)
    }
}
