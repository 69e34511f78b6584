//! Serde shape of a layout YAML document, before it's resolved into typed
//! [`crate::field::Field`]/[`crate::dataset::Dataset`] descriptors. Kept
//! deliberately permissive (strings, not enums) so that an invalid value
//! produces one of our own [`sirad_core::SiradError::Layout`] errors instead
//! of an opaque serde message.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDataset {
    pub source: String,
    #[serde(rename = "type", default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub header: Option<bool>,
    #[serde(default)]
    pub encoding: Option<String>,
    pub fields: Vec<RawFieldEntry>,
}

/// A layout's `fields` sequence holds either a bare column name (a plain
/// varchar data field) or a single-entry `name: { options... }` mapping.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawFieldEntry {
    Bare(String),
    Options(HashMap<String, RawFieldOptions>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFieldOptions {
    #[serde(default)]
    pub data: Option<bool>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub hash: Option<bool>,
    #[serde(default)]
    pub pii: Option<PiiOption>,
    #[serde(default)]
    pub ssn: Option<bool>,
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub width: Option<usize>,
    #[serde(default)]
    pub offsets: Option<usize>,
    #[serde(default)]
    pub skip: Option<bool>,
}

/// `pii: true` marks the field pii under its own name; `pii: other_name`
/// marks it pii under a renamed output column.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PiiOption {
    Bool(bool),
    Name(String),
}
