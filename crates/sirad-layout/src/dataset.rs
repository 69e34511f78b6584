//! A fully resolved dataset descriptor: the per-field model plus the
//! derived column lists the writers need (`data_cols`, `pii_cols`,
//! `link_cols`), and the expected source shape (delimiter, header, type).

use sirad_core::{Result, SiradError};

use crate::field::{Field, FieldType, Role};
use crate::raw::{RawDataset, RawFieldEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Csv,
    Fixed,
    Xlsx,
}

impl SourceType {
    fn parse(dataset: &str, raw: &str) -> Result<SourceType> {
        match raw {
            "csv" => Ok(SourceType::Csv),
            "fixed" => Ok(SourceType::Fixed),
            "xlsx" => Ok(SourceType::Xlsx),
            other => Err(SiradError::Layout {
                dataset: dataset.to_string(),
                message: format!("unknown dataset type '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub source: String,
    pub source_type: SourceType,
    pub delimiter: u8,
    pub header: bool,
    pub encoding: String,
    pub fields: Vec<Field>,
    pub has_pii: bool,
    /// `(column name, type)` in the order the data writer emits them,
    /// including the leading `record_id` and any `{name}_invalid` flags.
    pub data_cols: Vec<(String, FieldType)>,
    pub pii_cols: Vec<(String, FieldType)>,
    pub link_cols: Vec<(String, FieldType)>,
}

impl Dataset {
    pub fn from_raw(name: &str, raw: RawDataset) -> Result<Dataset> {
        let source_type = match &raw.source_type {
            Some(t) => SourceType::parse(name, t)?,
            None => SourceType::Csv,
        };

        let delimiter = match &raw.delimiter {
            Some(d) if d.len() == 1 => d.as_bytes()[0],
            Some(other) => {
                return Err(SiradError::Layout {
                    dataset: name.to_string(),
                    message: format!("delimiter must be a single byte, got '{other}'"),
                })
            }
            None => b',',
        };

        let mut fields = Vec::with_capacity(raw.fields.len());
        for entry in raw.fields {
            let field = match entry {
                RawFieldEntry::Bare(field_name) => Field::bare(field_name),
                RawFieldEntry::Options(mut map) => {
                    if map.len() != 1 {
                        return Err(SiradError::Layout {
                            dataset: name.to_string(),
                            message: "each field entry must map exactly one field name to its options".into(),
                        });
                    }
                    let (field_name, opts) = map.drain().next().expect("checked len == 1");
                    Field::from_options(name, &field_name, opts)?
                }
            };
            fields.push(field);
        }

        let mut seen = std::collections::HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.clone()) {
                return Err(SiradError::Layout {
                    dataset: name.to_string(),
                    message: format!("duplicate field name '{}'", field.name),
                });
            }
        }

        let has_pii = fields.iter().any(|f| f.role == Role::Pii);

        // Every channel's own values come first, then every `{name}_invalid`
        // flag for that channel's ssn fields, in field-declaration order —
        // the flags are appended as a trailing group, not interleaved
        // field-by-field.
        let mut data_cols = vec![("record_id".to_string(), FieldType::Int)];
        let mut data_invalid_cols = Vec::new();
        let mut pii_cols = vec![("pii_id".to_string(), FieldType::Int)];
        let mut pii_invalid_cols = Vec::new();

        for field in &fields {
            match field.role {
                Role::Data => {
                    data_cols.push((field.name.clone(), field.field_type));
                    if field.ssn {
                        data_invalid_cols.push((format!("{}_invalid", field.name), FieldType::Int));
                    }
                }
                Role::Pii => {
                    let out_name = field.output_name().to_string();
                    pii_cols.push((out_name.clone(), field.field_type));
                    if field.ssn {
                        pii_invalid_cols.push((format!("{out_name}_invalid"), FieldType::Int));
                    }
                }
                Role::Skip => {}
            }
        }
        data_cols.extend(data_invalid_cols);
        pii_cols.extend(pii_invalid_cols);

        let link_cols = vec![
            ("record_id".to_string(), FieldType::Int),
            ("pii_id".to_string(), FieldType::Int),
        ];

        Ok(Dataset {
            name: name.to_string(),
            source: raw.source,
            source_type,
            delimiter,
            header: raw.header.unwrap_or(true),
            encoding: raw.encoding.unwrap_or_else(|| "utf-8".to_string()),
            fields,
            has_pii,
            data_cols,
            pii_cols,
            link_cols,
        })
    }

    pub fn data_header(&self) -> Vec<&str> {
        self.data_cols.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn pii_header(&self) -> Vec<&str> {
        self.pii_cols.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn link_header(&self) -> Vec<&str> {
        self.link_cols.iter().map(|(n, _)| n.as_str()).collect()
    }
}
