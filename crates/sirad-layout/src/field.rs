//! A single resolved field descriptor: what a layout's `fields` entry means
//! once its options have been validated against the invariants in the
//! design (ssn ⇒ varchar, hash ⇒ varchar|date, never both data and pii).

use sirad_core::{salted_hash, Config, RawCell, Result, SiradError};
use sirad_format::{parse_and_render, render};

use crate::raw::{PiiOption, RawFieldOptions};

pub const DEFAULT_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Varchar,
    Int,
    Date,
}

impl FieldType {
    fn parse(dataset: &str, field: &str, raw: &str) -> Result<FieldType> {
        match raw {
            "varchar" => Ok(FieldType::Varchar),
            "int" => Ok(FieldType::Int),
            "date" => Ok(FieldType::Date),
            other => Err(SiradError::Layout {
                dataset: dataset.to_string(),
                message: format!("field '{field}' has unknown type '{other}'"),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Varchar => "varchar",
            FieldType::Int => "int",
            FieldType::Date => "date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Data,
    Pii,
    Skip,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub role: Role,
    pub pii_name: Option<String>,
    pub field_type: FieldType,
    pub format: String,
    pub hash: bool,
    pub ssn: bool,
    pub width: Option<usize>,
}

impl Field {
    /// A bare `- COLUMN_NAME` entry: a plain varchar data field.
    pub fn bare(name: impl Into<String>) -> Field {
        Field {
            name: name.into(),
            role: Role::Data,
            pii_name: None,
            field_type: FieldType::Varchar,
            format: DEFAULT_DATE_FORMAT.to_string(),
            hash: false,
            ssn: false,
            width: None,
        }
    }

    pub fn from_options(dataset: &str, name: &str, opts: RawFieldOptions) -> Result<Field> {
        let field_type = match &opts.field_type {
            Some(raw) => FieldType::parse(dataset, name, raw)?,
            None => FieldType::Varchar,
        };

        let (pii_name, is_pii) = match opts.pii {
            Some(PiiOption::Bool(true)) => (Some(name.to_string()), true),
            Some(PiiOption::Bool(false)) | None => (None, false),
            Some(PiiOption::Name(renamed)) => (Some(renamed), true),
        };
        let is_skip = opts.skip.unwrap_or(false);
        let wants_data = opts.data.unwrap_or(false);

        if is_pii && wants_data {
            return Err(SiradError::Layout {
                dataset: dataset.to_string(),
                message: format!("field '{name}' marks both 'data' and 'pii'"),
            });
        }

        let role = if is_pii {
            Role::Pii
        } else if is_skip {
            Role::Skip
        } else {
            Role::Data
        };

        let hash = opts.hash.unwrap_or(false);
        if hash && field_type == FieldType::Int {
            return Err(SiradError::Layout {
                dataset: dataset.to_string(),
                message: format!("field '{name}' sets 'hash' but has type 'int'; hash is only meaningful for varchar/date"),
            });
        }

        let ssn = opts.ssn.unwrap_or(false);
        if ssn && field_type != FieldType::Varchar {
            return Err(SiradError::Layout {
                dataset: dataset.to_string(),
                message: format!("field '{name}' marks 'ssn' but is not 'varchar'"),
            });
        }

        let width = opts.width.or(opts.offsets);
        let format = opts.format.unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());

        Ok(Field {
            name: name.to_string(),
            role,
            pii_name,
            field_type,
            format,
            hash,
            ssn,
            width,
        })
    }

    /// The output column name this field projects to in its own channel
    /// (the data column name for a data field, or the pii column name,
    /// renamed via `pii:` if given, for a pii field).
    pub fn output_name(&self) -> &str {
        self.pii_name.as_deref().unwrap_or(&self.name)
    }

    pub fn extract_data(&self, raw: &RawCell, cfg: &Config) -> Option<String> {
        if self.role != Role::Data {
            return None;
        }
        Some(self.extract_value(raw, cfg.data_salt.as_deref()))
    }

    pub fn extract_pii(&self, raw: &RawCell, cfg: &Config) -> Option<String> {
        if self.role != Role::Pii {
            return None;
        }
        Some(self.extract_value(raw, cfg.pii_salt.as_deref()))
    }

    fn extract_value(&self, raw: &RawCell, salt: Option<&str>) -> String {
        if raw.is_null() {
            return String::new();
        }
        match raw {
            RawCell::Text(text) => {
                if self.hash {
                    salted_hash(text, salt)
                } else if self.field_type == FieldType::Date {
                    parse_and_render(text, &self.format)
                } else {
                    text.clone()
                }
            }
            // Excel stores this cell as a date natively: skip the string
            // parse and go straight to rendering, same as the original
            // reader's `isinstance(raw, datetime)` branch.
            RawCell::Date(date) => {
                if self.hash {
                    salted_hash(&render(*date), salt)
                } else {
                    render(*date)
                }
            }
        }
    }
}
