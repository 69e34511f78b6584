//! Turns a layout YAML document into a typed [`dataset::Dataset`]: a
//! resolved list of [`field::Field`] descriptors plus the derived
//! data/pii/link column lists the writers need. Depends on `sirad-core` for
//! the error type, config, and salted hashing, and on `sirad-format` for
//! date normalization — nothing here touches a filesystem path or an actual
//! source row; that's `sirad-io`'s job.

pub mod dataset;
pub mod field;
pub mod raw;

pub use dataset::{Dataset, SourceType};
pub use field::{Field, FieldType, Role};
pub use raw::RawDataset;

use sirad_core::{Result, SiradError};

/// Parse a layout YAML document's bytes into a resolved [`Dataset`].
pub fn parse_layout(name: &str, yaml: &str) -> Result<Dataset> {
    let raw: RawDataset = serde_yaml_ng::from_str(yaml).map_err(|e| SiradError::Layout {
        dataset: name.to_string(),
        message: e.to_string(),
    })?;
    Dataset::from_raw(name, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tax_layout_from_yaml() {
        let yaml = r#"
source: tax.csv
type: csv
header: true
fields:
  - ID
  - LAST_NAME:
      pii: true
  - FIRST_NAME:
      pii: true
  - DOB:
      pii: true
      type: date
      format: "%Y-%m-%d"
  - SSN:
      pii: true
      ssn: true
  - JOB
  - SALARY
"#;
        let dataset = parse_layout("tax", yaml).unwrap();
        assert_eq!(dataset.source, "tax.csv");
        assert_eq!(dataset.source_type, SourceType::Csv);
        assert!(dataset.has_pii);
        assert_eq!(
            dataset.data_header(),
            vec!["record_id", "ID", "JOB", "SALARY"]
        );
    }

    #[test]
    fn rejects_unknown_option_key() {
        let yaml = r#"
source: bad.csv
fields:
  - FOO:
      bogus: true
"#;
        let err = parse_layout("bad", yaml).unwrap_err();
        assert!(matches!(err, SiradError::Layout { .. }));
    }

    #[test]
    fn rejects_unknown_top_level_key() {
        let yaml = r#"
source: bad.csv
frobnicate: true
fields:
  - ID
"#;
        let err = parse_layout("bad", yaml).unwrap_err();
        assert!(matches!(err, SiradError::Layout { .. }));
    }

    #[test]
    fn fixed_width_layout_carries_widths() {
        let yaml = r#"
source: tax.txt
type: fixed
header: false
fields:
  - SSN:
      width: 9
      ssn: true
      pii: true
  - LAST_NAME:
      width: 20
      pii: true
  - FIRST_NAME:
      width: 20
      pii: true
  - DOB:
      width: 8
      type: date
      pii: true
  - JOB:
      width: 10
"#;
        let dataset = parse_layout("tax_fixed", yaml).unwrap();
        assert_eq!(dataset.source_type, SourceType::Fixed);
        assert!(!dataset.header);
        assert_eq!(dataset.fields[0].width, Some(9));
    }
}
