//! Drives one dataset's raw rows through the layout's field extractors,
//! producing a `(data_values, pii_values)` pair per row. Each pair excludes
//! the leading `record_id`/`pii_id` column — the process writer assigns
//! those, since they depend on stream position and, for pii, a shuffle.

use std::path::Path;

use sirad_core::{ssn, Config, RawCell, Result, SiradError};
use sirad_io::RowSource;
use sirad_layout::{Dataset, Role};

pub struct Splitter<'a> {
    dataset: &'a Dataset,
    cfg: &'a Config,
    source: RowSource,
}

impl<'a> Splitter<'a> {
    pub fn open(dataset: &'a Dataset, cfg: &'a Config, raw_path: &Path) -> Result<Splitter<'a>> {
        check_salts_configured(dataset, cfg)?;
        let source = RowSource::open(dataset, raw_path)?;
        Ok(Splitter {
            dataset,
            cfg,
            source,
        })
    }

    /// Rows dropped by the reader for arity mismatch, after the split
    /// finishes (or at any point while iterating).
    pub fn skipped(&self) -> usize {
        self.source.skipped()
    }

    fn split_row(&self, row: Vec<RawCell>) -> Result<(Vec<String>, Vec<String>)> {
        if row.len() != self.dataset.fields.len() {
            return Err(SiradError::SourceShape {
                dataset: self.dataset.name.clone(),
                expected: self.dataset.fields.len(),
                got: row.len(),
            });
        }

        let mut data = Vec::new();
        let mut pii = Vec::new();
        let mut data_invalid = Vec::new();
        let mut pii_invalid = Vec::new();

        for (field, cell) in self.dataset.fields.iter().zip(row.into_iter()) {
            let cell = if field.ssn {
                let text = match &cell {
                    RawCell::Text(s) => s.clone(),
                    RawCell::Date(_) => String::new(),
                };
                RawCell::text(ssn::digits_only(&text))
            } else {
                cell
            };

            if let Some(value) = field.extract_data(&cell, self.cfg) {
                data.push(value);
            }
            if let Some(value) = field.extract_pii(&cell, self.cfg) {
                pii.push(value);
            }

            if field.ssn {
                let digits = match &cell {
                    RawCell::Text(s) => s.as_str(),
                    RawCell::Date(_) => "",
                };
                let invalid = if ssn::validate_ssn(digits) == ssn::VALID {
                    "0"
                } else {
                    "1"
                };
                if field.role == Role::Data {
                    data_invalid.push(invalid.to_string());
                }
                if field.role == Role::Pii {
                    pii_invalid.push(invalid.to_string());
                }
            }
        }

        data.extend(data_invalid);
        pii.extend(pii_invalid);
        Ok((data, pii))
    }
}

/// Refuse to run a dataset that declares a `hash: true` field in a channel
/// whose salt isn't configured, rather than silently hashing the unsalted
/// value: a data-channel hash field needs `DATA_SALT`, a pii-channel hash
/// field needs `PII_SALT`.
fn check_salts_configured(dataset: &Dataset, cfg: &Config) -> Result<()> {
    for field in &dataset.fields {
        if !field.hash {
            continue;
        }
        let (channel, salt) = match field.role {
            Role::Data => ("data", &cfg.data_salt),
            Role::Pii => ("pii", &cfg.pii_salt),
            Role::Skip => continue,
        };
        if salt.is_none() {
            return Err(SiradError::Configuration(format!(
                "dataset '{}' field '{}' sets hash:true but no {channel} salt is configured",
                dataset.name, field.name
            )));
        }
    }
    Ok(())
}

impl<'a> Iterator for Splitter<'a> {
    type Item = Result<(Vec<String>, Vec<String>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.source.next()?;
        Some(self.split_row(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sirad_layout::parse_layout;
    use std::io::Write as _;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn tax_scenario_splits_ssn_name_dob_to_pii_and_job_salary_to_data() {
        let dataset = parse_layout(
            "tax",
            r#"
source: tax.csv
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
"#,
        )
        .unwrap();
        let tmp = write_tmp(
            "ID,LAST_NAME,FIRST_NAME,DOB,SSN,JOB,SALARY\n1,Smith,Jane,1970-03-02,123-45-6789,cook,45000\n",
        );
        let cfg = Config::default();
        let splitter = Splitter::open(&dataset, &cfg, tmp.path()).unwrap();
        let rows: Vec<_> = splitter.map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        let (data, pii) = &rows[0];
        assert_eq!(data, &vec!["1".to_string(), "cook".to_string(), "45000".to_string()]);
        assert_eq!(
            pii,
            &vec![
                "Smith".to_string(),
                "Jane".to_string(),
                "1970-03-02".to_string(),
                "123456789".to_string(),
                "0".to_string(),
            ]
        );
    }

    #[test]
    fn hash_field_without_configured_salt_is_refused() {
        let dataset = parse_layout(
            "tax",
            r#"
source: tax.csv
header: true
fields:
  - ID
  - LAST_NAME:
      pii: true
      hash: true
"#,
        )
        .unwrap();
        let tmp = write_tmp("ID,LAST_NAME\n1,Smith\n");
        let cfg = Config::default();
        let err = Splitter::open(&dataset, &cfg, tmp.path()).unwrap_err();
        assert!(matches!(err, SiradError::Configuration(_)));
    }

    #[test]
    fn credit_scenario_has_no_pii_output() {
        let dataset = parse_layout(
            "credit",
            r#"
source: credit.csv
header: true
fields:
  - ID
  - SCORE
"#,
        )
        .unwrap();
        let tmp = write_tmp("ID,SCORE\n1,700\n");
        let cfg = Config::default();
        let splitter = Splitter::open(&dataset, &cfg, tmp.path()).unwrap();
        let rows: Vec<_> = splitter.map(|r| r.unwrap()).collect();
        assert_eq!(rows[0].1, Vec::<String>::new());
    }
}
