//! Delimited-text row iterator. When the dataset declares a header, the raw
//! first row is upper-cased/trimmed and used to build a name→index
//! projection so the declared field order — not the source's column
//! order — drives every later row. A row whose projected arity doesn't
//! match the layout is dropped and counted, never raised.

use std::io::{BufReader, Read};
use std::path::Path;

use sirad_core::{RawCell, Result, SiradError};
use sirad_layout::Dataset;

use crate::encoding::open_decoded;

pub struct CsvSource {
    inner: csv::Reader<BufReader<Box<dyn Read>>>,
    projection: Vec<usize>,
    skipped: usize,
}

impl CsvSource {
    pub fn open(dataset: &Dataset, path: &Path) -> Result<CsvSource> {
        let decoded = open_decoded(path, &dataset.name, &dataset.encoding)?;
        let mut inner = csv::ReaderBuilder::new()
            .delimiter(dataset.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(decoded);

        let projection = if dataset.header {
            let mut header = csv::StringRecord::new();
            let has_row = inner.read_record(&mut header).map_err(|e| SiradError::Layout {
                dataset: dataset.name.clone(),
                message: format!("failed to read header row: {e}"),
            })?;
            if !has_row {
                return Err(SiradError::Layout {
                    dataset: dataset.name.clone(),
                    message: "source file is empty; a header row was expected".into(),
                });
            }
            let names: Vec<String> = header
                .iter()
                .map(|c| c.trim().to_ascii_uppercase())
                .collect();
            let mut projection = Vec::with_capacity(dataset.fields.len());
            for field in &dataset.fields {
                let target = field.name.trim().to_ascii_uppercase();
                let idx = names.iter().position(|n| *n == target).ok_or_else(|| {
                    SiradError::Layout {
                        dataset: dataset.name.clone(),
                        message: format!(
                            "column '{}' declared in layout not found in source header",
                            field.name
                        ),
                    }
                })?;
                projection.push(idx);
            }
            projection
        } else {
            (0..dataset.fields.len()).collect()
        };

        Ok(CsvSource {
            inner,
            projection,
            skipped: 0,
        })
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for CsvSource {
    type Item = Vec<RawCell>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = csv::StringRecord::new();
            match self.inner.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => {
                    log::warn!("dropping unreadable csv record: {e}");
                    self.skipped += 1;
                    continue;
                }
            }

            let projected: Option<Vec<&str>> =
                self.projection.iter().map(|&i| record.get(i)).collect();
            let projected = match projected {
                Some(cells) if cells.len() == self.projection.len() => cells,
                _ => {
                    self.skipped += 1;
                    continue;
                }
            };

            let row = projected
                .into_iter()
                .map(|cell| RawCell::text(sirad_ascii::sanitize(cell)))
                .collect();
            return Some(row);
        }
    }
}
