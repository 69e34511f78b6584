//! Spreadsheet row reader over the first worksheet. Mirrors the CSV
//! reader's header-name projection; a typed date cell is passed through as
//! [`RawCell::Date`] rather than stringified, so the extractor can render it
//! without a parse round-trip.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use sirad_core::{RawCell, Result, SiradError};
use sirad_layout::Dataset;

pub struct XlsxSource {
    rows: std::vec::IntoIter<Vec<RawCell>>,
}

impl XlsxSource {
    pub fn open(dataset: &Dataset, path: &Path) -> Result<XlsxSource> {
        let layout_err = |message: String| SiradError::Layout {
            dataset: dataset.name.clone(),
            message,
        };

        let mut workbook =
            open_workbook_auto(path).map_err(|e| layout_err(format!("failed to open workbook: {e}")))?;
        let sheet_name = workbook
            .sheet_names()
            .into_iter()
            .next()
            .ok_or_else(|| layout_err("workbook has no sheets".into()))?;
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| layout_err(format!("failed to read worksheet '{sheet_name}': {e}")))?;

        let mut rows_iter = range.rows();
        let projection: Vec<usize> = if dataset.header {
            let header = rows_iter
                .next()
                .ok_or_else(|| layout_err("worksheet is empty; expected a header row".into()))?;
            let names: Vec<String> = header
                .iter()
                .map(|c| cell_to_text(c).trim().to_ascii_uppercase())
                .collect();
            dataset
                .fields
                .iter()
                .map(|field| {
                    let target = field.name.trim().to_ascii_uppercase();
                    names.iter().position(|n| *n == target).ok_or_else(|| {
                        layout_err(format!(
                            "column '{}' declared in layout not found in worksheet header",
                            field.name
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            (0..dataset.fields.len()).collect()
        };

        let rows: Vec<Vec<RawCell>> = rows_iter
            .map(|row| {
                projection
                    .iter()
                    .map(|&i| row.get(i).map(cell_to_raw).unwrap_or_else(|| RawCell::text(String::new())))
                    .collect()
            })
            .collect();

        Ok(XlsxSource {
            rows: rows.into_iter(),
        })
    }
}

impl Iterator for XlsxSource {
    type Item = Vec<RawCell>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|naive| naive.to_string())
            .unwrap_or_default(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

fn cell_to_raw(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::text(String::new()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => RawCell::Date(naive.date()),
            None => RawCell::text(String::new()),
        },
        other => RawCell::text(sirad_ascii::sanitize(&cell_to_text(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_int_cells_round_trip_as_text() {
        assert_eq!(cell_to_raw(&Data::Empty), RawCell::text(""));
        assert_eq!(cell_to_raw(&Data::Int(45000)), RawCell::text("45000"));
    }

    #[test]
    fn string_cell_is_sanitized_like_a_csv_cell() {
        assert_eq!(
            cell_to_raw(&Data::String("Smith".to_string())),
            RawCell::text("Smith")
        );
    }
}
