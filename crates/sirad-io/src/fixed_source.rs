//! Fixed-width row iterator. Every field in a `type: fixed` dataset must
//! declare a `width` (or its legacy `offsets` alias); consecutive widths
//! define half-open `[start, end)` character slices over each line.

use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;

use sirad_core::{RawCell, Result, SiradError};
use sirad_layout::Dataset;

use crate::encoding::open_decoded;

pub struct FixedSource {
    lines: Lines<BufReader<Box<dyn Read>>>,
    spans: Vec<(usize, usize)>,
}

impl FixedSource {
    pub fn open(dataset: &Dataset, path: &Path) -> Result<FixedSource> {
        let mut spans = Vec::with_capacity(dataset.fields.len());
        let mut start = 0usize;
        for field in &dataset.fields {
            let width = field.width.ok_or_else(|| SiradError::Layout {
                dataset: dataset.name.clone(),
                message: format!(
                    "field '{}' has no 'width' (required for fixed-width datasets)",
                    field.name
                ),
            })?;
            let end = start + width;
            spans.push((start, end));
            start = end;
        }

        let decoded = open_decoded(path, &dataset.name, &dataset.encoding)?;
        Ok(FixedSource {
            lines: decoded.lines(),
            spans,
        })
    }
}

impl Iterator for FixedSource {
    type Item = Vec<RawCell>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(e) => {
                log::warn!("dropping unreadable fixed-width line: {e}");
                return self.next();
            }
        };
        let chars: Vec<char> = line.chars().collect();
        let row = self
            .spans
            .iter()
            .map(|&(start, end)| {
                let start = start.min(chars.len());
                let end = end.min(chars.len());
                let slice: String = chars[start..end].iter().collect();
                RawCell::text(sirad_ascii::sanitize(&slice))
            })
            .collect();
        Some(row)
    }
}
