//! Assembles a dataset's research-release file: a data file with the
//! resolver's `sirad_id` prepended per row, or — for a dataset excluded
//! from the resolver pool — the data file carried through unchanged via a
//! hard link.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write as _};
use std::path::Path;

use sirad_core::{Result, SiradError};
use sirad_fs::{link_or_copy, output_path, AtomicFile};
use sirad_layout::Dataset;

/// Write the research file for one dataset. `link_rows` is the dataset's
/// link file content, already `(record_id, pii_id)` pairs in file order;
/// `sirad_ids` maps this dataset's own `pii_id`s to their resolved id. When
/// `link_rows` is `None` the dataset had no pii and its data file is
/// carried through unchanged.
pub fn write_release(
    dataset: &Dataset,
    cfg: &sirad_core::Config,
    data_path: &Path,
    link_rows: Option<&[(u64, u64)]>,
    sirad_ids: Option<&HashMap<u64, u64>>,
) -> Result<std::path::PathBuf> {
    let research_dest = output_path(&cfg.research_dir, &cfg.project, cfg.version, &dataset.name)
        .map_err(|e| SiradError::Io { path: cfg.research_dir.clone(), source: e })?;

    match (link_rows, sirad_ids) {
        (Some(link_rows), Some(sirad_ids)) => {
            let mut sorted = link_rows.to_vec();
            sorted.sort_by_key(|&(record_id, _)| record_id);

            let data_file = std::fs::File::open(data_path)
                .map_err(|e| SiradError::Io { path: data_path.to_path_buf(), source: e })?;
            let mut lines = BufReader::new(data_file).lines();
            let header = lines
                .next()
                .ok_or_else(|| SiradError::Integrity(format!("data file for '{}' has no header", dataset.name)))?
                .map_err(|e| SiradError::Io { path: data_path.to_path_buf(), source: e })?;

            let mut out = AtomicFile::create(&research_dest)
                .map_err(|e| SiradError::Io { path: research_dest.clone(), source: e })?;
            writeln!(out, "sirad_id|{header}")
                .map_err(|e| SiradError::Io { path: research_dest.clone(), source: e })?;

            for (record_id, pii_id) in sorted {
                let line = lines
                    .next()
                    .ok_or_else(|| {
                        SiradError::Integrity(format!(
                            "data file for '{}' has fewer rows than its link file",
                            dataset.name
                        ))
                    })?
                    .map_err(|e| SiradError::Io { path: data_path.to_path_buf(), source: e })?;

                let own_record_id: u64 = line
                    .split('|')
                    .next()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| {
                        SiradError::Integrity(format!(
                            "data row in '{}' has a non-numeric record_id",
                            dataset.name
                        ))
                    })?;
                if own_record_id != record_id {
                    return Err(SiradError::Integrity(format!(
                        "data/link record_id mismatch in '{}': data has {}, link expects {}",
                        dataset.name, own_record_id, record_id
                    )));
                }

                let sirad_id = sirad_ids.get(&pii_id).copied().ok_or_else(|| {
                    SiradError::Integrity(format!(
                        "no sirad_id resolved for pii_id {pii_id} in dataset '{}'",
                        dataset.name
                    ))
                })?;
                writeln!(out, "{sirad_id}|{line}")
                    .map_err(|e| SiradError::Io { path: research_dest.clone(), source: e })?;
            }

            out.commit().map_err(|e| SiradError::Io { path: research_dest.clone(), source: e })?;
        }
        _ => {
            link_or_copy(data_path, &research_dest)
                .map_err(|e| SiradError::Io { path: research_dest.clone(), source: e })?;
        }
    }

    Ok(research_dest)
}
