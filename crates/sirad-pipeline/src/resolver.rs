//! Pools pii rows across every dataset with pii and assigns the randomized,
//! cross-dataset SIRAD ID. Operates purely on in-memory rows read back from
//! already-written pii files — it never sees raw PII beyond what the
//! process writer already extracted.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use sirad_core::{soundex, Result, SiradError};
use sirad_layout::Dataset;

#[derive(Debug, Clone)]
pub struct PiiRow {
    pub dsn: String,
    pub pii_id: u64,
    pub ssn: Option<String>,
    pub ssn_invalid: Option<bool>,
    pub dob: Option<String>,
    pub last_name: Option<String>,
    pub first_sdx: Option<String>,
}

/// Read one dataset's pii file back and project the columns the resolver
/// cares about, matched case-insensitively against the pii header. A
/// dataset missing all of `ssn` and `first_name`/`last_name`/`dob`
/// contributes no rows.
pub fn load_pii_rows(dataset: &Dataset, pii_path: &Path) -> Result<Vec<PiiRow>> {
    let file = std::fs::File::open(pii_path).map_err(|e| SiradError::Io {
        path: pii_path.to_path_buf(),
        source: e,
    })?;
    let mut reader = csv::ReaderBuilder::new().delimiter(b'|').from_reader(file);

    let io_err = |e: csv::Error| SiradError::Io {
        path: pii_path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
    };

    let headers = reader.headers().map_err(io_err)?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    };

    let pii_id_idx = find("pii_id").ok_or_else(|| SiradError::Integrity(format!(
        "pii file for '{}' has no pii_id column",
        dataset.name
    )))?;
    let ssn_idx = find("ssn");
    let ssn_invalid_idx = find("ssn_invalid");
    let first_name_idx = find("first_name");
    let last_name_idx = find("last_name");
    let dob_idx = find("dob");

    let has_ssn_group = ssn_idx.is_some() && ssn_invalid_idx.is_some();
    let has_name_group = first_name_idx.is_some() && last_name_idx.is_some() && dob_idx.is_some();
    if !has_ssn_group && !has_name_group {
        return Ok(Vec::new());
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(io_err)?;
        let present = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let pii_id: u64 = record
            .get(pii_id_idx)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| SiradError::Integrity(format!(
                "pii file for '{}' has a row with a non-numeric pii_id",
                dataset.name
            )))?;

        let ssn = if has_ssn_group { present(ssn_idx) } else { None };
        let ssn_invalid = if has_ssn_group {
            present(ssn_invalid_idx).map(|v| v != "0")
        } else {
            None
        };
        let dob = present(dob_idx);
        let last_name = present(last_name_idx);
        let first_sdx = present(first_name_idx).map(|name| soundex::soundex(&name));

        rows.push(PiiRow {
            dsn: dataset.name.clone(),
            pii_id,
            ssn,
            ssn_invalid,
            dob,
            last_name,
            first_sdx,
        });
    }
    Ok(rows)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DatasetStats {
    pub n_all_pii: u64,
    pub n_ssn_fills: u64,
    pub n_ssn_keys: u64,
    pub n_dobn_keys: u64,
    pub n_ids: u64,
}

pub struct ResolverOutput {
    /// `(dsn, pii_id) -> sirad_id`. `0` means the row had no derivable key.
    pub sirad_ids: HashMap<(String, u64), u64>,
    pub stats: HashMap<String, DatasetStats>,
    /// The seed that actually drove the key-permutation shuffle: the
    /// caller's `seed` when given, otherwise the `u64` drawn from OS
    /// entropy — recorded so an unseeded run can still be identified
    /// after the fact, per the design's "record it in the statistics
    /// output" note.
    pub effective_seed: u64,
}

/// Run the full resolver transformation over the pooled rows of every
/// contributing dataset: Soundex already computed at load time, SSN
/// imputation by DOB/last-name/Soundex block, key assignment, and a
/// randomized dense rank over the distinct non-null keys.
pub fn resolve(mut rows: Vec<PiiRow>, seed: Option<u64>) -> ResolverOutput {
    let mut stats: HashMap<String, DatasetStats> = HashMap::new();
    for row in &rows {
        stats.entry(row.dsn.clone()).or_default().n_all_pii += 1;
    }

    // Build the DOB/last-name/Soundex -> unique valid SSN map from rows
    // with a valid SSN and a complete name/DOB block, keeping only blocks
    // whose surviving distinct SSN count is exactly one.
    let mut block_ssns: HashMap<(String, String, String), HashSet<String>> = HashMap::new();
    for row in &rows {
        if row.ssn_invalid == Some(false) {
            if let (Some(dob), Some(last), Some(sdx), Some(ssn)) =
                (&row.dob, &row.last_name, &row.first_sdx, &row.ssn)
            {
                block_ssns
                    .entry((dob.clone(), last.clone(), sdx.clone()))
                    .or_default()
                    .insert(ssn.clone());
            }
        }
    }
    let impute_map: HashMap<(String, String, String), String> = block_ssns
        .into_iter()
        .filter_map(|(block, ssns)| {
            if ssns.len() == 1 {
                ssns.into_iter().next().map(|ssn| (block, ssn))
            } else {
                None
            }
        })
        .collect();

    for row in &mut rows {
        if row.ssn_invalid != Some(false) {
            if let (Some(dob), Some(last), Some(sdx)) = (&row.dob, &row.last_name, &row.first_sdx) {
                if let Some(matched) = impute_map.get(&(dob.clone(), last.clone(), sdx.clone())) {
                    row.ssn = Some(matched.clone());
                    row.ssn_invalid = Some(false);
                    stats.entry(row.dsn.clone()).or_default().n_ssn_fills += 1;
                }
            }
        }
    }

    let mut keys: Vec<Option<String>> = Vec::with_capacity(rows.len());
    for row in &rows {
        let key = if row.ssn_invalid == Some(false) {
            stats.entry(row.dsn.clone()).or_default().n_ssn_keys += 1;
            row.ssn.clone()
        } else if let (Some(dob), Some(last), Some(sdx)) = (&row.dob, &row.last_name, &row.first_sdx) {
            stats.entry(row.dsn.clone()).or_default().n_dobn_keys += 1;
            Some(format!("{dob}_{last}_{sdx}"))
        } else {
            None
        };
        keys.push(key);
    }

    // First-appearance order, not `HashSet` iteration order: `RandomState`
    // is seeded per-process, so collecting straight out of a `HashSet`
    // would shuffle a differently-ordered input on every run and break
    // reproducibility under a fixed seed even though the shuffle itself is
    // seeded. `seen` exists only for membership; `distinct_keys` is built
    // by pushing the first time each key is encountered.
    let mut seen = HashSet::new();
    let mut distinct_keys: Vec<String> = Vec::new();
    for key in keys.iter().flatten() {
        if seen.insert(key.clone()) {
            distinct_keys.push(key.clone());
        }
    }
    let effective_seed = seed.unwrap_or_else(|| rand::rng().next_u64());
    let mut rng = StdRng::seed_from_u64(effective_seed);
    distinct_keys.shuffle(&mut rng);
    let rank: HashMap<String, u64> = distinct_keys
        .into_iter()
        .enumerate()
        .map(|(i, key)| (key, i as u64 + 1))
        .collect();

    let mut sirad_ids = HashMap::with_capacity(rows.len());
    for (row, key) in rows.iter().zip(keys.iter()) {
        let sirad_id = key.as_ref().and_then(|k| rank.get(k)).copied().unwrap_or(0);
        if sirad_id != 0 {
            stats.entry(row.dsn.clone()).or_default().n_ids += 1;
        }
        sirad_ids.insert((row.dsn.clone(), row.pii_id), sirad_id);
    }

    ResolverOutput {
        sirad_ids,
        stats,
        effective_seed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(dsn: &str, pii_id: u64, ssn: Option<&str>, ssn_invalid: Option<bool>, dob: &str, last: &str, first: &str) -> PiiRow {
        PiiRow {
            dsn: dsn.to_string(),
            pii_id,
            ssn: ssn.map(str::to_string),
            ssn_invalid,
            dob: Some(dob.to_string()),
            last_name: Some(last.to_string()),
            first_sdx: Some(soundex::soundex(first)),
        }
    }

    #[test]
    fn imputation_scenario_assigns_matching_sirad_ids() {
        // A: valid SSN under its own name. B: same DOB/last name, a first
        // name that Soundexes identically ("Jon"/"John" both -> J500), and
        // no SSN of its own — it should inherit A's SSN and therefore A's key.
        let a = row("tax", 1, Some("111223333"), Some(false), "1970-03-02", "Smith", "Jon");
        let b = row("credit", 1, None, Some(true), "1970-03-02", "Smith", "John");
        let out = resolve(vec![a, b], Some(42));

        let id_a = out.sirad_ids[&("tax".to_string(), 1)];
        let id_b = out.sirad_ids[&("credit".to_string(), 1)];
        assert_eq!(id_a, id_b);
        assert!(id_a >= 1);
        assert_eq!(out.stats["credit"].n_ssn_fills, 1);
    }

    #[test]
    fn rows_without_any_key_get_sirad_id_zero() {
        let row = PiiRow {
            dsn: "x".into(),
            pii_id: 1,
            ssn: None,
            ssn_invalid: Some(true),
            dob: None,
            last_name: None,
            first_sdx: None,
        };
        let out = resolve(vec![row], Some(1));
        assert_eq!(out.sirad_ids[&("x".to_string(), 1)], 0);
    }

    #[test]
    fn same_seed_gives_same_mapping_across_runs() {
        let a = row("tax", 1, Some("111223333"), Some(false), "1970-03-02", "Smith", "Jon");
        let b = row("other", 2, Some("999887777"), Some(false), "1982-01-01", "Doe", "Ann");
        let run1 = resolve(vec![a.clone(), b.clone()], Some(7));
        let run2 = resolve(vec![a, b], Some(7));
        assert_eq!(run1.sirad_ids, run2.sirad_ids);
    }
}
