//! Runs the process phase for one dataset: stream the splitter into the
//! data file with an assigned `record_id`, buffer pii rows, shuffle, and
//! write the pii and link files. Appends a line to the process log on
//! success.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use sirad_core::{Config, Result, SiradError};
use sirad_fs::{output_path, AtomicFile};
use sirad_layout::Dataset;

use crate::splitter::Splitter;

pub struct ProcessOutcome {
    pub nrows: usize,
    pub skipped: usize,
    pub elapsed_secs: f64,
    pub data_path: std::path::PathBuf,
    pub pii_path: Option<std::path::PathBuf>,
    pub link_path: Option<std::path::PathBuf>,
    /// The seed that drove this dataset's pii/link shuffle, when it has
    /// pii; `None` for a dataset with no pii to shuffle. Recorded so an
    /// unseeded run's shuffle can still be identified after the fact.
    pub effective_seed: Option<u64>,
}

pub fn process_dataset(dataset: &Dataset, cfg: &Config, raw_path: &Path, seed: Option<u64>) -> Result<ProcessOutcome> {
    let started = Instant::now();

    let data_dest = output_path(&cfg.data_dir, &cfg.project, cfg.version, &dataset.name)
        .map_err(|e| SiradError::Io { path: cfg.data_dir.clone(), source: e })?;
    let mut data_writer = sirad_io::new_writer(
        AtomicFile::create(&data_dest).map_err(|e| SiradError::Io { path: data_dest.clone(), source: e })?,
    );
    data_writer
        .write_record(dataset.data_header())
        .map_err(|e| SiradError::Io { path: data_dest.clone(), source: std::io::Error::new(std::io::ErrorKind::Other, e) })?;

    let mut splitter = Splitter::open(dataset, cfg, raw_path)?;
    let mut nrows = 0usize;
    let mut pii_rows: Vec<(u64, Vec<String>)> = Vec::new();

    while let Some(row) = splitter.next() {
        let (data_values, pii_values) = row?;
        let record_id = nrows as u64 + 1;
        let mut record = vec![record_id.to_string()];
        record.extend(data_values);
        data_writer
            .write_record(&record)
            .map_err(|e| SiradError::Io { path: data_dest.clone(), source: std::io::Error::new(std::io::ErrorKind::Other, e) })?;
        nrows += 1;
        if dataset.has_pii {
            pii_rows.push((record_id, pii_values));
        }
    }
    let skipped = splitter.skipped();

    let data_writer = data_writer.into_inner().map_err(|e| SiradError::Io {
        path: data_dest.clone(),
        source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
    })?;
    data_writer
        .commit()
        .map_err(|e| SiradError::Io { path: data_dest.clone(), source: e })?;

    let mut effective_seed = None;
    let (pii_path, link_path) = if dataset.has_pii {
        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        effective_seed = Some(seed);
        let mut rng = StdRng::seed_from_u64(seed);
        pii_rows.shuffle(&mut rng);

        let pii_dest = output_path(&cfg.pii_dir, &cfg.project, cfg.version, &dataset.name)
            .map_err(|e| SiradError::Io { path: cfg.pii_dir.clone(), source: e })?;
        let link_dest = output_path(&cfg.link_dir, &cfg.project, cfg.version, &dataset.name)
            .map_err(|e| SiradError::Io { path: cfg.link_dir.clone(), source: e })?;

        let mut pii_writer = sirad_io::new_writer(
            AtomicFile::create(&pii_dest).map_err(|e| SiradError::Io { path: pii_dest.clone(), source: e })?,
        );
        let mut link_writer = sirad_io::new_writer(
            AtomicFile::create(&link_dest).map_err(|e| SiradError::Io { path: link_dest.clone(), source: e })?,
        );
        pii_writer
            .write_record(dataset.pii_header())
            .map_err(io_err(&pii_dest))?;
        link_writer
            .write_record(dataset.link_header())
            .map_err(io_err(&link_dest))?;

        for (pii_id, (record_id, pii_values)) in pii_rows.into_iter().enumerate() {
            let pii_id = pii_id as u64 + 1;
            link_writer
                .write_record([record_id.to_string(), pii_id.to_string()])
                .map_err(io_err(&link_dest))?;
            let mut record = vec![pii_id.to_string()];
            record.extend(pii_values);
            pii_writer.write_record(&record).map_err(io_err(&pii_dest))?;
        }

        let pii_writer = pii_writer.into_inner().map_err(|e| SiradError::Io {
            path: pii_dest.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?;
        pii_writer.commit().map_err(|e| SiradError::Io { path: pii_dest.clone(), source: e })?;
        let link_writer = link_writer.into_inner().map_err(|e| SiradError::Io {
            path: link_dest.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?;
        link_writer.commit().map_err(|e| SiradError::Io { path: link_dest.clone(), source: e })?;

        (Some(pii_dest), Some(link_dest))
    } else {
        (None, None)
    };

    let elapsed_secs = started.elapsed().as_secs_f64();
    append_process_log(&cfg.process_log, &dataset.name, nrows, elapsed_secs)?;

    Ok(ProcessOutcome {
        nrows,
        skipped,
        elapsed_secs,
        data_path: data_dest,
        pii_path,
        link_path,
        effective_seed,
    })
}

fn io_err(path: &Path) -> impl Fn(csv::Error) -> SiradError + '_ {
    move |e| SiradError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
    }
}

/// Guards the process log's append so concurrent `-n > 1` workers don't
/// interleave the header write with a row, or a row with another row.
static PROCESS_LOG_LOCK: Mutex<()> = Mutex::new(());

fn append_process_log(path: &Path, dataset_name: &str, nrows: usize, elapsed_secs: f64) -> Result<()> {
    let _guard = PROCESS_LOG_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SiradError::Io { path: parent.to_path_buf(), source: e })?;
    }
    let is_new = !path.exists();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SiradError::Io { path: path.to_path_buf(), source: e })?;
    if is_new {
        writeln!(file, "DATASET,NROWS,ELAPSED").map_err(|e| SiradError::Io { path: path.to_path_buf(), source: e })?;
    }
    writeln!(file, "{dataset_name},{nrows},{elapsed_secs:.3}")
        .map_err(|e| SiradError::Io { path: path.to_path_buf(), source: e })?;
    Ok(())
}

/// Dataset names already recorded as complete in the process log, so a
/// re-run of `process` can skip them.
pub fn completed_datasets(path: &Path) -> Result<std::collections::HashSet<String>> {
    let mut done = std::collections::HashSet::new();
    let Ok(file) = std::fs::File::open(path) else {
        return Ok(done);
    };
    let mut reader = csv::Reader::from_reader(file);
    for record in reader.records() {
        let record = record.map_err(|e| SiradError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?;
        if let Some(name) = record.get(0) {
            done.insert(name.to_string());
        }
    }
    Ok(done)
}
