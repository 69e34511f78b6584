mod cli;
mod layouts;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use sirad_core::{Config, ConfigOverrides};
use sirad_layout::Dataset;
use sirad_pipeline::{completed_datasets, load_pii_rows, process_dataset, resolve, write_release, PiiRow};

use cli::{Cli, Command};

const CONFIG_FILE: &str = "sirad_config.yaml";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.debug);

    if let Err(err) = run(cli) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn init_logging(quiet: bool, debug: bool) {
    let level = if quiet {
        log::LevelFilter::Error
    } else if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn run(cli: Cli) -> Result<()> {
    if cli.workers > 1 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.workers)
            .build_global()
            .context("failed to size the worker pool")?;
    }

    let cfg = load_config()?;
    let datasets = layouts::discover(&cfg.layouts_dir)
        .with_context(|| format!("failed to load layouts from {}", cfg.layouts_dir.display()))?;
    if datasets.is_empty() {
        warn!("no layouts found under {}", cfg.layouts_dir.display());
    }

    match cli.command {
        Command::Sources => run_sources(&cfg, &datasets),
        Command::Validate => run_validate(&cfg, &datasets),
        Command::Process => run_process(&cfg, &datasets),
        Command::Research { seed } => run_research(&cfg, &datasets, seed),
    }
}

fn load_config() -> Result<Config> {
    let path = PathBuf::from(CONFIG_FILE);
    let mut cfg = Config::default();
    if path.exists() {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let overrides: ConfigOverrides = serde_yaml_ng::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        cfg = cfg.apply(overrides);
    } else {
        cfg = cfg.apply(ConfigOverrides::default());
        debug!("no {CONFIG_FILE} found, using defaults");
    }
    Ok(cfg)
}

fn raw_path(cfg: &Config, dataset: &Dataset) -> PathBuf {
    cfg.raw_dir.join(&dataset.source)
}

fn run_sources(cfg: &Config, datasets: &[Dataset]) -> Result<()> {
    for dataset in datasets {
        println!("{}\t{}", dataset.name, raw_path(cfg, dataset).display());
    }
    Ok(())
}

fn run_validate(cfg: &Config, datasets: &[Dataset]) -> Result<()> {
    let mut warnings = 0usize;
    for dataset in datasets {
        let path = raw_path(cfg, dataset);
        match sirad_io::RowSource::open(dataset, &path) {
            Ok(_) => info!("{}: source opens and its field count matches the layout", dataset.name),
            Err(err) => {
                warn!("{}: {err}", dataset.name);
                warnings += 1;
            }
        }
    }
    if warnings > 0 {
        bail!("{warnings} dataset(s) failed validation");
    }
    Ok(())
}

fn run_process(cfg: &Config, datasets: &[Dataset]) -> Result<()> {
    let done = completed_datasets(&cfg.process_log).context("failed to read the process log")?;
    let pending: Vec<&Dataset> = datasets.iter().filter(|d| !done.contains(&d.name)).collect();

    let results: Vec<(String, Result<()>)> = pending
        .par_iter()
        .map(|dataset| {
            let path = raw_path(cfg, dataset);
            let outcome = process_dataset(dataset, cfg, &path, cfg.seed)
                .with_context(|| format!("failed to process dataset '{}'", dataset.name));
            match &outcome {
                Ok(out) => info!(
                    "{}: {} rows written, {} rows dropped for arity mismatch{}",
                    dataset.name,
                    out.nrows,
                    out.skipped,
                    match out.effective_seed {
                        Some(seed) => format!(", pii shuffle seed {seed}"),
                        None => String::new(),
                    }
                ),
                Err(err) => error!("{err:#}"),
            }
            (dataset.name.clone(), outcome.map(|_| ()))
        })
        .collect();

    let failed: Vec<&str> = results
        .iter()
        .filter_map(|(name, r)| r.is_err().then_some(name.as_str()))
        .collect();
    if !failed.is_empty() {
        bail!("{} dataset(s) failed during processing: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}

fn run_research(cfg: &Config, datasets: &[Dataset], seed: Option<u64>) -> Result<()> {
    let seed = seed.or(cfg.seed);

    let mut pii_rows: Vec<PiiRow> = Vec::new();
    for dataset in datasets.iter().filter(|d| d.has_pii) {
        let pii_path = sirad_fs::output_path(&cfg.pii_dir, &cfg.project, cfg.version, &dataset.name)
            .with_context(|| format!("no pii file for dataset '{}' — run process first", dataset.name))?;
        pii_rows.extend(
            load_pii_rows(dataset, &pii_path)
                .with_context(|| format!("failed to read pii file for dataset '{}'", dataset.name))?,
        );
    }

    let resolved = resolve(pii_rows, seed);
    info!("resolver key-permutation seed: {}", resolved.effective_seed);
    for (name, stats) in &resolved.stats {
        info!(
            "{name}: {} pii rows, {} ssn fills, {} ssn keys, {} dob/name keys, {} ids assigned",
            stats.n_all_pii, stats.n_ssn_fills, stats.n_ssn_keys, stats.n_dobn_keys, stats.n_ids
        );
    }

    for dataset in datasets {
        let data_path = sirad_fs::output_path(&cfg.data_dir, &cfg.project, cfg.version, &dataset.name)
            .with_context(|| format!("no data file for dataset '{}' — run process first", dataset.name))?;

        if dataset.has_pii {
            let link_path = sirad_fs::output_path(&cfg.link_dir, &cfg.project, cfg.version, &dataset.name)
                .with_context(|| format!("no link file for dataset '{}'", dataset.name))?;
            let link_rows = read_link_rows(&link_path)
                .with_context(|| format!("failed to read link file for dataset '{}'", dataset.name))?;
            let sirad_ids: std::collections::HashMap<u64, u64> = resolved
                .sirad_ids
                .iter()
                .filter(|((dsn, _), _)| dsn == &dataset.name)
                .map(|((_, pii_id), sirad_id)| (*pii_id, *sirad_id))
                .collect();
            let dest = write_release(dataset, cfg, &data_path, Some(&link_rows), Some(&sirad_ids))
                .with_context(|| format!("failed to write research release for '{}'", dataset.name))?;
            info!("{}: research file written to {}", dataset.name, dest.display());
        } else {
            let dest = write_release(dataset, cfg, &data_path, None, None)
                .with_context(|| format!("failed to write research release for '{}'", dataset.name))?;
            info!("{}: carried through unchanged to {}", dataset.name, dest.display());
        }
    }

    Ok(())
}

fn read_link_rows(path: &std::path::Path) -> Result<Vec<(u64, u64)>> {
    let file = std::fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new().delimiter(b'|').from_reader(file);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let record_id: u64 = record.get(0).context("link row missing record_id")?.parse()?;
        let pii_id: u64 = record.get(1).context("link row missing pii_id")?.parse()?;
        rows.push((record_id, pii_id));
    }
    Ok(rows)
}
