//! Orchestration layer: drives one dataset through the splitter and
//! process writer, pools pii across datasets through the resolver, and
//! assembles the research release. Nothing here is CLI-specific — the
//! binary crate only adds argument parsing, logging setup, and the worker
//! pool.

pub mod process;
pub mod release;
pub mod resolver;
pub mod splitter;

pub use process::{completed_datasets, process_dataset, ProcessOutcome};
pub use release::write_release;
pub use resolver::{load_pii_rows, resolve, DatasetStats, PiiRow, ResolverOutput};
pub use splitter::Splitter;
