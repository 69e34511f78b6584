use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sirad", author, version, about = "Split and anonymize administrative records, then resolve a cross-dataset SIRAD ID", long_about = None)]
pub struct Cli {
    /// Number of worker threads to use for the process and validate phases
    #[arg(short = 'n', long = "workers", default_value_t = 1)]
    pub workers: usize,

    /// Suppress all logging messages except errors
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Show all logging messages, including debug output
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List each dataset's resolved raw source path
    Sources,
    /// Check each dataset's source header against its layout
    Validate,
    /// Split every dataset into data/pii/link files, skipping ones already in the process log
    Process,
    /// Pool pii across datasets, resolve the SIRAD ID, and write the research release
    Research {
        /// Random seed for reproducible SIRAD ID assignment (unset draws from OS entropy)
        #[arg(long)]
        seed: Option<u64>,
    },
}
