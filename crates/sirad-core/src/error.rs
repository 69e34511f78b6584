use std::path::PathBuf;

/// The error kinds from the design's error-handling section. `SourceShape`
/// and `Parse` are deliberately never constructed as hard failures by this
/// crate's own callers — they're dropped-and-counted or logged at debug —
/// but the variants exist so a caller that *does* want to surface them (e.g.
/// `validate`) has a typed way to.
#[derive(Debug, thiserror::Error)]
pub enum SiradError {
    #[error("layout error in dataset '{dataset}': {message}")]
    Layout { dataset: String, message: String },

    #[error("source row in dataset '{dataset}' has {got} fields, expected {expected}")]
    SourceShape {
        dataset: String,
        expected: usize,
        got: usize,
    },

    #[error("failed to parse '{raw}' as a date using format '{format}'")]
    Parse { raw: String, format: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SiradError>;
