//! Shared primitives for the sirad pipeline: configuration, the error type,
//! the null-value set, salted hashing, SSN validation, and Soundex. None of
//! these need to know about layout files or I/O, so they live below the
//! crates that do.

pub mod cell;
pub mod config;
pub mod error;
pub mod hash;
pub mod soundex;
pub mod ssn;

pub use cell::RawCell;
pub use config::{Config, ConfigOverrides, NULL_VALUES};
pub use error::{Result, SiradError};
pub use hash::salted_hash;
pub use soundex::soundex;
pub use ssn::validate_ssn;
