use std::path::PathBuf;

use serde::Deserialize;

/// Tokens treated as semantic null when reading a raw cell.
pub const NULL_VALUES: &[&str] = &[
    "", "NULL", "null", "NA", "na", "N/A", "#N/A", "NaN", "nan", ".", "#NULL!",
];

pub fn is_null(raw: &str) -> bool {
    NULL_VALUES.contains(&raw)
}

/// Process-global configuration, threaded explicitly rather than stored in a
/// singleton (see the design's notes on global mutable state): every
/// constructor that needs a directory, a salt, or the random seed takes a
/// `&Config`.
#[derive(Debug, Clone)]
pub struct Config {
    pub layouts_dir: PathBuf,
    pub raw_dir: PathBuf,
    pub data_dir: PathBuf,
    pub pii_dir: PathBuf,
    pub link_dir: PathBuf,
    pub research_dir: PathBuf,
    pub version: u32,
    pub project: String,
    pub data_salt: Option<String>,
    pub pii_salt: Option<String>,
    pub process_log: PathBuf,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = PathBuf::from("data");
        let process_log = data_dir.join("sirad.log");
        Config {
            layouts_dir: PathBuf::from("layouts"),
            raw_dir: PathBuf::from("raw"),
            data_dir,
            pii_dir: PathBuf::from("pii"),
            link_dir: PathBuf::from("link"),
            research_dir: PathBuf::from("research"),
            version: 1,
            project: String::new(),
            data_salt: None,
            pii_salt: None,
            process_log,
            seed: None,
        }
    }
}

/// Shape of the optional `sirad_config.yaml` override file picked up from
/// the working directory; every field is optional so a project only has to
/// override what it needs.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub layouts_dir: Option<PathBuf>,
    pub raw_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub pii_dir: Option<PathBuf>,
    pub link_dir: Option<PathBuf>,
    pub research_dir: Option<PathBuf>,
    pub version: Option<u32>,
    pub project: Option<String>,
    pub data_salt: Option<String>,
    pub pii_salt: Option<String>,
    pub process_log: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl Config {
    /// Apply a parsed override file on top of the defaults. `process_log`
    /// defaults from `data_dir`/`project`/`version` when not explicitly set,
    /// matching the original tool's derived default.
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(v) = overrides.layouts_dir {
            self.layouts_dir = v;
        }
        if let Some(v) = overrides.raw_dir {
            self.raw_dir = v;
        }
        if let Some(v) = overrides.data_dir {
            self.data_dir = v;
        }
        if let Some(v) = overrides.pii_dir {
            self.pii_dir = v;
        }
        if let Some(v) = overrides.link_dir {
            self.link_dir = v;
        }
        if let Some(v) = overrides.research_dir {
            self.research_dir = v;
        }
        if let Some(v) = overrides.version {
            self.version = v;
        }
        if let Some(v) = overrides.project {
            self.project = v;
        }
        if overrides.data_salt.is_some() {
            self.data_salt = overrides.data_salt;
        }
        if overrides.pii_salt.is_some() {
            self.pii_salt = overrides.pii_salt;
        }
        if let Some(v) = overrides.seed {
            self.seed = Some(v);
        }
        self.process_log = overrides.process_log.unwrap_or_else(|| {
            self.data_dir
                .join(format!("{}_V{}.sirad.log", self.project, self.version))
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_set_matches_spec() {
        for token in [
            "", "NULL", "null", "NA", "na", "N/A", "#N/A", "NaN", "nan", ".", "#NULL!",
        ] {
            assert!(is_null(token), "{token:?} should be null");
        }
        assert!(!is_null("0"));
        assert!(!is_null("none"));
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let cfg = Config::default().apply(ConfigOverrides {
            project: Some("Proj".into()),
            version: Some(3),
            data_salt: Some("s1".into()),
            ..Default::default()
        });
        assert_eq!(cfg.project, "Proj");
        assert_eq!(cfg.version, 3);
        assert_eq!(cfg.data_salt.as_deref(), Some("s1"));
        assert_eq!(cfg.process_log, cfg.data_dir.join("Proj_V3.sirad.log"));
    }
}
