//! Walks the layouts directory for dataset descriptors. Every regular file
//! found, at any depth, is parsed as a layout YAML document named after its
//! file stem — there's no extension filter, so a project can lay out its
//! layout files however it likes.

use std::path::Path;

use anyhow::{Context, Result};
use sirad_layout::{parse_layout, Dataset};

pub fn discover(layouts_dir: &Path) -> Result<Vec<Dataset>> {
    let mut paths = Vec::new();
    walk(layouts_dir, &mut paths)?;
    paths.sort();

    let mut datasets = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("layout file {} has no usable name", path.display()))?
            .to_string();
        let yaml = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read layout {}", path.display()))?;
        let dataset = parse_layout(&name, &yaml)
            .with_context(|| format!("failed to parse layout {}", path.display()))?;
        datasets.push(dataset);
    }
    Ok(datasets)
}

fn walk(dir: &Path, out: &mut Vec<std::path::PathBuf>) -> Result<()> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Ok(());
    };
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read directory {}", dir.display()))?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}
