//! Small filesystem helpers shared by the writers: output-path construction,
//! create-on-demand directories, atomic file writes, and the
//! hard-link-or-copy fallback used when a dataset is excluded from the
//! research release.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Build `<subdir>/<project>_V<version>/<name>.txt`, creating the
/// intermediate directory if it doesn't exist.
pub fn output_path(subdir: &Path, project: &str, version: u32, name: &str) -> io::Result<PathBuf> {
    let dir = subdir.join(format!("{project}_V{version}"));
    fs::create_dir_all(&dir)?;
    Ok(dir.join(format!("{name}.txt")))
}

/// A file written atomically: content lands in a temp file next to the
/// destination and is only renamed into place on [`AtomicFile::commit`].
/// A writer that is dropped without committing leaves the destination
/// untouched.
pub struct AtomicFile {
    dest: PathBuf,
    tmp: NamedTempFile,
}

impl AtomicFile {
    pub fn create(dest: impl Into<PathBuf>) -> io::Result<Self> {
        let dest = dest.into();
        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let tmp = NamedTempFile::new_in(dir)?;
        Ok(Self { dest, tmp })
    }

    pub fn commit(self) -> io::Result<()> {
        self.tmp.persist(&self.dest).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tmp.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.tmp.flush()
    }
}

/// Hard-link `src` at `dest`, falling back to a byte copy when the paths
/// span filesystems (hard-link unavailable). Any existing file at `dest` is
/// removed first so re-running a release doesn't fail on an existing link.
pub fn link_or_copy(src: &Path, dest: &Path) -> io::Result<()> {
    if dest.exists() {
        fs::remove_file(dest)?;
    }
    match fs::hard_link(src, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(src, dest)?;
            Ok(())
        }
    }
}
