//! Page naming convention
//!
//! The library's only wire format: a base directory holding zero-padded
//! sequential filenames with a fixed extension (`image/007.png`).

use std::path::{Path, PathBuf};

/// Builds asset paths for sequential page indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNaming {
    dir: PathBuf,
    extension: String,
    pad_width: usize,
}

impl PageNaming {
    pub fn new<P: AsRef<Path>>(dir: P, extension: &str, pad_width: usize) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
            pad_width,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a 1-based page index: index 7 → `<dir>/007.<ext>`.
    pub fn path_for(&self, index: u32) -> PathBuf {
        self.dir.join(format!(
            "{index:0width$}.{ext}",
            width = self.pad_width,
            ext = self.extension
        ))
    }
}
