//! Sequential asset discovery
//!
//! Probes the naming convention from index 1 upward and stops after a run
//! of consecutive misses. A hit resets the failure streak; a miss advances
//! the index without recording anything. Discovery is strictly sequential
//! because the streak can only be evaluated in order.

use std::fs;
use std::path::{Path, PathBuf};

use crate::naming::PageNaming;

/// Misses in a row before the scan gives up.
pub const DEFAULT_MISS_LIMIT: u32 = 3;

/// Errors that can occur while opening a page library
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("library directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("library path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

pub type LibraryResult<T> = Result<T, LibraryError>;

/// One discovered page. `index` is the probed file number; the 1-based
/// page number is the asset's position in the discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAsset {
    pub index: u32,
    pub path: PathBuf,
}

/// Existence check seam. Production probes the filesystem; tests script
/// hit/miss sequences. Checks must be side-effect-free.
pub trait AssetProbe {
    fn exists(&mut self, path: &Path) -> bool;
}

/// Filesystem-backed probe.
#[derive(Debug, Default)]
pub struct FsProbe;

impl AssetProbe for FsProbe {
    fn exists(&mut self, path: &Path) -> bool {
        fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false)
    }
}

/// Scan the naming convention until `miss_limit` consecutive probes fail.
///
/// The returned list is ordered by index and is the session's immutable
/// page list; an empty result is the recognized empty-library condition,
/// not an error.
pub fn discover_pages(
    naming: &PageNaming,
    probe: &mut dyn AssetProbe,
    miss_limit: u32,
) -> Vec<PageAsset> {
    let mut pages = Vec::new();
    let mut index = 1u32;
    let mut consecutive_misses = 0u32;

    while consecutive_misses < miss_limit {
        let path = naming.path_for(index);

        if probe.exists(&path) {
            consecutive_misses = 0;
            pages.push(PageAsset { index, path });
        } else {
            consecutive_misses += 1;
        }

        index += 1;
    }

    log::debug!(
        "discovered {} page(s) under {} (stopped at index {})",
        pages.len(),
        naming.dir().display(),
        index - 1
    );

    pages
}

/// Validate the library directory, then discover its pages with the
/// filesystem probe.
pub fn open_library(naming: &PageNaming, miss_limit: u32) -> LibraryResult<Vec<PageAsset>> {
    let dir = naming.dir();

    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(LibraryError::NotADirectory(dir.to_path_buf())),
        Err(_) => return Err(LibraryError::DirectoryNotFound(dir.to_path_buf())),
    }

    Ok(discover_pages(naming, &mut FsProbe, miss_limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Probe scripted with the set of indices that "exist"; counts probes.
    struct ScriptedProbe {
        present: HashSet<PathBuf>,
        probes: u32,
    }

    impl ScriptedProbe {
        fn with_hits(naming: &PageNaming, hits: &[u32]) -> Self {
            Self {
                present: hits.iter().map(|&i| naming.path_for(i)).collect(),
                probes: 0,
            }
        }
    }

    impl AssetProbe for ScriptedProbe {
        fn exists(&mut self, path: &Path) -> bool {
            self.probes += 1;
            self.present.contains(path)
        }
    }

    fn naming() -> PageNaming {
        PageNaming::new("image", "png", 3)
    }

    fn indices(pages: &[PageAsset]) -> Vec<u32> {
        pages.iter().map(|p| p.index).collect()
    }

    #[test]
    fn short_gap_is_skipped_and_scan_continues() {
        let naming = naming();
        let mut probe = ScriptedProbe::with_hits(&naming, &[1, 2, 3, 5, 6]);

        let pages = discover_pages(&naming, &mut probe, DEFAULT_MISS_LIMIT);

        assert_eq!(indices(&pages), vec![1, 2, 3, 5, 6]);
        assert_eq!(pages.len(), 5);
        // 1h 2h 3h 4m 5h 6h 7m 8m 9m: the streak reset at 5 kept it going.
        assert_eq!(probe.probes, 9);
    }

    #[test]
    fn scan_halts_at_third_consecutive_miss() {
        let naming = naming();
        let mut probe = ScriptedProbe::with_hits(&naming, &[1, 2]);

        let pages = discover_pages(&naming, &mut probe, DEFAULT_MISS_LIMIT);

        assert_eq!(indices(&pages), vec![1, 2]);
        assert_eq!(probe.probes, 5); // halted after probing index 5
    }

    #[test]
    fn long_gap_hides_everything_beyond_it() {
        let naming = naming();
        let mut probe = ScriptedProbe::with_hits(&naming, &[1, 2, 6]);

        let pages = discover_pages(&naming, &mut probe, DEFAULT_MISS_LIMIT);

        assert_eq!(indices(&pages), vec![1, 2]);
    }

    #[test]
    fn missing_first_pages_yield_empty_library() {
        let naming = naming();
        let mut probe = ScriptedProbe::with_hits(&naming, &[]);

        let pages = discover_pages(&naming, &mut probe, DEFAULT_MISS_LIMIT);

        assert!(pages.is_empty());
        assert_eq!(probe.probes, 3);
    }

    #[test]
    fn fs_probe_discovers_real_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["001.png", "002.png", "003.png", "005.png"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        // Unrelated files are invisible to the naming convention.
        fs::write(dir.path().join("cover.jpg"), b"").unwrap();

        let naming = PageNaming::new(dir.path(), "png", 3);
        let pages = open_library(&naming, DEFAULT_MISS_LIMIT).unwrap();

        assert_eq!(indices(&pages), vec![1, 2, 3, 5]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let naming = PageNaming::new("/definitely/not/here", "png", 3);
        let err = open_library(&naming, DEFAULT_MISS_LIMIT).unwrap_err();
        assert!(matches!(err, LibraryError::DirectoryNotFound(_)));
    }
}
