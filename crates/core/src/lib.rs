//! InkStrip Core Library
//!
//! Library discovery and session plumbing for the strip viewer.

pub mod config;
pub mod library;
pub mod loader;
pub mod naming;

pub use config::{ConfigError, PlatformLink, ViewerConfig};
pub use library::{
    discover_pages, open_library, AssetProbe, FsProbe, LibraryError, LibraryResult, PageAsset,
    DEFAULT_MISS_LIMIT,
};
pub use loader::{LoadEvent, PageLoader};
pub use naming::PageNaming;
