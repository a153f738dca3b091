//! Background page loader
//!
//! Runs discovery and image decoding off the UI thread and streams
//! results over a channel. Event order is fixed: one `Discovered`, then
//! one `PageDecoded` or `PageFailed` per page in page order, then
//! `Finished`. Discovery always completes fully before the first decode
//! starts. There is no cancellation; an abandoned loader just finishes
//! into a disconnected channel.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::library::{self, LibraryError, PageAsset};
use crate::naming::PageNaming;

#[derive(Debug)]
pub enum LoadEvent {
    /// Discovery finished; the page list is final for this session.
    Discovered { pages: Vec<PageAsset> },
    /// One page decoded to raw RGBA, tagged with its 1-based number.
    PageDecoded { page: u32, width: u32, height: u32, rgba: Vec<u8> },
    /// The file existed at discovery time but did not decode; the page
    /// keeps its slot.
    PageFailed { page: u32, path: PathBuf },
    /// All pages processed.
    Finished,
    /// The library could not be opened at all.
    Failed(LibraryError),
}

/// Handle to the loader thread. The UI drains events each frame with
/// `try_next`; dropping the handle abandons the thread.
pub struct PageLoader {
    rx: Receiver<LoadEvent>,
}

impl PageLoader {
    pub fn spawn(naming: PageNaming, miss_limit: u32) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || run(naming, miss_limit, tx));
        Self { rx }
    }

    /// Drain one pending event without blocking.
    pub fn try_next(&self) -> Option<LoadEvent> {
        self.rx.try_recv().ok()
    }
}

fn run(naming: PageNaming, miss_limit: u32, tx: Sender<LoadEvent>) {
    let pages = match library::open_library(&naming, miss_limit) {
        Ok(pages) => pages,
        Err(e) => {
            let _ = tx.send(LoadEvent::Failed(e));
            return;
        }
    };

    if tx.send(LoadEvent::Discovered { pages: pages.clone() }).is_err() {
        return;
    }

    for (position, asset) in pages.iter().enumerate() {
        let page = position as u32 + 1;

        let event = match image::open(&asset.path) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                let (width, height) = rgba.dimensions();
                LoadEvent::PageDecoded { page, width, height, rgba: rgba.into_raw() }
            }
            Err(e) => {
                log::warn!("failed to decode {}: {}", asset.path.display(), e);
                LoadEvent::PageFailed { page, path: asset.path.clone() }
            }
        };

        if tx.send(event).is_err() {
            return;
        }
    }

    let _ = tx.send(LoadEvent::Finished);
}
