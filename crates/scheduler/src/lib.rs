//! InkStrip Scheduler Library
//!
//! Cancellable timer handles for the viewer's event wiring.
//!
//! The viewer has exactly two timer-based behaviors: scroll events are
//! debounced into a single settle evaluation, and the end-of-chapter
//! dialog is held back by a one-shot delay. Both are modelled as explicit
//! handles owned by the caller and polled with `now` timestamps, so the
//! surrounding logic stays deterministic under test: no background
//! threads, no wall clock.
//!
//! # Example
//!
//! ```
//! use inkstrip_scheduler::{DebounceTimer, DelayTimer};
//!
//! let mut settle = DebounceTimer::new(100);
//! let mut dialog = DelayTimer::new();
//!
//! // Scroll events arm the debounce; each new event replaces the
//! // pending deadline.
//! settle.arm(0);
//! settle.arm(50);
//!
//! if settle.fire(150) {
//!     // Scroll has settled; give the reader a moment before the dialog.
//!     dialog.schedule(150, 1000);
//! }
//!
//! assert!(dialog.fire(1150));
//! ```

mod debounce;
mod delay;

pub use debounce::DebounceTimer;
pub use delay::DelayTimer;
