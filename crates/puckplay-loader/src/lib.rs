//! Puckplay Loader - Tracking data input for the playback engine
//!
//! Turns feed text into raw frame records for
//! [`FrameStore::load`](puckplay_core::FrameStore::load):
//!
//! - **Parsing**: JSON (the feed's native format) and RON, either as a bare
//!   frame list or wrapped in `{ "frames": [...] }`
//! - **Files**: format picked from the `.json` / `.ron` extension
//! - **Clip library**: per-goal clip files in a data directory, with a
//!   `sample` clip fallback
//!
//! # Example
//!
//! ```rust
//! use puckplay_core::FrameStore;
//!
//! let raw = puckplay_loader::parse_json(r#"[
//!     { "frame": 0, "time": 0.0, "onIce": { "1": { "id": 1, "x": 1200, "y": 510 } } }
//! ]"#)?;
//! let store = FrameStore::load(raw)?;
//! assert_eq!(store.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod clip;
mod error;
mod loader;

pub use clip::{ClipLibrary, ClipMeta, GoalClip, SAMPLE_CLIP};
pub use error::{Error, Result};
pub use loader::{load_store, parse_json, parse_ron, parse_str, read_frames, Format};
