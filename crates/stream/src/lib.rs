//! Streaming: tiles of the infinite field loaded around a moving viewer.
//!
//! # Invariants
//! - Unloading a tile loses nothing at generation 0; it regenerates identically.
//! - Every tile owns its random streams, so tiles generate and step in parallel.
//! - Per-frame load and unload work is bounded by the configured budgets.

mod budget;
mod field;

pub use budget::{FrameTimer, StreamConfig, StreamStats};
pub use field::{TileField, coords_in_radius};
