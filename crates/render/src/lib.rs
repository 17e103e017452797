//! Rendering Adapter: renderer-agnostic tile output.
//!
//! # Invariants
//! - Renderers only read tile views; they never mutate a tile.
//! - Output derives from one tile view at one generation.
//!
//! The glyph renderer prints one glyph per cell and one line per row, which
//! is all a terminal needs. Other backends implement the same trait.

mod renderer;

pub use renderer::{FrameHeader, GlyphRenderer, Renderer};
