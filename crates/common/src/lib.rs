//! Shared types for the spacefield workspace.
//!
//! # Invariants
//! - Tile coordinates are plain 64-bit integers; no precision beyond that.
//! - A `FieldConfig` handed to the kernel has passed `validate()`.

mod config;
mod types;

pub use config::{ConfigError, FieldConfig, RuleKind};
pub use types::TileCoord;
