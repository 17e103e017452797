//! Tile Kernel: per-tile seeding, composite construction, automaton stepping.
//!
//! # Invariants
//! - A tile is a pure function of (base seed, coordinate, config, generation).
//! - Every tile owns its random streams; nothing here touches a global RNG.
//! - Grids never change size after construction.

pub mod grid;
pub mod rule;
pub mod seed;
pub mod tile;

pub use grid::{Grid, TileView};
pub use rule::{BIRTH_DRAW, ConwayRule, NeighborRule, StochasticRule, rule_for};
pub use seed::{DerivedSeed, SeedParseError, cantor_pair, derive, parse_seed, zigzag};
pub use tile::{RandomStream, WorldTile};
