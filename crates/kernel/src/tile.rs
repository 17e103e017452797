use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spacefield_common::{ConfigError, FieldConfig, TileCoord};

use crate::grid::{Grid, TileView};
use crate::rule::{NeighborRule, rule_for};
use crate::seed::{DerivedSeed, derive};

/// Random stream type used for seeded tiles.
pub type RandomStream = ChaCha8Rng;

/// One tile of the infinite field, simulated inside its composite.
///
/// The composite is `composite_factor` x `composite_factor` sub-blocks of
/// `tile_width` cells each. Sub-block `(dx, dy)` holds world tile
/// `(x + dx, y + dy)`, seeded from that tile's own derived seed, so the
/// neighbors a tile simulates at generation 0 are bit-identical to those
/// tiles generated on their own. Only the middle sub-block is rendered; the
/// rest exist so border cells see real neighbors.
///
/// Every sub-block owns one random stream, used first to scatter the initial
/// population and then for the rule's draws on cells inside that sub-block.
#[derive(Debug)]
pub struct WorldTile<R = RandomStream> {
    coord: TileCoord,
    base_seed: u32,
    config: FieldConfig,
    grid: Grid,
    /// Next generation is written here, then swapped in.
    scratch: Grid,
    /// Row-major by sub-block, `(dy + r) * factor + (dx + r)`.
    streams: Vec<R>,
    rule: Box<dyn NeighborRule>,
    generation: u64,
    extinct: bool,
}

impl WorldTile<RandomStream> {
    /// Tile with the default config.
    pub fn new(base_seed: u32, coord: TileCoord) -> Self {
        Self::with_config(base_seed, coord, &FieldConfig::default())
    }

    /// Tile with an explicit config. Panics if the config is invalid.
    pub fn with_config(base_seed: u32, coord: TileCoord, config: &FieldConfig) -> Self {
        Self::seeded(base_seed, coord, config)
    }

    /// Tile with an explicit config, reporting an invalid config as an error.
    pub fn try_new(
        base_seed: u32,
        coord: TileCoord,
        config: &FieldConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::seeded(base_seed, coord, config))
    }
}

impl<R: RngCore + SeedableRng> WorldTile<R> {
    /// Seed one `R` per sub-block from that sub-block's derived seed and build the tile.
    pub fn seeded(base_seed: u32, coord: TileCoord, config: &FieldConfig) -> Self {
        assert_valid(config);
        let streams = sub_block_offsets(config.radius())
            .map(|(dx, dy)| {
                let seed = derive(base_seed, coord.x.wrapping_add(dx), coord.y.wrapping_add(dy));
                R::seed_from_u64(u64::from(seed))
            })
            .collect();
        Self::from_streams(base_seed, coord, config, streams)
    }
}

impl<R: RngCore> WorldTile<R> {
    /// Build a tile on caller-supplied streams, one per sub-block in row-major
    /// order starting at `(-r, -r)`.
    pub fn from_streams(
        base_seed: u32,
        coord: TileCoord,
        config: &FieldConfig,
        streams: Vec<R>,
    ) -> Self {
        assert_valid(config);
        let width = config.composite_width();
        let mut tile = Self::from_parts(base_seed, coord, config, Grid::new(width, width), streams);
        tile.scatter();

        tracing::debug!(
            %coord,
            base_seed = %DerivedSeed(base_seed),
            center_seed = %tile.center_seed(),
            population = tile.grid.population(),
            "tile constructed"
        );
        tile
    }

    fn from_parts(
        base_seed: u32,
        coord: TileCoord,
        config: &FieldConfig,
        grid: Grid,
        streams: Vec<R>,
    ) -> Self {
        assert_eq!(
            streams.len(),
            config.sub_block_count(),
            "one random stream per sub-block"
        );
        let width = config.composite_width();
        assert_eq!((grid.width(), grid.height()), (width, width), "composite size");
        Self {
            coord,
            base_seed,
            config: config.clone(),
            scratch: Grid::new(width, width),
            grid,
            streams,
            rule: rule_for(config),
            generation: 0,
            extinct: false,
        }
    }

    /// Scatter the initial population, each sub-block from its own stream.
    fn scatter(&mut self) {
        let mask = self.config.scatter_mask();
        let tile_width = self.config.tile_width;
        let factor = self.config.composite_factor;
        for (block, stream) in self.streams.iter_mut().enumerate() {
            let col0 = (block % factor) * tile_width;
            let row0 = (block / factor) * tile_width;
            for _ in 0..self.config.live_cells_per_sub_block {
                let col = (stream.next_u32() & mask) as usize;
                let row = (stream.next_u32() & mask) as usize;
                self.grid.set(col0 + col, row0 + row, true);
            }
        }
    }

    /// Advance the whole composite one generation.
    ///
    /// Neighbor counts come from the previous generation only; the new
    /// generation is committed all at once. Draws come from the stream of the
    /// sub-block the cell lies in, even for cells on a sub-block border.
    /// Returns `false` when no cell had any live neighbor, i.e. the composite
    /// was already empty going into this step.
    pub fn step(&mut self) -> bool {
        let width = self.grid.width();
        let tile_width = self.config.tile_width;
        let factor = self.config.composite_factor;
        let mut total_neighbors: u64 = 0;

        for row in 0..width {
            for col in 0..width {
                let n = self.grid.live_neighbors(col, row);
                total_neighbors += u64::from(n);

                let draw = if self.rule.wants_draw(n) {
                    let block = (row / tile_width) * factor + col / tile_width;
                    Some(self.streams[block].next_u32())
                } else {
                    None
                };
                let next = self.rule.decide(self.grid.get(col, row), n, draw);
                self.scratch.set(col, row, next);
            }
        }

        std::mem::swap(&mut self.grid, &mut self.scratch);
        self.generation += 1;
        let was_extinct = self.extinct;
        self.extinct = total_neighbors == 0;

        tracing::trace!(
            coord = %self.coord,
            generation = self.generation,
            population = self.grid.population(),
            "tile stepped"
        );
        if self.extinct && !was_extinct {
            tracing::info!(coord = %self.coord, generation = self.generation, "tile extinct");
        }
        !self.extinct
    }

    /// Step up to `n` times, stopping after the step that reports extinction.
    /// Returns the number of steps taken.
    pub fn step_n(&mut self, n: u64) -> u64 {
        for taken in 1..=n {
            if !self.step() {
                return taken;
            }
        }
        n
    }

    /// The tile itself: the middle sub-block of the composite.
    pub fn renderable_tile(&self) -> TileView<'_> {
        self.sub_block(0, 0)
    }

    /// Sub-block `(dx, dy)`, i.e. the simulated copy of tile `(x + dx, y + dy)`.
    ///
    /// Panics if either offset is outside the composite radius.
    pub fn sub_block(&self, dx: i64, dy: i64) -> TileView<'_> {
        let r = self.config.radius();
        assert!(
            (-r..=r).contains(&dx) && (-r..=r).contains(&dy),
            "sub-block offset ({dx}, {dy}) outside composite radius {r}"
        );
        let w = self.config.tile_width;
        self.grid.view((dx + r) as usize * w, (dy + r) as usize * w, w)
    }

    /// The whole composite.
    pub fn composite(&self) -> &Grid {
        &self.grid
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn base_seed(&self) -> u32 {
        self.base_seed
    }

    /// Seed of the tile itself (sub-block `(0, 0)`).
    pub fn center_seed(&self) -> DerivedSeed {
        DerivedSeed(derive(self.base_seed, self.coord.x, self.coord.y))
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Number of completed steps.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the last step reported extinction. Callers should stop stepping.
    pub fn is_extinct(&self) -> bool {
        self.extinct
    }

    /// Live cells across the whole composite.
    pub fn population(&self) -> usize {
        self.grid.population()
    }

    /// FNV-1a hash of coordinate, seed, generation and every composite cell.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.coord.x.to_le_bytes());
        mix(&mut h, &self.coord.y.to_le_bytes());
        mix(&mut h, &self.base_seed.to_le_bytes());
        mix(&mut h, &self.generation.to_le_bytes());
        for line in self.grid.rows() {
            for &alive in line {
                mix(&mut h, &[alive as u8]);
            }
        }
        h
    }
}

fn assert_valid(config: &FieldConfig) {
    if let Err(e) = config.validate() {
        panic!("invalid field config: {e}");
    }
}

/// `(dx, dy)` for every sub-block, row-major from `(-r, -r)`.
fn sub_block_offsets(r: i64) -> impl Iterator<Item = (i64, i64)> {
    (-r..=r).flat_map(move |dy| (-r..=r).map(move |dx| (dx, dy)))
}
