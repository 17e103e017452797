use std::collections::{HashMap, HashSet};
use std::time::Instant;

use rayon::prelude::*;
use spacefield_common::{FieldConfig, TileCoord};
use spacefield_kernel::WorldTile;

use crate::budget::{StreamConfig, StreamStats};

/// The infinite field, materialized only around a viewer.
///
/// Tiles within `preload_radius` of the viewer are generated (nearest first,
/// at most `load_budget` per update); tiles outside it are dropped (farthest
/// first, at most `unload_budget` per update). Tiles within `active_radius`
/// are stepped by [`TileField::step_active`].
#[derive(Debug)]
pub struct TileField {
    pub config: StreamConfig,
    base_seed: u32,
    field_config: FieldConfig,
    tiles: HashMap<TileCoord, WorldTile>,
    stats: StreamStats,
}

impl TileField {
    /// Panics if `field_config` is invalid.
    pub fn new(base_seed: u32, field_config: FieldConfig, config: StreamConfig) -> Self {
        if let Err(e) = field_config.validate() {
            panic!("invalid field config: {e}");
        }
        Self {
            config,
            base_seed,
            field_config,
            tiles: HashMap::new(),
            stats: StreamStats::default(),
        }
    }

    pub fn base_seed(&self) -> u32 {
        self.base_seed
    }

    /// Update streaming around the viewer's tile.
    /// Returns the tiles generated and dropped this update.
    pub fn update(&mut self, viewer: TileCoord) -> (Vec<TileCoord>, Vec<TileCoord>) {
        let _span = tracing::info_span!("field_update", %viewer).entered();
        let frame_start = Instant::now();

        let desired = coords_in_radius(viewer, self.config.preload_radius);
        let desired_set: HashSet<TileCoord> = desired.iter().copied().collect();

        let missing: Vec<TileCoord> = desired
            .iter()
            .filter(|c| !self.tiles.contains_key(*c))
            .copied()
            .collect();
        let to_load: Vec<TileCoord> = missing
            .iter()
            .take(self.config.load_budget)
            .copied()
            .collect();

        let mut to_unload: Vec<TileCoord> = self
            .tiles
            .keys()
            .filter(|c| !desired_set.contains(*c))
            .copied()
            .collect();
        // Farthest first; ties broken by coordinate so the order is stable.
        to_unload.sort_by_key(|c| (std::cmp::Reverse(c.ring_distance(viewer)), *c));
        to_unload.truncate(self.config.unload_budget);

        let seed = self.base_seed;
        let field_config = &self.field_config;
        let generated: Vec<(TileCoord, WorldTile)> = to_load
            .par_iter()
            .map(|&c| (c, WorldTile::with_config(seed, c, field_config)))
            .collect();

        for (c, tile) in generated {
            tracing::debug!(%c, "loading tile");
            self.tiles.insert(c, tile);
        }
        for c in &to_unload {
            tracing::debug!(%c, "unloading tile");
            self.tiles.remove(c);
        }

        self.stats = StreamStats {
            tiles_loaded_this_frame: to_load.len(),
            tiles_unloaded_this_frame: to_unload.len(),
            total_loaded_tiles: self.tiles.len(),
            pending_loads: missing.len() - to_load.len(),
            tiles_stepped_this_frame: 0,
            frame_time: frame_start.elapsed(),
        };

        tracing::trace!(
            loaded = to_load.len(),
            unloaded = to_unload.len(),
            total = self.tiles.len(),
            "field update complete"
        );

        (to_load, to_unload)
    }

    /// Step every loaded, non-extinct tile within `active_radius` of the viewer.
    /// Returns how many of them are still alive afterwards.
    pub fn step_active(&mut self, viewer: TileCoord) -> usize {
        let radius = self.config.active_radius;
        let (stepped, alive) = self
            .tiles
            .par_iter_mut()
            .filter(|(c, tile)| c.ring_distance(viewer) <= radius && !tile.is_extinct())
            .map(|(_, tile)| (1, usize::from(tile.step())))
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));
        self.stats.tiles_stepped_this_frame = stepped;
        alive
    }

    /// Loaded tiles within `active_radius` of the viewer, sorted.
    pub fn active_coords(&self, viewer: TileCoord) -> Vec<TileCoord> {
        let mut coords: Vec<TileCoord> = self
            .tiles
            .keys()
            .filter(|c| c.ring_distance(viewer) <= self.config.active_radius)
            .copied()
            .collect();
        coords.sort();
        coords
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&WorldTile> {
        self.tiles.get(&coord)
    }

    pub fn is_loaded(&self, coord: TileCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    /// All loaded tile coordinates, sorted.
    pub fn loaded_coords(&self) -> Vec<TileCoord> {
        let mut coords: Vec<TileCoord> = self.tiles.keys().copied().collect();
        coords.sort();
        coords
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Statistics from the last update.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }
}

/// Every tile within a square radius of `center`, nearest ring first.
pub fn coords_in_radius(center: TileCoord, radius: u64) -> Vec<TileCoord> {
    let r = radius as i64;
    let mut coords: Vec<TileCoord> = (-r..=r)
        .flat_map(|dy| (-r..=r).map(move |dx| center.offset(dx, dy)))
        .collect();
    coords.sort_by_key(|c| (c.ring_distance(center), *c));
    coords
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(config: StreamConfig) -> TileField {
        TileField::new(0x5EED, FieldConfig::default(), config)
    }

    #[test]
    fn coords_in_radius_is_nearest_first() {
        let coords = coords_in_radius(TileCoord::new(3, 3), 1);
        assert_eq!(coords.len(), 9);
        assert_eq!(coords[0], TileCoord::new(3, 3));
        assert!(coords[1..].iter().all(|c| c.ring_distance(TileCoord::new(3, 3)) == 1));
    }

    #[test]
    fn update_respects_load_budget() {
        let mut f = field(StreamConfig {
            active_radius: 0,
            preload_radius: 1,
            load_budget: 4,
            unload_budget: 4,
        });
        let (loaded, unloaded) = f.update(TileCoord::ORIGIN);
        assert_eq!(loaded.len(), 4);
        assert!(unloaded.is_empty());
        assert!(f.is_loaded(TileCoord::ORIGIN));
        assert_eq!(f.stats().pending_loads, 5);

        f.update(TileCoord::ORIGIN);
        f.update(TileCoord::ORIGIN);
        assert_eq!(f.len(), 9);
        assert_eq!(f.stats().pending_loads, 0);
    }

    #[test]
    fn moving_viewer_unloads_far_tiles() {
        let mut f = field(StreamConfig {
            active_radius: 0,
            preload_radius: 0,
            load_budget: 10,
            unload_budget: 10,
        });
        f.update(TileCoord::ORIGIN);
        let (loaded, unloaded) = f.update(TileCoord::new(100, 100));
        assert_eq!(loaded, vec![TileCoord::new(100, 100)]);
        assert_eq!(unloaded, vec![TileCoord::ORIGIN]);
        assert_eq!(f.loaded_coords(), vec![TileCoord::new(100, 100)]);
    }

    #[test]
    fn unload_budget_drops_farthest_first() {
        let mut f = field(StreamConfig {
            active_radius: 0,
            preload_radius: 2,
            load_budget: 25,
            unload_budget: 1,
        });
        f.update(TileCoord::ORIGIN);
        let (_, unloaded) = f.update(TileCoord::new(1, 0));
        assert_eq!(unloaded.len(), 1);
        assert_eq!(unloaded[0].x, -2);
    }

    #[test]
    fn streamed_tiles_match_direct_generation() {
        let mut f = field(StreamConfig::default());
        f.update(TileCoord::new(-4, 9));
        let direct = WorldTile::new(0x5EED, TileCoord::new(-3, 10));
        let streamed = f.tile(TileCoord::new(-3, 10)).unwrap();
        assert_eq!(streamed.state_hash(), direct.state_hash());
    }

    #[test]
    fn reloaded_tile_is_identical() {
        let mut f = field(StreamConfig {
            active_radius: 0,
            preload_radius: 0,
            load_budget: 1,
            unload_budget: 1,
        });
        f.update(TileCoord::ORIGIN);
        let before = f.tile(TileCoord::ORIGIN).unwrap().state_hash();
        f.update(TileCoord::new(50, 0));
        assert!(!f.is_loaded(TileCoord::ORIGIN));
        f.update(TileCoord::ORIGIN);
        assert_eq!(f.tile(TileCoord::ORIGIN).unwrap().state_hash(), before);
    }

    #[test]
    fn step_active_only_steps_active_tiles() {
        let mut f = field(StreamConfig {
            active_radius: 0,
            preload_radius: 1,
            load_budget: 9,
            unload_budget: 9,
        });
        f.update(TileCoord::ORIGIN);
        f.step_active(TileCoord::ORIGIN);
        assert_eq!(f.stats().tiles_stepped_this_frame, 1);
        f.update(TileCoord::ORIGIN);
        assert_eq!(f.stats().tiles_stepped_this_frame, 0);
        f.step_active(TileCoord::ORIGIN);

        assert_eq!(f.active_coords(TileCoord::ORIGIN), vec![TileCoord::ORIGIN]);
        assert_eq!(f.stats().tiles_stepped_this_frame, 1);
        assert_eq!(f.tile(TileCoord::ORIGIN).unwrap().generation(), 2);
        assert_eq!(f.tile(TileCoord::new(1, 1)).unwrap().generation(), 0);
    }

    #[test]
    fn parallel_stepping_matches_serial() {
        let mut f = field(StreamConfig::default());
        f.update(TileCoord::ORIGIN);
        for _ in 0..5 {
            f.step_active(TileCoord::ORIGIN);
        }
        let mut serial = WorldTile::new(0x5EED, TileCoord::new(1, -1));
        serial.step_n(5);
        let streamed = f.tile(TileCoord::new(1, -1)).unwrap();
        assert_eq!(streamed.generation(), serial.generation());
        assert_eq!(streamed.state_hash(), serial.state_hash());
    }

    #[test]
    #[should_panic(expected = "invalid field config")]
    fn invalid_field_config_panics() {
        let config = FieldConfig {
            composite_factor: 0,
            ..FieldConfig::default()
        };
        TileField::new(0, config, StreamConfig::default());
    }
}
