use spacefield_common::TileCoord;
use spacefield_kernel::{DerivedSeed, TileView, WorldTile};

/// Renderer-agnostic interface. All renderers implement this trait.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one tile view.
    fn render(&self, tile: &TileView<'_>) -> Self::Output;
}

/// Text renderer: one glyph per cell, newline per row.
///
/// The default look puts a space before every cell and draws live cells as
/// `*`, which keeps the field roughly square in a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphRenderer {
    pub live: char,
    pub dead: char,
    /// Printed before every cell when set.
    pub spacer: Option<char>,
}

impl Default for GlyphRenderer {
    fn default() -> Self {
        Self {
            live: '*',
            dead: ' ',
            spacer: Some(' '),
        }
    }
}

impl GlyphRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compact variant without spacers.
    pub fn compact(live: char, dead: char) -> Self {
        Self {
            live,
            dead,
            spacer: None,
        }
    }

    /// Render with a header line above the grid.
    pub fn render_framed(&self, tile: &TileView<'_>, header: &FrameHeader) -> String {
        let mut out = format!("{header}\n");
        out.push_str(&self.render(tile));
        out
    }
}

impl Renderer for GlyphRenderer {
    type Output = String;

    fn render(&self, tile: &TileView<'_>) -> String {
        let per_cell = if self.spacer.is_some() { 2 } else { 1 };
        let mut out = String::with_capacity(tile.size() * (tile.size() * per_cell + 1));
        for row in tile.rows() {
            for &alive in row {
                if let Some(spacer) = self.spacer {
                    out.push(spacer);
                }
                out.push(if alive { self.live } else { self.dead });
            }
            out.push('\n');
        }
        out
    }
}

/// What a frame shows above the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub coord: TileCoord,
    pub seed: DerivedSeed,
    pub generation: u64,
    pub population: usize,
}

impl FrameHeader {
    pub fn for_tile<R: rand::RngCore>(tile: &WorldTile<R>) -> Self {
        Self {
            coord: tile.coord(),
            seed: tile.center_seed(),
            generation: tile.generation(),
            population: tile.renderable_tile().population(),
        }
    }
}

impl std::fmt::Display for FrameHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tile {} seed={} gen={} pop={}",
            self.coord, self.seed, self.generation, self.population
        )
    }
}
