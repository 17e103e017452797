use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use spacefield_common::{FieldConfig, TileCoord};
use spacefield_kernel::{DerivedSeed, WorldTile, derive, parse_seed};
use spacefield_render::{FrameHeader, GlyphRenderer};
use spacefield_stream::{FrameTimer, StreamConfig, TileField};
use tracing_subscriber::EnvFilter;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

#[derive(Parser)]
#[command(name = "spacefield", about = "Procedural asteroid field generator")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Field config file (.json, .yaml or .yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Which tile to look at.
#[derive(Args, Debug, Clone, Copy)]
struct TileArgs {
    /// Base seed, decimal or 0x-prefixed hex. Defaults to the current time.
    #[arg(short, long, value_parser = parse_seed)]
    seed: Option<u32>,
    /// Tile column
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    x: i64,
    /// Tile row
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    y: i64,
}

impl TileArgs {
    fn coord(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }

    fn base_seed(&self) -> anyhow::Result<u32> {
        match self.seed {
            Some(seed) => Ok(seed),
            None => clock_seed(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Animate one tile in the terminal until it dies or the frames run out
    Animate {
        #[command(flatten)]
        tile: TileArgs,
        /// Maximum number of frames
        #[arg(short, long, default_value = "20")]
        frames: u64,
        /// Delay between frames in milliseconds
        #[arg(short, long, default_value = "100")]
        interval_ms: u64,
        /// Append frames instead of clearing the screen
        #[arg(long)]
        no_clear: bool,
    },
    /// Print the derived seed of a tile
    Seed {
        #[command(flatten)]
        tile: TileArgs,
    },
    /// Verify determinism and seamless tiling for one tile
    Check {
        #[command(flatten)]
        tile: TileArgs,
        /// Generations to compare
        #[arg(long, default_value = "50")]
        steps: u64,
    },
    /// Walk a viewer east through the streamed field and report timings
    Walk {
        /// Base seed, decimal or 0x-prefixed hex. Defaults to the current time.
        #[arg(short, long, value_parser = parse_seed)]
        seed: Option<u32>,
        /// Number of frames (one tile of movement each)
        #[arg(long, default_value = "30")]
        steps: u64,
        /// Preload radius in tiles
        #[arg(short, long, default_value = "2")]
        radius: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => FieldConfig::from_path(path)
            .with_context(|| format!("loading field config {}", path.display()))?,
        None => FieldConfig::default(),
    };
    tracing::debug!(?config, "field config");

    match cli.command {
        Commands::Animate {
            tile,
            frames,
            interval_ms,
            no_clear,
        } => animate(
            &config,
            tile.base_seed()?,
            tile.coord(),
            frames,
            Duration::from_millis(interval_ms),
            !no_clear,
        )?,
        Commands::Seed { tile } => {
            let base = tile.base_seed()?;
            let coord = tile.coord();
            println!(
                "base={} tile={} derived={}",
                DerivedSeed(base),
                coord,
                DerivedSeed(derive(base, coord.x, coord.y))
            );
        }
        Commands::Check { tile, steps } => check(&config, tile.base_seed()?, tile.coord(), steps)?,
        Commands::Walk {
            seed,
            steps,
            radius,
        } => {
            let base = match seed {
                Some(seed) => seed,
                None => clock_seed()?,
            };
            walk(&config, base, steps, radius);
        }
    }

    Ok(())
}

/// Seed from wall-clock seconds.
fn clock_seed() -> anyhow::Result<u32> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the Unix epoch")?
        .as_secs();
    Ok(secs as u32)
}

/// Render, step, wait; stop when the frames run out or the composite dies.
fn animate(
    config: &FieldConfig,
    base_seed: u32,
    coord: TileCoord,
    frames: u64,
    interval: Duration,
    clear: bool,
) -> anyhow::Result<()> {
    let mut tile = WorldTile::try_new(base_seed, coord, config)?;
    let renderer = GlyphRenderer::new();
    let stdout = std::io::stdout();

    for _ in 0..frames {
        let frame = renderer.render_framed(&tile.renderable_tile(), &FrameHeader::for_tile(&tile));
        {
            let mut out = stdout.lock();
            if clear {
                out.write_all(CLEAR_SCREEN.as_bytes())?;
            }
            out.write_all(frame.as_bytes()).context("writing frame to stdout")?;
            out.flush()?;
        }

        if !tile.step() {
            break;
        }
        std::thread::sleep(interval);
    }

    tracing::info!(
        %coord,
        generation = tile.generation(),
        extinct = tile.is_extinct(),
        "animation finished"
    );
    Ok(())
}

fn check(config: &FieldConfig, base_seed: u32, coord: TileCoord, steps: u64) -> anyhow::Result<()> {
    println!(
        "Self-check: seed={}, tile={coord}, steps={steps}",
        DerivedSeed(base_seed)
    );

    let mut a = WorldTile::try_new(base_seed, coord, config)?;
    let mut b = WorldTile::try_new(base_seed, coord, config)?;
    let taken_a = a.step_n(steps);
    let taken_b = b.step_n(steps);
    let deterministic = taken_a == taken_b && a.state_hash() == b.state_hash();
    println!(
        "Determinism: steps={taken_a}, hash={:#x} [{}]",
        a.state_hash(),
        status(deterministic)
    );

    let mut seamless = true;
    if config.radius() > 0 {
        let center = WorldTile::try_new(base_seed, coord, config)?;
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let neighbor = WorldTile::try_new(base_seed, coord.offset(dx, dy), config)?;
            let matches = neighbor.sub_block(-dx, -dy) == center.renderable_tile();
            println!("Seam with {}: [{}]", coord.offset(dx, dy), status(matches));
            seamless &= matches;
        }
    }

    if !(deterministic && seamless) {
        anyhow::bail!("self-check failed");
    }
    Ok(())
}

fn walk(config: &FieldConfig, base_seed: u32, steps: u64, radius: u64) {
    println!(
        "Field walk: seed={}, steps={steps}, preload radius={radius}",
        DerivedSeed(base_seed)
    );

    let stream_config = StreamConfig {
        preload_radius: radius,
        ..StreamConfig::default()
    };
    let mut field = TileField::new(base_seed, config.clone(), stream_config);
    let mut timer = FrameTimer::new(64);

    for i in 0..steps {
        let viewer = TileCoord::new(i as i64, 0);
        let start = Instant::now();
        field.update(viewer);
        let alive = field.step_active(viewer);
        timer.record(start.elapsed(), field.stats().tiles_stepped_this_frame);

        let stats = field.stats();
        println!(
            "  frame {i}: viewer={viewer} loaded={} unloaded={} pending={} resident={} stepped={} alive={alive}",
            stats.tiles_loaded_this_frame,
            stats.tiles_unloaded_this_frame,
            stats.pending_loads,
            stats.total_loaded_tiles,
            stats.tiles_stepped_this_frame,
        );
    }

    println!(
        "Frame time over last {}: avg {:?}, min {:?}, max {:?}, per tile {:?}",
        timer.count(),
        timer.average(),
        timer.min(),
        timer.max(),
        timer.per_tile()
    );
}

fn status(ok: bool) -> &'static str {
    if ok { "OK" } else { "MISMATCH" }
}
