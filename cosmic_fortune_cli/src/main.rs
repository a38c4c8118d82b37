// cosmic_fortune: headless command-line host.
//
// Drives the generation core without a renderer: resolve single sectors,
// draw ASCII survey maps, list star systems and nebulae, print planet
// terrain, and harvest chunks with the same save files an interactive host
// would use.
//
// Seed precedence: `--seed`, then the seed file (`--seed-file`, default
// `<save dir>/seed.txt`), then the config's `default_seed`. Logging goes to
// stderr through `tracing-subscriber`; set `RUST_LOG` to see it.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cosmic_fortune_sim::config::GalaxyConfig;
use cosmic_fortune_sim::context::GenContext;
use cosmic_fortune_sim::error::{GridError, SaveError};
use cosmic_fortune_sim::galaxy::{BodyKind, Detail, GalacticBody, survey};
use cosmic_fortune_sim::nebula::Nebula;
use cosmic_fortune_sim::save::{PlanetStore, ResourceTotals, load_seed};
use cosmic_fortune_sim::star_system::{Planet, StarSystem};
use cosmic_fortune_sim::terrain::{ChunkGrid, ResourceDelta};
use cosmic_fortune_sim::types::SectorCoord;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cosmic_fortune")]
#[command(about = "Explore a procedurally generated galaxy from the command line")]
struct Cli {
    /// Galaxy seed. Overrides the seed file.
    #[arg(long, global = true)]
    seed: Option<u32>,

    /// Seed file to read when --seed is absent.
    #[arg(long, global = true)]
    seed_file: Option<PathBuf>,

    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Save directory. Overrides the config.
    #[arg(long, global = true)]
    save_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Resolve one sector
    Body { x: u32, y: u32 },

    /// ASCII map of a window of sectors
    Survey { x: u32, y: u32, width: u32, height: u32 },

    /// Full star system listing
    System { x: u32, y: u32 },

    /// Full nebula description
    Nebula { x: u32, y: u32 },

    /// Tile map of a planet, saved modifications applied
    Terrain { x: u32, y: u32, planet: usize },

    /// Harvest one chunk and save the result
    Harvest {
        x: u32,
        y: u32,
        planet: usize,
        index: usize,
        /// Number of consecutive harvests.
        #[arg(long, default_value_t = 1)]
        times: u32,
    },

    /// Print aggregate resource totals
    Totals,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("no star system at {0}")]
    NoStarSystem(SectorCoord),

    #[error("no nebula at {0}")]
    NoNebula(SectorCoord),

    #[error("star system at {coord} has {count} planets, no planet {index}")]
    NoPlanet {
        coord: SectorCoord,
        index: usize,
        count: usize,
    },
}

type CliResult<T> = Result<T, CliError>;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Everything a command needs, resolved from flags, config and seed file.
struct Session {
    ctx: GenContext,
    config: GalaxyConfig,
}

impl Session {
    fn from_cli(cli: &Cli) -> CliResult<Self> {
        let mut config = match &cli.config {
            Some(path) => GalaxyConfig::load(path)?,
            None => GalaxyConfig::default(),
        };
        if let Some(dir) = &cli.save_dir {
            config.save.dir = dir.clone();
        }
        let seed = match cli.seed {
            Some(seed) => seed,
            None => {
                let path = cli
                    .seed_file
                    .clone()
                    .unwrap_or_else(|| config.save.seed_file());
                load_seed(&path, config.default_seed)?
            }
        };
        tracing::debug!(seed, save_dir = %config.save.dir.display(), "session resolved");
        Ok(Self {
            ctx: GenContext::new(seed),
            config,
        })
    }

    fn store(&self) -> PlanetStore {
        PlanetStore::new(
            self.config.save.planet_dir(self.ctx.seed()),
            self.config.save.format,
        )
    }

    fn star_system(&self, coord: SectorCoord) -> CliResult<StarSystem> {
        match GalacticBody::at(&self.ctx, coord, Detail::Full) {
            GalacticBody::StarSystem(system) => Ok(system),
            _ => Err(CliError::NoStarSystem(coord)),
        }
    }

    fn planet(&self, coord: SectorCoord, index: usize) -> CliResult<Planet> {
        let system = self.star_system(coord)?;
        let count = system.planets.len();
        system
            .planets
            .into_iter()
            .nth(index)
            .ok_or(CliError::NoPlanet {
                coord,
                index,
                count,
            })
    }

    /// Baseline terrain with saved modifications applied.
    fn terrain(&self, planet: &Planet) -> CliResult<ChunkGrid> {
        let mut grid = ChunkGrid::generate(&self.ctx, planet, &self.config.terrain);
        self.store().load(&mut grid)?;
        Ok(grid)
    }
}

fn run(cli: Cli) -> CliResult<String> {
    let session = Session::from_cli(&cli)?;
    let ctx = &session.ctx;
    match cli.command {
        Command::Body { x, y } => Ok(describe_body(&GalacticBody::at(
            ctx,
            SectorCoord::new(x, y),
            Detail::Summary,
        ))),
        Command::Survey {
            x,
            y,
            width,
            height,
        } => Ok(render_survey(ctx, SectorCoord::new(x, y), width, height)),
        Command::System { x, y } => {
            let system = session.star_system(SectorCoord::new(x, y))?;
            Ok(describe_system(&system))
        }
        Command::Nebula { x, y } => {
            let coord = SectorCoord::new(x, y);
            match GalacticBody::at(ctx, coord, Detail::Full) {
                GalacticBody::Nebula(nebula) => Ok(describe_nebula(&nebula)),
                _ => Err(CliError::NoNebula(coord)),
            }
        }
        Command::Terrain { x, y, planet } => {
            let planet = session.planet(SectorCoord::new(x, y), planet)?;
            let grid = session.terrain(&planet)?;
            Ok(render_terrain(&grid))
        }
        Command::Harvest {
            x,
            y,
            planet,
            index,
            times,
        } => harvest(&session, SectorCoord::new(x, y), planet, index, times),
        Command::Totals => {
            let totals = ResourceTotals::load(&session.config.save.totals_file())?;
            Ok(format!("{}\n", totals.to_text()))
        }
    }
}

/// Harvest chunk `index` of a planet `times` times, then save the planet
/// and the totals. Nothing is written unless every harvest succeeds.
fn harvest(
    session: &Session,
    coord: SectorCoord,
    planet: usize,
    index: usize,
    times: u32,
) -> CliResult<String> {
    let planet = session.planet(coord, planet)?;
    let mut grid = session.terrain(&planet)?;
    // The index is the only thing that can fail mid-loop; reject it first.
    grid.get(index)?;
    let totals_path = session.config.save.totals_file();
    let mut totals = ResourceTotals::load(&totals_path)?;

    let mut out = String::new();
    for round in 1..=times {
        let delta = grid.harvest(index, &session.config.terrain)?;
        totals.absorb(&delta);
        let _ = writeln!(out, "harvest {round}: {}", format_delta(&delta));
    }
    let path = session.store().save(&grid)?;
    totals.save(&totals_path)?;

    let chunk = grid.get(index)?;
    let _ = writeln!(
        out,
        "chunk {index}: tile {} total {:.4}",
        chunk.tile, chunk.total
    );
    let _ = writeln!(out, "saved {}", path.display());
    let _ = writeln!(out, "totals {}", totals.to_text());
    Ok(out)
}

fn describe_body(body: &GalacticBody) -> String {
    match body {
        GalacticBody::Absent => "empty space\n".to_string(),
        GalacticBody::BlackHole(hole) => format!("black hole at {}\n", hole.coord),
        GalacticBody::Nebula(nebula) => format!(
            "{:?} nebula at {}, size {:.1}, {}\n",
            nebula.kind, nebula.coord, nebula.size, nebula.overall_color
        ),
        GalacticBody::StarSystem(system) => format!(
            "{} star at {}, diameter {:.2}\n",
            system.star_color, system.coord, system.star_diameter
        ),
    }
}

fn render_survey(ctx: &GenContext, origin: SectorCoord, width: u32, height: u32) -> String {
    let entries = survey(ctx, origin, width, height);
    let mut map = vec![vec!['.'; width as usize]; height as usize];
    let (mut stars, mut nebulae, mut holes) = (0, 0, 0);
    for entry in &entries {
        let dx = entry.coord.x.wrapping_sub(origin.x) as usize;
        let dy = entry.coord.y.wrapping_sub(origin.y) as usize;
        map[dy][dx] = entry.kind.glyph();
        match entry.kind {
            BodyKind::StarSystem => stars += 1,
            BodyKind::Nebula => nebulae += 1,
            BodyKind::BlackHole => holes += 1,
        }
    }
    let mut out = String::new();
    for row in map {
        out.extend(row);
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "{stars} star systems, {nebulae} nebulae, {holes} black holes in {} sectors",
        u64::from(width) * u64::from(height)
    );
    out
}

fn describe_system(system: &StarSystem) -> String {
    let mut out = format!(
        "{} star at {}, diameter {:.2}, {} planets\n",
        system.star_color,
        system.coord,
        system.star_diameter,
        system.planets.len()
    );
    for (i, p) in system.planets.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{i}] dist {:.1} diam {:.2} temp {:.1}F water {:.2} foliage {:.2} minerals {:.2} gases {:.2}{} moons {} at {}",
            p.distance,
            p.diameter,
            p.temperature,
            p.water,
            p.foliage,
            p.minerals,
            p.gases,
            if p.has_ring { " ringed" } else { "" },
            p.moons.len(),
            p.coord,
        );
    }
    out
}

fn describe_nebula(nebula: &Nebula) -> String {
    let (first, second) = nebula.kind.tints();
    format!(
        "{:?} nebula at {}, size {:.1}, tint {}, {} clouds of {} and {}\n",
        nebula.kind,
        nebula.coord,
        nebula.size,
        nebula.overall_color,
        nebula.clouds.len(),
        first,
        second
    )
}

fn render_terrain(grid: &ChunkGrid) -> String {
    let mut out = String::new();
    let tiles: Vec<char> = grid
        .chunks()
        .map(|chunk| char::from_digit(u32::from(chunk.tile), 10).unwrap_or('?'))
        .collect();
    for row in tiles.chunks(grid.diameter().max(1)) {
        out.extend(row);
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "{}x{} chunks, {} modified, terrain seed {:08x}",
        grid.diameter(),
        grid.diameter(),
        grid.modifications().len(),
        grid.terrain_seed()
    );
    out
}

fn format_delta(delta: &ResourceDelta) -> String {
    format!(
        "water {:.4} foliage {:.4} minerals {:.4} gases {:.4}",
        delta.water, delta.foliage, delta.minerals, delta.gases
    )
}
