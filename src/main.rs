mod app;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use geodetic_floes::sim::constants::{DEFAULT_FALLOFF, DEFAULT_FRICTION, DEFAULT_REPULSION};
use geodetic_floes::{Layout, SimulatorConfig};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliLayout {
    Random,
    Arranged,
}

impl From<CliLayout> for Layout {
    fn from(value: CliLayout) -> Self {
        match value {
            CliLayout::Random => Layout::Random,
            CliLayout::Arranged => Layout::Arranged,
        }
    }
}

/// Geodetic floes - repulsion relaxation of points on a sphere
#[derive(Parser, Debug)]
#[command(name = "geodetic-floes", version, about)]
struct Cli {
    /// Number of points on the sphere (at least 4)
    #[arg(long, default_value_t = 500)]
    points: usize,

    /// Initial point layout
    #[arg(long, value_enum, default_value_t = CliLayout::Random)]
    layout: CliLayout,

    /// Total simulation steps
    #[arg(long, default_value_t = 1000)]
    steps: u64,

    /// Rebuild geometry and log statistics every N steps
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// Velocity damping coefficient
    #[arg(long, default_value_t = DEFAULT_FRICTION)]
    friction: f32,

    /// Repulsion force scale
    #[arg(long, default_value_t = DEFAULT_REPULSION)]
    repulsion: f32,

    /// Distance exponent of the repulsion term
    #[arg(long, default_value_t = DEFAULT_FALLOFF)]
    falloff: f32,

    /// Worker threads for the force sum (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Random seed for the initial layout and added points
    #[arg(long)]
    seed: Option<u64>,

    /// Export final points and geometry (supports .json and .json.gz)
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = app::AppConfig {
        seed: cli.seed.unwrap_or_else(rand::random),
        points: cli.points,
        layout: cli.layout.into(),
        steps: cli.steps,
        report_every: cli.report_every,
        simulator: SimulatorConfig {
            friction: cli.friction,
            repulsion: cli.repulsion,
            falloff: cli.falloff,
            threads: cli.threads,
        },
        export_path: cli.export,
    };

    app::run(&config)
}
