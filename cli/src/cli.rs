use std::path::PathBuf;

/// Site register enrichment CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "sitefill", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Fill missing coordinates and ward/constituency labels in a site register
    Enrich(EnrichArgs),

    /// Print the structure of a boundary shapefile
    Inspect(InspectArgs),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, clap::ValueEnum)]
pub enum ModeArg { Forward, Reverse }

#[derive(Copy, Clone, Eq, PartialEq, Debug, clap::ValueEnum)]
pub enum PrecedenceArg { RecordFirst, BoundaryFirst }

#[derive(clap::Args, Debug)]
pub struct EnrichArgs {
    /// TOML config file; flags below override its values
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Input site register (CSV)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Output CSV, defaults to "./updated_sites.csv"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Intermediate CSV written after geocoding
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub partial_output: Option<PathBuf>,

    /// Ward boundary shapefile, or a directory containing one
    #[arg(short, long, value_hint = clap::ValueHint::AnyPath)]
    pub boundaries: Option<PathBuf>,

    /// JSON county -> sub-county -> wards table
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub lookup: Option<PathBuf>,

    /// Geocoding API key
    #[arg(long, env = "GEOCODE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Geocoding endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Maximum number of successful geocoding calls
    #[arg(short = 'n', long)]
    pub max_requests: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Text encoding of input and output files
    #[arg(long)]
    pub encoding: Option<String>,

    /// Geocoding stage to run before the boundary join
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Which source wins for ward/constituency
    #[arg(long, value_enum)]
    pub precedence: Option<PrecedenceArg>,

    /// PROJ.4 definition of the boundary layer's CRS
    #[arg(long)]
    pub source_proj4: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Boundary shapefile, or a directory containing one
    #[arg(value_hint = clap::ValueHint::AnyPath)]
    pub path: PathBuf,

    /// Number of sample records to print
    #[arg(short, long, default_value_t = 5)]
    pub sample: usize,
}
