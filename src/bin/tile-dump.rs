//! Dumps the geometry of one tile of a TileMill source into a Rust fixture file.
//!
//!     tile-dump data.yml 14/8190/5447 --database-url postgres://localhost/osm

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use failure::ResultExt;
use log::info;
use sqlx::postgres::PgPoolOptions;

use tile_dump::dump::collect_tile;
use tile_dump::fixture::{fixture_ident, render_fixture_module};
use tile_dump::tm2::{PostgisSource, TM2Source};
use tile_dump::{TileFormat, TileSource};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Dump the features of one tile as an inline geometry literal",
    long_about = None,
)]
struct Cli {
    /// TileMill source (data.yml) describing the layers
    config: PathBuf,

    /// Tile to dump, laid out as given by --tile-format
    tile: String,

    /// PostGIS database holding the layer tables
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Order and separator of the tile argument, e.g. "x_y_z"
    #[arg(long, default_value = "z/x/y")]
    tile_format: TileFormat,

    /// Only dump this layer; may be repeated
    #[arg(long = "layer", value_name = "ID")]
    layers: Vec<String>,

    /// Directory the fixture file is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[tokio::main]
async fn main() -> Result<(), failure::Error> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .format_timestamp(None)
        .init();

    run(cli).await
}

async fn run(cli: Cli) -> Result<(), failure::Error> {
    let tile = cli.tile_format.parse_tile(&cli.tile)?;
    info!("dumping {} from {}", tile, cli.config.display());

    let source = TM2Source::from_file(&cli.config)
        .with_context(|_| format!("could not load {}", cli.config.display()))?;
    source.validate()?;
    info!("{} layers in {}", source.layers.len(), source.name);

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&cli.database_url)
        .await
        .context("could not connect to the database")?;
    let source = PostgisSource::new(source, pool);

    let layers = if cli.layers.is_empty() {
        None
    } else {
        Some(cli.layers.as_slice())
    };
    let geometry = collect_tile(&source, tile, layers).await?;

    let ident = fixture_ident(&format!(
        "{}_{}_{}_{}",
        source.name(),
        tile.z,
        tile.x,
        tile.y
    ));
    let module = render_fixture_module(&ident, &geometry)?;

    let path = cli.output_dir.join(format!("{}.rs", ident));
    fs::write(&path, module).with_context(|_| format!("could not write {}", path.display()))?;
    info!("wrote {}", path.display());

    Ok(())
}
