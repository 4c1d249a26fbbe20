use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use geosearch::{
    GeoSearchOptions, InstallOutcome, Origin, SelectQuery, SortDirection, StaticTable,
    distance_boundary, distance_from, install, order_by_distance,
};

#[derive(Parser, Debug)]
#[command(
    name = "geosearch",
    about = "Print a SELECT that measures great-circle distance from an origin."
)]
struct Args {
    /// Table to query
    #[arg(long)]
    table: String,

    /// Declared columns of the table, comma separated
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Columns to select instead of all columns, comma separated
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,

    /// Origin as "lat,lng" or JSON (an array or an object with the latitude/longitude columns)
    #[arg(long, allow_hyphen_values = true)]
    origin: String,

    /// Only rows within this distance of the origin
    #[arg(long)]
    within: Option<f64>,

    /// Order rows nearest first
    #[arg(long, default_value_t = false)]
    nearest_first: bool,

    #[arg(long)]
    limit: Option<i64>,

    /// miles, kilometers or nautical_miles (overrides the config file)
    #[arg(long)]
    units: Option<String>,

    /// TOML file with geosearch options (default: $GEOSEARCH_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = load_options(&args)?;
    let table = load_table(&args)?;

    match install(&table, &options)? {
        InstallOutcome::Enabled(config) => {
            debug!("Using {:?}", config);
        }
        InstallOutcome::Disabled(reason) => bail!("{}", reason),
    }

    let origin_json: serde_json::Value;
    let origin = if args.origin.trim_start().starts_with(['[', '{']) {
        origin_json = serde_json::from_str(&args.origin).context("Failed to parse origin JSON")?;
        Origin::from_json(&origin_json)?
    } else {
        let values = args
            .origin
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Invalid origin '{}'", args.origin))?;
        Origin::from_slice(&values)?
    };

    let mut query = SelectQuery::from_table(&args.table);
    if !args.select.is_empty() {
        query = query.select_columns(args.select.iter().cloned());
    }
    query = distance_from(&query, &table, &origin)?;
    if let Some(limit) = args.within {
        query = distance_boundary(&query, &table, limit, &origin)?;
    }
    if args.nearest_first {
        query = order_by_distance(&query, &table, &origin, SortDirection::Ascending)?;
    }
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }

    println!("{}", query);
    Ok(())
}

fn load_options(args: &Args) -> Result<GeoSearchOptions> {
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var("GEOSEARCH_CONFIG").ok().map(PathBuf::from));

    let mut options = match path {
        Some(path) => {
            info!("Loading geosearch options from {:?}", path);
            GeoSearchOptions::load(&path)?
        }
        None => GeoSearchOptions::default(),
    };

    if let Some(units) = &args.units {
        options = options.distance_units(units.clone());
    }
    Ok(options)
}

#[cfg(feature = "postgres")]
fn load_table(args: &Args) -> Result<StaticTable> {
    use diesel::{Connection, PgConnection};

    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let mut conn =
                PgConnection::establish(&url).context("Failed to connect to DATABASE_URL")?;
            let table = geosearch::db::load_table_definition(&mut conn, "public", &args.table)
                .with_context(|| format!("Failed to introspect table '{}'", args.table))?;
            Ok(table)
        }
        Err(_) => Ok(StaticTable::new(&args.table, args.columns.iter().cloned())),
    }
}

#[cfg(not(feature = "postgres"))]
fn load_table(args: &Args) -> Result<StaticTable> {
    Ok(StaticTable::new(&args.table, args.columns.iter().cloned()))
}
