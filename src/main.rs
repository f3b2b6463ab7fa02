use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ezma::catalog::{CatalogError, FileCatalog, LibraryCatalog, DEFAULT_API_URL};
use ezma::config::{CatalogSource, ConfigError, PointSource, Settings};
use ezma::geo::format_coords;
use ezma::server::{self, AppState};

/// Ezma: find books in Tashkent libraries and the nearest library holding them.
///
/// Examples:
///   ezma nearby --lat 41.3111 --lon 69.2806 --radius 5
///   ezma libraries --search universiteti
///   ezma books "o'tkan kunlar" --lat 41.2995 --lon 69.2401
///   ezma --catalog ./catalog.json serve --port 8080
#[derive(Parser)]
#[command(name = "ezma", version, about, long_about = None)]
struct Cli {
    /// Load libraries and books from a JSON catalog file.
    #[arg(long, global = true, env = "EZMA_CATALOG", conflicts_with = "api_url")]
    catalog: Option<PathBuf>,

    /// Use the catalog file at ~/.ezma/catalog.json.
    #[arg(long, global = true, conflicts_with_all = ["catalog", "api_url"])]
    catalog_default: bool,

    /// Query the library API at this base URL (e.g. https://s-libraries.uz/api).
    #[arg(long, global = true, env = "EZMA_API_URL")]
    api_url: Option<String>,

    /// Use the public library API at its default address.
    #[arg(long, global = true, conflicts_with_all = ["catalog", "api_url", "catalog_default"])]
    remote: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Query(QueryCommand),
    /// Run the HTTP API.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, short = 'p', default_value_t = 3000)]
        port: u16,
    },
}

/// Subcommands that answer one catalog query and exit.
#[derive(Subcommand)]
enum QueryCommand {
    /// Libraries near a point, nearest first.
    Nearby {
        #[command(flatten)]
        location: LocationArgs,

        /// Include pending and inactive libraries.
        #[arg(long)]
        all: bool,
    },
    /// List or search libraries by name or address.
    Libraries {
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Include pending and inactive libraries.
        #[arg(long)]
        all: bool,
    },
    /// Show one library and the books it holds.
    Library { id: u32 },
    /// Search books by title or author. With a location or radius, rank
    /// each book's holding libraries by distance.
    Books {
        query: String,

        #[command(flatten)]
        location: LocationArgs,
    },
}

#[derive(Args)]
struct LocationArgs {
    /// Latitude (-90 to 90).
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Search radius in km.
    #[arg(long, short = 'r')]
    radius: Option<f64>,
}

impl LocationArgs {
    /// Any location flag asks for distance ranking; a bare radius ranks
    /// from the fallback location.
    fn wants_ranking(&self) -> bool {
        self.lat.is_some() || self.lon.is_some() || self.radius.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Cannot encode output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ezma=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn catalog_source(cli: &Cli) -> CatalogSource {
    // Priority: --catalog > --catalog-default > --api-url > --remote > built-in
    if let Some(ref path) = cli.catalog {
        return CatalogSource::File(path.clone());
    }
    if cli.catalog_default {
        return CatalogSource::File(FileCatalog::default_path());
    }
    if let Some(ref url) = cli.api_url {
        return CatalogSource::Remote(url.clone());
    }
    if cli.remote {
        return CatalogSource::Remote(DEFAULT_API_URL.to_string());
    }
    CatalogSource::Builtin
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings {
        catalog: catalog_source(&cli),
        ..Settings::default()
    };
    let catalog = settings.catalog.open()?;

    match cli.command {
        Command::Serve { host, port } => {
            let state = AppState::new(catalog, settings);
            server::start(&host, port, state).await?;
            Ok(())
        }
        // Catalog backends may block on network I/O.
        Command::Query(command) => tokio::task::spawn_blocking(move || run_query(command, catalog.as_ref(), &settings))
            .await
            .map_err(|e| CliError::Server(std::io::Error::other(e)))?,
    }
}

fn run_query(command: QueryCommand, catalog: &dyn LibraryCatalog, settings: &Settings) -> Result<(), CliError> {
    match command {
        QueryCommand::Nearby { location, all } => {
            let (center, source) = settings.query_point(location.lat, location.lon)?;
            let radius_km = settings.radius_or_default(location.radius);
            let results = catalog.nearby_libraries(center, radius_km, all)?;

            let origin = match source {
                PointSource::Given => "",
                PointSource::Fallback => " (default location)",
            };
            eprintln!(
                "  {} libraries within {} km of {}{}",
                results.len(),
                radius_km,
                format_coords(center.latitude, center.longitude),
                origin,
            );
            for r in &results {
                eprintln!("    {:>5.1} km  {}", r.distance_km, r.entity.name);
            }
            print_json(&results)
        }
        QueryCommand::Libraries { search, all } => {
            let results = catalog.search_libraries(search.as_deref().unwrap_or(""), all)?;
            eprintln!("  {} libraries", results.len());
            print_json(&results)
        }
        QueryCommand::Library { id } => {
            let library = catalog.library(id)?;
            let books = catalog.books_in_library(id)?;
            eprintln!("  {} [{}]", library.name, library.status);
            eprintln!("  {}", library.address);
            eprintln!("  {}", format_coords(library.latitude, library.longitude));
            eprintln!("  {} titles in catalog", books.len());

            #[derive(Serialize)]
            struct LibraryDetail<'a> {
                #[serde(flatten)]
                library: &'a ezma::catalog::Library,
                books: &'a [ezma::catalog::Book],
            }
            print_json(&LibraryDetail { library: &library, books: &books })
        }
        QueryCommand::Books { query, location } => {
            let hits = catalog.search_books(&query)?;
            eprintln!("  {} books matching '{}'", hits.len(), query);

            if !location.wants_ranking() {
                return print_json(&hits);
            }

            let (center, _) = settings.query_point(location.lat, location.lon)?;
            let radius_km = settings.radius_or_default(location.radius);

            #[derive(Serialize)]
            struct RankedHit {
                #[serde(flatten)]
                book: ezma::catalog::Book,
                nearest: Vec<ezma::RankedResult<ezma::catalog::Library>>,
            }

            // Holdings were resolved by the search; rank them without refetching.
            let mut ranked = Vec::with_capacity(hits.len());
            for hit in hits {
                let nearest = hit.nearest(center, radius_km).map_err(CatalogError::from)?;
                match nearest.first() {
                    Some(n) => eprintln!(
                        "    {}: nearest is {} ({:.1} km)",
                        hit.book.title, n.entity.name, n.distance_km
                    ),
                    None => eprintln!("    {}: no open library within {} km", hit.book.title, radius_km),
                }
                ranked.push(RankedHit { book: hit.book, nearest });
            }
            print_json(&ranked)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
