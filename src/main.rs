use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use taskmap::config::AppConfig;
use taskmap::domain::geo::Coordinate;
use taskmap::domain::search::SearchRadius;
use taskmap::error::LOAD_FAILED_MESSAGE;
use taskmap::repository::Repository;
use taskmap::repository::database::init_database;
use taskmap::services::address_search::MIN_QUERY_CHARS;
use taskmap::services::export::{ExportFormat, export_markers};
use taskmap::services::geolocation::{FixedLocation, LocationProvider, NoLocation};
use taskmap::services::nearby_view::Navigator;
use taskmap::services::{AddressSearch, HttpGeocoder, HttpTaskApi, NearbyTasksView};

/// Terminal height stand-in for the sheet layout; the CLI never drags it.
const TERMINAL_VIEWPORT: f64 = 800.0;

#[derive(Parser)]
#[command(author, version, about = "Find paid tasks near you", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List open tasks around a point
    Nearby {
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
        /// Search radius in km, 0 for the whole country
        #[arg(short, long)]
        radius: Option<SearchRadius>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Table)]
        format: ExportFormat,
    },
    /// Show or change the remembered search radius
    Radius {
        #[command(subcommand)]
        action: RadiusAction,
    },
    /// Look up an address
    Search { query: String },
}

#[derive(Subcommand)]
enum RadiusAction {
    Get,
    Set { km: SearchRadius },
}

/// Prints where the app would navigate.
struct PrintNavigator {
    base_url: String,
}

impl Navigator for PrintNavigator {
    fn open_task(&self, task_id: Uuid) {
        println!("{}/tasks/{}", self.base_url, task_id);
    }

    fn create_task(&self) {
        println!("{}/tasks/new", self.base_url);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    config.validate()?;

    match cli.command {
        Commands::Nearby {
            lat,
            lng,
            radius,
            category,
            format,
        } => nearby(config, lat.zip(lng), radius, category, format).await,
        Commands::Radius { action } => {
            let repository = Repository::new(init_database(&config.database_path).await?);
            match action {
                RadiusAction::Get => {
                    let radius = repository.preferences.get_search_radius().await?.unwrap_or_default();
                    println!("{radius}");
                }
                RadiusAction::Set { km } => {
                    repository.preferences.set_search_radius(km).await?;
                    println!("Search radius set to {km}");
                }
            }
            Ok(())
        }
        Commands::Search { query } => search(&config, &query).await,
    }
}

async fn nearby(
    config: AppConfig,
    position: Option<(f64, f64)>,
    radius: Option<SearchRadius>,
    category: Option<String>,
    format: ExportFormat,
) -> Result<()> {
    let repository = Repository::new(init_database(&config.database_path).await?);
    let location: Arc<dyn LocationProvider> = match position {
        Some((lat, lng)) => Arc::new(FixedLocation(Coordinate::new(lat, lng))),
        None => Arc::new(NoLocation),
    };
    let api = Arc::new(HttpTaskApi::new(config.api_base_url.clone(), config.request_timeout()));
    let navigator = Arc::new(PrintNavigator {
        base_url: config.api_base_url.clone(),
    });

    let mut view = NearbyTasksView::new(
        api,
        repository.preferences.clone(),
        location,
        navigator,
        config,
        TERMINAL_VIEWPORT,
    );

    view.mount_with(radius, category).await;

    if view.state().error {
        eprintln!("{LOAD_FAILED_MESSAGE}");
        process::exit(1);
    }

    let origin = view.filter().origin;
    print!("{}", export_markers(&origin, &view.markers(), format)?);
    Ok(())
}

async fn search(config: &AppConfig, query: &str) -> Result<()> {
    let geocoder = HttpGeocoder::new(
        config.geocoder_url.clone(),
        config.geocoder_countries.clone(),
        config.request_timeout(),
    );
    let search = AddressSearch::new(Arc::new(geocoder), config.search_debounce());
    let mut results = search.subscribe();

    if query.trim().chars().count() < MIN_QUERY_CHARS {
        eprintln!("Type at least {MIN_QUERY_CHARS} characters");
        process::exit(2);
    }
    search.input(query);

    results.changed().await?;
    let found = results.borrow().clone();
    if found.error {
        eprintln!("Address lookup failed");
        process::exit(1);
    }
    for suggestion in &found.suggestions {
        println!("{}  ({})", suggestion.label, suggestion.coordinate);
    }
    Ok(())
}
