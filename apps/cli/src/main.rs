//! # recipecart: Recipe-to-Cart Command Line
//!
//! Startup for the RecipeCart engine. Initializes logging, loads
//! configuration, builds the fixture-backed collaborators, and renders the
//! results.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         CLI Startup Sequence                            │
//! │                                                                         │
//! │  1. init_tracing()        RUST_LOG or "info,recipecart=debug", stderr  │
//! │  2. EngineConfig::load()  defaults → config.toml → RECIPECART_* env    │
//! │  3. CatalogFixture::load  --catalog JSON → in-memory collaborators     │
//! │  4. Store inputs          config values overridden by CLI flags        │
//! │  5. Dispatch subcommand   recipe | recipes | sales | path              │
//! │                                                                         │
//! │  Any error: "error: ..." on stderr, exit code 1                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use recipecart_core::sales::parse_sale_limit;
use recipecart_engine::{
    CatalogFixture, EngineConfig, EngineError, EngineResult, LocationInputs, RecordingCart,
    ShoppingOrchestrator, ShoppingOrchestratorBuilder, ShoppingReport,
};

#[derive(Parser, Debug)]
#[command(
    name = "recipecart",
    version,
    about = "Turn a recipe into a priced grocery cart at your store"
)]
struct Cli {
    /// Path to config.toml (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog fixture (JSON) backing product and store lookups
    #[arg(long, global = true, default_value = "demos/catalog.json")]
    catalog: PathBuf,

    /// Store to shop at (overrides everything else)
    #[arg(long, global = true)]
    location_id: Option<String>,

    /// Find the nearest store by postal code
    #[arg(long, global = true)]
    postal_code: Option<String>,

    /// Fallback store when the postal code lookup finds nothing
    #[arg(long, global = true)]
    preferred_location_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price a recipe and fill the cart
    Recipe {
        /// Recipe name or free text, e.g. "apple pie"
        query: String,

        /// Print the JSON report instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the built-in recipes
    Recipes,

    /// Show discounted products at the store
    Sales {
        /// Search a single category instead of the default sale terms
        #[arg(long)]
        category: Option<String>,

        /// Maximum items to show (1-50, default 20)
        #[arg(long)]
        limit: Option<String>,
    },

    /// Order a grocery list by aisle
    Path {
        /// Grocery list file, or "-" for stdin
        file: String,
    },
}

impl Cli {
    fn store_flags(&self) -> LocationInputs {
        LocationInputs {
            location_id: self.location_id.clone(),
            postal_code: self.postal_code.clone(),
            preferred_location_id: self.preferred_location_id.clone(),
        }
    }
}

// =============================================================================
// Startup
// =============================================================================

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,recipecart=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_orchestrator(cli: &Cli, config: &EngineConfig) -> EngineResult<ShoppingOrchestrator> {
    let (catalog, locations) = CatalogFixture::load(&cli.catalog)
        .map_err(|e| EngineError::ConfigLoadFailed(format!("{}: {}", cli.catalog.display(), e)))?
        .into_services();

    ShoppingOrchestratorBuilder::new()
        .with_catalog(Arc::new(catalog))
        .with_locations(Arc::new(locations))
        .with_cart(Arc::new(RecordingCart::new()))
        .with_config(config)
        .build()
}

fn read_grocery_list(file: &str) -> EngineResult<String> {
    if file == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(file)?)
    }
}

// =============================================================================
// Commands
// =============================================================================

async fn dispatch(cli: Cli) -> EngineResult<()> {
    if let Command::Recipes = cli.command {
        for name in recipecart_core::RecipeCatalog::builtin().names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let config = EngineConfig::load(cli.config.clone())?;
    let inputs = config.store_inputs().overridden_by(&cli.store_flags());
    let orchestrator = build_orchestrator(&cli, &config)?;

    info!(
        concurrency = config.search.max_concurrency,
        modality = %config.modality(),
        "RecipeCart starting"
    );

    match &cli.command {
        Command::Recipe { query, json } => {
            let outcome = orchestrator.run(query, &inputs).await?;
            let report = ShoppingReport::from_outcome(&outcome);
            if *json {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", report.render_text());
            }
        }

        Command::Sales { category, limit } => {
            let limit = parse_sale_limit(limit.as_deref());
            let report = orchestrator
                .find_items_on_sale(&inputs, category.as_deref(), limit)
                .await?;

            if report.items.is_empty() {
                println!("No items on sale at store {}.", report.location.location_id);
            }
            for item in &report.items {
                println!(
                    "{:<40} {} → {} (save {}, {}% off) {}",
                    item.description,
                    item.regular_price,
                    item.sale_price,
                    item.savings,
                    item.discount_percent(),
                    item.aisle.as_deref().unwrap_or("")
                );
            }
        }

        Command::Path { file } => {
            let text = read_grocery_list(file)?;
            let path = orchestrator.grocery_list_store_path(&inputs, &text).await?;

            for (n, stop) in path.stops.iter().enumerate() {
                println!(
                    "{:>2}. {:<12} {:<24} {}",
                    n + 1,
                    stop.aisle.as_deref().unwrap_or("?"),
                    stop.item,
                    stop.product_description
                );
            }
            if !path.not_found.is_empty() {
                println!("Not found: {}", path.not_found.join(", "));
            }
            if !path.failed.is_empty() {
                println!("Search failed: {}", path.failed.join(", "));
            }
        }

        Command::Recipes => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
