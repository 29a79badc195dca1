//! `RocketShoes` CLI - Shopping cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! rocketshoes products
//!
//! # Put two pairs of product 3 in the cart
//! rocketshoes add 3
//! rocketshoes add 3
//!
//! # Change the amount, remove, inspect
//! rocketshoes update 3 1
//! rocketshoes remove 3
//! rocketshoes show
//! ```
//!
//! # Commands
//!
//! - `products` - List the catalog with amounts already in the cart
//! - `show` - Print the cart and its total
//! - `add`, `remove`, `update` - Change the cart
//! - `clear` - Empty the cart
//!
//! The cart is kept in the storage file between invocations. See
//! `rocketshoes_cart::config` for the environment variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rocketshoes_cart::{CartConfig, CatalogConfig};
use rocketshoes_core::ProductId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rocketshoes")]
#[command(author, version, about = "RocketShoes shopping cart")]
struct Cli {
    /// Catalog API base URL (overrides `ROCKETSHOES_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Cart storage file (overrides `ROCKETSHOES_STORAGE_PATH`)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products in the catalog
    Products,
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product id
        id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product id
        id: ProductId,
    },
    /// Set the amount of a product in the cart
    Update {
        /// Product id
        id: ProductId,

        /// New amount (zero or less is ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Remove every product from the cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Notices are already printed, so keep the cart crate quiet by default
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_cli=info,rocketshoes_cart=error".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Configuration from the environment, with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<CartConfig, Box<dyn std::error::Error>> {
    let mut config = CartConfig::from_env()?;

    if let Some(api_url) = &cli.api_url {
        let overridden = CatalogConfig::new(api_url)?;
        config.catalog.base_url = overridden.base_url;
    }
    if let Some(storage) = &cli.storage {
        config.storage_path.clone_from(storage);
    }

    Ok(config)
}

async fn run(command: Commands, config: &CartConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = commands::Session::open(config)?;

    match command {
        Commands::Products => commands::products::list(&session).await?,
        Commands::Show => commands::cart::show(&session),
        Commands::Add { id } => commands::cart::add(&mut session, id).await?,
        Commands::Remove { id } => commands::cart::remove(&mut session, id).await?,
        Commands::Update { id, amount } => commands::cart::update(&mut session, id, amount).await?,
        Commands::Clear => commands::cart::clear(&mut session).await?,
    }

    Ok(())
}
