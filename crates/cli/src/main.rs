//! Farmstand CLI - drive the storefront stores from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! fs-cli catalog list --category Vegetables --query tomato
//!
//! # Fill the cart
//! fs-cli cart add 3 --quantity 2
//!
//! # Sign in and set up the unlock PIN
//! fs-cli auth login -e shopper@example.com -p secret
//! fs-cli auth setup-pin 1234 1234
//!
//! # Pay with the PIN
//! fs-cli checkout --pin 1234
//! ```
//!
//! # Commands
//!
//! - `catalog` - Browse products
//! - `cart` - Manage the shopping cart
//! - `favorites` - Manage favorite products
//! - `orders` - Order history
//! - `addresses` - Saved delivery addresses
//! - `auth` - Sign-in, PIN and biometric setup
//! - `checkout` - Turn the cart into an order
//!
//! State is kept under `FARMSTAND_DATA_DIR`; see
//! [`farmstand_storefront::config`] for every setting.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use farmstand_core::BiometricKind;
use farmstand_storefront::auth::SimulatedBiometrics;
use farmstand_storefront::config::{AppConfig, BiometricMode, LogFormat};
use farmstand_storefront::error::set_sentry_user;
use farmstand_storefront::{AppError, AppState};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::State;

#[derive(Parser)]
#[command(name = "fs-cli")]
#[command(author, version, about = "Farmstand storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Manage favorite products
    Favorites {
        #[command(subcommand)]
        action: commands::favorites::FavoritesAction,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrdersAction,
    },
    /// Saved delivery addresses
    Addresses {
        #[command(subcommand)]
        action: commands::addresses::AddressesAction,
    },
    /// Sign-in, PIN and biometric setup
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Pay for the cart
    Checkout(commands::checkout::CheckoutArgs),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
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

/// Initialize tracing with `EnvFilter` and Sentry integration.
fn init_tracing(format: LogFormat) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "farmstand_storefront=info,farmstand_cli=info".into());

    let fmt_layer = match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(false).boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Simulated sensor matching the configured mode.
fn biometrics(config: &AppConfig) -> SimulatedBiometrics {
    match config.biometrics {
        BiometricMode::None => SimulatedBiometrics::rejecting(BiometricKind::None),
        BiometricMode::Accept => SimulatedBiometrics::accepting(config.biometric_kind),
        BiometricMode::Reject => SimulatedBiometrics::rejecting(config.biometric_kind),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::default());
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    let state = match AppState::open(&config, biometrics(&config)).await {
        Ok(state) => state,
        Err(e) => {
            e.report();
            tracing::error!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    if let Some(user) = state.auth().current_user() {
        set_sentry_user(&user.id, Some(user.email.as_str()));
    }

    let result = run(cli, &state).await;

    // Pending writes must land before the process exits
    state.flush().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            tracing::error!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, state: &State) -> Result<(), AppError> {
    match cli.command {
        Commands::Catalog { action } => commands::catalog::run(state, action),
        Commands::Cart { action } => commands::cart::run(state, action),
        Commands::Favorites { action } => commands::favorites::run(state, action),
        Commands::Orders { action } => commands::orders::run(state, action),
        Commands::Addresses { action } => commands::addresses::run(state, action),
        Commands::Auth { action } => commands::auth::run(state, action).await,
        Commands::Checkout(args) => commands::checkout::run(state, args).await,
    }
}
