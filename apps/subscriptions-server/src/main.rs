use anyhow::{bail, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use db::{ConnectOpts, DbHandle};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use subscriptions::config::SubscriptionsConfig;
use subscriptions::Subscriptions;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const SUBSCRIPTIONS_MODULE: &str = "subscriptions";
const API_INGRESS_MODULE: &str = "api_ingress";

/// Subscriptions Server - REST API for user subscription records
#[derive(Parser)]
#[command(name = "subscriptions-server")]
#[command(about = "Subscriptions Server - REST API for user subscription records")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Print config and exit if requested
    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Subscriptions Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
        Commands::Migrate => migrate(&config).await,
    }
}

fn bind_addr(config: &AppConfig) -> Result<SocketAddr> {
    format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid server address {}:{}",
                config.server.host, config.server.port
            )
        })
}

fn database_config(config: &AppConfig) -> Result<&DatabaseConfig> {
    let Some(db) = config.database.as_ref() else {
        bail!("database section is required");
    };
    if db.url.trim().is_empty() {
        bail!("database.url is empty");
    }
    DbHandle::detect(&db.url)?;
    Ok(db)
}

async fn connect(cfg: &DatabaseConfig) -> Result<DbHandle> {
    let opts = ConnectOpts {
        max_conns: cfg.max_conns.or(Some(10)),
        acquire_timeout: Some(Duration::from_secs(cfg.acquire_timeout_sec.unwrap_or(5))),
        ..Default::default()
    };
    tracing::info!(max_conns = ?opts.max_conns, "Connecting to database");
    let db = DbHandle::connect(&cfg.url, opts)
        .await
        .context("database connection failed")?;
    tracing::info!("Connected DB backend: {:?}", db.engine());
    Ok(db)
}

async fn run_server(config: AppConfig) -> Result<()> {
    let addr = bind_addr(&config)?;
    let db_config = database_config(&config)?;
    let subscriptions_cfg: SubscriptionsConfig = config.module_config(SUBSCRIPTIONS_MODULE)?;
    let ingress_cfg: ApiIngressConfig = config.module_config(API_INGRESS_MODULE)?;

    let db = connect(db_config).await?;
    Subscriptions::migrate(&db).await?;

    tracing::info!("Initializing modules...");
    let module = Subscriptions::init(&subscriptions_cfg, &db);
    let routes = module.register_rest(axum::Router::new())?;

    let ingress = Arc::new(ApiIngress::new(ingress_cfg));
    let router = ingress.build_router(routes, Some(module.openapi()))?;

    let cancel = CancellationToken::new();
    modkit::runtime::cancel_on_shutdown(cancel.clone());

    let mut server = tokio::spawn(ingress.serve(addr, router, cancel.clone()));
    tokio::select! {
        res = &mut server => {
            db.close().await;
            return res?;
        }
        _ = cancel.cancelled() => {}
    }

    // Graceful shutdown budget; 0 waits for in-flight requests
    let budget = config.server.timeout_sec;
    let res = if budget == 0 {
        server.await?
    } else {
        match tokio::time::timeout(Duration::from_secs(budget), server).await {
            Ok(joined) => joined?,
            Err(_) => {
                tracing::warn!(budget_sec = budget, "Graceful shutdown budget exceeded");
                Ok(())
            }
        }
    };

    db.close().await;
    tracing::info!("Subscriptions Server stopped");
    res
}

async fn migrate(config: &AppConfig) -> Result<()> {
    let db = connect(database_config(config)?).await?;
    Subscriptions::migrate(&db).await?;
    db.close().await;
    println!("Migrations applied");
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    bind_addr(config)?;
    database_config(config)?;
    let _: SubscriptionsConfig = config.module_config(SUBSCRIPTIONS_MODULE)?;
    let _: ApiIngressConfig = config.module_config(API_INGRESS_MODULE)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
