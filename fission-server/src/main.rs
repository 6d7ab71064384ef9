use std::sync::Arc;

use clap::Parser;
use fission_core::config::StoreBackend;
use fission_core::FissionConfig;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use fission_server::app::App;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "fission.toml")]
    config: String,

    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience, production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match FissionConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    if args.health {
        return health(&config).await;
    }

    let app = match App::build(&config).await {
        Ok(a) => Arc::new(a),
        Err(e) => {
            eprintln!("Failed to start backends: {}", e);
            std::process::exit(1);
        }
    };
    app.start().await;

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let served =
        fission_server::http::start_http_server(Arc::clone(&app), config, tx.subscribe()).await;
    if let Err(e) = &served {
        tracing::error!("HTTP server error: {}", e);
    }

    app.shutdown().await;
    tracing::info!("Fission server stopped");
    served
}

async fn health(config: &FissionConfig) -> anyhow::Result<()> {
    let store = match fission_core::create_store(&config.database).await {
        Ok(s) => s,
        Err(e) => {
            println!("❌ Store connection failed: {}", e);
            std::process::exit(1);
        }
    };

    match store.ping().await {
        Ok(v) => println!("✅ {} store connected: {}", store.name(), v),
        Err(e) => {
            println!("❌ {} store ping failed: {}", store.name(), e);
            std::process::exit(1);
        }
    }

    if config.database.backend == StoreBackend::Postgres {
        let pool = fission_core::db::create_pool(&config.database).await?;
        match fission_core::db::missing_tables(&pool).await {
            Ok(missing) if missing.is_empty() => println!("✅ Chat tables present"),
            Ok(missing) => {
                println!("❌ Missing tables: {} (apply schema.sql)", missing.join(", "));
                std::process::exit(1);
            }
            Err(e) => {
                println!("❌ Schema check failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    println!("✅ Fission health check passed");
    Ok(())
}
