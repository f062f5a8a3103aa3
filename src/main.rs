use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sysdeck::{api, app::Services, config::AppConfig};

#[derive(Parser)]
#[command(name = "sysdeck")]
#[command(about = "System-monitor dashboard backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API (overrides config and SYSDECK_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the dashboard cards once as JSON and exit
    Snapshot,
}

/// Initialize tracing, preferring RUST_LOG over the configured filter
fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let services = Services::new(&config);
    services.initialize_all().await?;

    let app = api::create_router(services.clone());

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", config.port)).await?;
    tracing::info!("sysdeck listening on http://127.0.0.1:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
            }
        })
        .await?;

    tracing::info!("Shutting down services");
    services.shutdown_all().await?;
    Ok(())
}

async fn snapshot(config: AppConfig) -> anyhow::Result<()> {
    let services = Services::new(&config);
    services.initialize_all().await?;

    services.system.refresh().await?;
    let dashboard = services.dashboard.build()?;
    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    services.shutdown_all().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, load_error) = AppConfig::load();
    init_tracing(&config.log_filter);
    if let Some(e) = load_error {
        tracing::warn!("Failed to load config, using defaults: {:#}", e);
    }

    match cli.command {
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await?;
        }
        Some(Commands::Snapshot) => snapshot(config).await?,
        None => serve(config).await?,
    }

    Ok(())
}
