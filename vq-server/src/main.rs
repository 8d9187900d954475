//! vq-server - live song request queue for events
//!
//! Audience clients browse the catalog and submit requests; the DJ
//! console triages the queue and syncs the catalog from a Google Sheet.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use vq_common::config::{prepare_root_folder, resolve_root_folder};
use vq_common::db::init_database;
use vq_server::services::AuddClient;
use vq_server::sheets::HttpSheetClient;
use vq_server::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "vq-server", version, about = "Live song request queue")]
struct Args {
    /// Root folder holding the database (overrides VQ_ROOT and config)
    #[arg(long)]
    root_folder: Option<String>,

    /// Port to listen on
    #[arg(long, default_value_t = 5740)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting vq-server v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), "VQ_ROOT")?;
    let db_path = prepare_root_folder(&root_folder)?;
    info!("Database path: {}", db_path.display());

    let db = init_database(&db_path).await?;
    info!("Database ready");

    let sheets = HttpSheetClient::new().map_err(|e| anyhow::anyhow!("{}", e))?;

    let audd = AuddClient::from_env().map_err(|e| anyhow::anyhow!("{}", e))?;
    if audd.is_none() {
        warn!("AUDD_API_TOKEN not set; song recognition and lyrics lookup disabled");
    }

    let state = AppState::new(db, sheets, audd);
    let app = build_router(state);

    let addr = format!("127.0.0.1:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("vq-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
