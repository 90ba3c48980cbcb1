use clap::Parser;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskboard::{api, db};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Task and assignee records over a JSON HTTP API")]
struct Cli {
    /// Document store connection string (file path, sqlite://<path> or :memory:).
    /// Defaults to taskboard.db in the platform data directory.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "taskboard=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let db = match open_store(cli.database_url.as_deref()) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to prepare document store: {:#}", e);
            return Err(e);
        }
    };

    let app = api::create_router(db.clone());

    let addr = format!("127.0.0.1:{}", api::PORT);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Taskboard server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close()?;
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Connects, migrates and seeds. Nothing is served until this returns.
fn open_store(url: Option<&str>) -> anyhow::Result<db::Database> {
    let db = match url {
        Some(url) => db::Database::open(url)?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;

    let report = db::seed_if_empty(&db)?;
    tracing::debug!(
        "Seeding finished: {} tasks, {} assignees inserted",
        report.tasks,
        report.assignees
    );

    Ok(db)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
