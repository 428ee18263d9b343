use std::sync::Arc;

use engine::{DatabasePersistence, LocalObjectStorage, RecordStore, accounts::Accounts};
use migration::{Migrator, MigratorTrait};
use server::ServerState;
use settings::Database;

mod settings;

const DEFAULT_STORAGE_ROOT: &str = "storage";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "karadmin={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no [server] settings found, nothing to run");
        return Ok(());
    };
    tracing::info!("Found server settings...");

    let db = parse_database(&server.database).await?;

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);

    let (root, public_base_url, best_effort_cleanup) = match settings.storage {
        Some(storage) => (
            storage.root,
            storage.public_base_url,
            storage.best_effort_cleanup,
        ),
        None => (DEFAULT_STORAGE_ROOT.to_string(), None, true),
    };
    let public_base_url = public_base_url.unwrap_or_else(|| format!("http://{addr}"));
    tracing::info!(%root, %public_base_url, "serving attachments");

    let store = RecordStore::builder()
        .persistence(Arc::new(DatabasePersistence::new(db.clone())))
        .storage(Arc::new(LocalObjectStorage::new(&root, public_base_url)))
        .best_effort_cleanup(best_effort_cleanup)
        .build()?;
    let state = ServerState::new(store, Accounts::new(db)).with_public_objects(root);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(state, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
