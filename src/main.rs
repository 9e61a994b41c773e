use crypto_forum::config::{Config, StoreBackend};
use crypto_forum::database::{create_pool, run_migrations};
use crypto_forum::store::{ForumStore, MemoryForumStore, PgForumStore};
use crypto_forum::{AppState, create_app};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crypto_forum=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config.database_url.clone().unwrap_or_default();
            let db = create_pool(&database_url, config.db_max_connections).await?;
            tracing::info!("Database connection pool created");

            run_migrations(&db).await?;
            tracing::info!("Database migrations completed");

            serve(PgForumStore::new(db), config).await
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            serve(MemoryForumStore::new(), config).await
        }
    }
}

async fn serve<S: ForumStore>(store: S, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let address = format!("{}:{}", config.host, config.port);
    let app = create_app(AppState::new(store, config));

    // Create listener
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Server listening on {}", address);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
