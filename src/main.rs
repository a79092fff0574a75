use std::sync::Arc;

use anyhow::Context;
use axum::ServiceExt;
use clap::Parser;
use tower::Layer;
use tower::util::MapRequestLayer;

use bookshelf::app::{build_router, AppState};
use bookshelf::config::AppConfig;
use bookshelf::db::author_repository::{AuthorRepository, MongoAuthorRepository};
use bookshelf::db::book_repository::{BookRepository, MongoBookRepository};
use bookshelf::demo_seeder::seed_demo_data;
use bookshelf::method_override::override_method;
use bookshelf::rendering::templates::Templates;

/// Server-rendered book catalog.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to ./bookshelf.toml when present)
    #[arg(long)]
    config: Option<String>,

    /// Seed demo authors and books into an empty database
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    tracing::info!("Starting bookshelf server...");

    // Connect to MongoDB
    let mongo_client = mongodb::Client::with_uri_str(&config.mongodb.uri)
        .await
        .context("Failed to connect to MongoDB")?;
    let mongo_db = mongo_client.database(&config.mongodb.database);
    let book_repo: Arc<dyn BookRepository> = Arc::new(MongoBookRepository::new(&mongo_db));
    let author_repo: Arc<dyn AuthorRepository> = Arc::new(MongoAuthorRepository::new(&mongo_db));

    tracing::info!("Connected to MongoDB at {}", config.mongodb.uri);

    if cli.seed_demo || config.demo_mode {
        if let Err(e) = seed_demo_data(author_repo.as_ref(), book_repo.as_ref()).await {
            tracing::error!("Demo seeding failed: {e}");
        }
    }

    let templates = Arc::new(Templates::new().context("Failed to compile templates")?);

    let app_state = AppState {
        book_repo,
        author_repo,
        templates,
    };

    let router = build_router(app_state, &config.public_dir);
    let app = MapRequestLayer::new(override_method).layer(router);

    let addr = config.bind_addr();
    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
