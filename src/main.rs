use std::sync::Arc;

use bullpen::api;
use bullpen::config::Config;
use bullpen::services::{
    CompetitionCatalog, LeaderboardService, ParticipationRegistry, PortfolioService, SqliteStore,
};
use bullpen::sources::YahooQuoteClient;
use bullpen::AppState;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bullpen=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting Bullpen server on {}:{}", config.host, config.port);

    // Open the portfolio store
    let store = Arc::new(SqliteStore::new(&config.database_path)?);
    info!("Using database at {}", config.database_path);

    // Seed the competition roster
    let anchor = config
        .competition_anchor
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let catalog = Arc::new(CompetitionCatalog::standard_roster(anchor));
    info!(
        "Seeded {} competitions anchored at {}",
        catalog.competitions().len(),
        anchor
    );

    // Wire up services
    let portfolio_service = PortfolioService::new(Arc::clone(&store));
    let registry = ParticipationRegistry::new(Arc::clone(&store), Arc::clone(&catalog));
    let leaderboard =
        LeaderboardService::with_window(portfolio_service.clone(), config.leaderboard_size);
    let quote_client = Arc::new(YahooQuoteClient::with_timeout(
        std::time::Duration::from_secs(config.quote_timeout_secs),
    ));

    // Create application state
    let state = AppState {
        config: config.clone(),
        portfolio_service,
        catalog,
        registry: registry.clone(),
        leaderboard,
        quote_client,
    };

    // Start the periodic participation sweep
    {
        let registry = registry.clone();
        let interval = config.sweep_interval_secs;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
                if let Err(e) = registry.close_completed() {
                    error!("Participation sweep failed: {}", e);
                }
            }
        });
    }

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = api::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Bullpen server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
