use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courtqueue::event::spawn_activity_log;
use courtqueue::{
    create_router, AppConfig, AppState, CourtRepository, CourtService, CourtStateListener,
    EventBus, InMemoryCourtRepository, PostgresCourtRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courtqueue=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting court rotation server");
    let config = AppConfig::from_env()?;

    // PostgreSQL when DATABASE_URL is set, otherwise everything lives in memory
    let repository: Arc<dyn CourtRepository> = match &config.server.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            let repository = PostgresCourtRepository::new(pool);
            repository.ensure_schema().await?;
            info!("Using PostgreSQL court repository");
            Arc::new(repository)
        }
        None => {
            info!("DATABASE_URL not set, using in-memory court repository");
            Arc::new(InMemoryCourtRepository::new())
        }
    };

    let event_bus = EventBus::new(config.server.event_channel_capacity);
    let _activity_log = spawn_activity_log(&event_bus);
    let listeners: Vec<Arc<dyn CourtStateListener>> = vec![Arc::new(event_bus.clone())];

    let court_service = CourtService::new(
        repository,
        listeners,
        config.rotation.clone(),
        config.estimator.clone(),
    );

    let address = format!("{}:{}", config.server.host, config.server.port);
    let app_state = AppState::new(Arc::new(court_service), event_bus, config);
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(address = %address, "Server running");
    axum::serve(listener, app).await?;
    Ok(())
}
