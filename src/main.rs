//! Arena Booking Core Service
//!
//! Connects to Postgres, applies migrations and holds the booking state
//! ready for an embedding transport layer.

use arena_booking::config::AppConfig;
use arena_booking::database::{create_pool, run_migrations, Database};
use arena_booking::error::{AppError, AppResult};
use arena_booking::AppState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    init_tracing(&config);

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Arena Booking Core Starting                     ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);
    info!("Lock timeout: {}ms", config.database.lock_timeout_ms);

    info!("Running database migrations...");
    run_migrations(&pool).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    let database = Database::with_lock_timeout(pool.clone(), config.database.lock_timeout());
    let _app_state = AppState::new(database);
    info!("✓ Slot catalog, reservation workflow and payment ledger initialized");

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Arena Booking Core Ready!                       ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  Environment:  {}                                    ║", config.environment);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received, closing database pool...");

    pool.close().await;
    info!("Arena booking core shutdown complete");
    Ok(())
}

/// Plain output for local development, JSON lines everywhere else
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("arena_booking={},arena_booking_core={},sqlx=warn", config.log_level, config.log_level).into()
    });

    if config.is_development() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    }
}
