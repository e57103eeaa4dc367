use std::net::SocketAddr;

use axum::middleware;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tour_booking_backend::{
    config::Config,
    db,
    entities::user::{self, UserRole},
    handlers::auth::hash_password,
    middleware::rate_limit::{create_global_governor, log_request},
    payment::MidtransClient,
    routes, AppResult, AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tour_booking_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Starting server at {}", config.server_addr());

    // Connect to database
    let db = db::connect(&config)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");

    // Run migrations
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Migrations complete");

    // Seed admin account if not exists
    seed_admin(&db, &config)
        .await
        .expect("Failed to seed admin account");

    let gateway = MidtransClient::new(
        config.payment_base_url.clone(),
        config.payment_server_key.clone(),
    )
    .expect("Failed to build payment gateway client");

    // Create app state
    let state = AppState {
        db,
        config: config.clone(),
        gateway,
    };

    // Create router with middleware
    let app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(create_global_governor())
        .layer(middleware::from_fn(log_request));

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}

/// Seed the admin account if it doesn't exist
async fn seed_admin(db: &DatabaseConnection, config: &Config) -> AppResult<()> {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&config.admin_email))
        .one(db)
        .await?;

    if existing.is_some() {
        return Ok(());
    }

    let admin = user::ActiveModel {
        name: Set("Admin".to_string()),
        email: Set(config.admin_email.clone()),
        phone: Set("-".to_string()),
        password_hash: Set(hash_password(&config.admin_password)?),
        role: Set(UserRole::Admin),
        ..Default::default()
    };

    admin.insert(db).await?;
    tracing::info!("Admin account created: {}", config.admin_email);

    Ok(())
}
