use config::Config;
use repositories::{posts_repo::PostsRepository, user_repo::UserRepository, PostgresRepo};
use routes::create_routes;
use services::{
    auth::AuthService, posts::PostsService, upload::UploadService, user::UserService,
};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use std::sync::Arc;

pub use self::errors::{Error, Result};

mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth_service: AuthService,
    pub posts_service: PostsService,
    pub users_service: UserService,
    pub upload_service: UploadService,
}

impl AppState {
    pub fn new(
        config: Config,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostsRepository>,
    ) -> Self {
        let posts_service = PostsService::new(posts);

        Self {
            auth_service: AuthService::new(
                users.clone(),
                config.jwt_secret.clone(),
                config.jwt_maxage,
            ),
            users_service: UserService::new(users, posts_service.clone()),
            posts_service,
            upload_service: UploadService::new(&config.upload_dir, config.max_upload_size),
            config,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,blog_api=debug,tower_http=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let config = match Config::init() {
        Ok(config) => config,
        Err(err) => {
            error!("🔥 Invalid configuration: {}", err.message());
            std::process::exit(1);
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("✅ Connection to the database is successful!");
            pool
        }
        Err(err) => {
            error!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
        error!("🔥 Failed to run database migrations: {:?}", err);
        std::process::exit(1);
    }

    let repo = Arc::new(PostgresRepo::new(pool));
    let app_state = AppState::new(config.clone(), repo.clone(), repo);

    if let Err(err) = app_state.upload_service.init().await {
        error!(
            "🔥 Failed to prepare upload directory {}: {}",
            config.upload_dir,
            err.message()
        );
        std::process::exit(1);
    }

    let app = create_routes(Arc::new(app_state));

    let listener = match tokio::net::TcpListener::bind(format!("[::]:{}", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("🔥 Failed to bind port {}: {:?}", config.port, err);
            std::process::exit(1);
        }
    };

    info!("🚀 Server listening on port {}", config.port);
    if let Err(err) = axum::serve(listener, app).await {
        error!("🔥 Server error: {:?}", err);
        std::process::exit(1);
    }
}
