use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{
        auth::auth_handler, health, posts::posts_handler, upload::upload_handler,
        user::users_handler,
    },
    middleware::configure_cors,
    AppState,
};

pub fn create_routes(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/posts", posts_handler())
        .nest("/users", users_handler())
        .nest(
            "/upload",
            upload_handler(app_state.upload_service.max_file_size()),
        );

    Router::new()
        .nest("/api", api_route)
        .route("/health", get(health))
        .nest_service(
            "/uploads",
            ServeDir::new(app_state.upload_service.upload_dir()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(configure_cors(&app_state.config))
        .layer(Extension(app_state))
}
