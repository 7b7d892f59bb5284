use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    middleware::{auth, JWTAuthMiddleware},
    models::{
        query::{parse_id, PaginationQueryDto},
        users::{UpdateProfileDto, UpdatedProfileDto},
    },
    AppState, Error, Result,
};

pub fn users_handler() -> Router {
    Router::new()
        .route(
            "/profile",
            put(update_profile).route_layer(middleware::from_fn(auth)),
        )
        .route("/{id}", get(get_profile))
        .route("/{id}/posts", get(get_user_posts))
}

async fn get_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse> {
    let user_id = parse_id(&user_id, "user")?;
    let profile = app_state.users_service.get_profile(user_id).await?;

    Ok(Json(profile))
}

async fn update_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddleware>,
    WithRejection(Json(body), _): WithRejection<Json<UpdateProfileDto>, Error>,
) -> Result<impl IntoResponse> {
    let body = body.normalized();
    body.validate()?;

    let updated = app_state
        .users_service
        .update_profile(&user.user, body.into())
        .await?;

    Ok(Json(UpdatedProfileDto::from(&updated)))
}

async fn get_user_posts(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<PaginationQueryDto>,
) -> Result<impl IntoResponse> {
    let user_id = parse_id(&user_id, "user")?;
    let posts = app_state
        .users_service
        .posts_by_author(user_id, query.pagination())
        .await?;

    Ok(Json(posts))
}
