use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put, MethodRouter},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    middleware::{auth, JWTAuthMiddleware},
    models::{
        posts::{CommentDto, CreatePostDto, UpdatePostDto},
        query::{parse_id, PostListQueryDto},
        response::Response,
    },
    AppState, Error, Result,
};

fn protected(route: MethodRouter) -> MethodRouter {
    route.route_layer(middleware::from_fn(auth))
}

pub fn posts_handler() -> Router {
    Router::new()
        .route("/", get(list_posts).merge(protected(post(create_post))))
        .route(
            "/{id}",
            get(get_post).merge(protected(put(update_post).delete(delete_post))),
        )
        .route("/{id}/like", protected(post(toggle_like)))
        .route("/{id}/comments", protected(post(create_comment)))
        .route(
            "/{id}/comments/{comment_id}",
            protected(delete(delete_comment)),
        )
}

async fn list_posts(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<PostListQueryDto>,
) -> Result<impl IntoResponse> {
    let filter = query.filter()?;
    let posts = app_state
        .posts_service
        .list_posts(filter, query.pagination())
        .await?;

    Ok(Json(posts))
}

async fn get_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse> {
    let post_id = parse_id(&post_id, "post")?;
    let post = app_state.posts_service.get_post(post_id).await?;

    Ok(Json(post))
}

async fn create_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddleware>,
    WithRejection(Json(new_post), _): WithRejection<Json<CreatePostDto>, Error>,
) -> Result<impl IntoResponse> {
    new_post.validate()?;

    let post = app_state
        .posts_service
        .create_post(&user.user, new_post.into())
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddleware>,
    Path(post_id): Path<String>,
    WithRejection(Json(changes), _): WithRejection<Json<UpdatePostDto>, Error>,
) -> Result<impl IntoResponse> {
    changes.validate()?;
    let post_id = parse_id(&post_id, "post")?;

    let post = app_state
        .posts_service
        .update_post(&user.user, post_id, changes.into())
        .await?;

    Ok(Json(post))
}

async fn delete_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddleware>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse> {
    let post_id = parse_id(&post_id, "post")?;
    app_state
        .posts_service
        .delete_post(&user.user, post_id)
        .await?;

    Ok(Json(Response::success("Post deleted successfully")))
}

async fn toggle_like(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddleware>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse> {
    let post_id = parse_id(&post_id, "post")?;
    let likes = app_state
        .posts_service
        .toggle_like(&user.user, post_id)
        .await?;

    Ok(Json(likes))
}

async fn create_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddleware>,
    Path(post_id): Path<String>,
    WithRejection(Json(comment), _): WithRejection<Json<CommentDto>, Error>,
) -> Result<impl IntoResponse> {
    comment.validate()?;
    let post_id = parse_id(&post_id, "post")?;

    let comments = app_state
        .posts_service
        .add_comment(&user.user, post_id, &comment.content)
        .await?;

    Ok((StatusCode::CREATED, Json(comments)))
}

async fn delete_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddleware>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let post_id = parse_id(&post_id, "post")?;
    let comment_id = parse_id(&comment_id, "comment")?;

    app_state
        .posts_service
        .delete_comment(&user.user, post_id, comment_id)
        .await?;

    Ok(Json(Response::success("Comment deleted successfully")))
}
