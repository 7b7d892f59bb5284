use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use tower_cookies::Cookie;
use validator::Validate;

use crate::{
    middleware::{auth, JWTAuthMiddleware},
    models::users::{FilterUserDto, LoginUserDto, RegisterUserDto, UserLoginResponseDto},
    AppState, Error, Result,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route(
            "/me",
            get(get_me).route_layer(middleware::from_fn(auth)),
        )
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(new_user), _): WithRejection<Json<RegisterUserDto>, Error>,
) -> Result<impl IntoResponse> {
    new_user.validate()?;

    let (user, token) = app_state
        .auth_service
        .register(new_user.username, new_user.email, new_user.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserLoginResponseDto {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
            role: None,
            token,
        }),
    ))
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<LoginUserDto>, Error>,
) -> Result<impl IntoResponse> {
    body.validate()?;

    let (user, token) = app_state
        .auth_service
        .login(&body.email, &body.password)
        .await?;

    let cookie_duration = time::Duration::hours(app_state.config.jwt_maxage);
    let cookie = Cookie::build(("token", token.clone()))
        .path("/")
        .max_age(cookie_duration)
        .http_only(true)
        .build();
    let cookie_header =
        HeaderValue::from_str(&cookie.to_string()).map_err(|_| Error::InternalServerError)?;

    let mut response = Json(UserLoginResponseDto {
        id: user.id,
        username: user.username,
        email: user.email,
        avatar: user.avatar,
        role: Some(user.role.to_str().to_string()),
        token,
    })
    .into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, cookie_header);

    Ok(response)
}

pub async fn get_me(Extension(user): Extension<JWTAuthMiddleware>) -> Result<impl IntoResponse> {
    Ok(Json(FilterUserDto::filter_user(&user.user)))
}
