use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{config::Config, models::users::User, AppState, Error, Result};

/// The authenticated caller, attached to the request by [`auth`].
#[derive(Debug, Clone)]
pub struct JWTAuthMiddleware {
    pub user: User,
}

fn extract_token(req: &Request) -> Option<String> {
    let cookies = CookieJar::from_headers(req.headers());

    cookies
        .get("token")
        .map(|c| c.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| {
                    auth_value
                        .strip_prefix("Bearer ")
                        .map(|stripped| stripped.trim().to_string())
                })
        })
        .filter(|token| !token.is_empty())
}

pub async fn auth(mut req: Request, next: Next) -> Result<impl IntoResponse> {
    let app_state = req
        .extensions()
        .get::<Arc<AppState>>()
        .cloned()
        .ok_or(Error::InternalServerError)?;

    let token = extract_token(&req)
        .ok_or_else(|| Error::Unauthorized("Not authorized, no token".to_string()))?;

    let user_id = app_state.auth_service.decode_token(token)?;

    let user = app_state
        .users_service
        .get_user(user_id)
        .await
        .map_err(|err| match err {
            Error::NotFound(_) => Error::Unauthorized("User not found".to_string()),
            other => other,
        })?;

    req.extensions_mut().insert(JWTAuthMiddleware { user });

    Ok(next.run(req).await)
}

pub fn configure_cors(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = std::iter::once("http://localhost:5173")
        .chain(config.client_url.as_deref())
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
