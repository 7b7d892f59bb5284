use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::{header, HeaderMap},
    middleware,
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};

use crate::{
    middleware::auth,
    models::response::{MultiUploadResponseDto, UploadResponseDto, UploadedFileDto},
    services::upload::{public_url, UploadService, MAX_FILES},
    AppState, Error, Result,
};

pub fn upload_handler(max_file_size: usize) -> Router {
    // Room for every file of a multi upload plus multipart framing.
    let body_limit = max_file_size * MAX_FILES + 64 * 1024;

    Router::new()
        .route("/", post(upload_single))
        .route("/multiple", post(upload_multiple))
        .route_layer(middleware::from_fn(auth))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// `<scheme>://<host>` of the incoming request.
fn request_base_url(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{scheme}://{host}")
}

/// Stores every file sent under `field_name`, at most `max_files` of them.
/// Nothing stays on disk when any of the files is rejected.
async fn store_files(
    service: &UploadService,
    multipart: &mut Multipart,
    field_name: &str,
    max_files: usize,
) -> Result<Vec<String>> {
    let mut stored = Vec::new();

    match collect_files(service, multipart, field_name, max_files, &mut stored).await {
        Ok(()) => Ok(stored),
        Err(err) => {
            service.discard(&stored).await;
            Err(err)
        }
    }
}

async fn collect_files(
    service: &UploadService,
    multipart: &mut Multipart,
    field_name: &str,
    max_files: usize,
    stored: &mut Vec<String>,
) -> Result<()> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            return Err(Error::BadRequest(format!(
                "Unexpected field, expected '{field_name}'"
            )));
        }
        if stored.len() == max_files {
            return Err(Error::BadRequest(format!(
                "Too many files, at most {max_files} allowed"
            )));
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;

        let filename = service
            .store(content_type.as_deref(), file_name.as_deref(), &bytes)
            .await?;
        stored.push(filename);
    }

    Ok(())
}

async fn upload_single(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut stored = store_files(&app_state.upload_service, &mut multipart, "image", 1).await?;
    let filename = stored
        .pop()
        .ok_or_else(|| Error::BadRequest("No file uploaded".to_string()))?;

    Ok(Json(UploadResponseDto {
        message: "File uploaded successfully".to_string(),
        url: public_url(&request_base_url(&headers), &filename),
        filename,
    }))
}

async fn upload_multiple(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let stored =
        store_files(&app_state.upload_service, &mut multipart, "images", MAX_FILES).await?;
    if stored.is_empty() {
        return Err(Error::BadRequest("No files uploaded".to_string()));
    }

    let base_url = request_base_url(&headers);
    let files = stored
        .into_iter()
        .map(|filename| UploadedFileDto {
            url: public_url(&base_url, &filename),
            filename,
        })
        .collect();

    Ok(Json(MultiUploadResponseDto {
        message: "Files uploaded successfully".to_string(),
        files,
    }))
}
