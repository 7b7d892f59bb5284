use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    NotFound(String),
    Unauthorized(String),
    InvalidCredentials,
    InvalidToken,
    TokenExpired,
    Forbidden(String),
    BadRequest(String),
    Validation(Vec<String>),
    Duplicate(String),
    Config(String),
    InternalServerError,
    DatabaseError(sqlx::Error),
    InvalidHashFormat(argon2::password_hash::Error),
    Io(std::io::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_)
            | Self::InvalidCredentials
            | Self::InvalidToken
            | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Validation(_) | Self::Duplicate(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Config(_)
            | Self::InternalServerError
            | Self::DatabaseError(_)
            | Self::InvalidHashFormat(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Config(msg) => msg.clone(),
            Self::InvalidCredentials => "Invalid credentials".to_string(),
            Self::InvalidToken => "Invalid token".to_string(),
            Self::TokenExpired => "Token expired".to_string(),
            Self::Validation(_) => "Validation Error".to_string(),
            Self::Duplicate(field) => format!("{field} already exists"),
            Self::InternalServerError => "Internal server error".to_string(),
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InvalidHashFormat(_) => "Invalid hash format".to_string(),
            Self::Io(_) => "Server Error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(errors) => json!({
                "status": "error",
                "message": self.message(),
                "errors": errors,
            }),
            _ => json!({ "status": "error", "message": self.message() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let field = db_err
                    .constraint()
                    .map(field_from_constraint)
                    .unwrap_or("value");
                return Self::Duplicate(field.to_string());
            }
        }

        error!("Database error: {:?}", err);
        Self::DatabaseError(err)
    }
}

// Unique constraints are named `<table>_<column>_key`.
fn field_from_constraint(constraint: &str) -> &str {
    let trimmed = constraint.strip_suffix("_key").unwrap_or(constraint);
    match trimmed.split_once('_') {
        Some((_, column)) => column,
        None => trimmed,
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        error!("Invalid hash format");
        Self::InvalidHashFormat(err)
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{field} is invalid"))
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        messages.sort();

        Self::Validation(messages)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        error!("I/O error: {:?}", err);
        Self::Io(err)
    }
}

impl From<MultipartError> for Error {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(err.body_text())
    }
}

// A well-formed body with missing or mistyped fields is a validation
// failure; anything else about the body is a plain bad request.
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => Self::Validation(vec![err.body_text()]),
            other => Self::BadRequest(other.body_text()),
        }
    }
}
