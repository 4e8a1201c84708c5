use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{html, DOCTYPE};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Not found")]
    NotFound,
    /// Editor action without a valid session. Rendered identically to
    /// `NotFound` so unauthenticated callers cannot confirm the route exists.
    #[error("Unauthorized")]
    Unauthorized,
    #[error("A blog with this title already exists")]
    DuplicateSlug,
    #[error("An account with this username already exists")]
    DuplicateUsername,
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Map an sqlx error to `DuplicateSlug` when it is a unique-constraint
    /// violation, so the storage-layer constraint (not the check-then-insert
    /// pre-check) is what closes the race between concurrent creates.
    pub fn slug_conflict(err: sqlx::Error) -> AppError {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateSlug,
            _ => AppError::Db(err),
        }
    }

    /// Same mapping for the editors table.
    pub fn username_conflict(err: sqlx::Error) -> AppError {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateUsername,
            _ => AppError::Db(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title, message) = match &self {
            AppError::NotFound | AppError::Unauthorized => (
                StatusCode::NOT_FOUND,
                "404 Not Found",
                "The page you requested could not be found.".to_string(),
            ),
            AppError::DuplicateSlug | AppError::DuplicateUsername | AppError::Validation(_) => {
                // Form-level failures are normally rendered on the originating
                // form; this path is the fallback when one escapes a handler.
                (StatusCode::CONFLICT, "Request failed", self.to_string())
            }
            AppError::Db(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "500 Internal Server Error",
                    "An internal server error occurred.".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "500 Internal Server Error",
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (title) }
                }
                body {
                    h1 { (title) }
                    p { (message) }
                }
            }
        };

        (status, Html(body.into_string())).into_response()
    }
}
