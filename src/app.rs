use axum::{
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Router,
};

use crate::{editor, error::AppError, handlers, state::AppState};

/// Assemble the full route table. Layers (tracing, panic recovery) are added
/// by the caller so tests can drive the bare router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { StatusCode::OK }))
        .route("/", get(handlers::get_home))
        .route("/blog/article/{slug}", get(handlers::get_article))
        .route("/blogs", get(handlers::get_blog_list))
        .route("/blogs/page/{page}", get(handlers::get_blog_list_page))
        .route("/blogs/search", post(handlers::post_search))
        // Stray /blogs/* URLs go back to the canonical list.
        .route("/blogs/{*rest}", get(|| async { Redirect::to("/blogs") }))
        .merge(editor::router(state.clone()))
        .fallback(|| async { AppError::NotFound })
        .with_state(state)
}
