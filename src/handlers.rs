use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    pagination::{paginate, PAGE_SIZE},
    posts,
    render::{date_only, render_markdown},
    session::extract_session_cookie,
    state::AppState,
    template,
};

/// Whether the request carries a live editor session. Public pages only use
/// this to switch the nav; it gates nothing here.
pub async fn logged_in(state: &AppState, headers: &HeaderMap) -> bool {
    match extract_session_cookie(headers) {
        Some(token) => state.sessions.authenticated(&token).await.is_some(),
        None => false,
    }
}

pub async fn get_home(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let recent = posts::find_page_sorted(&state.db, 0, 5).await?;
    let logged_in = logged_in(&state, &headers).await;
    Ok(Html(template::home(&recent, logged_in).into_string()).into_response())
}

pub async fn get_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let post = posts::get_by_slug(&state.db, &slug)
        .await?
        .ok_or(AppError::NotFound)?;

    let content_html = render_markdown(&post.content);
    let date = date_only(&post.created_at).to_string();
    let logged_in = logged_in(&state, &headers).await;

    Ok(Html(template::article(&post, &content_html, &date, logged_in).into_string())
        .into_response())
}

pub async fn get_blog_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    render_list_page(&state, &headers, 1).await
}

pub async fn get_blog_list_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(page): Path<String>,
) -> Result<Response, AppError> {
    // A non-numeric page segment falls back to page 1 rather than erroring.
    let requested = page.parse::<i64>().unwrap_or(1);
    render_list_page(&state, &headers, requested).await
}

async fn render_list_page(
    state: &AppState,
    headers: &HeaderMap,
    requested_page: i64,
) -> Result<Response, AppError> {
    let total = posts::count(&state.db).await?;
    let window = paginate(total, requested_page, PAGE_SIZE);

    let page = if window.is_empty() {
        Vec::new()
    } else {
        posts::find_page_sorted(&state.db, window.offset, window.limit).await?
    };

    let logged_in = logged_in(state, headers).await;
    Ok(Html(template::list(&page, &window, logged_in).into_string()).into_response())
}

#[derive(Deserialize)]
pub struct SearchForm {
    pub search_term: String,
}

pub async fn post_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SearchForm>,
) -> Result<Response, AppError> {
    let term = form.search_term.trim();
    let logged_in = logged_in(&state, &headers).await;

    if term.is_empty() {
        let markup = template::message_page(
            "Blog search",
            "No search term was given.",
            logged_in,
        );
        return Ok(Html(markup.into_string()).into_response());
    }

    let hits = posts::search_title(&state.db, term).await?;
    Ok(Html(template::search_results(&hits, term, logged_in).into_string()).into_response())
}
