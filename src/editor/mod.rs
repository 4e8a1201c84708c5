mod handlers;
mod template;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;

use crate::{
    editors,
    error::AppError,
    session::extract_session_cookie,
    state::AppState,
    template as site,
};

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the editor router with full `/editor/*` paths. Merged (not nested)
/// into the main router so the path literals below are what clients see.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/editor/login", get(get_login).post(post_login));

    let protected = Router::new()
        .route(
            "/editor/create",
            get(handlers::get_create).post(handlers::post_create),
        )
        .route(
            "/editor/edit/{slug}",
            get(handlers::get_edit).post(handlers::post_edit),
        )
        .route("/editor/preview", post(handlers::post_preview))
        .route("/editor/delete/{slug}", post(handlers::post_delete))
        .route("/editor/logout", post(post_logout))
        .route_layer(middleware::from_fn_with_state(state, require_editor));

    Router::new().merge(public).merge(protected)
}

// ── Auth middleware ───────────────────────────────────────────────────────────

/// Gate for editor-only routes. Anything without a live session gets the
/// generic not-found page — never a redirect, never a distinct 403 — so an
/// unauthenticated caller cannot tell these routes exist.
async fn require_editor(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let authed = match extract_session_cookie(req.headers()) {
        Some(token) => state.sessions.authenticated(&token).await.is_some(),
        None => false,
    };

    if authed {
        next.run(req).await
    } else {
        AppError::Unauthorized.into_response()
    }
}

// ── Login / logout ────────────────────────────────────────────────────────────

async fn get_login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let logged_in = crate::handlers::logged_in(&state, &headers).await;
    Html(template::login_page(None, logged_in).into_string()).into_response()
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn post_login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if form.username.is_empty() || form.password.is_empty() {
        let markup = template::login_page(Some("No username or password given."), false);
        return Ok(Html(markup.into_string()).into_response());
    }

    // Brute-force mitigation: repeated attempts from one address are slowed
    // down before any credential work happens.
    state.login_limiter.throttle(addr.ip()).await;

    let account = editors::verify_login(&state.db, &form.username, &form.password).await?;

    // A verified account whose editor id is outside the startup allowlist is
    // refused with the same message as bad credentials.
    let account = match account {
        Some(a) if state.sessions.permits(&a.editor_id) => a,
        _ => {
            let markup =
                template::login_page(Some("Username or password is incorrect."), false);
            return Ok(Html(markup.into_string()).into_response());
        }
    };

    tracing::info!("Editor {} logged in", account.username);
    editors::touch_last_login(&state.db, &account.editor_id).await?;

    let token = state.sessions.login(&account.editor_id).await;
    let markup = site::message_page("Login success", "You're logged in!", true);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, state.sessions.cookie(&token))],
        Html(markup.into_string()),
    )
        .into_response())
}

async fn post_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = extract_session_cookie(&headers) {
        state.sessions.logout(&token).await;
    }

    (
        StatusCode::SEE_OTHER,
        [
            (header::SET_COOKIE, state.sessions.clear_cookie()),
            (header::LOCATION, "/".to_string()),
        ],
    )
        .into_response()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

pub(crate) fn redirect_to_article(slug: &str) -> Response {
    Redirect::to(&format!("/blog/article/{}", crate::slug::encode_slug(slug))).into_response()
}
