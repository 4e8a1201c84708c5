mod app;
mod db;
mod editor;
mod editors;
mod error;
mod handlers;
mod pagination;
mod posts;
mod ratelimit;
mod render;
mod session;
mod slug;
mod state;
mod template;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ratelimit::LoginLimiter;
use session::SessionGate;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "inkpress", about = "Server-rendered blogging platform")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Path to the SQLite database file (created if missing)
    #[arg(long, env = "DB_PATH", default_value = "inkpress.db")]
    db: PathBuf,

    /// Editor session time-to-live in seconds (sliding)
    #[arg(long, env = "SESSION_TTL", default_value = "86400")]
    session_ttl: u64,

    /// Optional file of editor ids permitted to log in, one per line.
    /// If unset, every account may log in. Re-read only on restart.
    #[arg(long, env = "EDITOR_ALLOWLIST")]
    allowlist: Option<PathBuf>,

    /// Login rate-limit window in seconds
    #[arg(long, env = "LOGIN_WINDOW_SECS", default_value = "600")]
    login_window: u64,

    /// Login attempts per window before delays kick in
    #[arg(long, env = "LOGIN_DELAY_AFTER", default_value = "5")]
    login_delay_after: u32,

    /// Delay step in milliseconds added per attempt past the threshold
    #[arg(long, env = "LOGIN_DELAY_MS", default_value = "250")]
    login_delay_ms: u64,
}

/// Editor accounts are managed offline; there is no signup route.
#[derive(Subcommand, Debug)]
enum Command {
    /// Create an editor account
    AddEditor { username: String, password: String },
    /// Delete an editor account
    RemoveEditor { username: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment, so RUST_LOG set
    // there reaches the filter below. Silently ignored if absent.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkpress=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let pool = db::init_pool(&args.db).await?;

    if let Some(command) = args.command {
        return run_command(command, &pool).await;
    }

    let allowlist = match &args.allowlist {
        Some(path) => {
            let ids = session::load_allowlist(path)?;
            tracing::info!("Editor allowlist loaded: {} id(s) from {}", ids.len(), path.display());
            Some(ids)
        }
        None => None,
    };

    let state = AppState {
        db: pool,
        sessions: Arc::new(SessionGate::new(
            Duration::from_secs(args.session_ttl),
            allowlist,
        )),
        login_limiter: Arc::new(LoginLimiter::new(
            Duration::from_secs(args.login_window),
            args.login_delay_after,
            Duration::from_millis(args.login_delay_ms),
        )),
    };

    // CatchPanicLayer is outermost so it recovers from panics anywhere in the stack.
    let app = app::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new());

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind to {addr}"))?;

    tracing::info!("Listening on http://{addr}");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    Ok(())
}

async fn run_command(command: Command, pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    match command {
        Command::AddEditor { username, password } => {
            let account = editors::create_account(pool, &username, &password)
                .await
                .with_context(|| format!("Cannot create account {username}"))?;
            println!("Created editor {} (id {})", account.username, account.editor_id);
        }
        Command::RemoveEditor { username } => {
            let result = editors::delete_account(pool, &username)
                .await
                .with_context(|| format!("Cannot delete account {username}"))?;
            if result.deleted == 0 {
                println!("No editor named {username}");
            } else {
                println!("Deleted editor {username}");
            }
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result { tracing::error!("ctrl-c error: {}", e); }
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM");
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
    tracing::info!("Shutting down gracefully");
}
