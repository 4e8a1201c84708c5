use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{ratelimit::LoginLimiter, session::SessionGate};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub sessions: Arc<SessionGate>,
    pub login_limiter: Arc<LoginLimiter>,
}
