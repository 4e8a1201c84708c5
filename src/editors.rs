use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
// rand_core 0.6 is what password-hash/argon2 depends on; must match that version.
use rand_core::OsRng;
use sqlx::{Row, SqlitePool};
use std::sync::OnceLock;

use crate::{db::now_utc, error::AppError};

/// An editor account as seen outside the credential service. No password
/// material ever leaves this module.
#[derive(Debug, Clone)]
pub struct Account {
    pub editor_id: String,
    pub username: String,
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted: u64,
}

/// Hash a password with argon2id and return the PHC string (salt embedded).
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))?
        .to_string();
    Ok(hash)
}

/// Create an editor account with a fresh opaque id. Account creation only
/// happens through the offline CLI; there is no signup route.
pub async fn create_account(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Account, AppError> {
    let editor_id = fresh_id();
    let hash = hash_password(password)?;

    sqlx::query("INSERT INTO editors (editor_id, username, password_hash) VALUES (?, ?, ?)")
        .bind(&editor_id)
        .bind(username)
        .bind(&hash)
        .execute(pool)
        .await
        .map_err(AppError::username_conflict)?;

    Ok(Account {
        editor_id,
        username: username.to_string(),
        last_login: None,
    })
}

/// Verify a username/password pair. Returns the account on a match, `None`
/// on a wrong password or an unknown username.
///
/// Unknown usernames are verified against a fixed dummy hash so both failure
/// modes do the same argon2 work and are indistinguishable by latency.
pub async fn verify_login(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<Account>, AppError> {
    let row = sqlx::query(
        "SELECT editor_id, username, password_hash, last_login FROM editors WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        verify_against(dummy_hash(), password);
        return Ok(None);
    };

    let hash: String = row.get("password_hash");
    if !verify_against(&hash, password) {
        return Ok(None);
    }

    Ok(Some(Account {
        editor_id: row.get("editor_id"),
        username: row.get("username"),
        last_login: row.get("last_login"),
    }))
}

/// Record a successful login time.
pub async fn touch_last_login(pool: &SqlitePool, editor_id: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE editors SET last_login = ? WHERE editor_id = ?")
        .bind(now_utc())
        .bind(editor_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete an account by username. An unknown username reports zero deletions.
pub async fn delete_account(pool: &SqlitePool, username: &str) -> Result<DeleteResult, AppError> {
    let result = sqlx::query("DELETE FROM editors WHERE username = ?")
        .bind(username)
        .execute(pool)
        .await?;
    Ok(DeleteResult {
        deleted: result.rows_affected(),
    })
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn verify_against(hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// PHC string used to equalize work on unknown usernames. Hashed once per
/// process; the password it encodes is never accepted anywhere.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        hash_password("inkpress-dummy-credential").unwrap_or_default()
    })
}

/// 32 random bytes as lowercase hex. Opaque, not derived from the username.
fn fresh_id() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn hash_verifies_and_rejects() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_against(&hash, "hunter2"));
        assert!(!verify_against(&hash, "hunter3"));
    }

    #[tokio::test]
    async fn account_ids_are_opaque_and_distinct() {
        let pool = test_pool().await;
        let a = create_account(&pool, "alice", "pw-a").await.unwrap();
        let b = create_account(&pool, "bob", "pw-b").await.unwrap();

        assert_ne!(a.editor_id, b.editor_id);
        assert_ne!(a.editor_id, a.username);
        assert_eq!(a.editor_id.len(), 64);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let pool = test_pool().await;
        create_account(&pool, "alice", "pw").await.unwrap();

        let err = create_account(&pool, "alice", "other-pw").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
    }

    #[tokio::test]
    async fn login_success_returns_account_without_password_material() {
        let pool = test_pool().await;
        let created = create_account(&pool, "alice", "correct horse").await.unwrap();

        let account = verify_login(&pool, "alice", "correct horse")
            .await
            .unwrap()
            .expect("valid login");
        assert_eq!(account.editor_id, created.editor_id);
        assert_eq!(account.username, "alice");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let pool = test_pool().await;
        create_account(&pool, "alice", "correct horse").await.unwrap();

        let wrong_pw = verify_login(&pool, "alice", "battery staple").await.unwrap();
        let no_user = verify_login(&pool, "nobody", "battery staple").await.unwrap();
        assert!(wrong_pw.is_none());
        assert!(no_user.is_none());
    }

    #[tokio::test]
    async fn last_login_is_recorded() {
        let pool = test_pool().await;
        let account = create_account(&pool, "alice", "pw").await.unwrap();
        assert!(account.last_login.is_none());

        touch_last_login(&pool, &account.editor_id).await.unwrap();
        let account = verify_login(&pool, "alice", "pw").await.unwrap().unwrap();
        assert!(account.last_login.is_some());
    }

    #[tokio::test]
    async fn delete_account_reports_count() {
        let pool = test_pool().await;
        create_account(&pool, "alice", "pw").await.unwrap();

        assert_eq!(delete_account(&pool, "alice").await.unwrap().deleted, 1);
        assert_eq!(delete_account(&pool, "alice").await.unwrap().deleted, 0);
        assert!(verify_login(&pool, "alice", "pw").await.unwrap().is_none());
    }
}
