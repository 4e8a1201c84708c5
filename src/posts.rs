use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::{db::now_utc, error::AppError};

/// A stored blog post. `content` is raw markdown; it is rendered to sanitized
/// HTML only at display time.
#[derive(Debug, Clone)]
pub struct Post {
    pub internal_title: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// List-view projection of a post. The full `content` column is left out of
/// list and search queries to keep those payloads small.
#[derive(Debug, Clone)]
pub struct PostSummary {
    pub internal_title: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub created_at: String,
}

/// Replacement fields for an edit. The slug may differ from the post's
/// current slug, in which case the update renames the article URL.
#[derive(Debug, Clone)]
pub struct PostFields {
    pub internal_title: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted: u64,
}

/// Cap on search results, matching the list-page cap for unpaginated views.
const SEARCH_LIMIT: i64 = 20;

/// Insert a new post. The UNIQUE constraint on `internal_title` is the
/// authoritative duplicate check; a violation surfaces as
/// `AppError::DuplicateSlug` even when the caller's pre-check raced.
pub async fn create(
    pool: &SqlitePool,
    fields: &PostFields,
) -> Result<Post, AppError> {
    let now = now_utc();
    sqlx::query(
        "INSERT INTO posts (internal_title, title, summary, content, tags, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&fields.internal_title)
    .bind(&fields.title)
    .bind(&fields.summary)
    .bind(&fields.content)
    .bind(encode_tags(&fields.tags))
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .map_err(AppError::slug_conflict)?;

    Ok(Post {
        internal_title: fields.internal_title.clone(),
        title: fields.title.clone(),
        summary: fields.summary.clone(),
        content: fields.content.clone(),
        tags: fields.tags.clone(),
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn get_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Post>, AppError> {
    let row = sqlx::query(
        "SELECT internal_title, title, summary, content, tags, created_at, updated_at
         FROM posts WHERE internal_title = ?",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| post_from_row(&r)))
}

pub async fn exists(pool: &SqlitePool, slug: &str) -> Result<bool, AppError> {
    let row = sqlx::query("SELECT 1 AS one FROM posts WHERE internal_title = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn count(pool: &SqlitePool) -> Result<i64, AppError> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM posts")
        .fetch_one(pool)
        .await?;
    Ok(row.get::<i64, _>("n"))
}

/// Fetch one page of posts, newest first. The slug tie-break keeps the order
/// stable when several posts share a creation timestamp, so repeated calls
/// paginate identically.
pub async fn find_page_sorted(
    pool: &SqlitePool,
    offset: i64,
    limit: i64,
) -> Result<Vec<PostSummary>, AppError> {
    let rows = sqlx::query(
        "SELECT internal_title, title, summary, tags, created_at
         FROM posts
         ORDER BY created_at DESC, internal_title ASC
         LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(summary_from_row).collect())
}

/// Case-insensitive substring search on the display title. The term is
/// LIKE-escaped so user input is always a literal, never a pattern.
pub async fn search_title(pool: &SqlitePool, term: &str) -> Result<Vec<PostSummary>, AppError> {
    let pattern = format!("%{}%", escape_like(term));
    let rows = sqlx::query(
        "SELECT internal_title, title, summary, tags, created_at
         FROM posts
         WHERE title LIKE ? ESCAPE '\\'
         ORDER BY created_at DESC, internal_title ASC
         LIMIT ?",
    )
    .bind(pattern)
    .bind(SEARCH_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(summary_from_row).collect())
}

/// Full field replacement of the post stored under `slug`. A renamed slug
/// that collides with another post surfaces as `DuplicateSlug`.
pub async fn update(
    pool: &SqlitePool,
    slug: &str,
    fields: &PostFields,
) -> Result<UpdateResult, AppError> {
    let result = sqlx::query(
        "UPDATE posts
         SET internal_title = ?, title = ?, summary = ?, content = ?, tags = ?, updated_at = ?
         WHERE internal_title = ?",
    )
    .bind(&fields.internal_title)
    .bind(&fields.title)
    .bind(&fields.summary)
    .bind(&fields.content)
    .bind(encode_tags(&fields.tags))
    .bind(now_utc())
    .bind(slug)
    .execute(pool)
    .await
    .map_err(AppError::slug_conflict)?;

    let n = result.rows_affected();
    Ok(UpdateResult {
        matched: n,
        modified: n,
    })
}

/// Delete the post stored under `slug`. An unknown slug is not an error; it
/// reports zero deletions.
pub async fn delete(pool: &SqlitePool, slug: &str) -> Result<DeleteResult, AppError> {
    let result = sqlx::query("DELETE FROM posts WHERE internal_title = ?")
        .bind(slug)
        .execute(pool)
        .await?;
    Ok(DeleteResult {
        deleted: result.rows_affected(),
    })
}

// ── Row mapping ──────────────────────────────────────────────────────────────

fn post_from_row(r: &SqliteRow) -> Post {
    Post {
        internal_title: r.get("internal_title"),
        title: r.get("title"),
        summary: r.get("summary"),
        content: r.get("content"),
        tags: decode_tags(&r.get::<String, _>("tags")),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

fn summary_from_row(r: &SqliteRow) -> PostSummary {
    PostSummary {
        internal_title: r.get("internal_title"),
        title: r.get("title"),
        summary: r.get("summary"),
        tags: decode_tags(&r.get::<String, _>("tags")),
        created_at: r.get("created_at"),
    }
}

fn encode_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

fn decode_tags(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn fields(slug: &str, title: &str) -> PostFields {
        PostFields {
            internal_title: slug.to_string(),
            title: title.to_string(),
            summary: format!("Summary of {title}"),
            content: "# Hello\n\nBody text.".to_string(),
            tags: vec!["rust".to_string()],
        }
    }

    async fn set_created_at(pool: &SqlitePool, slug: &str, ts: &str) {
        sqlx::query("UPDATE posts SET created_at = ? WHERE internal_title = ?")
            .bind(ts)
            .bind(slug)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let pool = test_pool().await;
        create(&pool, &fields("first-post", "First Post")).await.unwrap();

        let post = get_by_slug(&pool, "first-post").await.unwrap().unwrap();
        assert_eq!(post.title, "First Post");
        assert_eq!(post.tags, vec!["rust"]);
        assert!(exists(&pool, "first-post").await.unwrap());
        assert!(!exists(&pool, "other").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected_and_original_kept() {
        let pool = test_pool().await;
        create(&pool, &fields("taken", "Taken")).await.unwrap();

        let err = create(&pool, &fields("taken", "Taken Again")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateSlug));

        let post = get_by_slug(&pool, "taken").await.unwrap().unwrap();
        assert_eq!(post.title, "Taken");
        assert_eq!(count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn page_sort_is_newest_first_with_slug_tiebreak() {
        let pool = test_pool().await;
        for slug in ["b-post", "a-post", "c-post"] {
            create(&pool, &fields(slug, slug)).await.unwrap();
            set_created_at(&pool, slug, "2026-01-01 00:00:00").await;
        }
        create(&pool, &fields("newest", "newest")).await.unwrap();
        set_created_at(&pool, "newest", "2026-02-01 00:00:00").await;

        let page = find_page_sorted(&pool, 0, 10).await.unwrap();
        let slugs: Vec<&str> = page.iter().map(|p| p.internal_title.as_str()).collect();
        assert_eq!(slugs, ["newest", "a-post", "b-post", "c-post"]);

        // Same call again paginates identically.
        let again = find_page_sorted(&pool, 0, 10).await.unwrap();
        let again_slugs: Vec<&str> = again.iter().map(|p| p.internal_title.as_str()).collect();
        assert_eq!(slugs, again_slugs);
    }

    #[tokio::test]
    async fn offset_and_limit_window_the_result() {
        let pool = test_pool().await;
        for i in 0..5 {
            let slug = format!("post-{i}");
            create(&pool, &fields(&slug, &slug)).await.unwrap();
            set_created_at(&pool, &slug, &format!("2026-01-0{} 00:00:00", i + 1)).await;
        }

        let page = find_page_sorted(&pool, 2, 2).await.unwrap();
        let slugs: Vec<&str> = page.iter().map(|p| p.internal_title.as_str()).collect();
        assert_eq!(slugs, ["post-2", "post-1"]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_literal() {
        let pool = test_pool().await;
        create(&pool, &fields("rust-tips", "Rust Tips")).await.unwrap();
        create(&pool, &fields("go-notes", "Go Notes")).await.unwrap();
        create(&pool, &fields("percent", "100% coverage")).await.unwrap();

        let hits = search_title(&pool, "rust").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].internal_title, "rust-tips");

        // "%" must match literally, not as a wildcard.
        let hits = search_title(&pool, "100%").await.unwrap();
        assert_eq!(hits.len(), 1);
        let hits = search_title(&pool, "100%x").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields_and_can_rename_slug() {
        let pool = test_pool().await;
        create(&pool, &fields("old-slug", "Old Title")).await.unwrap();

        let result = update(&pool, "old-slug", &fields("new-slug", "New Title"))
            .await
            .unwrap();
        assert_eq!(result.matched, 1);

        assert!(get_by_slug(&pool, "old-slug").await.unwrap().is_none());
        let post = get_by_slug(&pool, "new-slug").await.unwrap().unwrap();
        assert_eq!(post.title, "New Title");
    }

    #[tokio::test]
    async fn update_rename_onto_other_post_is_duplicate() {
        let pool = test_pool().await;
        create(&pool, &fields("one", "One")).await.unwrap();
        create(&pool, &fields("two", "Two")).await.unwrap();

        let err = update(&pool, "two", &fields("one", "One Again")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateSlug));
    }

    #[tokio::test]
    async fn update_of_missing_slug_matches_nothing() {
        let pool = test_pool().await;
        let result = update(&pool, "ghost", &fields("ghost", "Ghost")).await.unwrap();
        assert_eq!(result.matched, 0);
    }

    #[tokio::test]
    async fn delete_reports_count_and_tolerates_missing() {
        let pool = test_pool().await;
        create(&pool, &fields("doomed", "Doomed")).await.unwrap();

        assert_eq!(delete(&pool, "doomed").await.unwrap().deleted, 1);
        assert_eq!(delete(&pool, "doomed").await.unwrap().deleted, 0);
    }
}
