use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    posts::{self, Post, PostFields},
    render::{render_markdown, today},
    slug::{cap_title, slugify},
    state::AppState,
    template as site,
};

use super::{redirect_to_article, template};

/// The publish form, shared by create and edit. Tags arrive comma-separated.
#[derive(Deserialize)]
pub struct PublishForm {
    pub title: String,
    pub summary: String,
    pub content: String,
    #[serde(default)]
    pub tags: String,
}

impl PublishForm {
    /// Reject blank required fields; returns the user-facing message.
    fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty()
            || self.summary.trim().is_empty()
            || self.content.trim().is_empty()
        {
            return Err(AppError::Validation(
                "Title, summary, or content was left blank.".to_string(),
            ));
        }
        Ok(())
    }

    /// Normalize the form into storable fields plus the derived slug.
    fn into_fields(self) -> Result<PostFields, AppError> {
        let title = cap_title(self.title.trim());
        let internal_title = slugify(&title);
        if internal_title.is_empty() {
            return Err(AppError::Validation(
                "The title contains no characters usable in a URL.".to_string(),
            ));
        }

        Ok(PostFields {
            internal_title,
            title,
            summary: cap_title(self.summary.trim()),
            content: self.content,
            tags: parse_tags(&self.tags),
        })
    }
}

fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render a form-level failure on the response page instead of surfacing an
/// HTTP error; anything else propagates.
fn form_message(title: &str, err: AppError) -> Result<Response, AppError> {
    match err {
        AppError::Validation(msg) => {
            Ok(Html(site::message_page(title, &msg, true).into_string()).into_response())
        }
        AppError::DuplicateSlug => Ok(Html(
            site::message_page(title, "A blog with this title already exists.", true)
                .into_string(),
        )
        .into_response()),
        other => Err(other),
    }
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn get_create() -> Response {
    Html(template::publish_page("Create a blog", "/editor/create", None).into_string())
        .into_response()
}

pub async fn post_create(
    State(state): State<AppState>,
    Form(form): Form<PublishForm>,
) -> Result<Response, AppError> {
    const ERROR_TITLE: &str = "Blog creation error";

    if let Err(e) = form.validate() {
        return form_message(ERROR_TITLE, e);
    }
    let fields = match form.into_fields() {
        Ok(f) => f,
        Err(e) => return form_message(ERROR_TITLE, e),
    };

    // Friendly pre-check; the UNIQUE constraint still decides the race.
    if posts::exists(&state.db, &fields.internal_title).await? {
        return form_message(ERROR_TITLE, AppError::DuplicateSlug);
    }

    match posts::create(&state.db, &fields).await {
        Ok(post) => {
            tracing::info!("Created blog {}", post.internal_title);
            Ok(redirect_to_article(&post.internal_title))
        }
        Err(e) => form_message(ERROR_TITLE, e),
    }
}

// ── Edit ──────────────────────────────────────────────────────────────────────

pub async fn get_edit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let Some(post) = posts::get_by_slug(&state.db, &slug).await? else {
        let markup = site::message_page("Edit blog error", "This blog does not exist.", true);
        return Ok(Html(markup.into_string()).into_response());
    };

    let heading = format!("Editing: {}", post.title);
    let action = format!("/editor/edit/{}", crate::slug::encode_slug(&slug));
    Ok(Html(template::publish_page(&heading, &action, Some(&post)).into_string())
        .into_response())
}

pub async fn post_edit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Form(form): Form<PublishForm>,
) -> Result<Response, AppError> {
    const ERROR_TITLE: &str = "Blog update error";

    if let Err(e) = form.validate() {
        return form_message(ERROR_TITLE, e);
    }
    let fields = match form.into_fields() {
        Ok(f) => f,
        Err(e) => return form_message(ERROR_TITLE, e),
    };

    if !posts::exists(&state.db, &slug).await? {
        let markup = site::message_page(ERROR_TITLE, "This blog does not exist.", true);
        return Ok(Html(markup.into_string()).into_response());
    }

    // A rename must not collide with a different post; keeping the same slug
    // is a no-op rename and always allowed.
    if fields.internal_title != slug && posts::exists(&state.db, &fields.internal_title).await? {
        return form_message(ERROR_TITLE, AppError::DuplicateSlug);
    }

    match posts::update(&state.db, &slug, &fields).await {
        Ok(result) if result.matched == 1 => {
            tracing::info!("Updated blog {} -> {}", slug, fields.internal_title);
            Ok(redirect_to_article(&fields.internal_title))
        }
        Ok(_) => {
            let markup = site::message_page(ERROR_TITLE, "The blog was not updated.", true);
            Ok(Html(markup.into_string()).into_response())
        }
        Err(e) => form_message(ERROR_TITLE, e),
    }
}

// ── Preview ───────────────────────────────────────────────────────────────────

/// Render an unsaved draft exactly like a published article. Nothing is
/// persisted; the draft lives only in this request.
pub async fn post_preview(
    State(_state): State<AppState>,
    Form(form): Form<PublishForm>,
) -> Result<Response, AppError> {
    let date = today();
    let draft = Post {
        internal_title: String::new(),
        title: format!("PREVIEW: {}", cap_title(form.title.trim())),
        summary: cap_title(form.summary.trim()),
        content: form.content.clone(),
        tags: parse_tags(&form.tags),
        created_at: date.clone(),
        updated_at: date.clone(),
    };

    let content_html = render_markdown(&draft.content);
    Ok(Html(site::article(&draft, &content_html, &date, true).into_string()).into_response())
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn post_delete(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let result = posts::delete(&state.db, &slug).await?;

    if result.deleted == 1 {
        tracing::info!("Deleted blog {}", slug);
        Ok(Redirect::to("/blogs").into_response())
    } else {
        let markup = site::message_page("Blog delete error", "This blog does not exist.", true);
        Ok(Html(markup.into_string()).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_trims_and_drops_empties() {
        assert_eq!(parse_tags("rust, web , ,blog"), ["rust", "web", "blog"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn blank_fields_fail_validation() {
        let form = PublishForm {
            title: "Title".to_string(),
            summary: "  ".to_string(),
            content: "body".to_string(),
            tags: String::new(),
        };
        assert!(matches!(form.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn fields_derive_slug_from_capped_title() {
        let form = PublishForm {
            title: "  My New Post!  ".to_string(),
            summary: "sum".to_string(),
            content: "body".to_string(),
            tags: "a,b".to_string(),
        };
        let fields = form.into_fields().unwrap();
        assert_eq!(fields.title, "My New Post!");
        assert_eq!(fields.internal_title, "my-new-post!");
        assert_eq!(fields.tags, ["a", "b"]);
    }

    #[test]
    fn unusable_title_is_rejected() {
        let form = PublishForm {
            title: "\u{0007}\u{0007}".to_string(),
            summary: "sum".to_string(),
            content: "body".to_string(),
            tags: String::new(),
        };
        assert!(matches!(form.into_fields(), Err(AppError::Validation(_))));
    }
}
