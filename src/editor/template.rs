use maud::{html, Markup};

use crate::posts::Post;
use crate::template::layout;

/// Editor login form. `error` renders a message above the form after a
/// failed attempt.
pub fn login_page(error: Option<&str>, logged_in: bool) -> Markup {
    layout(
        "Editor login",
        logged_in,
        html! {
            h1 { "Editor login" }
            @if let Some(msg) = error {
                p class="error" { (msg) }
            }
            form method="post" action="/editor/login" {
                label { "Username"
                    input type="text" name="username" autocomplete="username" required;
                }
                label { "Password"
                    input type="password" name="password" autocomplete="current-password" required;
                }
                button type="submit" { "Log in" }
            }
        },
    )
}

/// The publish form, used for both create (`existing: None`) and edit.
/// The preview button posts the same fields to `/editor/preview` in a new
/// tab, leaving the form intact.
pub fn publish_page(heading: &str, action: &str, existing: Option<&Post>) -> Markup {
    let title = existing.map(|p| p.title.as_str()).unwrap_or("");
    let summary = existing.map(|p| p.summary.as_str()).unwrap_or("");
    let content = existing.map(|p| p.content.as_str()).unwrap_or("");
    let tags = existing
        .map(|p| p.tags.join(", "))
        .unwrap_or_default();

    layout(
        heading,
        true,
        html! {
            h1 { (heading) }
            form method="post" action=(action) {
                label { "Title"
                    input type="text" name="title" value=(title) maxlength="255" required;
                }
                label { "Summary"
                    input type="text" name="summary" value=(summary) maxlength="255" required;
                }
                label { "Tags (comma separated)"
                    input type="text" name="tags" value=(tags);
                }
                label { "Content (markdown)"
                    textarea name="content" rows="24" required { (content) }
                }
                button type="submit" { "Publish" }
                button type="submit" formaction="/editor/preview" formtarget="_blank" {
                    "Preview"
                }
            }
        },
    )
}
