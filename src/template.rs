use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::pagination::PageWindow;
use crate::posts::{Post, PostSummary};
use crate::render::date_only;
use crate::slug::encode_slug;

/// Shared page shell: head, site nav, footer. `logged_in` switches the nav
/// between the login link and the editor actions.
pub fn layout(page_title: &str, logged_in: bool, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (page_title) }
            }
            body {
                header {
                    nav {
                        a href="/" { "Home" }
                        " | "
                        a href="/blogs" { "Blogs" }
                        " | "
                        @if logged_in {
                            a href="/editor/create" { "New post" }
                            " | "
                            form method="post" action="/editor/logout" style="display:inline" {
                                button type="submit" { "Log out" }
                            }
                        } @else {
                            a href="/editor/login" { "Editor login" }
                        }
                    }
                    form method="post" action="/blogs/search" {
                        input type="text" name="search_term" placeholder="Search titles" required;
                        button type="submit" { "Search" }
                    }
                }
                main {
                    (content)
                }
            }
        }
    }
}

/// Home page: intro plus the most recent posts.
pub fn home(recent: &[PostSummary], logged_in: bool) -> Markup {
    layout(
        "Home",
        logged_in,
        html! {
            h1 { "Home" }
            p { "Latest articles:" }
            @if recent.is_empty() {
                p { em { "Nothing published yet." } }
            } @else {
                ul {
                    @for post in recent {
                        li {
                            a href={ "/blog/article/" (encode_slug(&post.internal_title)) } { (post.title) }
                            " — " (date_only(&post.created_at))
                        }
                    }
                }
                p { a href="/blogs" { "All articles" } }
            }
        },
    )
}

/// One rendered article. `content_html` is the already-rendered (sanitized)
/// markdown body.
pub fn article(
    post: &Post,
    content_html: &str,
    date_string: &str,
    logged_in: bool,
) -> Markup {
    layout(
        &post.title,
        logged_in,
        html! {
            article {
                h1 { (post.title) }
                p class="meta" {
                    (date_string)
                    @if !post.tags.is_empty() {
                        " · "
                        @for (i, tag) in post.tags.iter().enumerate() {
                            @if i > 0 { ", " }
                            span class="tag" { (tag) }
                        }
                    }
                }
                p class="summary" { em { (post.summary) } }
                div class="content" {
                    (PreEscaped(content_html))
                }
            }
            @if logged_in {
                nav class="editor-actions" {
                    a href={ "/editor/edit/" (encode_slug(&post.internal_title)) } { "Edit" }
                    " | "
                    form method="post" action={ "/editor/delete/" (encode_slug(&post.internal_title)) }
                        style="display:inline" {
                        button type="submit" { "Delete" }
                    }
                }
            }
        },
    )
}

/// Paginated post list. An empty window renders the empty-state view.
pub fn list(posts: &[PostSummary], window: &PageWindow, logged_in: bool) -> Markup {
    layout(
        "Blog list",
        logged_in,
        html! {
            h1 { "Blogs" }
            @if window.is_empty() {
                p { em { "No blogs have been published yet." } }
            } @else {
                (post_listing(posts))
                nav class="pages" {
                    @if window.current_page > 1 {
                        a href={ "/blogs/page/" ((window.current_page - 1)) } { "Newer" }
                    }
                    " Page " (window.current_page) " of " (window.page_count) " "
                    @if !window.is_last_page {
                        a href={ "/blogs/page/" ((window.current_page + 1)) } { "Older" }
                    }
                }
            }
        },
    )
}

/// Title-search results, unpaginated.
pub fn search_results(posts: &[PostSummary], term: &str, logged_in: bool) -> Markup {
    layout(
        "Blog search results",
        logged_in,
        html! {
            h1 { "Search results for \"" (term) "\"" }
            @if posts.is_empty() {
                p { em { "No blogs matched." } }
            } @else {
                (post_listing(posts))
            }
        },
    )
}

/// Generic outcome page used for form-level messages (validation failures,
/// duplicate titles, login results).
pub fn message_page(title: &str, message: &str, logged_in: bool) -> Markup {
    layout(
        title,
        logged_in,
        html! {
            h1 { (title) }
            p { (message) }
            p { a href="/blogs" { "Back to the blogs" } }
        },
    )
}

fn post_listing(posts: &[PostSummary]) -> Markup {
    html! {
        ul class="posts" {
            @for post in posts {
                li {
                    a href={ "/blog/article/" (encode_slug(&post.internal_title)) } { (post.title) }
                    " — " (date_only(&post.created_at))
                    p { (post.summary) }
                }
            }
        }
    }
}
