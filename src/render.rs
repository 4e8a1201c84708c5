/// Render stored markdown to HTML for display. Raw HTML passthrough is
/// disabled so post content is sanitized at display time, never at save time.
pub fn render_markdown(content: &str) -> String {
    let mut opts = markdown::Options::gfm();
    opts.parse.constructs.frontmatter = false;
    opts.compile.allow_dangerous_html = false;
    markdown::to_html_with_options(content, &opts).unwrap_or_else(|_| markdown::to_html(content))
}

/// Reduce a stored `YYYY-MM-DD HH:MM:SS` timestamp to its date part.
pub fn date_only(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}

/// Today's UTC date, for preview rendering.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
