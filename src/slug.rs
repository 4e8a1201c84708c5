/// Maximum length of a display title (and summary), in characters.
pub const TITLE_MAX_CHARS: usize = 255;

/// Derive a URL-safe internal title from a human-entered display title.
///
/// Steps, in order: cap at 255 characters, lowercase, strip disallowed
/// characters (everything that is not a letter, number, separator, or ASCII
/// punctuation — controls, symbols, and marks are removed), trim, replace
/// spaces with hyphens. Punctuation deliberately survives into the slug;
/// hyphens produced here are themselves punctuation, so running the result
/// through `slugify` again is a no-op.
///
/// Lowercasing runs before the filter: some lowercase forms carry a combining
/// mark (`İ` becomes `i` + U+0307) which the filter must see and strip, or
/// the slug would not be a fixed point.
pub fn slugify(title: &str) -> String {
    title
        .chars()
        .take(TITLE_MAX_CHARS)
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_ascii_punctuation()
                || (c.is_whitespace() && !c.is_control())
        })
        .collect::<String>()
        .trim()
        .replace(' ', "-")
}

/// Percent-encode a slug for use as a URL path segment (links, redirect
/// `Location` headers). Slugs keep punctuation, so `%`, `?`, and `#` must
/// not appear raw.
pub fn encode_slug(slug: &str) -> String {
    use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
    const SEGMENT: &AsciiSet = &CONTROLS
        .add(b' ')
        .add(b'"')
        .add(b'#')
        .add(b'%')
        .add(b'/')
        .add(b'<')
        .add(b'>')
        .add(b'?')
        .add(b'`')
        .add(b'{')
        .add(b'}');
    utf8_percent_encode(slug, SEGMENT).to_string()
}

/// Cap a form-supplied field at the display-title limit.
pub fn cap_title(s: &str) -> String {
    if s.chars().count() <= TITLE_MAX_CHARS {
        s.to_string()
    } else {
        s.chars().take(TITLE_MAX_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_title() {
        assert_eq!(slugify("My First Post"), "my-first-post");
    }

    #[test]
    fn punctuation_survives() {
        assert_eq!(slugify("Hello, World!"), "hello,-world!");
    }

    #[test]
    fn control_and_symbol_characters_are_stripped() {
        assert_eq!(slugify("Tabs\tand\u{0007}bells"), "tabsandbells");
        assert_eq!(slugify("Math © stuff"), "math--stuff");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(slugify("  padded title  "), "padded-title");
    }

    #[test]
    fn unicode_letters_are_kept() {
        assert_eq!(slugify("Über Café"), "über-café");
    }

    #[test]
    fn long_titles_are_capped() {
        let long = "a".repeat(400);
        assert_eq!(slugify(&long).chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn slug_is_a_fixed_point() {
        for title in ["My First Post", "Hello, World!", "  Über Café  ", "a-b-c"] {
            let slug = slugify(title);
            assert_eq!(slugify(&slug), slug, "re-slugifying {title:?}");
        }
    }

    #[test]
    fn dotted_capital_i_lowercases_to_a_stable_slug() {
        // Lowercase "İ" is "i" plus a combining dot; the mark must be
        // stripped on the first pass, not on a later one.
        let slug = slugify("İstanbul Notes");
        assert_eq!(slug, "istanbul-notes");
        assert_eq!(slugify(&slug), slug);
    }

    #[test]
    fn slug_encoding_escapes_url_metacharacters() {
        assert_eq!(encode_slug("plain-slug"), "plain-slug");
        assert_eq!(encode_slug("50%-done?"), "50%25-done%3F");
    }

    #[test]
    fn cap_title_counts_chars_not_bytes() {
        let s = "é".repeat(300);
        assert_eq!(cap_title(&s).chars().count(), 255);
        assert_eq!(cap_title("short"), "short");
    }
}
