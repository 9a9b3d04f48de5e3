//! Slug derivation for entry URLs and source file names.
//!
//! Every entry is published under `<entries_dir>/<slug>/`, and the `new` and
//! `fetch-cover` commands locate source documents as `<slug>.md`, so all of
//! them go through the one function here.
//!
//! ## Rules
//!
//! - Lower-case the input.
//! - Every maximal run of characters outside `[a-z0-9]` becomes one `-`.
//! - Leading and trailing dashes are stripped.
//! - An empty result falls back to [`FALLBACK_SLUG`].
//!
//! ```text
//! "The Left Hand of Darkness" → "the-left-hand-of-darkness"
//! "Piranesi!!"                → "piranesi"
//! "Café Society"              → "caf-society"
//! "???"                       → "post"
//! ```
//!
//! Non-ASCII letters are treated as separators rather than transliterated, so
//! output stays within `[a-z0-9-]` no matter what the title contains.

/// Slug used when a title has no ASCII alphanumerics at all.
pub const FALLBACK_SLUG: &str = "post";

/// Turn a title (or explicit `slug:` override) into a URL-safe slug.
///
/// Idempotent: `slugify(&slugify(x)) == slugify(x)`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}
