//! Render-ready entries derived from source documents.
//!
//! An [`Entry`] is built once per document per build, from the parsed header
//! and the rendered body. Everything the page and feed composers need is
//! computed here so they stay pure formatting code.
//!
//! ## Recognized header keys
//!
//! | Key | Used for | When absent |
//! |-----|----------|-------------|
//! | `title` | card and page title, slug source | file stem |
//! | `slug` | URL override | slug of the title |
//! | `date` | ordering, labels, `pubDate` | undated |
//! | `summary` | card text, feed description | empty |
//! | `cover` | cover image URL | no cover |
//! | `rating` | stars, `n/5` | unrated |
//! | `tags` | shown verbatim | nothing shown |
//!
//! Any other key is kept in [`Entry::metadata`] untouched.

use crate::dates;
use crate::frontmatter::{self, Metadata};
use crate::markdown::Renderer;
use crate::naming::slugify;
use crate::scan::SourceDocument;
use std::io;
use std::path::PathBuf;

/// Highest rating on the scale.
pub const MAX_RATING: f64 = 5.0;

pub const FULL_STAR: char = '\u{2605}';
/// Half steps reuse the filled glyph; pages wrap it in `span.half` so a
/// stylesheet can still tell it apart.
pub const HALF_STAR: char = FULL_STAR;
pub const EMPTY_STAR: char = '\u{2606}';

/// Parse a rating and normalize it to the nearest half step within `[0, 5]`.
///
/// Returns `None` for empty or non-numeric input; `"0"` is a real rating.
pub fn clamp_rating(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let stepped = ((value * 2.0).round() / 2.0).clamp(0.0, MAX_RATING);
    // (-0.25, 0) rounds to -0.0, which would print as "-0/5".
    Some(if stepped == 0.0 { 0.0 } else { stepped })
}

/// Star counts for a clamped rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stars {
    pub full: usize,
    pub half: usize,
    pub empty: usize,
}

impl Stars {
    pub fn from_rating(rating: f64) -> Self {
        let rating = rating.clamp(0.0, MAX_RATING);
        let full = rating.floor() as usize;
        let half = usize::from(rating.fract() != 0.0);
        let empty = MAX_RATING as usize - full - half;
        Self { full, half, empty }
    }

    pub fn full_glyphs(&self) -> String {
        std::iter::repeat_n(FULL_STAR, self.full).collect()
    }

    pub fn half_glyphs(&self) -> String {
        std::iter::repeat_n(HALF_STAR, self.half).collect()
    }

    pub fn empty_glyphs(&self) -> String {
        std::iter::repeat_n(EMPTY_STAR, self.empty).collect()
    }
}

/// One published post.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Source document the entry was read from.
    pub source: PathBuf,
    pub title: String,
    pub slug: String,
    pub raw_date: String,
    pub date_label: String,
    pub summary: String,
    pub cover_url: String,
    pub rating: Option<f64>,
    /// Raw `tags:` value, shown as written.
    pub tags: String,
    pub body_markdown: String,
    pub body_html: String,
    pub metadata: Metadata,
}

impl Entry {
    /// Derive an entry from a loaded document.
    pub fn from_document(doc: &SourceDocument, escape_html: bool) -> Self {
        let (metadata, body) = frontmatter::parse(&doc.raw);
        let field = |key: &str| metadata.get(key).cloned().unwrap_or_default();

        let title = metadata
            .get("title")
            .filter(|t| !t.is_empty())
            .cloned()
            .unwrap_or_else(|| doc.stem().to_string());
        let slug = metadata
            .get("slug")
            .filter(|s| !s.is_empty())
            .map(|s| slugify(s))
            .unwrap_or_else(|| slugify(&title));
        let raw_date = field("date");
        let body_html = Renderer::new(escape_html).render(&body);

        Self {
            source: doc.path.clone(),
            date_label: dates::format_date_label(&raw_date),
            rating: metadata.get("rating").and_then(|r| clamp_rating(r)),
            summary: field("summary"),
            cover_url: field("cover"),
            tags: field("tags"),
            title,
            slug,
            raw_date,
            body_markdown: body,
            body_html,
            metadata,
        }
    }

    pub fn stars(&self) -> Option<Stars> {
        self.rating.map(Stars::from_rating)
    }

    /// `4.5/5`, or `None` when unrated.
    pub fn rating_text(&self) -> Option<String> {
        self.rating.map(|r| format!("{r}/{MAX_RATING}"))
    }

    /// Whether the author asked for a cover (`cover:` present) but left it blank.
    pub fn wants_cover(&self) -> bool {
        self.metadata.contains_key("cover") && self.cover_url.is_empty()
    }

    /// Record a looked-up cover in both the entry and its header.
    pub fn set_cover(&mut self, url: &str) {
        self.cover_url = url.to_string();
        self.metadata.insert("cover".to_string(), url.to_string());
    }

    /// Write the current header and body back over the source document.
    pub fn save(&self) -> io::Result<()> {
        frontmatter::write(&self.source, &self.metadata, &self.body_markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{doc, write_doc};

    // =========================================================================
    // Rating
    // =========================================================================

    #[test]
    fn rating_rounds_to_half() {
        assert_eq!(clamp_rating("4.3"), Some(4.5));
        assert_eq!(clamp_rating("4.2"), Some(4.0));
        assert_eq!(clamp_rating("3.75"), Some(4.0));
        assert_eq!(clamp_rating(" 2 "), Some(2.0));
    }

    #[test]
    fn rating_clamped() {
        assert_eq!(clamp_rating("7"), Some(5.0));
        assert_eq!(clamp_rating("-2"), Some(0.0));
        assert_eq!(clamp_rating("0"), Some(0.0));
    }

    #[test]
    fn small_negative_rating_is_positive_zero() {
        let rating = clamp_rating("-0.2").unwrap();
        assert!(rating.is_sign_positive());

        let entry = Entry::from_document(&doc("a.md", "---
rating: -0.2
---
x"), false);
        assert_eq!(entry.rating_text().as_deref(), Some("0/5"));
    }

    #[test]
    fn unparseable_rating_is_absent() {
        assert_eq!(clamp_rating(""), None);
        assert_eq!(clamp_rating("great"), None);
        assert_eq!(clamp_rating("NaN"), None);
        assert_eq!(clamp_rating("inf"), None);
    }

    #[test]
    fn rating_always_in_range_and_half_step() {
        let mut x = -20.0;
        while x <= 20.0 {
            let r = clamp_rating(&x.to_string()).unwrap();
            assert!((0.0..=MAX_RATING).contains(&r), "{x} -> {r}");
            assert_eq!((r * 2.0).fract(), 0.0, "{x} -> {r}");
            x += 0.13;
        }
    }

    // =========================================================================
    // Stars
    // =========================================================================

    #[test]
    fn stars_counts() {
        assert_eq!(
            Stars::from_rating(3.5),
            Stars { full: 3, half: 1, empty: 1 }
        );
        assert_eq!(
            Stars::from_rating(5.0),
            Stars { full: 5, half: 0, empty: 0 }
        );
        assert_eq!(
            Stars::from_rating(0.0),
            Stars { full: 0, half: 0, empty: 5 }
        );
    }

    #[test]
    fn stars_glyph_runs() {
        let stars = Stars::from_rating(2.5);
        assert_eq!(stars.full_glyphs(), "★★");
        assert_eq!(stars.half_glyphs(), "★");
        assert_eq!(stars.empty_glyphs(), "☆☆");
        assert_eq!(Stars::from_rating(4.0).half_glyphs(), "");
    }

    #[test]
    fn stars_always_five_glyphs() {
        for step in 0..=10 {
            let stars = Stars::from_rating(step as f64 / 2.0);
            assert_eq!(stars.full + stars.half + stars.empty, 5);
            let glyphs = stars.full_glyphs() + &stars.half_glyphs() + &stars.empty_glyphs();
            assert_eq!(glyphs.chars().count(), 5);
        }
    }

    // =========================================================================
    // Entry derivation
    // =========================================================================

    #[test]
    fn derives_fields_from_header() {
        let entry = Entry::from_document(
            &doc(
                "example.md",
                "---\ntitle: Example\nrating: 4.3\nsummary: Short.\ntags: a, b\n---\n\n# Hi\n\nSome **bold** text.",
            ),
            false,
        );
        assert_eq!(entry.title, "Example");
        assert_eq!(entry.slug, "example");
        assert_eq!(entry.rating, Some(4.5));
        assert_eq!(entry.summary, "Short.");
        assert_eq!(entry.tags, "a, b");
        assert_eq!(entry.raw_date, "");
        assert_eq!(entry.date_label, "");
        assert!(entry.body_html.contains("<h1>Hi</h1>"));
        assert!(entry.body_html.contains("<p>Some <strong>bold</strong> text.</p>"));
    }

    #[test]
    fn title_defaults_to_file_stem() {
        let entry = Entry::from_document(&doc("my-notes.md", "Just text."), false);
        assert_eq!(entry.title, "my-notes");
        assert_eq!(entry.slug, "my-notes");
        assert!(entry.metadata.is_empty());
    }

    #[test]
    fn slug_override_is_slugified() {
        let entry = Entry::from_document(
            &doc("a.md", "---\ntitle: Anything\nslug: Custom Path!\n---\nx"),
            false,
        );
        assert_eq!(entry.slug, "custom-path");
    }

    #[test]
    fn date_label_derived() {
        let entry = Entry::from_document(&doc("a.md", "---\ndate: 2024-01-01\n---\nx"), false);
        assert_eq!(entry.raw_date, "2024-01-01");
        assert_eq!(entry.date_label, "Jan 1, 2024");
    }

    #[test]
    fn unrated_entry_has_no_stars() {
        let entry = Entry::from_document(&doc("a.md", "---\nrating: soon\n---\nx"), false);
        assert_eq!(entry.rating, None);
        assert_eq!(entry.stars(), None);
        assert_eq!(entry.rating_text(), None);
    }

    #[test]
    fn rating_text_format() {
        let entry = Entry::from_document(&doc("a.md", "---\nrating: 4\n---\nx"), false);
        assert_eq!(entry.rating_text().as_deref(), Some("4/5"));
        let entry = Entry::from_document(&doc("b.md", "---\nrating: 3.5\n---\nx"), false);
        assert_eq!(entry.rating_text().as_deref(), Some("3.5/5"));
    }

    #[test]
    fn escape_setting_reaches_renderer() {
        let entry = Entry::from_document(&doc("a.md", "<b>x</b>"), true);
        assert_eq!(entry.body_html, "<p>&lt;b&gt;x&lt;/b&gt;</p>");
    }

    #[test]
    fn wants_cover_only_when_key_present_and_blank() {
        let blank = Entry::from_document(&doc("a.md", "---\ncover:\n---\nx"), false);
        assert!(blank.wants_cover());
        let missing = Entry::from_document(&doc("b.md", "---\ntitle: B\n---\nx"), false);
        assert!(!missing.wants_cover());
        let set = Entry::from_document(&doc("c.md", "---\ncover: https://x/c.jpg\n---\nx"), false);
        assert!(!set.wants_cover());
    }

    #[test]
    fn set_cover_then_save_rewrites_one_line() {
        let tmp = tempfile::TempDir::new().unwrap();
        let raw = "---\ntitle: A\ncover:\nrating: 4\n---\nBody";
        write_doc(tmp.path(), "a.md", raw);
        let mut entry = Entry::from_document(&doc("a.md", raw), false);
        entry.source = tmp.path().join("a.md");

        entry.set_cover("https://x/c.jpg");
        entry.save().unwrap();

        assert_eq!(entry.cover_url, "https://x/c.jpg");
        assert_eq!(
            std::fs::read_to_string(&entry.source).unwrap(),
            "---\ntitle: A\ncover: https://x/c.jpg\nrating: 4\n---\n\nBody\n"
        );
    }
}
