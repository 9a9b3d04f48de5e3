//! HTML page generation.
//!
//! Pure functions from entries and config to markup. Nothing here touches the
//! filesystem; the pipeline decides where each page lands.
//!
//! ## Generated Pages
//!
//! - **Home page** (`/index.html`): tagline, then one card per entry in the
//!   order the pipeline sorted them
//! - **Entry pages** (`/{entries_dir}/{slug}/index.html`): cover, title,
//!   date and tags, rating, rendered body
//!
//! ## Page Layout
//!
//! Every page shares one document shell:
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │ [ad] Ali in Drafts                        Home │  ← header (Home on entry pages)
//! ├────────────────────────────────────────────────┤
//! │  main                                          │
//! │  ┌──────────────────────────────────────────┐  │
//! │  │ Piranesi                     Mar 2, 2024 │  │  ← post-card
//! │  │ A house of endless halls.                │  │
//! │  │ ★★★★★ 4.5/5                              │  │
//! │  └──────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────┘
//!                                              RSS    ← footer
//! ```
//!
//! ## Links
//!
//! All in-site links are relative, so the output works from `file://`, from
//! `shelfmark serve`, and from any subpath on a static host. The one
//! exception is the feed `<link rel="alternate">`, which is absolute when a
//! base URL is configured so feed readers can discover it.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templates.
//! Titles, summaries, tags and URLs are escaped by maud; the rendered body is
//! inserted as-is through `PreEscaped`.

use crate::config::{PathsConfig, SiteConfig};
use crate::entry::{Entry, Stars};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::path::{Component, Path, PathBuf};

const CSS: &str = include_str!("../static/style.css");

// ============================================================================
// Paths and links
// ============================================================================

/// Output path of an entry page, relative to the output root.
pub fn entry_path(paths: &PathsConfig, slug: &str) -> PathBuf {
    Path::new(&paths.entries_dir)
        .join(slug)
        .join(&paths.index_document)
}

/// Link from the home page to an entry page.
pub fn entry_href(paths: &PathsConfig, slug: &str) -> String {
    format!(
        "{}/{slug}/{}",
        paths.entries_dir.trim_end_matches('/'),
        paths.index_document
    )
}

/// Relative prefix leading from an entry page back to the output root.
fn entry_root_prefix(paths: &PathsConfig) -> String {
    let depth = Path::new(&paths.entries_dir)
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count();
    "../".repeat(depth + 1)
}

/// Feed URL for `<link rel="alternate">`.
fn feed_alternate_href(config: &SiteConfig, root_prefix: &str) -> String {
    match &config.site.base_url {
        Some(base) => format!("{base}/{}", config.paths.feed),
        None => format!("{root_prefix}{}", config.paths.feed),
    }
}

/// Two-letter mark shown in the logo: first letters of the first and last
/// words of the site title.
fn monogram(title: &str) -> String {
    let words: Vec<&str> = title.split_whitespace().collect();
    let initial = |w: Option<&&str>| w.and_then(|w| w.chars().next());
    [initial(words.first()), initial(words.last())]
        .into_iter()
        .flatten()
        .take(if words.len() > 1 { 2 } else { 1 })
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================================
// HTML Components
// ============================================================================

/// Location of the page being rendered, relative to the output root.
struct PageContext<'a> {
    config: &'a SiteConfig,
    /// `""` for the home page, `"../../"` for entry pages.
    root_prefix: String,
    show_home_link: bool,
}

/// Renders the base HTML document structure
fn base_document(ctx: &PageContext, title: &str, description: &str, content: Markup) -> Markup {
    let site = &ctx.config.site;
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                meta name="description" content=(description);
                link rel="alternate" type="application/rss+xml" title=(site.title)
                    href=(feed_alternate_href(ctx.config, &ctx.root_prefix));
                style { (PreEscaped(CSS)) }
            }
            body {
                (site_header(ctx))
                main {
                    (content)
                }
                footer.site-footer {
                    a href={ (ctx.root_prefix) (ctx.config.paths.feed) } { "RSS" }
                }
            }
        }
    }
}

/// Renders the site header with logo and navigation
fn site_header(ctx: &PageContext) -> Markup {
    let title = &ctx.config.site.title;
    html! {
        header.site-header {
            div.logo {
                span.mark { (monogram(title)) }
                (title)
            }
            nav {
                @if ctx.show_home_link {
                    a href={ (ctx.root_prefix) (ctx.config.paths.index_document) } { "Home" }
                }
            }
        }
    }
}

/// Star glyphs; the half step is wrapped so it can be styled apart.
fn render_stars(stars: Stars) -> Markup {
    html! {
        span.stars {
            (stars.full_glyphs())
            @if stars.half > 0 {
                span.half { (stars.half_glyphs()) }
            }
            (stars.empty_glyphs())
        }
    }
}

fn rating_block(entry: &Entry) -> Markup {
    html! {
        @if let (Some(stars), Some(text)) = (entry.stars(), entry.rating_text()) {
            div.rating {
                (render_stars(stars))
                span.value { (text) }
            }
        }
    }
}

// ============================================================================
// Pages
// ============================================================================

/// Renders the home page listing every entry.
pub fn render_index(entries: &[Entry], config: &SiteConfig) -> Markup {
    let ctx = PageContext {
        config,
        root_prefix: String::new(),
        show_home_link: false,
    };

    let content = html! {
        article {
            p.meta { (config.site.tagline) }
            @for entry in entries {
                article.post-card {
                    div {
                        h2 {
                            a href=(entry_href(&config.paths, &entry.slug)) { (entry.title) }
                        }
                        p { (entry.summary) }
                        (rating_block(entry))
                    }
                    time { (entry.date_label) }
                }
            }
            @if entries.is_empty() {
                p {
                    "No posts yet. Add a markdown file in "
                    code { (config.paths.source.display().to_string()) "/" }
                    "."
                }
            }
        }
    };

    base_document(&ctx, &config.site.title, &config.site.description, content)
}

/// Renders one entry page.
pub fn render_entry_page(entry: &Entry, config: &SiteConfig) -> Markup {
    let ctx = PageContext {
        config,
        root_prefix: entry_root_prefix(&config.paths),
        show_home_link: true,
    };

    let has_date = !entry.date_label.is_empty();
    let has_tags = !entry.tags.is_empty();
    let has_cover = !entry.cover_url.is_empty();

    let content = html! {
        article {
            div.post-hero.no-cover[!has_cover] {
                @if has_cover {
                    div {
                        img.cover src=(entry.cover_url) alt={ "Cover of " (entry.title) } loading="lazy";
                    }
                }
                div {
                    h1 { (entry.title) }
                    p.meta {
                        @if has_date {
                            time datetime=(entry.raw_date) { (entry.date_label) }
                        }
                        @if has_date && has_tags { " · " }
                        @if has_tags {
                            span { "Tags: " (entry.tags) }
                        }
                    }
                    (rating_block(entry))
                }
            }
            (PreEscaped(&entry.body_html))
        }
    };

    let title = format!("{} — {}", entry.title, config.site.title);
    let description = if entry.summary.is_empty() {
        &entry.title
    } else {
        &entry.summary
    };
    base_document(&ctx, &title, description, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{DISPOSSESSED, PIRANESI, UNDATED, entry};

    fn config() -> SiteConfig {
        SiteConfig::default()
    }

    // =========================================================================
    // Links
    // =========================================================================

    #[test]
    fn entry_links_and_paths() {
        let paths = PathsConfig::default();
        assert_eq!(entry_href(&paths, "piranesi"), "posts/piranesi/index.html");
        assert_eq!(
            entry_path(&paths, "piranesi"),
            PathBuf::from("posts/piranesi/index.html")
        );
        assert_eq!(entry_root_prefix(&paths), "../../");
    }

    #[test]
    fn nested_entries_dir_deepens_prefix() {
        let paths = PathsConfig {
            entries_dir: "notes/books".to_string(),
            ..PathsConfig::default()
        };
        assert_eq!(entry_root_prefix(&paths), "../../../");
        assert_eq!(entry_href(&paths, "x"), "notes/books/x/index.html");
    }

    #[test]
    fn monogram_from_title() {
        assert_eq!(monogram("Ali in Drafts"), "ad");
        assert_eq!(monogram("Margins"), "m");
        assert_eq!(monogram(""), "");
    }

    #[test]
    fn feed_link_absolute_with_base_url() {
        let mut config = config();
        config.site.base_url = Some("https://notes.example.com".into());
        let html = render_index(&[], &config).into_string();
        assert!(html.contains(r#"href="https://notes.example.com/rss.xml""#));
    }

    #[test]
    fn feed_link_relative_without_base_url() {
        let html = render_entry_page(&entry("a.md", "x"), &config()).into_string();
        assert!(html.contains(r#"type="application/rss+xml" title="Ali in Drafts" href="../../rss.xml""#));
        assert!(html.contains(r#"<a href="../../rss.xml">RSS</a>"#));
    }

    // =========================================================================
    // Home page
    // =========================================================================

    #[test]
    fn index_lists_cards_in_given_order() {
        let entries = vec![
            entry("piranesi.md", PIRANESI),
            entry("the-dispossessed.md", DISPOSSESSED),
        ];
        let html = render_index(&entries, &config()).into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches(r#"<article class="post-card">"#).count(), 2);
        let first = html.find("Piranesi").unwrap();
        let second = html.find("The Dispossessed").unwrap();
        assert!(first < second);
        assert!(html.contains(r#"<a href="posts/piranesi/index.html">Piranesi</a>"#));
        assert!(html.contains("<time>Mar 2, 2024</time>"));
        assert!(html.contains("A space for drafts, doubts, and ideas"));
        assert!(!html.contains("No posts yet"));
    }

    #[test]
    fn index_has_no_home_link() {
        let html = render_index(&[], &config()).into_string();
        assert!(!html.contains(">Home</a>"));
    }

    #[test]
    fn empty_index_shows_hint() {
        let html = render_index(&[], &config()).into_string();
        assert!(html.contains("No posts yet. Add a markdown file in <code>posts/</code>."));
        assert!(!html.contains("post-card\""));
    }

    #[test]
    fn card_rating_block() {
        let html = render_index(&[entry("p.md", PIRANESI)], &config()).into_string();
        assert!(html.contains(
            r#"<div class="rating"><span class="stars">★★★★<span class="half">★</span></span><span class="value">4.5/5</span></div>"#
        ));
    }

    #[test]
    fn unrated_card_has_no_rating_block() {
        let html = render_index(&[entry("u.md", UNDATED)], &config()).into_string();
        assert!(!html.contains("class=\"rating\""));
        assert!(html.contains("<time></time>"));
    }

    #[test]
    fn titles_and_summaries_are_escaped() {
        let e = entry("a.md", "---\ntitle: <script>x</script>\nsummary: A & B\n---\nbody");
        let html = render_index(&[e], &config()).into_string();
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(html.contains("A &amp; B"));
    }

    // =========================================================================
    // Entry page
    // =========================================================================

    #[test]
    fn entry_page_structure() {
        let e = entry("the-dispossessed.md", DISPOSSESSED);
        let html = render_entry_page(&e, &config()).into_string();

        assert!(html.contains("<title>The Dispossessed — Ali in Drafts</title>"));
        assert!(html.contains(r#"<meta name="description" content="An ambiguous utopia.">"#));
        assert!(html.contains(
            r#"<img class="cover" src="https://covers.example/dispossessed.jpg" alt="Cover of The Dispossessed" loading="lazy">"#
        ));
        assert!(html.contains("<h1>The Dispossessed</h1>"));
        assert!(html.contains(
            r#"<p class="meta"><time datetime="2023-11-23">Nov 23, 2023</time> · <span>Tags: sf</span></p>"#
        ));
        assert!(html.contains("<span class=\"value\">5/5</span>"));
        assert!(html.contains("<ul>\n<li>Anarres</li>\n<li>Urras</li>\n</ul>"));
        assert!(html.contains(r#"<a href="../../index.html">Home</a>"#));
    }

    #[test]
    fn entry_page_without_cover_or_meta() {
        let e = entry("someday.md", UNDATED);
        let html = render_entry_page(&e, &config()).into_string();
        assert!(!html.contains("<img"));
        assert!(html.contains(r#"class="post-hero no-cover""#));
        assert!(html.contains(r#"<p class="meta"></p>"#));
        assert!(html.contains(r#"<meta name="description" content="someday notes">"#));
    }

    #[test]
    fn meta_line_tags_only() {
        let e = entry("a.md", "---\ntitle: A\ntags: x, y\n---\nb");
        let html = render_entry_page(&e, &config()).into_string();
        assert!(html.contains(r#"<p class="meta"><span>Tags: x, y</span></p>"#));
    }

    #[test]
    fn body_html_inserted_verbatim() {
        let e = entry("a.md", "<aside>raw</aside>");
        let html = render_entry_page(&e, &config()).into_string();
        assert!(html.contains("<p><aside>raw</aside></p>"));
    }
}
