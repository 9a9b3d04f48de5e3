//! # Shelfmark
//!
//! A small static site generator for reading notes. Every markdown file in
//! the source directory is one entry; a `---` fenced header carries its
//! title, date, rating and cover. The output is a home page, one page per
//! entry, and an RSS feed.
//!
//! ```text
//! posts/piranesi.md          dist/index.html
//! posts/the-dispossessed.md  dist/rss.xml
//!                     ──▶    dist/posts/piranesi/index.html
//!                            dist/posts/the-dispossessed/index.html
//! ```
//!
//! # Pipeline
//!
//! ```text
//! scan        posts/*.md        →  SourceDocument   (read, sorted by name)
//! frontmatter raw text          →  Metadata + body
//! markdown    body              →  HTML
//! entry       document          →  Entry            (slug, date label, stars)
//! covers      blank `cover:`    →  catalog URL      (opt-in, rewrites sources)
//! pipeline    entries           →  Artifacts        (home, feed, pages) → dist/
//! ```
//!
//! Every artifact is composed in memory before the first file is written, so
//! a build that fails on bad input never leaves half a site behind.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Reads the flat source directory into [`scan::SourceDocument`]s |
//! | [`frontmatter`] | Header parsing and writing, order-preserving |
//! | [`markdown`] | Line-oriented markdown subset, a four-state block machine |
//! | [`naming`] | Slug derivation |
//! | [`dates`] | Lenient date parsing, card labels, RFC 1123 feed dates |
//! | [`entry`] | [`entry::Entry`]: everything a page needs, derived once |
//! | [`generate`] | Home and entry pages, rendered with Maud |
//! | [`feed`] | RSS 2.0 channel via the `rss` crate |
//! | [`pipeline`] | Build orchestration: derive, check, enrich, sort, compose, write |
//! | [`covers`] | Google Books lookup behind the [`covers::CoverLookup`] trait |
//! | [`scaffold`] | `new`: template documents |
//! | [`serve`] | `serve`: blocking preview server over the output directory |
//! | [`config`] | `shelfmark.toml` loading, merging, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Header Is the Database
//!
//! There is no index file and no cache. Ordering comes from the `date:`
//! header, URLs from `slug:` or the title. Keys shelfmark does not know are
//! carried through untouched, and the only writer ([`frontmatter::write`])
//! preserves key order, so a cover lookup changes one line of a file and
//! nothing else.
//!
//! ## Markdown Subset, Not CommonMark
//!
//! Reading notes need headings, lists, quotes, code, links and emphasis. The
//! renderer in [`markdown`] handles exactly that, one line at a time. Raw
//! HTML in prose passes through by default; `[markdown] escape_html = true`
//! escapes it.
//!
//! ## Network Only When Asked
//!
//! A plain `shelfmark build` never touches the network or the source
//! directory. Cover lookups run with `build --covers` (or
//! `[covers] auto_enrich`), one request at a time, and a failed lookup is a
//! warning, not a failed build.

pub mod config;
pub mod covers;
pub mod dates;
pub mod entry;
pub mod feed;
pub mod frontmatter;
pub mod generate;
pub mod markdown;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod scaffold;
pub mod scan;
pub mod serve;

#[cfg(test)]
pub(crate) mod test_helpers;
