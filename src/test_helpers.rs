//! Shared test utilities for the shelfmark test suite.
//!
//! Provides document fixtures, a small sample site on disk, and a
//! [`MockLookup`] that stands in for the book catalog.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = setup_site();
//! let config = site_config(site.path());
//! let lookup = MockLookup::with_results(vec![Ok(volume("abc"))]);
//!
//! let report = build(&config, &BuildOptions { enrich_covers: true }, Some(&lookup)).unwrap();
//! assert_eq!(lookup.queries(), vec!["Piranesi"]);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::covers::{CoverError, CoverLookup, VolumeMatch};
use crate::entry::Entry;
use crate::scan::SourceDocument;

// =========================================================================
// Documents
// =========================================================================

/// In-memory document, as if loaded from `name`.
pub fn doc(name: &str, raw: &str) -> SourceDocument {
    SourceDocument {
        file_name: name.to_string(),
        path: PathBuf::from(name),
        raw: raw.to_string(),
    }
}

/// Entry derived from an in-memory document with default rendering.
pub fn entry(name: &str, raw: &str) -> Entry {
    Entry::from_document(&doc(name, raw), false)
}

/// Write a document into `dir`, creating the directory if needed.
pub fn write_doc(dir: &Path, name: &str, raw: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), raw).unwrap();
}

// =========================================================================
// Sample site
// =========================================================================

pub const PIRANESI: &str = "---
title: Piranesi
date: 2024-03-02
summary: A house of endless halls.
cover:
rating: 4.5
tags: fantasy, review
---

## Thoughts

The Beauty of the House is **immeasurable**.
";

pub const DISPOSSESSED: &str = "---
title: The Dispossessed
date: 2023-11-23
summary: An ambiguous utopia.
cover: https://covers.example/dispossessed.jpg
rating: 5
tags: sf
---

- Anarres
- Urras
";

pub const UNDATED: &str = "---
title: someday notes
---

Nothing dated yet.
";

/// Temp directory with `posts/` holding three sample documents.
///
/// Output goes to `dist/` next to it via [`site_config`].
pub fn setup_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let posts = tmp.path().join("posts");
    write_doc(&posts, "piranesi.md", PIRANESI);
    write_doc(&posts, "the-dispossessed.md", DISPOSSESSED);
    write_doc(&posts, "someday.md", UNDATED);
    tmp
}

/// Default config with source and output rooted at `root`.
pub fn site_config(root: &Path) -> SiteConfig {
    let mut config = SiteConfig::default();
    config.paths.source = root.join("posts");
    config.paths.output = root.join("dist");
    config
}

// =========================================================================
// Catalog mock
// =========================================================================

pub fn volume(id: &str) -> VolumeMatch {
    VolumeMatch {
        volume_id: id.to_string(),
        isbn: None,
    }
}

/// Catalog stand-in that replays queued results and records every query.
///
/// Results are handed out in the order given. Once the queue is empty every
/// search fails with [`CoverError::NoMatch`].
#[derive(Default)]
pub struct MockLookup {
    results: Mutex<Vec<Result<VolumeMatch, CoverError>>>,
    queries: Mutex<Vec<String>>,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut results: Vec<Result<VolumeMatch, CoverError>>) -> Self {
        results.reverse();
        Self {
            results: Mutex::new(results),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl CoverLookup for MockLookup {
    fn search(&self, title: &str) -> Result<VolumeMatch, CoverError> {
        self.queries.lock().unwrap().push(title.to_string());
        self.results
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| {
                Err(CoverError::NoMatch {
                    title: title.to_string(),
                })
            })
    }
}

// =========================================================================
// Lookups — panics with a clear message on miss
// =========================================================================

/// Find an entry by title. Panics if not found.
pub fn find_entry<'a>(entries: &'a [Entry], title: &str) -> &'a Entry {
    entries.iter().find(|e| e.title == title).unwrap_or_else(|| {
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        panic!("entry '{title}' not found. Available: {titles:?}")
    })
}

/// Titles in order.
pub fn titles(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.title.as_str()).collect()
}

/// Read a generated file under `root`. Panics with the path on failure.
pub fn read_output(root: &Path, relative: &str) -> String {
    let path = root.join(relative);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("could not read {}: {e}", path.display()))
}
