//! Build orchestration.
//!
//! One build is a straight line:
//!
//! ```text
//! load documents → derive entries → check slugs → [enrich covers] → sort
//!     → compose artifacts (home, feed, entry pages) → write
//! ```
//!
//! Everything up to the write phase happens in memory. The write phase builds
//! the new site in a staging directory beside the output and swaps it in only
//! once every file is on disk, so a failed build of any kind leaves the
//! output directory exactly as it was.
//!
//! Cover enrichment only runs when asked for; it is the one step that
//! touches the source directory, and it needs a [`CoverLookup`].

use crate::config::SiteConfig;
use crate::covers::{self, CoverLookup, CoverOutcome};
use crate::dates::parse_date;
use crate::entry::Entry;
use crate::feed;
use crate::generate::{self, entry_path};
use crate::scan::{self, ScanError};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::{debug, info, warn};
use std::cmp::Reverse;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("slug {slug:?} is used by both {} and {}", .first.display(), .second.display())]
    SlugCollision {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("output path {0} does not name a directory")]
    InvalidOutput(PathBuf),
}

/// Per-run switches that are not part of the site config.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Look up blank `cover:` fields before rendering.
    pub enrich_covers: bool,
}

/// A composed output file, relative to the output root.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub relative_path: PathBuf,
    pub contents: String,
}

/// What a build produced, for display.
#[derive(Debug)]
pub struct BuildReport {
    /// Entries in published order.
    pub entries: Vec<Entry>,
    pub artifacts: Vec<PathBuf>,
    pub covers: Vec<CoverOutcome>,
    pub output: PathBuf,
}

/// Run a full build.
///
/// `lookup` is only consulted when `opts.enrich_covers` is set.
pub fn build(
    config: &SiteConfig,
    opts: &BuildOptions,
    lookup: Option<&dyn CoverLookup>,
) -> Result<BuildReport, BuildError> {
    build_at(config, opts, lookup, Utc::now())
}

/// [`build`] with an explicit build time, stamped into the feed.
pub fn build_at(
    config: &SiteConfig,
    opts: &BuildOptions,
    lookup: Option<&dyn CoverLookup>,
    built_at: DateTime<Utc>,
) -> Result<BuildReport, BuildError> {
    let documents = scan::load_documents(&config.paths.source)?;
    info!(
        "loaded {} document(s) from {}",
        documents.len(),
        config.paths.source.display()
    );

    let mut entries: Vec<Entry> = documents
        .iter()
        .map(|doc| Entry::from_document(doc, config.markdown.escape_html))
        .collect();
    check_slugs(&entries)?;

    let cover_outcomes = match lookup {
        Some(lookup) if opts.enrich_covers => covers::enrich(&mut entries, lookup),
        _ => Vec::new(),
    };

    sort_entries(&mut entries);
    let artifacts = compose(&entries, config, built_at);
    write_artifacts(&config.paths.output, &artifacts)?;

    Ok(BuildReport {
        entries,
        artifacts: artifacts.into_iter().map(|a| a.relative_path).collect(),
        covers: cover_outcomes,
        output: config.paths.output.clone(),
    })
}

/// Reject two entries that would write to the same page.
pub fn check_slugs(entries: &[Entry]) -> Result<(), BuildError> {
    let mut seen: IndexMap<&str, &Path> = IndexMap::new();
    for entry in entries {
        if let Some(first) = seen.insert(&entry.slug, &entry.source) {
            return Err(BuildError::SlugCollision {
                slug: entry.slug.clone(),
                first: first.to_path_buf(),
                second: entry.source.clone(),
            });
        }
    }
    Ok(())
}

/// Publication order: dated entries newest first, then undated entries
/// alphabetically.
///
/// Ties between equal dates fall back to the title so the order never
/// depends on how the filesystem listed the files.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by_cached_key(SortKey::new);
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Dated(Reverse<DateTime<Utc>>, String),
    Undated(String, String),
}

impl SortKey {
    fn new(entry: &Entry) -> Self {
        match parse_date(&entry.raw_date) {
            Some(date) => SortKey::Dated(Reverse(date), entry.title.clone()),
            None => SortKey::Undated(entry.title.to_lowercase(), entry.title.clone()),
        }
    }
}

/// Compose every output file of a build.
pub fn compose(entries: &[Entry], config: &SiteConfig, built_at: DateTime<Utc>) -> Vec<Artifact> {
    let paths = &config.paths;
    let mut artifacts = Vec::with_capacity(entries.len() + 2);

    artifacts.push(Artifact {
        relative_path: PathBuf::from(&paths.index_document),
        contents: generate::render_index(entries, config).into_string(),
    });
    artifacts.push(Artifact {
        relative_path: PathBuf::from(&paths.feed),
        contents: feed::render_feed(entries, config, built_at),
    });
    for entry in entries {
        artifacts.push(Artifact {
            relative_path: entry_path(paths, &entry.slug),
            contents: generate::render_entry_page(entry, config).into_string(),
        });
    }

    artifacts
}

/// Replace `root` with exactly `artifacts`, or leave it untouched.
///
/// Everything is written into `.{name}.staging` next to `root` first. Only
/// when every write succeeded is the old tree moved to `.{name}.previous`,
/// the staging tree renamed into place, and the old tree removed.
pub fn write_artifacts(root: &Path, artifacts: &[Artifact]) -> Result<(), BuildError> {
    let staging = sibling(root, "staging")?;
    let previous = sibling(root, "previous")?;
    remove_path(&staging)?;
    remove_path(&previous)?;

    if let Err(e) = write_tree(&staging, artifacts) {
        discard(&staging);
        return Err(e);
    }

    let had_previous = root.symlink_metadata().is_ok();
    if had_previous {
        if let Err(source) = fs::rename(root, &previous) {
            discard(&staging);
            return Err(io_error(root, source));
        }
    }
    if let Err(source) = fs::rename(&staging, root) {
        if had_previous {
            if let Err(e) = fs::rename(&previous, root) {
                warn!("could not restore {}: {e}", root.display());
            }
        }
        discard(&staging);
        return Err(io_error(root, source));
    }
    if had_previous {
        discard(&previous);
    }
    Ok(())
}

fn write_tree(root: &Path, artifacts: &[Artifact]) -> Result<(), BuildError> {
    fs::create_dir_all(root).map_err(|source| io_error(root, source))?;
    for artifact in artifacts {
        let path = root.join(&artifact.relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }
        fs::write(&path, &artifact.contents).map_err(|source| io_error(&path, source))?;
        debug!("wrote {}", path.display());
    }
    Ok(())
}

/// `dist` → `.dist.<suffix>` in the same parent directory.
fn sibling(root: &Path, suffix: &str) -> Result<PathBuf, BuildError> {
    let name = root
        .file_name()
        .ok_or_else(|| BuildError::InvalidOutput(root.to_path_buf()))?;
    let mut sibling = OsString::from(".");
    sibling.push(name);
    sibling.push(".");
    sibling.push(suffix);
    Ok(root.with_file_name(sibling))
}

fn remove_path(path: &Path) -> Result<(), BuildError> {
    let result = match path.symlink_metadata() {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    };
    result.map_err(|source| io_error(path, source))
}

fn discard(path: &Path) {
    if let Err(e) = remove_path(path) {
        warn!("could not remove {}: {e}", path.display());
    }
}

fn io_error(path: &Path, source: std::io::Error) -> BuildError {
    BuildError::Io {
        path: path.to_path_buf(),
        source,
    }
}
