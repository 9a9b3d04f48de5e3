//! New-entry scaffolding.
//!
//! `shelfmark new "Title"` writes `<source>/<slug>.md` with a filled-in
//! header and two section headings to start from. An existing file is never
//! overwritten.

use crate::frontmatter::{self, Metadata};
use crate::naming::slugify;
use crate::scan::document_path;
use chrono::{NaiveDate, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Rating written when none is given.
pub const DEFAULT_RATING: &str = "4";

const SUMMARY_PLACEHOLDER: &str = "One-line hook for the review.";
const DEFAULT_TAGS: &str = "review, book";
const BODY_TEMPLATE: &str = "## Why I Read It\n\n## Thoughts";

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What to put in a new document.
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub title: String,
    /// File name override; defaults to the slug of the title.
    pub slug: Option<String>,
    pub cover: Option<String>,
    pub rating: Option<String>,
}

/// Document text for a new entry dated `today`.
pub fn template(entry: &NewEntry, today: NaiveDate) -> String {
    let mut meta = Metadata::new();
    meta.insert("title".into(), entry.title.clone());
    meta.insert("date".into(), today.format("%Y-%m-%d").to_string());
    meta.insert("summary".into(), SUMMARY_PLACEHOLDER.into());
    meta.insert("cover".into(), entry.cover.clone().unwrap_or_default());
    meta.insert(
        "rating".into(),
        entry
            .rating
            .clone()
            .unwrap_or_else(|| DEFAULT_RATING.into()),
    );
    meta.insert("tags".into(), DEFAULT_TAGS.into());
    frontmatter::serialize(&meta, BODY_TEMPLATE)
}

/// Create the document under `source`, creating the directory if needed.
pub fn create_entry(source: &Path, entry: &NewEntry) -> Result<PathBuf, ScaffoldError> {
    create_entry_on(source, entry, Utc::now().date_naive())
}

/// [`create_entry`] with an explicit date.
pub fn create_entry_on(
    source: &Path,
    entry: &NewEntry,
    today: NaiveDate,
) -> Result<PathBuf, ScaffoldError> {
    let slug = slugify(entry.slug.as_deref().unwrap_or(&entry.title));
    let path = document_path(source, &slug);

    fs::create_dir_all(source).map_err(|e| io_error(source, e))?;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => ScaffoldError::AlreadyExists(path.clone()),
            _ => io_error(&path, e),
        })?;
    file.write_all(template(entry, today).as_bytes())
        .map_err(|e| io_error(&path, e))?;

    Ok(path)
}

fn io_error(path: &Path, source: std::io::Error) -> ScaffoldError {
    ScaffoldError::Io {
        path: path.to_path_buf(),
        source,
    }
}
