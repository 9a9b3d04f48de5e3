//! Cover image lookup.
//!
//! Covers come from the Google Books catalog: search by title, take the first
//! volume, and point at its front-cover thumbnail. The [`CoverLookup`] trait
//! is the seam between the catalog and everything that consumes it, so the
//! build and the `fetch-cover` command can be tested without the network.
//!
//! Two consumers:
//!
//! - [`enrich`]: during `build --covers`, fills every entry whose header has
//!   a blank `cover:` line. Failures are logged and reported, never fatal.
//! - [`fetch_cover`]: the standalone command. One document, failures are
//!   returned to the caller.
//!
//! Both persist a found cover by rewriting the document header in place.

use crate::entry::Entry;
use crate::frontmatter;
use crate::naming::slugify;
use crate::scan::document_path;
use log::{debug, info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";

#[derive(Error, Debug)]
pub enum CoverError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("catalog returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("could not decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no volume found for {title:?}")]
    NoMatch { title: String },
}

/// First catalog hit for a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMatch {
    pub volume_id: String,
    /// ISBN-13 when the catalog lists one, else ISBN-10.
    pub isbn: Option<String>,
}

impl VolumeMatch {
    pub fn cover_url(&self) -> String {
        cover_url(&self.volume_id)
    }
}

/// Front-cover thumbnail URL for a catalog volume.
pub fn cover_url(volume_id: &str) -> String {
    format!("https://books.google.com/books/content?id={volume_id}&printsec=frontcover&img=1&zoom=1")
}

/// Anything that can turn a title into a catalog volume.
pub trait CoverLookup {
    fn search(&self, title: &str) -> Result<VolumeMatch, CoverError>;
}

// =============================================================================
// Google Books client
// =============================================================================

/// Blocking Google Books client.
pub struct GoogleBooks {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl GoogleBooks {
    pub fn new(timeout: Duration) -> Result<Self, CoverError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shelfmark/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: SEARCH_ENDPOINT.to_string(),
        })
    }

    /// Query URL for a title, asking for a single result.
    pub fn search_url(&self, title: &str) -> String {
        format!(
            "{}?q={}&maxResults=1",
            self.endpoint,
            urlencoding::encode(title)
        )
    }
}

impl CoverLookup for GoogleBooks {
    fn search(&self, title: &str) -> Result<VolumeMatch, CoverError> {
        let url = self.search_url(title);
        debug!("cover lookup: GET {url}");
        let response = self.client.get(&url).send()?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(CoverError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let body = response.text()?;
        parse_volumes(&body, title)
    }
}

#[derive(Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Deserialize)]
struct Volume {
    id: String,
    #[serde(default, rename = "volumeInfo")]
    volume_info: VolumeInfo,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    #[serde(default)]
    industry_identifiers: Vec<Identifier>,
}

#[derive(Deserialize)]
struct Identifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

/// Pick the first volume out of a search response body.
pub fn parse_volumes(body: &str, title: &str) -> Result<VolumeMatch, CoverError> {
    let response: VolumesResponse = serde_json::from_str(body)?;
    let volume = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| CoverError::NoMatch {
            title: title.to_string(),
        })?;

    let ids = &volume.volume_info.industry_identifiers;
    let isbn = ["ISBN_13", "ISBN_10"].iter().find_map(|kind| {
        ids.iter()
            .find(|id| id.kind == *kind)
            .map(|id| id.identifier.clone())
    });

    Ok(VolumeMatch {
        volume_id: volume.id,
        isbn,
    })
}

// =============================================================================
// Build-time enrichment
// =============================================================================

/// What happened to one entry during enrichment.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverOutcome {
    Found {
        title: String,
        source: PathBuf,
        url: String,
    },
    Failed {
        title: String,
        source: PathBuf,
        reason: String,
    },
}

/// Look up a cover for every entry that asks for one.
///
/// Lookups run one at a time in entry order. An entry is only changed once
/// its document has been rewritten, so a failed save leaves it as it was.
pub fn enrich(entries: &mut [Entry], lookup: &dyn CoverLookup) -> Vec<CoverOutcome> {
    let mut outcomes = Vec::new();

    for entry in entries.iter_mut().filter(|e| e.wants_cover()) {
        let result = lookup.search(&entry.title).map(|hit| hit.cover_url());
        let outcome = match result {
            Ok(url) => {
                let mut updated = entry.clone();
                updated.set_cover(&url);
                match updated.save() {
                    Ok(()) => {
                        info!("cover for {:?}: {url}", entry.title);
                        *entry = updated;
                        CoverOutcome::Found {
                            title: entry.title.clone(),
                            source: entry.source.clone(),
                            url,
                        }
                    }
                    Err(e) => failed(entry, format!("could not update document: {e}")),
                }
            }
            Err(e) => failed(entry, e.to_string()),
        };
        outcomes.push(outcome);
    }

    outcomes
}

fn failed(entry: &Entry, reason: String) -> CoverOutcome {
    warn!(
        "cover lookup for {:?} ({}) failed: {reason}",
        entry.title,
        entry.source.display()
    );
    CoverOutcome::Failed {
        title: entry.title.clone(),
        source: entry.source.clone(),
        reason,
    }
}

// =============================================================================
// Standalone fetch
// =============================================================================

#[derive(Error, Debug)]
pub enum FetchCoverError {
    #[error("no document at {0} (use --slug if the file name differs from the title)")]
    MissingDocument(PathBuf),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cover lookup failed: {0}")]
    Lookup(#[from] CoverError),
}

/// Result of a successful `fetch-cover` run.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The document already had a cover and `force` was off.
    AlreadySet { path: PathBuf, url: String },
    Updated {
        path: PathBuf,
        url: String,
        isbn: Option<String>,
    },
}

/// Find and store a cover for one document.
///
/// The document is `<source>/<slug>.md`, where `slug` defaults to the slug of
/// `title`. The header's own title, when set, is what gets searched.
pub fn fetch_cover(
    source: &Path,
    title: &str,
    slug: Option<&str>,
    force: bool,
    lookup: &dyn CoverLookup,
) -> Result<FetchOutcome, FetchCoverError> {
    let slug = slugify(slug.unwrap_or(title));
    let path = document_path(source, &slug);
    if !path.is_file() {
        return Err(FetchCoverError::MissingDocument(path));
    }

    let raw = std::fs::read_to_string(&path).map_err(|source| FetchCoverError::Io {
        path: path.clone(),
        source,
    })?;
    let (mut meta, body) = frontmatter::parse(&raw);

    if !force {
        if let Some(existing) = meta.get("cover").filter(|c| !c.is_empty()) {
            return Ok(FetchOutcome::AlreadySet {
                url: existing.clone(),
                path,
            });
        }
    }

    let query = meta
        .get("title")
        .filter(|t| !t.is_empty())
        .cloned()
        .unwrap_or_else(|| title.to_string());
    let hit = lookup.search(&query)?;
    let url = hit.cover_url();

    meta.insert("cover".to_string(), url.clone());
    frontmatter::write(&path, &meta, &body).map_err(|source| FetchCoverError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(FetchOutcome::Updated {
        path,
        url,
        isbn: hit.isbn,
    })
}
