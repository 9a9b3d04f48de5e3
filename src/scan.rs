//! Source directory loading.
//!
//! The source directory is flat: every `*.md` file directly inside it is one
//! entry. Subdirectories, hidden files and other extensions are ignored, so
//! drafts can live in `posts/drafts/` and images next to the notes without
//! being published.
//!
//! ```text
//! posts/
//! ├── piranesi.md          # entry
//! ├── the-dispossessed.md  # entry
//! ├── .scratch.md          # hidden, skipped
//! ├── cover.jpg            # not markdown, skipped
//! └── drafts/              # subdirectory, skipped
//!     └── wip.md
//! ```
//!
//! Documents are returned sorted by file name so every build sees the same
//! input order regardless of how the filesystem lists them. Bytes that are
//! not UTF-8 become U+FFFD; only a failed read is an error.

use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source directory not found: {0} (create it and add markdown files)")]
    MissingSource(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One markdown file, read once per build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name including extension, e.g. `piranesi.md`.
    pub file_name: String,
    pub path: PathBuf,
    pub raw: String,
}

impl SourceDocument {
    /// File name without the `.md` extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }
}

/// Read every markdown document in `source`.
pub fn load_documents(source: &Path) -> Result<Vec<SourceDocument>, ScanError> {
    if !source.is_dir() {
        return Err(ScanError::MissingSource(source.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(source).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let bytes = fs::read(&path).map_err(|source| ScanError::Io {
                path: path.clone(),
                source,
            })?;
            let raw = match String::from_utf8(bytes) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("{} is not valid UTF-8, decoding lossily", path.display());
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                }
            };
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(SourceDocument {
                file_name,
                path,
                raw,
            })
        })
        .collect()
}

/// Path of the document for `slug` inside `source`.
pub fn document_path(source: &Path, slug: &str) -> PathBuf {
    source.join(format!("{slug}.md"))
}

fn is_markdown(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(true);
    !hidden
        && path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("md"))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_doc;
    use tempfile::TempDir;

    #[test]
    fn missing_source_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_documents(&tmp.path().join("nope"));
        assert!(matches!(result, Err(ScanError::MissingSource(_))));
    }

    #[test]
    fn empty_source_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(load_documents(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn loads_markdown_sorted_by_name() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "b.md", "B");
        write_doc(tmp.path(), "a.md", "A");
        write_doc(tmp.path(), "C.MD", "C");

        let docs = load_documents(tmp.path()).unwrap();
        let names: Vec<&str> = docs.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["C.MD", "a.md", "b.md"]);
        assert_eq!(docs[1].raw, "A");
    }

    #[test]
    fn skips_hidden_non_markdown_and_subdirectories() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "keep.md", "x");
        write_doc(tmp.path(), ".hidden.md", "x");
        write_doc(tmp.path(), "notes.txt", "x");
        fs::create_dir(tmp.path().join("drafts")).unwrap();
        write_doc(&tmp.path().join("drafts"), "wip.md", "x");

        let docs = load_documents(tmp.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_name, "keep.md");
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "good.md", "fine");
        fs::write(tmp.path().join("latin1.md"), b"---\ntitle: Caf\xe9\n---\nx").unwrap();

        let docs = load_documents(tmp.path()).unwrap();

        assert_eq!(docs.len(), 2);
        let latin1 = docs.iter().find(|d| d.file_name == "latin1.md").unwrap();
        assert!(latin1.raw.contains("title: Caf\u{FFFD}"));
    }

    #[test]
    fn stem_strips_extension() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "the-dispossessed.md", "x");
        let docs = load_documents(tmp.path()).unwrap();
        assert_eq!(docs[0].stem(), "the-dispossessed");
    }

    #[test]
    fn document_path_uses_slug() {
        assert_eq!(
            document_path(Path::new("posts"), "piranesi"),
            PathBuf::from("posts/piranesi.md")
        );
    }
}
