//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output leads with what was published, not with files. Each entry is shown
//! by its position and title; the source document and the generated page are
//! secondary context, as an indented `Source:` line and a `→ path` suffix.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Covers
//! 001 Piranesi: found
//!     Source: piranesi.md
//!     https://books.google.com/books/content?id=…
//!
//! Entries
//! 001 Piranesi → posts/piranesi/index.html
//!     Source: piranesi.md
//!     Mar 2, 2024 · 4.5/5
//! 002 someday notes → posts/someday-notes/index.html
//!     Source: someday.md
//!
//! Home → index.html
//! Feed → rss.xml
//!
//! Generated 2 entries in dist/
//! ```
//!
//! The `Covers` section only appears when enrichment ran.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::PathsConfig;
use crate::covers::{CoverOutcome, FetchOutcome};
use crate::entry::Entry;
use crate::pipeline::BuildReport;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// File name of a source path, falling back to the whole path.
fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `Mar 2, 2024 · 4.5/5`, or `None` when the entry has neither.
fn entry_detail(entry: &Entry) -> Option<String> {
    let parts: Vec<String> = [Some(entry.date_label.clone()), entry.rating_text()]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(" · "))
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{n} {}", if n == 1 { one } else { many })
}

// ============================================================================
// Build
// ============================================================================

/// Format cover enrichment results.
pub fn format_cover_outcomes(outcomes: &[CoverOutcome]) -> Vec<String> {
    let mut lines = vec!["Covers".to_string()];
    for (i, outcome) in outcomes.iter().enumerate() {
        let index = format_index(i + 1);
        match outcome {
            CoverOutcome::Found { title, source, url } => {
                lines.push(format!("{index} {title}: found"));
                lines.push(format!("{}Source: {}", indent(1), source_name(source)));
                lines.push(format!("{}{url}", indent(1)));
            }
            CoverOutcome::Failed {
                title,
                source,
                reason,
            } => {
                lines.push(format!("{index} {title}: failed"));
                lines.push(format!("{}Source: {}", indent(1), source_name(source)));
                lines.push(format!("{}{reason}", indent(1)));
            }
        }
    }
    lines
}

/// Format the summary of a finished build.
pub fn format_build_output(report: &BuildReport, paths: &PathsConfig) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.covers.is_empty() {
        lines.extend(format_cover_outcomes(&report.covers));
        lines.push(String::new());
    }

    if !report.entries.is_empty() {
        lines.push("Entries".to_string());
        for (i, entry) in report.entries.iter().enumerate() {
            lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                entry.title,
                crate::generate::entry_href(paths, &entry.slug)
            ));
            lines.push(format!(
                "{}Source: {}",
                indent(1),
                source_name(&entry.source)
            ));
            if let Some(detail) = entry_detail(entry) {
                lines.push(format!("{}{detail}", indent(1)));
            }
        }
        lines.push(String::new());
    }

    lines.push(format!("Home → {}", paths.index_document));
    lines.push(format!("Feed → {}", paths.feed));
    lines.push(String::new());
    lines.push(format!(
        "Generated {} in {}/",
        plural(report.entries.len(), "entry", "entries"),
        report.output.display()
    ));

    lines
}

pub fn print_build_output(report: &BuildReport, paths: &PathsConfig) {
    for line in format_build_output(report, paths) {
        println!("{}", line);
    }
}

// ============================================================================
// Other commands
// ============================================================================

/// Format the result of `fetch-cover`.
pub fn format_fetch_outcome(outcome: &FetchOutcome) -> Vec<String> {
    match outcome {
        FetchOutcome::AlreadySet { path, url } => vec![
            format!("Cover already set for {}: {url}", source_name(path)),
            format!("{}Use --force to replace it.", indent(1)),
        ],
        FetchOutcome::Updated { path, url, isbn } => {
            let mut lines = vec![format!("Set cover for {} → {url}", source_name(path))];
            if let Some(isbn) = isbn {
                lines.push(format!("{}ISBN: {isbn}", indent(1)));
            }
            lines
        }
    }
}

pub fn print_fetch_outcome(outcome: &FetchOutcome) {
    for line in format_fetch_outcome(outcome) {
        println!("{}", line);
    }
}

/// Format the result of `new`.
pub fn format_new_entry(path: &Path) -> Vec<String> {
    vec![format!("Created {}", path.display())]
}

pub fn print_new_entry(path: &Path) {
    for line in format_new_entry(path) {
        println!("{}", line);
    }
}

/// Banner shown when the preview server starts.
pub fn format_serve_banner(root: &Path, port: u16) -> Vec<String> {
    vec![
        format!("Serving {}/ at http://localhost:{port}", root.display()),
        format!("{}Press Ctrl+C to stop.", indent(1)),
    ]
}

pub fn print_serve_banner(root: &Path, port: u16) {
    for line in format_serve_banner(root, port) {
        println!("{}", line);
    }
}
