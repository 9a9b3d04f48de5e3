//! Local preview server.
//!
//! A blocking `tiny_http` loop that serves the build output as static files.
//! It does not build or watch anything; run `shelfmark build` first.
//!
//! Request resolution:
//!
//! 1. Query string stripped, percent-escapes decoded
//! 2. Any `..` segment → 404
//! 3. Existing file → served with a content type guessed from its extension
//! 4. Directory → its index document, if present
//! 5. Anything else → 404

use crate::output;
use log::{debug, warn};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("output directory {0} does not exist (run `shelfmark build` first)")]
    MissingOutput(PathBuf),
    #[error("could not listen on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Serve `root` on `port` until the process is stopped.
pub fn serve(root: &Path, port: u16, index_document: &str) -> Result<(), ServeError> {
    if !root.is_dir() {
        return Err(ServeError::MissingOutput(root.to_path_buf()));
    }
    let server =
        Server::http(("0.0.0.0", port)).map_err(|source| ServeError::Bind { port, source })?;
    output::print_serve_banner(root, port);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, root, index_document) {
            warn!("preview request failed: {e}");
        }
    }
    Ok(())
}

fn handle_request(request: Request, root: &Path, index_document: &str) -> std::io::Result<()> {
    debug!("{} {}", request.method(), request.url());
    match resolve(root, request.url(), index_document) {
        Some(path) => match fs::read(&path) {
            Ok(content) => respond(request, 200, guess_content_type(&path), content),
            Err(e) => {
                warn!("could not read {}: {e}", path.display());
                respond(request, 404, "text/plain; charset=utf-8", b"Not found".to_vec())
            }
        },
        None => respond(request, 404, "text/plain; charset=utf-8", b"Not found".to_vec()),
    }
}

fn respond(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> std::io::Result<()> {
    let mut response = Response::from_data(body).with_status_code(StatusCode(status));
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes()) {
        response.add_header(header);
    }
    request.respond(response)
}

/// Map a request URL onto a file under `root`.
///
/// Returns `None` when nothing servable exists there.
pub fn resolve(root: &Path, url: &str, index_document: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = urlencoding::decode(path).ok()?;
    let relative = Path::new(decoded.trim_start_matches('/'));

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    let candidate = root.join(relative);
    let file = if candidate.is_dir() {
        candidate.join(index_document)
    } else {
        candidate
    };
    file.is_file().then_some(file)
}

/// Guess MIME content type from file extension.
pub fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/rss+xml; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        _ => "text/plain; charset=utf-8",
    }
}
