//! Markdown-to-HTML rendering for entry bodies.
//!
//! This is a deliberately small dialect, not CommonMark. Each physical line is
//! one block-level event:
//!
//! | Line | Renders as |
//! |------|------------|
//! | ```` ``` ```` (optionally followed by an info string) | opens / closes `<pre><code>` |
//! | `- item`, `* item`, `+ item` | `<li>` inside a `<ul>` |
//! | `# …` through `###### …` | `<h1>` … `<h6>` |
//! | `> quote` | `<blockquote>` |
//! | blank | ends the current list |
//! | anything else | `<p>` |
//!
//! Paragraphs are single lines: two consecutive text lines are two `<p>`s.
//!
//! ## Block state machine
//!
//! Rendering is a finite-state automaton over [`BlockState`]. Every line is
//! classified into a [`Line`] (classification depends on the state only to
//! the extent that inside a code block everything except a fence is
//! verbatim), and [`Renderer::step`] is one `match` over `(state, line)`. A
//! list or code block still open at the end of input is closed by
//! [`Renderer::finish`]; output never contains an unterminated block.
//!
//! ## Inline spans
//!
//! Headings, list items, quotes and paragraphs get inline processing, in
//! this order: links, code spans, `**strong**`, `*emphasis*`. Markup produced
//! by one pass is opaque to the later ones, so a `*` inside a link target or
//! a code span is never turned into emphasis, while `**[a bold](link)**`
//! still works. Link labels stay plain text and get the later passes too.
//! The private-use characters U+E000 and U+E001 delimit parked markup, so
//! they are dropped from prose before the passes run.
//!
//! ## Escaping
//!
//! Link targets and code (spans and blocks) are always HTML-escaped. Prose is
//! passed through untouched by default: documents are written by the site
//! owner and raw HTML in them is intentional. Setting
//! `markdown.escape_html = true` escapes prose too.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+").unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());
static QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^>\s?").unwrap());

static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static STRONG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}([0-9]+)\u{E001}").unwrap());

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

const FENCE: &str = "```";

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a body with the default (trusting) settings.
pub fn render(body: &str) -> String {
    Renderer::new(false).render(body)
}

/// Block-level state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Normal,
    InList,
    InCodeBlock,
}

/// A classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Fence,
    /// A line inside a fenced code block, kept byte for byte.
    Verbatim(&'a str),
    Bullet(&'a str),
    Blank,
    Heading(usize, &'a str),
    Quote(&'a str),
    Text(&'a str),
}

impl<'a> Line<'a> {
    /// Classify `line` given the current block state.
    pub fn classify(line: &'a str, state: BlockState) -> Self {
        if line.trim().starts_with(FENCE) {
            return Line::Fence;
        }
        if state == BlockState::InCodeBlock {
            return Line::Verbatim(line);
        }
        if let Some(m) = BULLET.find(line) {
            return Line::Bullet(&line[m.end()..]);
        }
        if line.trim().is_empty() {
            return Line::Blank;
        }
        if let Some(caps) = HEADING.captures(line) {
            let level = caps.get(1).map_or(1, |m| m.as_str().len());
            let text = caps.get(2).map_or("", |m| m.as_str());
            return Line::Heading(level, text.trim());
        }
        if let Some(m) = QUOTE.find(line) {
            return Line::Quote(line[m.end()..].trim());
        }
        Line::Text(line.trim())
    }
}

/// Line-driven markdown renderer.
#[derive(Debug)]
pub struct Renderer<'a> {
    escape_prose: bool,
    state: BlockState,
    html: Vec<String>,
    code: Vec<&'a str>,
}

impl<'a> Renderer<'a> {
    pub fn new(escape_prose: bool) -> Self {
        Self {
            escape_prose,
            state: BlockState::Normal,
            html: Vec::new(),
            code: Vec::new(),
        }
    }

    /// Render a whole body.
    pub fn render(mut self, body: &'a str) -> String {
        for line in body.lines() {
            // `lines` keeps the `\r` of a final unterminated CRLF line.
            self.step(line.strip_suffix('\r').unwrap_or(line));
        }
        self.finish()
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    /// Feed one line through the transition table.
    pub fn step(&mut self, line: &'a str) {
        use BlockState::*;

        match (self.state, Line::classify(line, self.state)) {
            (InCodeBlock, Line::Fence) => {
                self.close_code();
            }
            (_, Line::Fence) => {
                self.close_list();
                self.state = InCodeBlock;
            }
            (InCodeBlock, Line::Verbatim(text)) => {
                self.code.push(text);
            }
            (InList, Line::Bullet(text)) => {
                let item = self.inline(text);
                self.html.push(format!("<li>{item}</li>"));
            }
            (_, Line::Bullet(text)) => {
                self.close_blocks();
                self.html.push("<ul>".to_string());
                self.state = InList;
                let item = self.inline(text);
                self.html.push(format!("<li>{item}</li>"));
            }
            (_, Line::Blank) => {
                self.close_blocks();
            }
            (_, Line::Heading(level, text)) => {
                self.close_blocks();
                let content = self.inline(text);
                self.html.push(format!("<h{level}>{content}</h{level}>"));
            }
            (_, Line::Quote(text)) => {
                self.close_blocks();
                let content = self.inline(text);
                self.html.push(format!("<blockquote>{content}</blockquote>"));
            }
            (_, Line::Text(text)) => {
                self.close_blocks();
                let content = self.inline(text);
                self.html.push(format!("<p>{content}</p>"));
            }
            // Verbatim lines are only produced inside a code block.
            (_, Line::Verbatim(text)) => {
                self.code.push(text);
            }
        }
    }

    /// Close whatever is still open and return the HTML.
    pub fn finish(mut self) -> String {
        self.close_blocks();
        self.html.join("\n")
    }

    fn close_blocks(&mut self) {
        self.close_list();
        self.close_code();
    }

    fn close_list(&mut self) {
        if self.state == BlockState::InList {
            self.html.push("</ul>".to_string());
            self.state = BlockState::Normal;
        }
    }

    fn close_code(&mut self) {
        if self.state == BlockState::InCodeBlock {
            let code = escape_html(&self.code.join("\n"));
            self.html.push(format!("<pre><code>{code}</code></pre>"));
            self.code.clear();
            self.state = BlockState::Normal;
        }
    }

    fn inline(&self, text: &str) -> String {
        render_inline(text, self.escape_prose)
    }
}

/// Finished markup is parked here while later passes run, leaving a
/// placeholder in the text. Placeholders contain none of the characters the
/// passes look for, so generated markup can be wrapped (a bold link) but
/// never rewritten from the inside.
#[derive(Debug, Default)]
struct Stash {
    pieces: Vec<String>,
}

impl Stash {
    fn put(&mut self, markup: String) -> String {
        let idx = self.pieces.len();
        self.pieces.push(markup);
        format!("{PLACEHOLDER_OPEN}{idx}{PLACEHOLDER_CLOSE}")
    }

    fn restore(&self, text: &str) -> String {
        PLACEHOLDER
            .replace_all(text, |caps: &regex::Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| self.pieces.get(idx))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Apply inline substitutions to a single line of prose.
pub fn render_inline(text: &str, escape_prose: bool) -> String {
    let mut stash = Stash::default();

    // Placeholder delimiters in the source would be restored as stashed markup.
    let text: Cow<'_, str> = if text.contains([PLACEHOLDER_OPEN, PLACEHOLDER_CLOSE]) {
        Cow::Owned(
            text.chars()
                .filter(|c| !matches!(*c, PLACEHOLDER_OPEN | PLACEHOLDER_CLOSE))
                .collect(),
        )
    } else {
        Cow::Borrowed(text)
    };

    let text = LINK.replace_all(&text, |caps: &regex::Captures<'_>| {
        let open = stash.put(format!("<a href=\"{}\">", escape_html(&caps[2])));
        let close = stash.put("</a>".to_string());
        format!("{open}{}{close}", &caps[1])
    });
    let text = CODE_SPAN.replace_all(&text, |caps: &regex::Captures<'_>| {
        let code = escape_html(&stash.restore(&caps[1]));
        stash.put(format!("<code>{code}</code>"))
    });
    let text = STRONG.replace_all(&text, |caps: &regex::Captures<'_>| {
        wrap(&mut stash, "strong", &caps[1])
    });
    let text = EMPHASIS.replace_all(&text, |caps: &regex::Captures<'_>| {
        wrap(&mut stash, "em", &caps[1])
    });

    if escape_prose {
        stash.restore(&escape_html(&text))
    } else {
        stash.restore(&text)
    }
}

fn wrap(stash: &mut Stash, tag: &str, inner: &str) -> String {
    let open = stash.put(format!("<{tag}>"));
    let close = stash.put(format!("</{tag}>"));
    format!("{open}{inner}{close}")
}
