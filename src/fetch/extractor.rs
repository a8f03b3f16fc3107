use dom_smoothie::{Config, Readability};
use scraper::node::Text;
use scraper::{ElementRef, Html, Node};
use tracing::warn;

/// Subtrees whose text is never shown to a reader.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "title", "tr", "ul",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractMode {
    /// Every visible text node on the page, navigation and ads included.
    #[default]
    FullText,
    /// Main article only, falling back to `FullText` when the page is not
    /// judged readable.
    Readable,
}

#[derive(Debug)]
pub struct Extraction {
    pub text: String,
    /// True when `Readable` was requested but full-page text was returned.
    pub used_raw_fallback: bool,
}

pub fn extract_with(html: &str, mode: ExtractMode, url: Option<&str>) -> Extraction {
    match mode {
        ExtractMode::FullText => Extraction {
            text: extract(html),
            used_raw_fallback: false,
        },
        ExtractMode::Readable => extract_readable(html, url),
    }
}

/// Plain text of a page. Tolerates any input, malformed markup and non-HTML
/// included; the worst case is an empty string.
pub fn extract(html: &str) -> String {
    let document = Html::parse_document(html);
    collapse_whitespace(&collect_text(document.root_element()))
}

fn extract_readable(html: &str, url: Option<&str>) -> Extraction {
    let mut readability = match Readability::new(html, url, Some(Config::default())) {
        Ok(r) => r,
        Err(e) => {
            warn!(%e, "readability init failed, using full-page text");
            return raw_fallback(html);
        }
    };

    if !readability.is_probably_readable() {
        warn!("page not judged readable, using full-page text");
        return raw_fallback(html);
    }

    match readability.parse() {
        Ok(article) => Extraction {
            text: extract(&article.content),
            used_raw_fallback: false,
        },
        Err(e) => {
            warn!(%e, "readability parse failed, using full-page text");
            raw_fallback(html)
        }
    }
}

fn raw_fallback(html: &str) -> Extraction {
    Extraction {
        text: extract(html),
        used_raw_fallback: true,
    }
}

enum Step<'a> {
    Enter(ElementRef<'a>),
    Text(&'a Text),
    Break,
}

// Iterative walk; nesting depth of hostile markup cannot blow the stack.
fn collect_text(root: ElementRef<'_>) -> String {
    let mut buf = String::new();
    let mut stack = vec![Step::Enter(root)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Text(text) => buf.push_str(text),
            Step::Break => buf.push('\n'),
            Step::Enter(element) => {
                let tag = element.value().name();
                if SKIPPED_TAGS.contains(&tag) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&tag);
                if block {
                    buf.push('\n');
                    stack.push(Step::Break);
                }
                for child in element.children().rev() {
                    match child.value() {
                        Node::Text(text) => stack.push(Step::Text(text)),
                        Node::Element(_) => {
                            if let Some(el) = ElementRef::wrap(child) {
                                stack.push(Step::Enter(el));
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    buf
}

/// Single spaces within a line, at most one blank line between blocks.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;

    for line in text.lines() {
        let mut words = line.split_whitespace().peekable();
        if words.peek().is_none() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run > 0 { "\n\n" } else { "\n" });
        }
        blank_run = 0;
        for (i, word) in words.enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(word);
        }
    }

    out
}
