//! Terminal rendering of normalized markup.

use crate::error::{OcrError, Result};
use crate::types::{FAILED_RESULT, IDLE_RESULT, NO_TEXT_RESULT};
use scraper::{Html, Node};

/// Text suitable for copying: placeholder status messages and empty results
/// are refused.
pub fn copy_text(markup: &str) -> Result<String> {
    let trimmed = markup.trim();
    if trimmed.is_empty() || [IDLE_RESULT, FAILED_RESULT, NO_TEXT_RESULT].contains(&trimmed) {
        return Err(OcrError::NothingToCopy);
    }
    Ok(to_plain_text(markup))
}

/// Render markup as plain text: `<br>` becomes a newline, `<img>` becomes
/// `[image: alt]`, other tags are dropped and entities decoded by the parser.
pub fn to_plain_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let mut out = String::with_capacity(markup.len());
    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => match element.name() {
                "br" => out.push('\n'),
                "img" => {
                    out.push_str("[image: ");
                    out.push_str(element.attr("alt").unwrap_or(""));
                    out.push(']');
                }
                _ => {}
            },
            _ => {}
        }
    }
    out
}
