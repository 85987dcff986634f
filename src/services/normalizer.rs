//! OCR response normalization.
//!
//! Turns a raw OCR payload into one markup string: embedded figures are
//! inlined at their `![alt](id)` placeholders, newlines become `<br>` and pages
//! are separated by a double break. Pure, no I/O.

use crate::models::{OcrPage, OcrResponse};
use regex::{NoExpand, Regex};
use serde_json::Value;

pub const LINE_BREAK: &str = "<br>";
pub const PAGE_SEPARATOR: &str = "<br><br>";
const IMG_STYLE: &str = "max-width: 100%; height: auto; border-radius: 8px; margin: 8px 0;";

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    /// HTML-escape alt text before it is written into the `<img>` tag.
    /// Off by default: the OCR service is the only producer of alt text.
    pub escape_alt: bool,
}

/// Normalize a parsed OCR payload with default options.
/// Unrecognized shapes yield an empty string.
pub fn normalize(raw: &Value) -> String {
    normalize_with(raw, NormalizeOptions::default())
}

pub fn normalize_with(raw: &Value, options: NormalizeOptions) -> String {
    normalize_response(&OcrResponse::from_value(raw), options)
}

pub fn normalize_response(response: &OcrResponse, options: NormalizeOptions) -> String {
    match response {
        OcrResponse::Paginated(pages) => {
            tracing::debug!("Normalizing {} page(s)", pages.len());
            let mut rendered: Vec<String> = pages.iter().map(|page| render_page(page, options)).collect();
            // Blank trailing pages would only leave a dangling separator.
            while rendered.last().is_some_and(|p| p.trim().is_empty()) {
                rendered.pop();
            }
            rendered
                .join(PAGE_SEPARATOR)
                .trim()
                .to_string()
        }
        OcrResponse::ChatCompletion(content) => breaks(content),
        OcrResponse::Unrecognized => {
            tracing::debug!("OCR response has neither pages nor choices");
            String::new()
        }
    }
}

fn render_page(page: &OcrPage, options: NormalizeOptions) -> String {
    let mut markdown = page.markdown.clone().unwrap_or_default();
    for image in &page.images {
        let Some((id, data)) = image.resolvable() else {
            continue;
        };
        let pattern = match placeholder_pattern(&regex::escape(id)) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Skipping image {}: {}", id, e);
                continue;
            }
        };
        markdown = substitute(&markdown, &pattern, id, data, options);
    }
    breaks(&markdown)
}

/// Pattern for `![alt](id)` where `escaped_id` is already a literal regex
/// fragment (see [`regex::escape`]). Alt text may not contain `]`. This only
/// recognizes well-formed inline image syntax, not Markdown in general.
pub fn placeholder_pattern(escaped_id: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"!\[([^\]]*?)\]\({}\)", escaped_id))
}

/// Replace every placeholder matched by `pattern` with one `<img>` tag.
/// The label comes from the first placeholder's alt text, falling back to `id`.
/// Text without a placeholder is returned unchanged (the image is dropped).
fn substitute(markdown: &str, pattern: &Regex, id: &str, data: &str, options: NormalizeOptions) -> String {
    let Some(caps) = pattern.captures(markdown) else {
        tracing::debug!("No placeholder for image {}, dropping it", id);
        return markdown.to_string();
    };
    let alt = caps
        .get(1)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(id);
    let alt = if options.escape_alt {
        escape_html(alt)
    } else {
        alt.to_string()
    };
    let tag = img_tag(data, &alt);
    pattern.replace_all(markdown, NoExpand(&tag)).into_owned()
}

fn img_tag(src: &str, alt: &str) -> String {
    format!(r#"<img src="{}" alt="{}" style="{}" />"#, src, alt, IMG_STYLE)
}

fn breaks(text: &str) -> String {
    text.replace('\n', LINE_BREAK)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
