//! services/api/src/content/markup.rs
//!
//! Boilerplate removal and text extraction over fetched HTML. The document
//! is parsed once, every subtree matching the noise selector set is detached
//! before any text is read, and all extracted text is whitespace-collapsed.

use scraper::{Html, Selector};

/// Elements detached from the document before any text extraction. Covers
/// non-content tags plus the class/role names boilerplate commonly hides
/// behind.
const NOISE_SELECTORS: &str = "script, style, nav, header, footer, aside, iframe, noscript, \
     .menu, .sidebar, .ad, [role='navigation'], [role='banner']";

//=========================================================================================
// Page Reading
//=========================================================================================

/// The readable parts of one fetched page, noise already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub og_title: Option<String>,
    pub title_tag: Option<String>,
    pub description: String,
    pub body_text: String,
}

/// Parses raw markup, strips the noise subtrees, and reads the title
/// candidates, the meta description and the visible body text.
pub fn read_page(html: &str) -> PageView {
    let mut document = Html::parse_document(html);
    strip_noise(&mut document);

    let description = [
        meta_content(&document, "meta[name='description']"),
        meta_content(&document, "meta[property='og:description']"),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<String>>()
    .join(" ");

    PageView {
        og_title: meta_content(&document, "meta[property='og:title']"),
        title_tag: first_text(&document, "title"),
        description: collapse_whitespace(&description),
        body_text: first_text(&document, "body").unwrap_or_default(),
    }
}

/// Detaches every node matching `NOISE_SELECTORS`. Must run before any text
/// is read so hidden scripts and menus never leak into the digest.
fn strip_noise(document: &mut Html) {
    let selector = Selector::parse(NOISE_SELECTORS).unwrap();
    let noise_ids: Vec<_> = document.select(&selector).map(|element| element.id()).collect();
    for id in noise_ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Reads the trimmed `content` attribute of the first match. Empty content
/// counts as absent.
fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();
    let content = document.select(&selector).next()?.value().attr("content")?;
    let content = content.trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

/// Reads the whitespace-collapsed text of the first match. Empty text counts
/// as absent.
fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();
    let element = document.select(&selector).next()?;
    let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

//=========================================================================================
// Text Utilities
//=========================================================================================

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Truncates to a character budget. Counts characters, not bytes, so
/// multi-byte text is never split mid-character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
