//! Content parsing and text extraction
//!
//! This module turns fetched bodies into indexable documents:
//! - HTML: title, meta description, language, boilerplate-stripped text,
//!   and outgoing links
//! - Plain text: cleaned body with a derived title
//! - Images and videos: filename-derived title plus format metadata
//!
//! Unsupported content types yield `None` and are recorded as per-URL
//! failures by the orchestrator.

use crate::url::resolve_href;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Body text is capped at this many characters after cleaning
pub const MAX_CONTENT_CHARS: usize = 50_000;

/// Elements whose subtrees carry boilerplate, not content
const EXCLUDED_ELEMENTS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

/// Classification of an indexed document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HTML or plain text page
    Webpage,
    /// Image resource
    Image,
    /// Video resource
    Video,
}

impl ContentKind {
    /// Database and facet representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Webpage => "webpage",
            ContentKind::Image => "image",
            ContentKind::Video => "video",
        }
    }
}

/// Extracted information from a fetched resource
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Document title, if one could be derived
    pub title: Option<String>,

    /// Meta description (HTML only)
    pub description: Option<String>,

    /// Cleaned text content
    pub content: String,

    /// Two-letter document language, "fr" when undeclared
    pub language: String,

    /// Outgoing links resolved to absolute URLs (HTML only)
    pub links: Vec<Url>,

    /// Document classification
    pub kind: ContentKind,

    /// Extra metadata as JSON (media format), if any
    pub metadata: Option<String>,

    /// Content quality estimate in 0.0..=1.0
    pub quality_score: f64,
}

/// Parses a fetched body according to its content type
///
/// # Arguments
///
/// * `content_type` - Normalized media type (no parameters)
/// * `body` - Raw response body
/// * `url` - The fetched URL, used for link resolution and media titles
/// * `max_links` - Cap on extracted links
///
/// # Returns
///
/// * `Some(ParsedDocument)` - Supported content type, parsed
/// * `None` - Unsupported content type
pub fn parse_content(
    content_type: &str,
    body: &[u8],
    url: &Url,
    max_links: usize,
) -> Option<ParsedDocument> {
    if content_type == "text/html" {
        Some(parse_html(&String::from_utf8_lossy(body), url, max_links))
    } else if content_type == "text/plain" {
        Some(parse_text(&String::from_utf8_lossy(body)))
    } else if content_type.starts_with("image/") {
        Some(parse_media(url, ContentKind::Image))
    } else if content_type.starts_with("video/") {
        Some(parse_media(url, ContentKind::Video))
    } else {
        None
    }
}

/// Parses an HTML page
///
/// Boilerplate subtrees (script, style, nav, header, footer, aside) are
/// excluded from the extracted text. Links are resolved against `base_url`
/// and capped at `max_links`.
pub fn parse_html(html: &str, base_url: &Url, max_links: usize) -> ParsedDocument {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let description = extract_description(&document);
    let language = extract_language(&document).unwrap_or_else(|| "fr".to_string());
    let content = clean_text(&extract_body_text(&document));
    let links = extract_links(&document, base_url, max_links);

    let quality_score = quality_score(title.as_deref(), description.as_deref(), &content);

    ParsedDocument {
        title,
        description,
        content,
        language,
        links,
        kind: ContentKind::Webpage,
        metadata: None,
        quality_score,
    }
}

/// Parses a plain text body
fn parse_text(text: &str) -> ParsedDocument {
    let content = clean_text(text);

    let title = if content.is_empty() {
        None
    } else if content.chars().count() > 100 {
        let mut prefix: String = content.chars().take(100).collect();
        prefix.push_str("...");
        Some(prefix)
    } else {
        Some(content.clone())
    };

    // Length is the only quality signal a bare text file offers
    let quality_score = (text.chars().count() as f64 / 1000.0).min(1.0);

    ParsedDocument {
        title,
        description: None,
        content,
        language: "fr".to_string(),
        links: Vec::new(),
        kind: ContentKind::Webpage,
        metadata: None,
        quality_score,
    }
}

/// Builds a media document from the URL alone
///
/// The filename stem becomes the title and the extension is recorded as
/// format metadata. Media bodies carry no text or links.
fn parse_media(url: &Url, kind: ContentKind) -> ParsedDocument {
    let file_name = url
        .path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or("");
    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, extension)) => (stem, extension),
        None => (file_name, ""),
    };

    let metadata = serde_json::json!({ "format": extension }).to_string();

    ParsedDocument {
        title: if stem.is_empty() {
            None
        } else {
            Some(stem.to_string())
        },
        description: None,
        content: String::new(),
        language: "fr".to_string(),
        links: Vec::new(),
        kind,
        metadata: Some(metadata),
        quality_score: 1.0,
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts the meta description from the HTML document
fn extract_description(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="description"]"#).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|value| value.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts the declared document language, trimmed to two letters
fn extract_language(document: &Html) -> Option<String> {
    let selector = Selector::parse("html").ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("lang"))
        .map(|value| value.chars().take(2).collect::<String>())
        .filter(|s| !s.is_empty())
}

/// Extracts body text, skipping boilerplate subtrees
fn extract_body_text(document: &Html) -> String {
    let mut text = String::new();
    if let Ok(selector) = Selector::parse("body") {
        if let Some(body) = document.select(&selector).next() {
            collect_text(body, &mut text);
        }
    }
    text
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if child.value().is_element() {
            if let Some(child_element) = ElementRef::wrap(child) {
                if !EXCLUDED_ELEMENTS.contains(&child_element.value().name()) {
                    collect_text(child_element, out);
                }
            }
        }
    }
}

/// Extracts up to `max_links` resolvable links from the document
fn extract_links(document: &Html, base_url: &Url, max_links: usize) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if links.len() >= max_links {
                break;
            }
            if let Some(href) = element.value().attr("href") {
                if let Some(resolved) = resolve_href(base_url, href) {
                    links.push(resolved);
                }
            }
        }
    }

    links
}

/// Cleans extracted text for storage
///
/// Whitespace runs collapse to single spaces, control characters are
/// removed, and the result is capped at 50,000 characters with a "..."
/// marker when truncated.
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut cleaned: String = collapsed.chars().filter(|c| !c.is_control()).collect();

    if cleaned.chars().count() > MAX_CONTENT_CHARS {
        cleaned = cleaned.chars().take(MAX_CONTENT_CHARS).collect();
        cleaned.push_str("...");
    }

    cleaned
}

/// Estimates content quality from structural signals, 0.0 to 1.0
fn quality_score(title: Option<&str>, description: Option<&str>, content: &str) -> f64 {
    let mut score: f64 = 0.0;

    if let Some(title) = title {
        if !title.is_empty() {
            score += 0.3;
            let length = title.chars().count();
            if length > 10 && length < 100 {
                score += 0.1;
            }
        }
    }

    if description.map_or(false, |d| !d.is_empty()) {
        score += 0.2;
    }

    let content_length = content.chars().count();
    if content_length > 500 {
        score += 0.3;
        if content_length > 1000 && content_length < 10_000 {
            score += 0.2;
        }
    }

    score.min(1.0)
}
