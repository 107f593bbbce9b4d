//! Per-page content pipeline
//!
//! The blocking half of page processing: parse the fetched body, strip
//! script/style noise, extract the configured content region, derive the
//! document name, convert to markdown, and extract scoped links. Everything
//! here is pure CPU work; workers run it under `spawn_blocking`.

use crate::extract::{extract_links, ExtractedLink, LinkFilter, Taxonomy};
use crate::markdown::{html_to_markdown, ConvertOptions};
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Marker substring in a derived document name that flags a not-found page
const NOT_FOUND_MARKER: &str = "404";

/// Immutable per-crawl settings the pipeline needs
#[derive(Debug, Clone)]
pub struct PageSettings {
    /// The crawl's base URL; links are resolved and filtered against it
    pub base_url: Url,
    pub content_tags: Vec<String>,
    pub link_tags: Vec<String>,
    pub filter: LinkFilter,
    pub md_with_links: bool,
}

/// Everything the pipeline produced for one page
#[derive(Debug)]
pub struct PageArtifacts {
    /// Filesystem-safe document name derived from title and URL path
    pub document_name: String,

    /// The derived name contained the not-found marker; nothing else is valid
    pub not_found: bool,

    /// Converted markdown, or None when the extracted content was empty
    pub markdown: Option<String>,

    /// All scoped links, files and pages alike, in document order
    pub links: Vec<ExtractedLink>,
}

/// Runs the full blocking pipeline over a fetched page body
pub fn process_html(
    page_url: &Url,
    body: &str,
    settings: &PageSettings,
    taxonomy: &Taxonomy,
) -> PageArtifacts {
    // Link extraction gets its own parse; stripping below never touches it
    let link_document = Html::parse_document(body);

    let title = extract_title(&link_document);
    let document_name = derive_document_name(page_url, title.as_deref());

    if document_name.contains(NOT_FOUND_MARKER) {
        return PageArtifacts {
            document_name,
            not_found: true,
            markdown: None,
            links: Vec::new(),
        };
    }

    let mut content_document = Html::parse_document(body);
    strip_noise(&mut content_document);
    let content_html = extract_content(content_document, &settings.content_tags);

    let mut strip_tags = vec!["img".to_string()];
    if !settings.md_with_links {
        strip_tags.push("a".to_string());
    }
    let markdown = html_to_markdown(&content_html, &ConvertOptions { strip_tags });
    let markdown = if markdown.trim().is_empty() {
        None
    } else {
        Some(markdown)
    };

    let links = extract_links(
        &link_document,
        &settings.base_url,
        &settings.link_tags,
        settings.filter,
        taxonomy,
    );

    PageArtifacts {
        document_name,
        not_found: false,
        markdown,
        links,
    }
}

/// Splits extracted links into (file links, content links) by taxonomy extension
pub fn partition_links(
    links: Vec<ExtractedLink>,
    taxonomy: &Taxonomy,
) -> (Vec<ExtractedLink>, Vec<ExtractedLink>) {
    links.into_iter().partition(|link| {
        Url::parse(&link.url)
            .map(|u| taxonomy.matches_path(u.path()))
            .unwrap_or(false)
    })
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Derives the markdown document name from the page title and URL path
///
/// `{title}-{path with / replaced by _}` when the URL has a non-root path,
/// just the title otherwise. Slashes are trimmed from the ends and any
/// interior slash (a title like "A / B") becomes an underscore, so the name
/// is always a single path component.
pub fn derive_document_name(url: &Url, title: Option<&str>) -> String {
    let title = title
        .map(|t| t.trim_matches('/').to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    let path = url.path();
    let name = if path.is_empty() || path == "/" {
        title
    } else {
        format!("{}-{}", title, path.replace('/', "_"))
    };

    name.trim_matches('/').replace('/', "_")
}

/// Detaches every script and style element from the document
fn strip_noise(document: &mut Html) {
    let ids: Vec<NodeId> = document
        .tree
        .nodes()
        .filter(|node| {
            node.value()
                .as_element()
                .map(|el| matches!(el.name(), "script" | "style"))
                .unwrap_or(false)
        })
        .map(|node| node.id())
        .collect();

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Extracts the configured content region into a fresh document shell
///
/// With no content tags configured, the whole (stripped) document is used.
/// Otherwise matching elements are moved out per tag name, first-seen tag
/// order, each tag name processed at most once. Moving detaches the element,
/// so a later tag name never re-captures content that already left the tree,
/// and an element nested inside one already taken in the same pass is covered
/// by its ancestor.
fn extract_content(mut document: Html, content_tags: &[String]) -> String {
    if content_tags.is_empty() {
        return document.root_element().html();
    }

    let mut seen_tags = HashSet::new();
    let mut parts = String::new();

    for tag in content_tags {
        if !seen_tags.insert(tag.as_str()) {
            continue;
        }
        let Ok(selector) = Selector::parse(tag) else {
            tracing::warn!("Skipping unparseable content tag: {}", tag);
            continue;
        };

        let selected: Vec<NodeId> = document.select(&selector).map(|el| el.id()).collect();
        let selected_set: HashSet<NodeId> = selected.iter().copied().collect();

        let top_level: Vec<NodeId> = selected
            .iter()
            .copied()
            .filter(|id| {
                document
                    .tree
                    .get(*id)
                    .map(|node| !node.ancestors().any(|a| selected_set.contains(&a.id())))
                    .unwrap_or(false)
            })
            .collect();

        for id in &top_level {
            if let Some(element) = document.tree.get(*id).and_then(ElementRef::wrap) {
                parts.push_str(&element.html());
            }
        }
        for id in top_level {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    format!(
        "<html><head><meta charset=\"utf-8\"></head><body>{}</body></html>",
        parts
    )
}
