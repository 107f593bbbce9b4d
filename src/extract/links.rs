//! Scoped link extraction
//!
//! Searches the configured regions of a parsed page for anchors, resolves
//! them against the base URL, and keeps the ones that pass the domain/path
//! filters. Links ending in a taxonomy extension always pass so that file
//! references on other hosts are still collected for download.

use crate::extract::taxonomy::Taxonomy;
use scraper::{Html, Selector};
use url::Url;

/// An outbound reference: resolved absolute URL plus the anchor's visible text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub url: String,
    pub text: String,
}

/// Filter settings for link extraction
#[derive(Debug, Clone, Copy)]
pub struct LinkFilter {
    /// Keep only links on the base URL's host
    pub domain_match: bool,
    /// Keep only links whose path contains the base path
    pub path_match: bool,
    /// Drop hrefs ending in a raster-image extension
    pub exclude_images: bool,
}

const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".gif"];

/// Extracts links from the scoped regions of a document
///
/// For each tag name in `scope_tags` (in the order given), every matching
/// element is visited in document order and its anchors resolved against
/// `base_url`. A candidate survives iff its resolved path ends in a taxonomy
/// extension, or it has a scheme and host and passes the configured filters.
/// Duplicates across elements are not removed here; the frontier dedupes.
pub fn extract_links(
    document: &Html,
    base_url: &Url,
    scope_tags: &[String],
    filter: LinkFilter,
    taxonomy: &Taxonomy,
) -> Vec<ExtractedLink> {
    let anchor_selector = match Selector::parse("a[href]") {
        Ok(sel) => sel,
        Err(_) => return Vec::new(),
    };

    let mut links = Vec::new();
    for tag in scope_tags {
        let Ok(tag_selector) = Selector::parse(tag) else {
            tracing::warn!("Skipping unparseable scope tag: {}", tag);
            continue;
        };

        for region in document.select(&tag_selector) {
            for anchor in region.select(&anchor_selector) {
                let Some(href) = anchor.value().attr("href") else {
                    continue;
                };
                let Ok(resolved) = base_url.join(href) else {
                    continue;
                };
                if !is_relevant(&resolved, href, base_url, filter, taxonomy) {
                    continue;
                }

                let text: String = anchor.text().map(str::trim).collect();
                links.push(ExtractedLink {
                    url: resolved.to_string(),
                    text,
                });
            }
        }
    }

    tracing::debug!("Extracted {} links from {}", links.len(), base_url);
    links
}

fn is_relevant(
    resolved: &Url,
    href: &str,
    base_url: &Url,
    filter: LinkFilter,
    taxonomy: &Taxonomy,
) -> bool {
    // File references always pass, regardless of domain or path filters
    if taxonomy.matches_path(resolved.path()) {
        return true;
    }

    if resolved.host_str().is_none() {
        return false;
    }

    if filter.domain_match && resolved.host_str() != base_url.host_str() {
        return false;
    }

    if filter.path_match && !resolved.path().contains(base_url.path()) {
        return false;
    }

    if filter.exclude_images {
        let href_lower = href.to_lowercase();
        if IMAGE_EXTENSIONS.iter().any(|ext| href_lower.ends_with(ext)) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_all() -> LinkFilter {
        LinkFilter {
            domain_match: true,
            path_match: false,
            exclude_images: true,
        }
    }

    fn extract(html: &str, base: &str, tags: &[&str], filter: LinkFilter) -> Vec<ExtractedLink> {
        let document = Html::parse_document(html);
        let base_url = Url::parse(base).unwrap();
        let scope: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        extract_links(&document, &base_url, &scope, filter, &Taxonomy::builtin())
    }

    #[test]
    fn test_relative_links_resolved() {
        let html = r#"<html><body><div><a href="/page1">Page 1</a></div></body></html>"#;
        let links = extract(html, "https://example.com", &["body"], filter_all());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://example.com/page1");
        assert_eq!(links[0].text, "Page 1");
    }

    #[test]
    fn test_other_host_excluded_when_domain_match() {
        let html = r#"<html><body><a href="https://other.com/p">Other</a></body></html>"#;
        let links = extract(html, "https://example.com", &["body"], filter_all());
        assert!(links.is_empty());
    }

    #[test]
    fn test_other_host_included_when_domain_match_off() {
        let html = r#"<html><body><a href="https://other.com/p">Other</a></body></html>"#;
        let mut filter = filter_all();
        filter.domain_match = false;
        let links = extract(html, "https://example.com", &["body"], filter);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_file_link_passes_despite_foreign_host() {
        let html = r#"<html><body><a href="https://cdn.other.com/report.pdf">Report</a></body></html>"#;
        let links = extract(html, "https://example.com", &["body"], filter_all());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://cdn.other.com/report.pdf");
    }

    #[test]
    fn test_image_links_excluded() {
        let html = r#"<html><body><a href="photo.png">Photo</a><a href="/page">Page</a></body></html>"#;
        let links = extract(html, "https://example.com", &["body"], filter_all());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://example.com/page");
    }

    #[test]
    fn test_image_links_kept_when_filter_off() {
        let html = r#"<html><body><a href="photo.png">Photo</a></body></html>"#;
        let mut filter = filter_all();
        filter.exclude_images = false;
        let links = extract(html, "https://example.com", &["body"], filter);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_path_match_filters_by_substring() {
        let html = r#"<html><body>
            <a href="/docs/guide">In</a>
            <a href="/blog/post">Out</a>
        </body></html>"#;
        let mut filter = filter_all();
        filter.path_match = true;
        let links = extract(html, "https://example.com/docs", &["body"], filter);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://example.com/docs/guide");
    }

    #[test]
    fn test_scope_tags_bound_the_search() {
        let html = r#"<html><body>
            <nav><a href="/skipped">Nav</a></nav>
            <main><a href="/kept">Main</a></main>
        </body></html>"#;
        let links = extract(html, "https://example.com", &["main"], filter_all());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://example.com/kept");
    }

    #[test]
    fn test_scope_tag_order_preserved() {
        let html = r#"<html><body>
            <footer><a href="/second">F</a></footer>
            <main><a href="/first">M</a></main>
        </body></html>"#;
        let links = extract(html, "https://example.com", &["main", "footer"], filter_all());
        assert_eq!(links[0].url, "https://example.com/first");
        assert_eq!(links[1].url, "https://example.com/second");
    }

    #[test]
    fn test_duplicates_not_removed() {
        let html = r#"<html><body>
            <div><a href="/page">A</a></div>
            <div><a href="/page">B</a></div>
        </body></html>"#;
        let links = extract(html, "https://example.com", &["body"], filter_all());
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_mailto_excluded() {
        let html = r#"<html><body><a href="mailto:x@example.com">Mail</a></body></html>"#;
        let links = extract(html, "https://example.com", &["body"], filter_all());
        assert!(links.is_empty());
    }
}
