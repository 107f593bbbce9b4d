//! Categorized file downloader
//!
//! Fetches file links and writes their raw bytes under
//! `{download_dir}/{category}/{title}.{ext}`, with the category taken from
//! the file-type taxonomy. A per-file failure is logged and skipped; the URL
//! stays in the undownloaded set so a later run can retry it. Only files
//! whose bytes were actually written are marked downloaded.

use crate::extract::{url_extension, ExtractedLink, Taxonomy};
use crate::frontier::Frontier;
use reqwest::Client;
use std::path::Path;

/// Downloads every not-yet-downloaded file link in the batch
///
/// Returns the URLs that were written successfully.
pub async fn download_files(
    client: &Client,
    taxonomy: &Taxonomy,
    file_links: &[ExtractedLink],
    download_dir: &Path,
    frontier: &Frontier,
) -> Vec<String> {
    let mut succeeded = Vec::new();

    for link in file_links {
        if !frontier.claim_download(&link.url) {
            tracing::debug!("Already downloaded, skipping: {}", link.url);
            continue;
        }

        let Some(ext) = url_extension(&link.url) else {
            tracing::warn!("File link without extension, skipping: {}", link.url);
            frontier.finish_download(&link.url, false);
            continue;
        };

        let category = taxonomy.category(&ext);
        let file_name = format!("{}.{}", derive_title(&link.url, &link.text), ext);
        let target = download_dir.join(category).join(&file_name);

        match fetch_and_write(client, &link.url, &target).await {
            Ok(bytes) => {
                tracing::info!("Downloaded {} ({} bytes) -> {}", link.url, bytes, file_name);
                frontier.finish_download(&link.url, true);
                succeeded.push(link.url.clone());
            }
            Err(e) => {
                tracing::error!("Download failed for {}: {}", link.url, e);
                frontier.finish_download(&link.url, false);
            }
        }
    }

    succeeded
}

async fn fetch_and_write(
    client: &Client,
    url: &str,
    target: &Path,
) -> Result<usize, crate::CrawlError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(target, &bytes).await?;
    Ok(bytes.len())
}

/// File name stem: anchor text when present, else the URL's file stem
fn derive_title(url: &str, text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        return trimmed.replace('/', "_");
    }
    url.split('?')
        .next()
        .unwrap_or(url)
        .rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.').map(|(stem, _)| stem.to_string()))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "untitled".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontier::FrontierState;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn file_link(url: &str, text: &str) -> ExtractedLink {
        ExtractedLink {
            url: url.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_derive_title() {
        assert_eq!(derive_title("https://e.com/r.pdf", "Annual Report"), "Annual Report");
        assert_eq!(derive_title("https://e.com/r.pdf", "a/b"), "a_b");
        assert_eq!(derive_title("https://e.com/docs/report.pdf", "  "), "report");
        assert_eq!(derive_title("https://e.com/", ""), "untitled");
    }

    #[tokio::test]
    async fn test_download_writes_categorized_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/report.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 fake".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let frontier = Frontier::new(FrontierState::default());
        let links = vec![file_link(&format!("{}/files/report.pdf", server.uri()), "Report")];

        let ok = download_files(
            &Client::new(),
            &Taxonomy::builtin(),
            &links,
            dir.path(),
            &frontier,
        )
        .await;

        assert_eq!(ok.len(), 1);
        let written = dir.path().join("documents").join("Report.pdf");
        assert_eq!(std::fs::read(written).unwrap(), b"%PDF-1.4 fake");
        assert!(frontier.snapshot().downloaded.contains(&links[0].url));
    }

    #[tokio::test]
    async fn test_failed_download_not_marked_and_batch_continues() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bad.zip"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/good.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zipzip".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let frontier = Frontier::new(FrontierState::default());
        let bad = format!("{}/bad.zip", server.uri());
        let good = format!("{}/good.zip", server.uri());
        let links = vec![file_link(&bad, "Bad"), file_link(&good, "Good")];
        frontier.discover_files(links.iter().map(|l| l.url.as_str()));

        let ok = download_files(
            &Client::new(),
            &Taxonomy::builtin(),
            &links,
            dir.path(),
            &frontier,
        )
        .await;

        assert_eq!(ok, vec![good.clone()]);
        let state = frontier.snapshot();
        assert!(state.undownloaded.contains(&bad));
        assert!(state.downloaded.contains(&good));
        assert!(dir.path().join("archives").join("Good.zip").exists());
    }

    #[tokio::test]
    async fn test_already_downloaded_skipped() {
        let dir = TempDir::new().unwrap();
        let frontier = Frontier::new(FrontierState::default());
        let url = "https://example.com/seen.pdf";
        frontier.claim_download(url);
        frontier.finish_download(url, true);

        let ok = download_files(
            &Client::new(),
            &Taxonomy::builtin(),
            &[file_link(url, "Seen")],
            dir.path(),
            &frontier,
        )
        .await;

        // No request is attempted for an already-downloaded URL
        assert!(ok.is_empty());
    }
}
