//! File-type taxonomy: extension → category
//!
//! Loaded once at startup and immutable afterwards. Classification routes
//! downloads into per-category subdirectories; unknown extensions fall back
//! to the "other" category.

use crate::CrawlError;
use std::collections::HashMap;
use std::path::Path;

/// Category assigned to extensions not present in the mapping
pub const FALLBACK_CATEGORY: &str = "other";

/// Immutable extension → category mapping
#[derive(Debug, Clone)]
pub struct Taxonomy {
    map: HashMap<String, String>,
}

impl Taxonomy {
    /// Built-in mapping covering common document, archive, and data files
    pub fn builtin() -> Self {
        let entries: &[(&str, &str)] = &[
            ("pdf", "documents"),
            ("doc", "documents"),
            ("docx", "documents"),
            ("rtf", "documents"),
            ("txt", "documents"),
            ("md", "documents"),
            ("xls", "spreadsheets"),
            ("xlsx", "spreadsheets"),
            ("csv", "spreadsheets"),
            ("ppt", "presentations"),
            ("pptx", "presentations"),
            ("zip", "archives"),
            ("rar", "archives"),
            ("7z", "archives"),
            ("xml", "data"),
            ("json", "data"),
            ("yaml", "data"),
            ("yml", "data"),
            ("log", "data"),
            ("ini", "data"),
            ("cfg", "data"),
        ];
        Self {
            map: entries
                .iter()
                .map(|(ext, cat)| (ext.to_string(), cat.to_string()))
                .collect(),
        }
    }

    /// Loads a mapping from a JSON object file (`{"pdf": "documents", ...}`)
    pub fn load(path: &Path) -> Result<Self, CrawlError> {
        let content = std::fs::read_to_string(path)?;
        let raw: HashMap<String, String> = serde_json::from_str(&content)
            .map_err(|e| CrawlError::Taxonomy(format!("{}: {}", path.display(), e)))?;
        if raw.is_empty() {
            return Err(CrawlError::Taxonomy(format!(
                "{}: taxonomy file maps no extensions",
                path.display()
            )));
        }
        let map = raw
            .into_iter()
            .map(|(ext, cat)| (ext.trim_start_matches('.').to_lowercase(), cat))
            .collect();
        Ok(Self { map })
    }

    /// Builds the taxonomy from the optional config override
    pub fn from_config(file_types_path: Option<&str>) -> Result<Self, CrawlError> {
        match file_types_path {
            Some(path) => Self::load(Path::new(path)),
            None => Ok(Self::builtin()),
        }
    }

    /// Category for a (lowercase, dot-free) extension
    pub fn category(&self, ext: &str) -> &str {
        self.map
            .get(&ext.to_lowercase())
            .map(String::as_str)
            .unwrap_or(FALLBACK_CATEGORY)
    }

    /// Whether a URL path ends in a known extension
    pub fn matches_path(&self, path: &str) -> bool {
        let lower = path.to_lowercase();
        self.map.keys().any(|ext| lower.ends_with(&format!(".{}", ext)))
    }
}

/// Extracts the extension from a URL: text after the last dot, query stripped
pub fn url_extension(url: &str) -> Option<String> {
    let without_query = url.split('?').next().unwrap_or(url);
    let after_dot = without_query.rsplit('.').next()?;
    if after_dot == without_query || after_dot.is_empty() || after_dot.contains('/') {
        return None;
    }
    Some(after_dot.to_lowercase())
}
