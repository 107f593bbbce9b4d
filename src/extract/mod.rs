//! Link extraction and file-type classification
//!
//! # Components
//!
//! - `extract_links`: finds and resolves anchors within the configured scope
//!   tags of a parsed page
//! - `Taxonomy`: the immutable extension → category mapping used to tell file
//!   links apart from content links and to route downloads

mod links;
mod taxonomy;

pub use links::{extract_links, ExtractedLink, LinkFilter};
pub use taxonomy::{url_extension, Taxonomy, FALLBACK_CATEGORY};
