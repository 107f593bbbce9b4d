//! Per-element conversion rules
//!
//! Each element kind gets one method with a default markdown rendering;
//! callers override individual methods by implementing the trait on their own
//! type. The default table rule keeps the table as HTML (tables rarely
//! survive a markdown round trip) with only colspan/rowspan attributes kept.

/// Rendering strategy, one method per element kind
pub trait ElementRules {
    /// Headings h1..h6; `level` is clamped to that range by the walker
    fn heading(&self, level: u8, text: &str) -> String {
        format!("{} {}\n\n", "#".repeat(level as usize), text.trim())
    }

    /// Block containers: p, div, section, article, main
    fn block(&self, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{}\n\n", trimmed)
        }
    }

    /// Anchors; `href` is None when the anchor has no target
    fn anchor(&self, href: Option<&str>, text: &str) -> String {
        match href {
            Some(href) if !text.trim().is_empty() => format!("[{}]({})", text.trim(), href),
            _ => text.trim().to_string(),
        }
    }

    /// Images are dropped from the rendered document
    fn image(&self, _src: Option<&str>, _alt: Option<&str>) -> String {
        String::new()
    }

    /// Tables pass through as sanitized HTML
    fn table(&self, sanitized_html: &str) -> String {
        format!("{}\n\n", sanitized_html.trim())
    }

    fn emphasis(&self, text: &str) -> String {
        if text.trim().is_empty() {
            String::new()
        } else {
            format!("*{}*", text.trim())
        }
    }

    fn strong(&self, text: &str) -> String {
        if text.trim().is_empty() {
            String::new()
        } else {
            format!("**{}**", text.trim())
        }
    }

    fn inline_code(&self, text: &str) -> String {
        format!("`{}`", text)
    }

    fn code_block(&self, text: &str) -> String {
        format!("```\n{}\n```\n\n", text.trim_end())
    }

    fn list_item(&self, ordered: bool, index: usize, text: &str) -> String {
        if ordered {
            format!("{}. {}\n", index, text.trim())
        } else {
            format!("- {}\n", text.trim())
        }
    }

    fn blockquote(&self, text: &str) -> String {
        let quoted: String = text
            .trim()
            .lines()
            .map(|line| format!("> {}\n", line))
            .collect();
        format!("{}\n", quoted)
    }

    fn line_break(&self) -> String {
        "\n".to_string()
    }

    fn horizontal_rule(&self) -> String {
        "---\n\n".to_string()
    }
}

/// The default rule set
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRules;

impl ElementRules for DefaultRules {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_heading() {
        assert_eq!(DefaultRules.heading(2, "Title"), "## Title\n\n");
    }

    #[test]
    fn test_default_anchor() {
        assert_eq!(
            DefaultRules.anchor(Some("/page"), "Link"),
            "[Link](/page)"
        );
        assert_eq!(DefaultRules.anchor(None, "Text"), "Text");
    }

    #[test]
    fn test_default_image_is_empty() {
        assert_eq!(DefaultRules.image(Some("/a.png"), Some("alt")), "");
    }

    #[test]
    fn test_list_items() {
        assert_eq!(DefaultRules.list_item(false, 1, "item"), "- item\n");
        assert_eq!(DefaultRules.list_item(true, 3, "item"), "3. item\n");
    }

    #[test]
    fn test_rule_override() {
        struct BareLinks;
        impl ElementRules for BareLinks {
            fn anchor(&self, _href: Option<&str>, text: &str) -> String {
                text.trim().to_string()
            }
        }
        assert_eq!(BareLinks.anchor(Some("/page"), "Link"), "Link");
    }
}
