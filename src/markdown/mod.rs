//! Markdown conversion
//!
//! Renders an HTML fragment into portable markdown by walking the parsed
//! tree and dispatching each element kind to an [`ElementRules`] method.
//! Images are always dropped; additional tags can be stripped per call
//! (stripping a tag keeps its text but removes its markup). Tables pass
//! through as HTML with only colspan/rowspan attributes preserved.

mod rules;

pub use rules::{DefaultRules, ElementRules};

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Options controlling a single conversion
#[derive(Debug, Default, Clone)]
pub struct ConvertOptions {
    /// Tag names whose markup is dropped while their text is kept
    pub strip_tags: Vec<String>,
}

/// Converts HTML to markdown with the default rules
pub fn html_to_markdown(html: &str, options: &ConvertOptions) -> String {
    convert_with_rules(html, options, &DefaultRules)
}

/// Converts HTML to markdown with caller-supplied rules
pub fn convert_with_rules(html: &str, options: &ConvertOptions, rules: &dyn ElementRules) -> String {
    let document = Html::parse_document(html);
    let body = render_node(document.tree.root(), options, rules);
    let mut out = collapse_blank_lines(body.trim());
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn render_node(node: NodeRef<Node>, options: &ConvertOptions, rules: &dyn ElementRules) -> String {
    match node.value() {
        Node::Text(text) => collapse_whitespace(text),
        Node::Element(element) => {
            let name = element.name();

            // Images are always dropped, before any strip handling
            if name == "img" {
                return rules.image(element.attr("src"), element.attr("alt"));
            }

            // Non-content subtrees
            if matches!(name, "head" | "script" | "style" | "meta" | "link" | "title") {
                return String::new();
            }

            if options.strip_tags.iter().any(|t| t == name) {
                return render_children(node, options, rules);
            }

            match name {
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    let level = name.as_bytes()[1] - b'0';
                    rules.heading(level, &render_children(node, options, rules))
                }
                "p" | "div" | "section" | "article" | "main" | "header" | "footer" | "aside"
                | "nav" | "figure" => rules.block(&render_children(node, options, rules)),
                "a" => rules.anchor(
                    element.attr("href"),
                    &render_children(node, options, rules),
                ),
                "strong" | "b" => rules.strong(&render_children(node, options, rules)),
                "em" | "i" => rules.emphasis(&render_children(node, options, rules)),
                "pre" => rules.code_block(&raw_text(node)),
                "code" => rules.inline_code(&render_children(node, options, rules)),
                "ul" | "ol" => render_list(node, name == "ol", options, rules),
                "li" => rules.list_item(false, 1, &render_children(node, options, rules)),
                "table" => {
                    let mut html = String::new();
                    sanitize_html(node, &mut html);
                    rules.table(&html)
                }
                "blockquote" => rules.blockquote(&render_children(node, options, rules)),
                "br" => rules.line_break(),
                "hr" => rules.horizontal_rule(),
                _ => render_children(node, options, rules),
            }
        }
        _ => render_children(node, options, rules),
    }
}

fn render_children(
    node: NodeRef<Node>,
    options: &ConvertOptions,
    rules: &dyn ElementRules,
) -> String {
    let mut out = String::new();
    for child in node.children() {
        let rendered = render_node(child, options, rules);
        if rendered.is_empty() {
            continue;
        }
        // Dropping a child (an image, say) must not leave a doubled space
        if out.ends_with(' ') && rendered.starts_with(' ') {
            out.push_str(rendered.trim_start_matches(' '));
        } else {
            out.push_str(&rendered);
        }
    }
    out
}

fn render_list(
    node: NodeRef<Node>,
    ordered: bool,
    options: &ConvertOptions,
    rules: &dyn ElementRules,
) -> String {
    let mut out = String::new();
    let mut index = 0;
    for child in node.children() {
        let is_item = child
            .value()
            .as_element()
            .map(|el| el.name() == "li")
            .unwrap_or(false);
        if !is_item {
            continue;
        }
        index += 1;
        out.push_str(&rules.list_item(
            ordered,
            index,
            &render_children(child, options, rules),
        ));
    }
    out.push('\n');
    out
}

/// Raw descendant text without whitespace collapsing (for code blocks)
fn raw_text(node: NodeRef<Node>) -> String {
    ElementRef::wrap(node)
        .map(|el| el.text().collect())
        .unwrap_or_default()
}

/// Re-serializes a subtree keeping only colspan/rowspan attributes
fn sanitize_html(node: NodeRef<Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => {
            let name = element.name();
            out.push('<');
            out.push_str(name);
            for (key, value) in element.attrs() {
                if key == "colspan" || key == "rowspan" {
                    out.push_str(&format!(" {}=\"{}\"", key, value));
                }
            }
            out.push('>');
            for child in node.children() {
                sanitize_html(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        _ => {}
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.pop();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(html: &str) -> String {
        html_to_markdown(html, &ConvertOptions::default())
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let md = convert("<h1>Title</h1><p>First.</p><p>Second.</p>");
        assert_eq!(md, "# Title\n\nFirst.\n\nSecond.\n");
    }

    #[test]
    fn test_anchor_rendered_as_link() {
        let md = convert(r#"<p><a href="/page">Go</a></p>"#);
        assert_eq!(md, "[Go](/page)\n");
    }

    #[test]
    fn test_anchor_stripped_keeps_text() {
        let options = ConvertOptions {
            strip_tags: vec!["a".to_string()],
        };
        let md = html_to_markdown(r#"<p><a href="/page">Go</a> now</p>"#, &options);
        assert_eq!(md, "Go now\n");
    }

    #[test]
    fn test_images_always_dropped() {
        let md = convert(r#"<p>before <img src="x.png" alt="pic"> after</p>"#);
        assert_eq!(md, "before after\n");
    }

    #[test]
    fn test_emphasis_and_strong() {
        let md = convert("<p><em>soft</em> and <strong>hard</strong></p>");
        assert_eq!(md, "*soft* and **hard**\n");
    }

    #[test]
    fn test_unordered_list() {
        let md = convert("<ul><li>one</li><li>two</li></ul>");
        assert_eq!(md, "- one\n- two\n");
    }

    #[test]
    fn test_ordered_list() {
        let md = convert("<ol><li>one</li><li>two</li></ol>");
        assert_eq!(md, "1. one\n2. two\n");
    }

    #[test]
    fn test_code_block_preserves_text() {
        let md = convert("<pre>let x = 1;\nlet y = 2;</pre>");
        assert_eq!(md, "```\nlet x = 1;\nlet y = 2;\n```\n");
    }

    #[test]
    fn test_table_kept_as_html_with_span_attrs() {
        let html = r#"<table class="fancy" style="color: red">
            <tr><td colspan="2" align="left">wide</td></tr>
        </table>"#;
        let md = convert(html);
        assert!(md.contains(r#"<td colspan="2">wide</td>"#));
        assert!(!md.contains("class"));
        assert!(!md.contains("style"));
        assert!(!md.contains("align"));
    }

    #[test]
    fn test_script_and_title_dropped() {
        let md = convert(
            "<html><head><title>T</title><script>var x;</script></head><body><p>Body</p></body></html>",
        );
        assert_eq!(md, "Body\n");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(convert(""), "");
    }

    #[test]
    fn test_whitespace_collapsed() {
        let md = convert("<p>a   lot\n   of\tspace</p>");
        assert_eq!(md, "a lot of space\n");
    }
}
