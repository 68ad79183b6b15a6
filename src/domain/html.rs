//! Owned HTML tree and its serializer.
//!
//! The rendered-tree stage converts the markdown tree into this structure;
//! the compiled-document stage serializes it. Both artifacts round-trip
//! through the cache as JSON.

use serde::{Deserialize, Serialize};

/// Root of a rendered document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HtmlTree {
    pub children: Vec<HtmlNode>,
}

impl HtmlTree {
    pub fn new(children: Vec<HtmlNode>) -> Self {
        Self { children }
    }

    /// Serialize to HTML text. Text and attribute values are escaped; `Raw`
    /// nodes pass through untouched.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            render_node(child, &mut out);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HtmlNode {
    Element {
        tag: String,
        #[serde(default)]
        attributes: Vec<(String, String)>,
        #[serde(default)]
        children: Vec<HtmlNode>,
    },
    Text {
        value: String,
    },
    Raw {
        value: String,
    },
}

impl HtmlNode {
    pub fn element(
        tag: impl Into<String>,
        attributes: Vec<(String, String)>,
        children: Vec<HtmlNode>,
    ) -> Self {
        HtmlNode::Element {
            tag: tag.into(),
            attributes,
            children,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        HtmlNode::Text {
            value: value.into(),
        }
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img" | "input")
}

fn render_node(node: &HtmlNode, out: &mut String) {
    match node {
        HtmlNode::Element {
            tag,
            attributes,
            children,
        } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attribute(value));
                out.push('"');
            }
            if is_void(tag) {
                out.push_str(" />");
                return;
            }
            out.push('>');
            for child in children {
                render_node(child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        HtmlNode::Text { value } => out.push_str(&escape_text(value)),
        HtmlNode::Raw { value } => out.push_str(value),
    }
}

pub(crate) fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' | '\r' | '\t' => escaped.push(' '),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub(crate) fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_elements() {
        let tree = HtmlTree::new(vec![HtmlNode::element(
            "p",
            Vec::new(),
            vec![
                HtmlNode::text("see "),
                HtmlNode::element(
                    "a",
                    vec![("href".to_string(), "/docs/guide".to_string())],
                    vec![HtmlNode::text("the guide")],
                ),
            ],
        )]);
        assert_eq!(
            tree.to_html(),
            "<p>see <a href=\"/docs/guide\">the guide</a></p>"
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let tree = HtmlTree::new(vec![HtmlNode::element(
            "a",
            vec![("title".to_string(), "a \"b\" & c".to_string())],
            vec![HtmlNode::text("<script>")],
        )]);
        assert_eq!(
            tree.to_html(),
            "<a title=\"a &quot;b&quot; &amp; c\">&lt;script&gt;</a>"
        );
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let tree = HtmlTree::new(vec![HtmlNode::element(
            "img",
            vec![("src".to_string(), "/cover.png".to_string())],
            Vec::new(),
        )]);
        assert_eq!(tree.to_html(), "<img src=\"/cover.png\" />");
    }

    #[test]
    fn raw_nodes_pass_through() {
        let tree = HtmlTree::new(vec![HtmlNode::Raw {
            value: "<hr class=\"divider\">".to_string(),
        }]);
        assert_eq!(tree.to_html(), "<hr class=\"divider\">");
    }
}
