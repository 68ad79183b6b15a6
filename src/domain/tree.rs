//! Owned markdown syntax tree.
//!
//! Parsed documents are converted out of comrak's arena representation into
//! this owned tree so cached artifacts are self-contained and serializable.
//! Extensions mutate it in place at the post-parse hook.

use serde::{Deserialize, Serialize};

/// Root of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkdownTree {
    pub children: Vec<MarkdownNode>,
}

impl MarkdownTree {
    pub fn new(children: Vec<MarkdownNode>) -> Self {
        Self { children }
    }

    /// Depth-first walk over every node, parents before children.
    pub fn walk(&self, visit: &mut impl FnMut(&MarkdownNode)) {
        walk_nodes(&self.children, visit);
    }

    /// Mutable depth-first walk, parents before children.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut MarkdownNode)) {
        walk_nodes_mut(&mut self.children, visit);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MarkdownNode {
    Paragraph {
        children: Vec<MarkdownNode>,
    },
    Heading {
        depth: u8,
        children: Vec<MarkdownNode>,
    },
    Text {
        value: String,
    },
    Emphasis {
        children: Vec<MarkdownNode>,
    },
    Strong {
        children: Vec<MarkdownNode>,
    },
    Delete {
        children: Vec<MarkdownNode>,
    },
    InlineCode {
        value: String,
    },
    Code {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
    },
    Link {
        url: String,
        title: Option<String>,
        children: Vec<MarkdownNode>,
    },
    Image {
        url: String,
        title: Option<String>,
        alt: String,
    },
    List {
        ordered: bool,
        start: Option<u32>,
        children: Vec<MarkdownNode>,
    },
    ListItem {
        checked: Option<bool>,
        children: Vec<MarkdownNode>,
    },
    BlockQuote {
        children: Vec<MarkdownNode>,
    },
    ThematicBreak,
    Break,
    Html {
        value: String,
    },
    FootnoteDefinition {
        identifier: String,
        children: Vec<MarkdownNode>,
    },
    FootnoteReference {
        identifier: String,
    },
    Table {
        children: Vec<MarkdownNode>,
    },
    TableRow {
        header: bool,
        children: Vec<MarkdownNode>,
    },
    TableCell {
        children: Vec<MarkdownNode>,
    },
}

impl MarkdownNode {
    /// Child nodes; empty for leaves.
    pub fn children(&self) -> &[MarkdownNode] {
        match self {
            MarkdownNode::Paragraph { children }
            | MarkdownNode::Heading { children, .. }
            | MarkdownNode::Emphasis { children }
            | MarkdownNode::Strong { children }
            | MarkdownNode::Delete { children }
            | MarkdownNode::Link { children, .. }
            | MarkdownNode::List { children, .. }
            | MarkdownNode::ListItem { children, .. }
            | MarkdownNode::BlockQuote { children }
            | MarkdownNode::FootnoteDefinition { children, .. }
            | MarkdownNode::Table { children }
            | MarkdownNode::TableRow { children, .. }
            | MarkdownNode::TableCell { children } => children,
            _ => &[],
        }
    }

    /// Mutable child list, when the node has one.
    pub fn children_mut(&mut self) -> Option<&mut Vec<MarkdownNode>> {
        match self {
            MarkdownNode::Paragraph { children }
            | MarkdownNode::Heading { children, .. }
            | MarkdownNode::Emphasis { children }
            | MarkdownNode::Strong { children }
            | MarkdownNode::Delete { children }
            | MarkdownNode::Link { children, .. }
            | MarkdownNode::List { children, .. }
            | MarkdownNode::ListItem { children, .. }
            | MarkdownNode::BlockQuote { children }
            | MarkdownNode::FootnoteDefinition { children, .. }
            | MarkdownNode::Table { children }
            | MarkdownNode::TableRow { children, .. }
            | MarkdownNode::TableCell { children } => Some(children),
            _ => None,
        }
    }

    /// Value of the first text leaf under this node, if any.
    pub fn first_text(&self) -> Option<&str> {
        if let MarkdownNode::Text { value } = self {
            return Some(value);
        }
        self.children().iter().find_map(MarkdownNode::first_text)
    }
}

/// Concatenate the text and inline-code leaves under `nodes`, with breaks
/// flattened to spaces.
pub(crate) fn collect_text(nodes: &[MarkdownNode]) -> String {
    fn fill(node: &MarkdownNode, buffer: &mut String) {
        match node {
            MarkdownNode::Text { value } | MarkdownNode::InlineCode { value } => {
                buffer.push_str(value);
            }
            MarkdownNode::Break => buffer.push(' '),
            _ => {}
        }
        for child in node.children() {
            fill(child, buffer);
        }
    }

    let mut text = String::new();
    for node in nodes {
        fill(node, &mut text);
    }
    text
}

fn walk_nodes(nodes: &[MarkdownNode], visit: &mut impl FnMut(&MarkdownNode)) {
    for node in nodes {
        visit(node);
        walk_nodes(node.children(), visit);
    }
}

fn walk_nodes_mut(nodes: &mut [MarkdownNode], visit: &mut impl FnMut(&mut MarkdownNode)) {
    for node in nodes {
        visit(node);
        if let Some(children) = node.children_mut() {
            walk_nodes_mut(children, visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> MarkdownTree {
        MarkdownTree::new(vec![MarkdownNode::Heading {
            depth: 1,
            children: vec![
                MarkdownNode::Emphasis {
                    children: vec![MarkdownNode::Text {
                        value: "Deep".to_string(),
                    }],
                },
                MarkdownNode::Text {
                    value: " title".to_string(),
                },
            ],
        }])
    }

    #[test]
    fn walk_visits_parents_before_children() {
        let tree = sample_tree();
        let mut order = Vec::new();
        tree.walk(&mut |node| {
            order.push(match node {
                MarkdownNode::Heading { .. } => "heading",
                MarkdownNode::Emphasis { .. } => "emphasis",
                MarkdownNode::Text { .. } => "text",
                _ => "other",
            });
        });
        assert_eq!(order, vec!["heading", "emphasis", "text", "text"]);
    }

    #[test]
    fn first_text_finds_nested_leaf() {
        let tree = sample_tree();
        assert_eq!(tree.children[0].first_text(), Some("Deep"));
    }

    #[test]
    fn collect_text_joins_leaves_in_order() {
        let tree = sample_tree();
        assert_eq!(collect_text(&tree.children), "Deep title");
    }

    #[test]
    fn serialization_tags_nodes_by_type() {
        let node = MarkdownNode::InlineCode {
            value: "cargo".to_string(),
        };
        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["type"], "inlineCode");
        assert_eq!(json["value"], "cargo");

        let back: MarkdownNode = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, node);
    }
}
