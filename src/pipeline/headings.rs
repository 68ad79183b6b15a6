//! Heading summary extraction.

use serde::{Deserialize, Serialize};

use crate::domain::tree::{MarkdownNode, MarkdownTree};

/// One heading of a document: the value of its first text leaf plus its
/// depth. A heading with no text leaf (for example, only inline code) has
/// `text: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub text: Option<String>,
    pub depth: u8,
}

/// Depth filter accepted by the headings query. Applied after retrieval so
/// the filter never fragments the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    pub const fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
            HeadingLevel::H5 => 5,
            HeadingLevel::H6 => 6,
        }
    }
}

/// Collect every heading in document order.
pub(crate) fn collect_headings(tree: &MarkdownTree) -> Vec<Heading> {
    let mut headings = Vec::new();
    tree.walk(&mut |node| {
        if let MarkdownNode::Heading { depth, .. } = node {
            headings.push(Heading {
                text: node.first_text().map(str::to_string),
                depth: *depth,
            });
        }
    });
    headings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(depth: u8, text: &str) -> MarkdownNode {
        MarkdownNode::Heading {
            depth,
            children: vec![MarkdownNode::Text {
                value: text.to_string(),
            }],
        }
    }

    #[test]
    fn collects_headings_in_document_order() {
        let tree = MarkdownTree::new(vec![
            heading(1, "Title"),
            heading(2, "First"),
            heading(2, "Second"),
        ]);
        let headings = collect_headings(&tree);
        assert_eq!(
            headings,
            vec![
                Heading {
                    text: Some("Title".to_string()),
                    depth: 1
                },
                Heading {
                    text: Some("First".to_string()),
                    depth: 2
                },
                Heading {
                    text: Some("Second".to_string()),
                    depth: 2
                },
            ]
        );
    }

    #[test]
    fn heading_without_text_leaf_has_none() {
        let tree = MarkdownTree::new(vec![MarkdownNode::Heading {
            depth: 3,
            children: vec![MarkdownNode::InlineCode {
                value: "main".to_string(),
            }],
        }]);
        assert_eq!(collect_headings(&tree)[0].text, None);
    }

    #[test]
    fn heading_level_depths() {
        assert_eq!(HeadingLevel::H1.depth(), 1);
        assert_eq!(HeadingLevel::H6.depth(), 6);
    }
}
