//! Excerpt text assembly and pruning.
//!
//! The cached artifact is the untruncated join of the document's text and
//! inline-code leaves; pruning to the caller's length happens per call so a
//! different length never fragments the cache.

use crate::domain::tree::{MarkdownNode, MarkdownTree};

pub(crate) const DEFAULT_PRUNE_LENGTH: usize = 140;
const ELLIPSIS: char = '…';

/// Join every text and inline-code leaf in document order with single
/// spaces. Leaves carry their surrounding markdown spacing, so parts are
/// trimmed and whitespace-only leaves dropped to keep the join single-spaced.
pub(crate) fn excerpt_source(tree: &MarkdownTree) -> String {
    let mut parts: Vec<String> = Vec::new();
    tree.walk(&mut |node| match node {
        MarkdownNode::Text { value } | MarkdownNode::InlineCode { value } => {
            let part = value.trim();
            if !part.is_empty() {
                parts.push(part.to_string());
            }
        }
        _ => {}
    });
    parts.join(" ")
}

/// Truncate to `max_chars` characters plus an ellipsis marker; text at or
/// under the limit is returned unchanged.
pub(crate) fn prune(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut pruned: String = text.chars().take(max_chars).collect();
    pruned.push(ELLIPSIS);
    pruned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_joins_text_and_inline_code_with_spaces() {
        let tree = MarkdownTree::new(vec![MarkdownNode::Paragraph {
            children: vec![
                MarkdownNode::Text {
                    value: "Install".to_string(),
                },
                MarkdownNode::InlineCode {
                    value: "cargo".to_string(),
                },
                MarkdownNode::Text {
                    value: "first".to_string(),
                },
            ],
        }]);
        assert_eq!(excerpt_source(&tree), "Install cargo first");
    }

    #[test]
    fn prune_truncates_over_limit_with_ellipsis() {
        let text = "a".repeat(200);
        let pruned = prune(&text, 140);
        assert_eq!(pruned.chars().count(), 141);
        assert_eq!(&pruned[..140], "a".repeat(140));
        assert!(pruned.ends_with('…'));
    }

    #[test]
    fn prune_leaves_short_text_unchanged() {
        assert_eq!(prune("short", 140), "short");
    }

    #[test]
    fn prune_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(prune(&text, 10), text);
        let pruned = prune(&text, 9);
        assert_eq!(pruned.chars().count(), 10);
        assert!(pruned.ends_with('…'));
    }
}
