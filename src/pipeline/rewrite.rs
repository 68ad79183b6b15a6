//! Root-relative link prefixing over the parsed tree.

use crate::domain::tree::{MarkdownNode, MarkdownTree};

/// Join `prefix` and `url`, collapsing the duplicate separator at the seam.
pub(crate) fn with_path_prefix(url: &str, prefix: &str) -> String {
    format!("{prefix}{url}").replacen("//", "/", 1)
}

/// Rewrite root-relative link targets in place. Protocol-relative targets
/// (`//host/...`) and absolute URLs are left untouched.
pub(crate) fn prefix_root_links(tree: &mut MarkdownTree, prefix: &str) {
    if prefix.is_empty() {
        return;
    }
    tree.walk_mut(&mut |node| {
        if let MarkdownNode::Link { url, .. } = node {
            if url.starts_with('/') && !url.starts_with("//") {
                *url = with_path_prefix(url, prefix);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(url: &str) -> MarkdownTree {
        MarkdownTree::new(vec![MarkdownNode::Paragraph {
            children: vec![MarkdownNode::Link {
                url: url.to_string(),
                title: None,
                children: Vec::new(),
            }],
        }])
    }

    fn first_url(tree: &MarkdownTree) -> String {
        let mut found = None;
        tree.walk(&mut |node| {
            if let MarkdownNode::Link { url, .. } = node {
                found = Some(url.clone());
            }
        });
        found.expect("link")
    }

    #[test]
    fn root_relative_urls_gain_the_prefix_without_double_slash() {
        let mut tree = link("/guide");
        prefix_root_links(&mut tree, "/docs");
        assert_eq!(first_url(&tree), "/docs/guide");
    }

    #[test]
    fn protocol_relative_urls_are_untouched() {
        let mut tree = link("//external.example/page");
        prefix_root_links(&mut tree, "/docs");
        assert_eq!(first_url(&tree), "//external.example/page");
    }

    #[test]
    fn absolute_urls_are_untouched() {
        let mut tree = link("https://example.com/guide");
        prefix_root_links(&mut tree, "/docs");
        assert_eq!(first_url(&tree), "https://example.com/guide");
    }

    #[test]
    fn empty_prefix_is_a_no_op() {
        let mut tree = link("/guide");
        prefix_root_links(&mut tree, "");
        assert_eq!(first_url(&tree), "/guide");
    }

    #[test]
    fn image_urls_are_not_rewritten() {
        let mut tree = MarkdownTree::new(vec![MarkdownNode::Paragraph {
            children: vec![MarkdownNode::Image {
                url: "/cover.png".to_string(),
                title: None,
                alt: String::new(),
            }],
        }]);
        prefix_root_links(&mut tree, "/docs");
        tree.walk(&mut |node| {
            if let MarkdownNode::Image { url, .. } = node {
                assert_eq!(url, "/cover.png");
            }
        });
    }

    #[test]
    fn trailing_slash_prefix_still_joins_cleanly() {
        assert_eq!(with_path_prefix("/guide", "/docs/"), "/docs/guide");
    }
}
