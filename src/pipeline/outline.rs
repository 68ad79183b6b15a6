//! Table-of-contents assembly and rendering.
//!
//! The outline is built from the document's heading sequence, every entry
//! URL is rewritten to `{path_prefix}/{slug}/{anchor}`, and the result is
//! rendered as nested list markup. An empty outline renders to an empty
//! string rather than failing.

use tracing::debug;

use crate::domain::html::{escape_attribute, escape_text};
use crate::domain::slug::AnchorSlugger;
use crate::domain::tree::{MarkdownNode, MarkdownTree, collect_text};

#[derive(Debug)]
struct OutlineEntry {
    title: String,
    url: String,
    depth: u8,
    children: Vec<OutlineEntry>,
}

/// Build, rewrite, and render the outline in one pass.
pub(crate) fn table_of_contents(tree: &MarkdownTree, path_prefix: &str, slug: &str) -> String {
    let mut entries = build_outline(tree);
    if entries.is_empty() {
        return String::new();
    }
    prefix_urls(&mut entries, path_prefix, slug);

    let mut out = String::new();
    render_list(&entries, &mut out);
    out
}

fn build_outline(tree: &MarkdownTree) -> Vec<OutlineEntry> {
    let mut slugger = AnchorSlugger::new();
    let mut entries: Vec<OutlineEntry> = Vec::new();

    tree.walk(&mut |node| {
        if let MarkdownNode::Heading { depth, children } = node {
            let raw = collect_text(children);
            let title = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            let anchor = match slugger.anchor_for(&title) {
                Ok(anchor) => anchor,
                Err(err) => {
                    debug!(
                        target = "pipeline::outline",
                        error = %err,
                        "Skipping outline entry for unsluggable heading"
                    );
                    return;
                }
            };
            attach(
                &mut entries,
                OutlineEntry {
                    title,
                    url: format!("#{anchor}"),
                    depth: *depth,
                    children: Vec::new(),
                },
            );
        }
    });

    entries
}

/// Nest an entry under the last sibling when it is deeper, otherwise append.
fn attach(siblings: &mut Vec<OutlineEntry>, entry: OutlineEntry) {
    if let Some(last) = siblings.last_mut() {
        if entry.depth > last.depth {
            attach(&mut last.children, entry);
            return;
        }
    }
    siblings.push(entry);
}

/// Rewrite every entry URL to `{prefix}/{slug}/{url}`, collapsing duplicate
/// separators introduced by the join.
fn prefix_urls(entries: &mut [OutlineEntry], prefix: &str, slug: &str) {
    for entry in entries {
        entry.url = [prefix, slug, &entry.url].join("/").replace("//", "/");
        prefix_urls(&mut entry.children, prefix, slug);
    }
}

fn render_list(entries: &[OutlineEntry], out: &mut String) {
    out.push_str("<ul>");
    for entry in entries {
        out.push_str("<li><a href=\"");
        out.push_str(&escape_attribute(&entry.url));
        out.push_str("\">");
        out.push_str(&escape_text(&entry.title));
        out.push_str("</a>");
        if !entry.children.is_empty() {
            render_list(&entry.children, out);
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
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
    fn nests_deeper_headings_under_their_predecessor() {
        let tree = MarkdownTree::new(vec![
            heading(1, "Overview"),
            heading(2, "Details"),
            heading(1, "Appendix"),
        ]);
        let toc = table_of_contents(&tree, "/docs", "my-post");
        assert_eq!(
            toc,
            "<ul>\
             <li><a href=\"/docs/my-post/#overview\">Overview</a>\
             <ul><li><a href=\"/docs/my-post/#details\">Details</a></li></ul>\
             </li>\
             <li><a href=\"/docs/my-post/#appendix\">Appendix</a></li>\
             </ul>"
        );
    }

    #[test]
    fn empty_document_renders_empty_string() {
        let tree = MarkdownTree::default();
        assert_eq!(table_of_contents(&tree, "/docs", "my-post"), "");
    }

    #[test]
    fn empty_prefix_joins_without_duplicate_separators() {
        let tree = MarkdownTree::new(vec![heading(1, "Overview")]);
        let toc = table_of_contents(&tree, "", "my-post");
        assert!(toc.contains("href=\"/my-post/#overview\""));
    }

    #[test]
    fn duplicate_headings_receive_unique_anchors() {
        let tree = MarkdownTree::new(vec![heading(2, "Setup"), heading(2, "Setup")]);
        let toc = table_of_contents(&tree, "", "post");
        assert!(toc.contains("#setup\""));
        assert!(toc.contains("#setup-2\""));
    }
}
