//! Conversion of the markdown tree into the rendered HTML tree, and
//! compilation of the final document text.

use crate::domain::html::{HtmlNode, HtmlTree};
use crate::domain::slug::AnchorSlugger;
use crate::domain::tree::{MarkdownNode, MarkdownTree, collect_text};

/// Static header prepended to every compiled document, independent of
/// content.
const DOCUMENT_PREAMBLE: &str =
    "<!doctype html>\n<meta charset=\"utf-8\">\n<meta name=\"generator\" content=\"foglio\">\n";

/// Convert the markdown tree into the rendered tree. Headings receive
/// deterministic `id` anchors so outline links resolve against the rendered
/// output.
pub(crate) fn to_html_tree(tree: &MarkdownTree) -> HtmlTree {
    let mut slugger = AnchorSlugger::new();
    HtmlTree::new(convert_nodes(&tree.children, &mut slugger))
}

/// Serialize the rendered tree and prepend the document preamble.
pub(crate) fn compile_document(tree: &HtmlTree) -> String {
    format!("{DOCUMENT_PREAMBLE}{}", tree.to_html())
}

fn convert_nodes(nodes: &[MarkdownNode], slugger: &mut AnchorSlugger) -> Vec<HtmlNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        convert_node(node, slugger, &mut out);
    }
    out
}

fn convert_node(node: &MarkdownNode, slugger: &mut AnchorSlugger, out: &mut Vec<HtmlNode>) {
    match node {
        MarkdownNode::Paragraph { children } => {
            out.push(HtmlNode::element(
                "p",
                Vec::new(),
                convert_nodes(children, slugger),
            ));
        }
        MarkdownNode::Heading { depth, children } => {
            let level = (*depth).clamp(1, 6);
            let raw = collect_text(children);
            let title = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            let mut attributes = Vec::new();
            if let Ok(anchor) = slugger.anchor_for(&title) {
                attributes.push(("id".to_string(), anchor));
            }
            out.push(HtmlNode::element(
                format!("h{level}"),
                attributes,
                convert_nodes(children, slugger),
            ));
        }
        MarkdownNode::Text { value } => out.push(HtmlNode::text(value.clone())),
        MarkdownNode::Emphasis { children } => {
            out.push(HtmlNode::element(
                "em",
                Vec::new(),
                convert_nodes(children, slugger),
            ));
        }
        MarkdownNode::Strong { children } => {
            out.push(HtmlNode::element(
                "strong",
                Vec::new(),
                convert_nodes(children, slugger),
            ));
        }
        MarkdownNode::Delete { children } => {
            out.push(HtmlNode::element(
                "del",
                Vec::new(),
                convert_nodes(children, slugger),
            ));
        }
        MarkdownNode::InlineCode { value } => {
            out.push(HtmlNode::element(
                "code",
                Vec::new(),
                vec![HtmlNode::text(value.clone())],
            ));
        }
        MarkdownNode::Code { lang, value, .. } => {
            let mut code_attributes = Vec::new();
            if let Some(lang) = lang {
                code_attributes.push(("class".to_string(), format!("language-{lang}")));
            }
            let mut literal = value.clone();
            if !literal.ends_with('\n') {
                literal.push('\n');
            }
            out.push(HtmlNode::element(
                "pre",
                Vec::new(),
                vec![HtmlNode::element(
                    "code",
                    code_attributes,
                    vec![HtmlNode::text(literal)],
                )],
            ));
        }
        MarkdownNode::Link {
            url,
            title,
            children,
        } => {
            let mut attributes = vec![("href".to_string(), url.clone())];
            if let Some(title) = title {
                attributes.push(("title".to_string(), title.clone()));
            }
            out.push(HtmlNode::element(
                "a",
                attributes,
                convert_nodes(children, slugger),
            ));
        }
        MarkdownNode::Image { url, title, alt } => {
            let mut attributes = vec![
                ("src".to_string(), url.clone()),
                ("alt".to_string(), alt.clone()),
            ];
            if let Some(title) = title {
                attributes.push(("title".to_string(), title.clone()));
            }
            out.push(HtmlNode::element("img", attributes, Vec::new()));
        }
        MarkdownNode::List {
            ordered,
            start,
            children,
        } => {
            let tag = if *ordered { "ol" } else { "ul" };
            let mut attributes = Vec::new();
            if let Some(start) = start {
                if *ordered && *start != 1 {
                    attributes.push(("start".to_string(), start.to_string()));
                }
            }
            out.push(HtmlNode::element(
                tag,
                attributes,
                convert_nodes(children, slugger),
            ));
        }
        MarkdownNode::ListItem { checked, children } => {
            let mut item_children = Vec::new();
            if let Some(checked) = checked {
                let mut attributes = vec![
                    ("type".to_string(), "checkbox".to_string()),
                    ("disabled".to_string(), String::new()),
                ];
                if *checked {
                    attributes.push(("checked".to_string(), String::new()));
                }
                item_children.push(HtmlNode::element("input", attributes, Vec::new()));
            }
            item_children.extend(convert_nodes(children, slugger));
            out.push(HtmlNode::element("li", Vec::new(), item_children));
        }
        MarkdownNode::BlockQuote { children } => {
            out.push(HtmlNode::element(
                "blockquote",
                Vec::new(),
                convert_nodes(children, slugger),
            ));
        }
        MarkdownNode::ThematicBreak => out.push(HtmlNode::element("hr", Vec::new(), Vec::new())),
        MarkdownNode::Break => out.push(HtmlNode::element("br", Vec::new(), Vec::new())),
        MarkdownNode::Html { value } => out.push(HtmlNode::Raw {
            value: value.clone(),
        }),
        MarkdownNode::FootnoteDefinition {
            identifier,
            children,
        } => {
            out.push(HtmlNode::element(
                "div",
                vec![
                    ("id".to_string(), format!("fn-{identifier}")),
                    ("class".to_string(), "footnote-definition".to_string()),
                ],
                convert_nodes(children, slugger),
            ));
        }
        MarkdownNode::FootnoteReference { identifier } => {
            out.push(HtmlNode::element(
                "sup",
                vec![("class".to_string(), "footnote-reference".to_string())],
                vec![HtmlNode::element(
                    "a",
                    vec![("href".to_string(), format!("#fn-{identifier}"))],
                    vec![HtmlNode::text(identifier.clone())],
                )],
            ));
        }
        MarkdownNode::Table { children } => {
            out.push(HtmlNode::element(
                "table",
                Vec::new(),
                convert_nodes(children, slugger),
            ));
        }
        MarkdownNode::TableRow { header, children } => {
            let cell_tag = if *header { "th" } else { "td" };
            let cells = children
                .iter()
                .map(|cell| {
                    HtmlNode::element(cell_tag, Vec::new(), convert_nodes(cell.children(), slugger))
                })
                .collect();
            out.push(HtmlNode::element("tr", Vec::new(), cells));
        }
        MarkdownNode::TableCell { children } => {
            out.push(HtmlNode::element(
                "td",
                Vec::new(),
                convert_nodes(children, slugger),
            ));
        }
    }
}
