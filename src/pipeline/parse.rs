//! Comrak parsing and conversion into the owned tree.
//!
//! The arena-backed comrak AST is converted into [`MarkdownTree`] before the
//! parse stage returns, so nothing lifetime-bound ever crosses an await
//! point or reaches the cache.

use std::collections::BTreeSet;

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::options::Options;
use comrak::{Arena, parse_document};
use tracing::debug;

use crate::config::ParserFeature;
use crate::domain::tree::{MarkdownNode, MarkdownTree, collect_text};

/// Comrak options for the configured feature set. Footnotes stay on
/// unconditionally; everything else is opt-in through parser-extend hooks.
fn parser_options(features: &BTreeSet<ParserFeature>) -> Options<'static> {
    let mut options = Options::default();
    options.extension.footnotes = true;
    for feature in features {
        let ext = &mut options.extension;
        match feature {
            ParserFeature::Autolink => ext.autolink = true,
            ParserFeature::Strikethrough => ext.strikethrough = true,
            ParserFeature::Table => ext.table = true,
            ParserFeature::TaskList => ext.tasklist = true,
        }
    }
    options
}

/// Parse `source` into an owned tree. Comrak is total over text input, so
/// malformed markdown degrades to literal content rather than an error.
pub(crate) fn parse_markdown(source: &str, features: &BTreeSet<ParserFeature>) -> MarkdownTree {
    let options = parser_options(features);
    let arena = Arena::new();
    let root = parse_document(&arena, source, &options);
    MarkdownTree::new(convert_children(root))
}

fn convert_children<'a>(node: &'a AstNode<'a>) -> Vec<MarkdownNode> {
    let mut children = Vec::new();
    let mut child = node.first_child();
    while let Some(next) = child {
        convert_node(next, &mut children);
        child = next.next_sibling();
    }
    children
}

fn convert_node<'a>(node: &'a AstNode<'a>, out: &mut Vec<MarkdownNode>) {
    let data = node.data.borrow();
    match &data.value {
        NodeValue::Paragraph => out.push(MarkdownNode::Paragraph {
            children: convert_children(node),
        }),
        NodeValue::Heading(heading) => out.push(MarkdownNode::Heading {
            depth: heading.level,
            children: convert_children(node),
        }),
        NodeValue::Text(text) => out.push(MarkdownNode::Text {
            value: text.to_string(),
        }),
        NodeValue::SoftBreak => out.push(MarkdownNode::Text {
            value: " ".to_string(),
        }),
        NodeValue::LineBreak => out.push(MarkdownNode::Break),
        NodeValue::Emph => out.push(MarkdownNode::Emphasis {
            children: convert_children(node),
        }),
        NodeValue::Strong => out.push(MarkdownNode::Strong {
            children: convert_children(node),
        }),
        NodeValue::Strikethrough => out.push(MarkdownNode::Delete {
            children: convert_children(node),
        }),
        NodeValue::Code(code) => out.push(MarkdownNode::InlineCode {
            value: code.literal.clone(),
        }),
        NodeValue::CodeBlock(block) => {
            let mut segments = block.info.trim().split_whitespace();
            let lang = segments.next().map(str::to_string);
            let meta = segments.collect::<Vec<_>>().join(" ");
            out.push(MarkdownNode::Code {
                lang,
                meta: (!meta.is_empty()).then_some(meta),
                value: block.literal.clone(),
            });
        }
        NodeValue::Link(link) => out.push(MarkdownNode::Link {
            url: link.url.clone(),
            title: (!link.title.is_empty()).then(|| link.title.clone()),
            children: convert_children(node),
        }),
        NodeValue::Image(link) => {
            let alt_children = convert_children(node);
            let alt_raw = collect_text(&alt_children);
            let alt = alt_raw.split_whitespace().collect::<Vec<_>>().join(" ");
            out.push(MarkdownNode::Image {
                url: link.url.clone(),
                title: (!link.title.is_empty()).then(|| link.title.clone()),
                alt,
            });
        }
        NodeValue::List(list) => {
            let ordered = matches!(list.list_type, ListType::Ordered);
            out.push(MarkdownNode::List {
                ordered,
                start: ordered.then_some(list.start as u32),
                children: convert_children(node),
            });
        }
        NodeValue::Item(_) => out.push(MarkdownNode::ListItem {
            checked: None,
            children: convert_children(node),
        }),
        NodeValue::TaskItem(state) => out.push(MarkdownNode::ListItem {
            checked: Some(state.symbol.is_some()),
            children: convert_children(node),
        }),
        NodeValue::BlockQuote => out.push(MarkdownNode::BlockQuote {
            children: convert_children(node),
        }),
        NodeValue::ThematicBreak => out.push(MarkdownNode::ThematicBreak),
        NodeValue::HtmlBlock(block) => out.push(MarkdownNode::Html {
            value: block.literal.clone(),
        }),
        NodeValue::HtmlInline(raw) => out.push(MarkdownNode::Html { value: raw.clone() }),
        NodeValue::FootnoteDefinition(definition) => out.push(MarkdownNode::FootnoteDefinition {
            identifier: definition.name.clone(),
            children: convert_children(node),
        }),
        NodeValue::FootnoteReference(reference) => out.push(MarkdownNode::FootnoteReference {
            identifier: reference.name.clone(),
        }),
        NodeValue::Table(_) => out.push(MarkdownNode::Table {
            children: convert_children(node),
        }),
        NodeValue::TableRow(header) => out.push(MarkdownNode::TableRow {
            header: *header,
            children: convert_children(node),
        }),
        NodeValue::TableCell => out.push(MarkdownNode::TableCell {
            children: convert_children(node),
        }),
        NodeValue::Document => out.extend(convert_children(node)),
        _ => {
            debug!(
                target = "pipeline::parse",
                "Unsupported markdown node flattened into its children"
            );
            out.extend(convert_children(node));
        }
    }
}
