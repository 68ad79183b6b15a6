//! Raw-source linguistic counts and reading-time estimation.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::domain::tree::{MarkdownNode, collect_text};
use crate::pipeline::parse::parse_markdown;

/// Reading speed used by the time-to-read estimate, in words per minute.
const AVERAGE_WPM: u32 = 265;

/// Paragraph, sentence, and word counts over the raw source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub paragraphs: u32,
    pub sentences: u32,
    pub words: u32,
}

/// Linguistic pass over the raw source: a plain parse with base options (no
/// extensions, no prefix rewriting), then unicode segmentation over the
/// prose blocks.
pub(crate) fn word_count(source: &str) -> WordCount {
    let tree = parse_markdown(source, &BTreeSet::new());

    let mut paragraphs = 0u32;
    let mut sentences = 0u32;
    let mut words = 0u32;

    tree.walk(&mut |node| match node {
        MarkdownNode::Paragraph { children } => {
            paragraphs += 1;
            let text = collect_text(children);
            sentences += count_sentences(&text);
            words += text.unicode_words().count() as u32;
        }
        MarkdownNode::Heading { children, .. } => {
            let text = collect_text(children);
            sentences += count_sentences(&text);
            words += text.unicode_words().count() as u32;
        }
        _ => {}
    });

    WordCount {
        paragraphs,
        sentences,
        words,
    }
}

fn count_sentences(text: &str) -> u32 {
    text.unicode_sentences()
        .filter(|sentence| sentence.chars().any(char::is_alphanumeric))
        .count() as u32
}

static MARKUP_STRIPPER: Lazy<ammonia::Builder<'static>> = Lazy::new(|| {
    let mut builder = ammonia::Builder::default();
    builder.tags(HashSet::new());
    builder
});

/// Estimate reading time in minutes from rendered markup: strip every tag,
/// count words, divide by the average reading speed, round, floor at one.
pub(crate) fn time_to_read(markup: &str) -> u32 {
    let text = MARKUP_STRIPPER.clean(markup).to_string();
    let words = text.unicode_words().count() as f64;
    let minutes = (words / f64::from(AVERAGE_WPM)).round() as u32;
    minutes.max(1)
}
