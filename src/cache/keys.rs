//! Cache key construction.
//!
//! Two computations that would produce different output must never share a
//! key; two that would produce identical output should share one. The key is
//! therefore exactly the stage name, the content digest, and the
//! configuration fingerprint.

/// One cacheable step of the derivation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Ast,
    Headings,
    Toc,
    HtmlTree,
    Html,
    Excerpt,
    WordCount,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Ast => "ast",
            Stage::Headings => "headings",
            Stage::Toc => "toc",
            Stage::HtmlTree => "html-tree",
            Stage::Html => "html",
            Stage::Excerpt => "excerpt",
            Stage::WordCount => "word-count",
        }
    }
}

/// Build the composite key `{stage}-{digest}-{fingerprint}`.
pub fn cache_key(stage: Stage, digest: &str, fingerprint: &str) -> String {
    format!("{}-{digest}-{fingerprint}", stage.as_str())
}
