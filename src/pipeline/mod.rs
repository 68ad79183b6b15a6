//! The derivation pipeline and its query surface.
//!
//! [`MarkdownPipeline`] is the long-lived service object that owns the stage
//! cache, the in-flight coordinator, and the extension set resolved at
//! construction. Each query is a thin adapter: one cache key, one named
//! compute function, everything else shared. Downstream stages pull their
//! upstream artifact through the same coalesced getters, so querying only
//! the headings of a cold document still computes (and caches) the AST
//! exactly once, and never materializes the compiled document.

mod excerpt;
mod headings;
mod outline;
mod parse;
mod render;
mod rewrite;
mod words;

pub use headings::{Heading, HeadingLevel};
pub use words::WordCount;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::cache::{ArtifactStore, Stage, StageCache};
use crate::config::{ParserFeature, TransformConfig};
use crate::domain::document::{SourceDocument, Workspace};
use crate::domain::html::HtmlTree;
use crate::domain::tree::MarkdownTree;
use crate::error::PipelineError;
use crate::extension::{ExtensionRegistry, HookRunner};
use crate::telemetry;

/// Cached, coalesced derivation pipeline over markdown source documents.
///
/// Cheap to clone; clones share the cache, the in-flight table, and the
/// resolved extension set.
#[derive(Clone)]
pub struct MarkdownPipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    config: TransformConfig,
    fingerprint: String,
    features: BTreeSet<ParserFeature>,
    hooks: HookRunner,
    workspace: Arc<dyn Workspace>,
    cache: StageCache,
}

impl MarkdownPipeline {
    /// Build a pipeline: resolve the configured extensions through the
    /// registry, collect their parser features, and fix the cache
    /// fingerprint for this configuration.
    pub fn new(
        config: TransformConfig,
        registry: &ExtensionRegistry,
        store: Arc<dyn ArtifactStore>,
        workspace: Arc<dyn Workspace>,
    ) -> Result<Self, PipelineError> {
        telemetry::describe_metrics();
        let hooks = registry.resolve(&config.extensions)?;
        let features = hooks.parser_features();
        let fingerprint = config.fingerprint();
        Ok(Self {
            inner: Arc::new(PipelineInner {
                config,
                fingerprint,
                features,
                hooks,
                workspace,
                cache: StageCache::new(store),
            }),
        })
    }

    /// The cache namespace of this pipeline's configuration.
    pub fn fingerprint(&self) -> &str {
        &self.inner.fingerprint
    }

    /// The parsed (and extension-mutated) syntax tree.
    pub async fn ast(&self, document: &SourceDocument) -> Result<MarkdownTree, PipelineError> {
        Arc::clone(&self.inner).ast(document.clone()).await
    }

    /// Headings in document order, optionally filtered to one depth. The
    /// filter is applied after retrieval and is not part of the cache key.
    pub async fn headings(
        &self,
        document: &SourceDocument,
        depth: Option<HeadingLevel>,
    ) -> Result<Vec<Heading>, PipelineError> {
        let headings = Arc::clone(&self.inner).headings(document.clone()).await?;
        Ok(match depth {
            Some(level) => headings
                .into_iter()
                .filter(|heading| heading.depth == level.depth())
                .collect(),
            None => headings,
        })
    }

    /// The rendered outline, or an empty string for a document without
    /// headings.
    pub async fn table_of_contents(
        &self,
        document: &SourceDocument,
    ) -> Result<String, PipelineError> {
        Arc::clone(&self.inner)
            .table_of_contents(document.clone())
            .await
    }

    /// The rendered HTML tree.
    pub async fn html_tree(&self, document: &SourceDocument) -> Result<HtmlTree, PipelineError> {
        Arc::clone(&self.inner).html_tree(document.clone()).await
    }

    /// The compiled document: serialized HTML behind the fixed preamble.
    pub async fn html(&self, document: &SourceDocument) -> Result<String, PipelineError> {
        Arc::clone(&self.inner).html(document.clone()).await
    }

    /// Plain-text excerpt pruned to `prune_length` characters (default 140).
    /// A precomputed excerpt on the document is returned verbatim and never
    /// touches the pipeline.
    pub async fn excerpt(
        &self,
        document: &SourceDocument,
        prune_length: Option<usize>,
    ) -> Result<String, PipelineError> {
        if let Some(precomputed) = document.excerpt() {
            return Ok(precomputed.to_string());
        }
        let source = Arc::clone(&self.inner)
            .excerpt_source(document.clone())
            .await?;
        Ok(excerpt::prune(
            &source,
            prune_length.unwrap_or(excerpt::DEFAULT_PRUNE_LENGTH),
        ))
    }

    /// Estimated reading time in whole minutes, never below one.
    pub async fn time_to_read(&self, document: &SourceDocument) -> Result<u32, PipelineError> {
        let tree = Arc::clone(&self.inner).html_tree(document.clone()).await?;
        Ok(words::time_to_read(&tree.to_html()))
    }

    /// Paragraph, sentence, and word counts over the raw source.
    pub async fn word_count(&self, document: &SourceDocument) -> Result<WordCount, PipelineError> {
        Arc::clone(&self.inner).word_count(document.clone()).await
    }
}

impl PipelineInner {
    async fn ast(self: Arc<Self>, document: SourceDocument) -> Result<MarkdownTree, PipelineError> {
        let inner = Arc::clone(&self);
        let doc = document.clone();
        self.cache
            .fetch_or_compute(Stage::Ast, &document, &self.fingerprint, move || {
                inner.compute_ast(doc)
            })
            .await
    }

    /// The parse stage: source hooks, parse, link prefixing, tree hooks.
    /// Every other stage depends on this one, which is why it is the most
    /// valuable to coalesce.
    async fn compute_ast(
        self: Arc<Self>,
        document: SourceDocument,
    ) -> Result<MarkdownTree, PipelineError> {
        let mut source = document.content().to_string();
        let workspace = self.workspace.documents().await;
        self.hooks
            .run_source_hooks(&mut source, &document, &workspace)
            .await?;

        let mut tree = parse::parse_markdown(&source, &self.features);
        rewrite::prefix_root_links(&mut tree, &self.config.path_prefix);

        // Source hooks may have changed workspace state; tree hooks get a
        // fresh snapshot.
        let workspace = self.workspace.documents().await;
        self.hooks
            .run_tree_hooks(&mut tree, &document, &workspace, &self.config.path_prefix)
            .await?;

        Ok(tree)
    }

    async fn headings(
        self: Arc<Self>,
        document: SourceDocument,
    ) -> Result<Vec<Heading>, PipelineError> {
        let inner = Arc::clone(&self);
        let doc = document.clone();
        self.cache
            .fetch_or_compute(Stage::Headings, &document, &self.fingerprint, move || {
                async move {
                    let tree = inner.ast(doc).await?;
                    Ok(headings::collect_headings(&tree))
                }
            })
            .await
    }

    async fn table_of_contents(
        self: Arc<Self>,
        document: SourceDocument,
    ) -> Result<String, PipelineError> {
        let inner = Arc::clone(&self);
        let doc = document.clone();
        self.cache
            .fetch_or_compute(Stage::Toc, &document, &self.fingerprint, move || {
                async move {
                    let slug = doc.slug().to_string();
                    let tree = Arc::clone(&inner).ast(doc).await?;
                    Ok(outline::table_of_contents(
                        &tree,
                        &inner.config.path_prefix,
                        &slug,
                    ))
                }
            })
            .await
    }

    async fn html_tree(
        self: Arc<Self>,
        document: SourceDocument,
    ) -> Result<HtmlTree, PipelineError> {
        let inner = Arc::clone(&self);
        let doc = document.clone();
        self.cache
            .fetch_or_compute(Stage::HtmlTree, &document, &self.fingerprint, move || {
                async move {
                    let tree = inner.ast(doc).await?;
                    Ok(render::to_html_tree(&tree))
                }
            })
            .await
    }

    async fn html(self: Arc<Self>, document: SourceDocument) -> Result<String, PipelineError> {
        let inner = Arc::clone(&self);
        let doc = document.clone();
        self.cache
            .fetch_or_compute(Stage::Html, &document, &self.fingerprint, move || {
                async move {
                    let tree = inner.html_tree(doc).await?;
                    Ok(render::compile_document(&tree))
                }
            })
            .await
    }

    async fn excerpt_source(
        self: Arc<Self>,
        document: SourceDocument,
    ) -> Result<String, PipelineError> {
        let inner = Arc::clone(&self);
        let doc = document.clone();
        self.cache
            .fetch_or_compute(Stage::Excerpt, &document, &self.fingerprint, move || {
                async move {
                    let tree = inner.ast(doc).await?;
                    Ok(excerpt::excerpt_source(&tree))
                }
            })
            .await
    }

    async fn word_count(
        self: Arc<Self>,
        document: SourceDocument,
    ) -> Result<WordCount, PipelineError> {
        let doc = document.clone();
        self.cache
            .fetch_or_compute(Stage::WordCount, &document, &self.fingerprint, move || {
                async move { Ok(words::word_count(doc.content())) }
            })
            .await
    }
}
