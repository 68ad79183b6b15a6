//! Content-addressed derivation pipeline for markdown documents.
//!
//! `foglio` turns one markdown source into a chain of cacheable artifacts
//! (syntax tree, rendered HTML tree, compiled document, plus headings, table
//! of contents, excerpt, and word counts) and serves many concurrent
//! queries for them without recomputing shared work.
//!
//! Three guarantees hold at the core:
//!
//! - **Coalescing**: concurrent demand for a not-yet-cached artifact runs
//!   exactly one computation; every caller observes its result, including a
//!   failure.
//! - **Precise invalidation**: cache keys are
//!   `{stage}-{contentDigest}-{configFingerprint}`, so artifacts go stale
//!   exactly when the source content or the transformation configuration
//!   changes, and stale entries are simply orphaned.
//! - **Independent stages**: asking for headings never materializes the
//!   compiled document, yet both share the one cached parse.
//!
//! Persistence ([`ArtifactStore`]), the auxiliary-document snapshot
//! ([`Workspace`]), and transformation extensions ([`MarkdownExtension`])
//! are injected capabilities.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use foglio::{
//!     ExtensionRegistry, MarkdownPipeline, MemoryArtifactStore, SourceDocument, StaticWorkspace,
//!     TransformConfig,
//! };
//!
//! # async fn demo() -> Result<(), foglio::PipelineError> {
//! let registry = ExtensionRegistry::new();
//! let pipeline = MarkdownPipeline::new(
//!     TransformConfig::default(),
//!     &registry,
//!     Arc::new(MemoryArtifactStore::new()),
//!     Arc::new(StaticWorkspace::default()),
//! )?;
//!
//! let document = SourceDocument::new("post-1", "hello-world", "# Hello\n\nWorld.");
//! let headings = pipeline.headings(&document, None).await?;
//! let toc = pipeline.table_of_contents(&document).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod extension;
pub mod pipeline;
pub mod telemetry;

pub use cache::{ArtifactStore, MemoryArtifactStore, Stage, StageCache, StoreError};
pub use config::{ExtensionDescriptor, ParserFeature, TransformConfig};
pub use domain::document::{SourceDocument, StaticWorkspace, Workspace, content_digest};
pub use domain::html::{HtmlNode, HtmlTree};
pub use domain::tree::{MarkdownNode, MarkdownTree};
pub use error::{HookPoint, PipelineError};
pub use extension::{
    ExtensionError, ExtensionFactory, ExtensionRegistry, HookRunner, MarkdownExtension,
    SourceContext, TreeContext,
};
pub use pipeline::{Heading, HeadingLevel, MarkdownPipeline, WordCount};
