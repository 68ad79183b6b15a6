//! Source documents and the workspace capability.
//!
//! Documents are owned by the host content layer; the pipeline only reads
//! them. The content digest is computed once at construction and is the
//! content half of every cache key.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Immutable markdown source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    id: String,
    slug: String,
    content: String,
    digest: String,
    excerpt: Option<String>,
}

impl SourceDocument {
    pub fn new(
        id: impl Into<String>,
        slug: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let digest = content_digest(&content);
        Self {
            id: id.into(),
            slug: slug.into(),
            content,
            digest,
            excerpt: None,
        }
    }

    /// Attach a precomputed excerpt. Excerpt queries return it verbatim and
    /// never touch the parse pipeline.
    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Hex-encoded SHA-256 digest of the content.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn excerpt(&self) -> Option<&str> {
        self.excerpt.as_deref()
    }
}

/// Hex-encoded SHA-256 digest of document content.
pub fn content_digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Read access to the set of auxiliary documents known to the host.
///
/// Extensions receive the snapshot as read-only context for cross-document
/// analysis; the pipeline never writes through it.
#[async_trait]
pub trait Workspace: Send + Sync {
    async fn documents(&self) -> Vec<Arc<SourceDocument>>;
}

/// Fixed snapshot implementation for hosts without a live content layer.
#[derive(Debug, Clone, Default)]
pub struct StaticWorkspace {
    documents: Vec<Arc<SourceDocument>>,
}

impl StaticWorkspace {
    pub fn new(documents: Vec<SourceDocument>) -> Self {
        Self {
            documents: documents.into_iter().map(Arc::new).collect(),
        }
    }
}

#[async_trait]
impl Workspace for StaticWorkspace {
    async fn documents(&self) -> Vec<Arc<SourceDocument>> {
        self.documents.clone()
    }
}
