//! Transformation configuration and cache fingerprinting.
//!
//! A [`TransformConfig`] is immutable for the lifetime of a pipeline. Its
//! fingerprint namespaces every cache entry, so two pipelines with different
//! extension sets or path prefixes can never observe each other's artifacts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to a registered extension plus its options payload.
///
/// The reference is resolved through the
/// [`ExtensionRegistry`](crate::extension::ExtensionRegistry) exactly once,
/// when the pipeline is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
    pub reference: String,
    #[serde(default)]
    pub options: Value,
}

impl ExtensionDescriptor {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(reference: impl Into<String>, options: Value) -> Self {
        Self {
            reference: reference.into(),
            options,
        }
    }
}

/// Parser extensions an installed extension may request at the parser-extend
/// hook. Each maps onto one comrak extension flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParserFeature {
    Autolink,
    Strikethrough,
    Table,
    TaskList,
}

/// Immutable per-pipeline transformation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Ordered extension descriptors; order is part of the fingerprint.
    #[serde(default)]
    pub extensions: Vec<ExtensionDescriptor>,
    /// Prefix joined onto root-relative link targets during the parse stage.
    #[serde(default)]
    pub path_prefix: String,
}

impl TransformConfig {
    pub fn new(extensions: Vec<ExtensionDescriptor>, path_prefix: impl Into<String>) -> Self {
        Self {
            extensions,
            path_prefix: path_prefix.into(),
        }
    }

    /// Stable string namespacing cache entries by configuration: the
    /// concatenated extension references followed by the path prefix.
    ///
    /// Same config ⇒ same fingerprint ⇒ same cache namespace. Renaming a
    /// single extension reference orphans every artifact cached under the old
    /// fingerprint.
    pub fn fingerprint(&self) -> String {
        let references: String = self
            .extensions
            .iter()
            .map(|descriptor| descriptor.reference.as_str())
            .collect();
        format!("{references}-{}", self.path_prefix)
    }
}
