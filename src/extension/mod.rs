//! Extension capability surface and the hook runner.
//!
//! Extensions are registered as factories under a stable reference and
//! resolved into configured instances exactly once, when the pipeline is
//! built. Each instance may expose up to three capabilities: parser-feature
//! requests folded into the comrak options, a pre-parse source-mutation
//! hook, and a post-parse tree-mutation hook. Hooks run in descriptor order
//! and may suspend.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::{ExtensionDescriptor, ParserFeature};
use crate::domain::document::SourceDocument;
use crate::domain::tree::MarkdownTree;
use crate::error::{HookPoint, PipelineError};

/// Failure raised inside an extension hook or factory. The hook runner wraps
/// it with the extension name and injection point before it reaches callers.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExtensionError {
    message: String,
}

impl ExtensionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Context handed to pre-parse source-mutation hooks.
pub struct SourceContext<'a> {
    /// The working source text; mutations feed straight into the parser.
    pub source: &'a mut String,
    pub document: &'a SourceDocument,
    /// Read-only snapshot of the host's auxiliary documents.
    pub workspace: &'a [Arc<SourceDocument>],
}

/// Context handed to post-parse tree-mutation hooks.
pub struct TreeContext<'a> {
    /// The working tree; mutated in place.
    pub tree: &'a mut MarkdownTree,
    pub document: &'a SourceDocument,
    /// Read-only snapshot of the host's auxiliary documents, refreshed after
    /// the parse so tree hooks observe state the source hooks may have
    /// changed.
    pub workspace: &'a [Arc<SourceDocument>],
    pub path_prefix: &'a str,
}

/// One installed transformation extension. Every capability is optional.
#[async_trait]
pub trait MarkdownExtension: Send + Sync {
    /// Name used in logs and error messages. The cache fingerprint uses the
    /// descriptor reference, not this name.
    fn name(&self) -> &str;

    /// Comrak extensions this extension needs enabled at parse time.
    fn parser_features(&self) -> Vec<ParserFeature> {
        Vec::new()
    }

    /// Rewrite or annotate the raw source before parsing.
    async fn mutate_source(&self, _context: SourceContext<'_>) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Mutate the parsed tree in place.
    async fn mutate_tree(&self, _context: TreeContext<'_>) -> Result<(), ExtensionError> {
        Ok(())
    }
}

/// Builds a configured extension instance from its descriptor options.
pub trait ExtensionFactory: Send + Sync {
    fn build(&self, options: &Value) -> Result<Arc<dyn MarkdownExtension>, ExtensionError>;
}

impl<F> ExtensionFactory for F
where
    F: Fn(&Value) -> Result<Arc<dyn MarkdownExtension>, ExtensionError> + Send + Sync,
{
    fn build(&self, options: &Value) -> Result<Arc<dyn MarkdownExtension>, ExtensionError> {
        self(options)
    }
}

/// Startup-time registry mapping extension references to factories.
#[derive(Default)]
pub struct ExtensionRegistry {
    factories: HashMap<String, Arc<dyn ExtensionFactory>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under `reference`. Re-registering a reference
    /// replaces the previous factory.
    pub fn register(
        &mut self,
        reference: impl Into<String>,
        factory: impl ExtensionFactory + 'static,
    ) -> &mut Self {
        self.factories.insert(reference.into(), Arc::new(factory));
        self
    }

    /// Resolve the configured descriptor list into a hook runner. Called
    /// once per pipeline; hooks are never re-resolved per query.
    pub fn resolve(&self, descriptors: &[ExtensionDescriptor]) -> Result<HookRunner, PipelineError> {
        let mut extensions = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let factory = self.factories.get(&descriptor.reference).ok_or_else(|| {
                PipelineError::UnknownExtension {
                    reference: descriptor.reference.clone(),
                }
            })?;
            let extension =
                factory
                    .build(&descriptor.options)
                    .map_err(|err| PipelineError::Extension {
                        extension: descriptor.reference.clone(),
                        hook: HookPoint::Build,
                        message: err.to_string(),
                    })?;
            extensions.push(extension);
        }
        Ok(HookRunner::new(extensions))
    }
}

/// Applies the resolved extension set at the two injection points.
pub struct HookRunner {
    extensions: Vec<Arc<dyn MarkdownExtension>>,
}

impl HookRunner {
    pub fn new(extensions: Vec<Arc<dyn MarkdownExtension>>) -> Self {
        Self { extensions }
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Union of the parser features requested by every extension.
    pub fn parser_features(&self) -> BTreeSet<ParserFeature> {
        self.extensions
            .iter()
            .flat_map(|extension| extension.parser_features())
            .collect()
    }

    /// Run every source-mutation hook in order.
    pub async fn run_source_hooks(
        &self,
        source: &mut String,
        document: &SourceDocument,
        workspace: &[Arc<SourceDocument>],
    ) -> Result<(), PipelineError> {
        for extension in &self.extensions {
            let context = SourceContext {
                source: &mut *source,
                document,
                workspace,
            };
            extension
                .mutate_source(context)
                .await
                .map_err(|err| PipelineError::Extension {
                    extension: extension.name().to_string(),
                    hook: HookPoint::MutateSource,
                    message: err.to_string(),
                })?;
        }
        Ok(())
    }

    /// Run every tree-mutation hook in order.
    pub async fn run_tree_hooks(
        &self,
        tree: &mut MarkdownTree,
        document: &SourceDocument,
        workspace: &[Arc<SourceDocument>],
        path_prefix: &str,
    ) -> Result<(), PipelineError> {
        for extension in &self.extensions {
            let context = TreeContext {
                tree: &mut *tree,
                document,
                workspace,
                path_prefix,
            };
            extension
                .mutate_tree(context)
                .await
                .map_err(|err| PipelineError::Extension {
                    extension: extension.name().to_string(),
                    hook: HookPoint::MutateTree,
                    message: err.to_string(),
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tree::MarkdownNode;

    struct UppercaseTitles;

    #[async_trait]
    impl MarkdownExtension for UppercaseTitles {
        fn name(&self) -> &str {
            "uppercase-titles"
        }

        fn parser_features(&self) -> Vec<ParserFeature> {
            vec![ParserFeature::Strikethrough]
        }

        async fn mutate_tree(&self, context: TreeContext<'_>) -> Result<(), ExtensionError> {
            context.tree.walk_mut(&mut |node| {
                if let MarkdownNode::Heading { children, .. } = node {
                    for child in children {
                        if let MarkdownNode::Text { value } = child {
                            *value = value.to_uppercase();
                        }
                    }
                }
            });
            Ok(())
        }
    }

    fn registry() -> ExtensionRegistry {
        let mut registry = ExtensionRegistry::new();
        registry.register(
            "uppercase-titles",
            |_options: &Value| -> Result<Arc<dyn MarkdownExtension>, ExtensionError> {
                Ok(Arc::new(UppercaseTitles))
            },
        );
        registry
    }

    #[test]
    fn resolve_rejects_unknown_references() {
        let registry = ExtensionRegistry::new();
        let result = registry.resolve(&[ExtensionDescriptor::new("missing")]);
        assert_eq!(
            result.err(),
            Some(PipelineError::UnknownExtension {
                reference: "missing".to_string()
            })
        );
    }

    #[test]
    fn resolved_runner_unions_parser_features() {
        let runner = registry()
            .resolve(&[ExtensionDescriptor::new("uppercase-titles")])
            .expect("resolve");
        assert!(
            runner
                .parser_features()
                .contains(&ParserFeature::Strikethrough)
        );
    }

    #[tokio::test]
    async fn tree_hooks_mutate_in_descriptor_order() {
        let runner = registry()
            .resolve(&[ExtensionDescriptor::new("uppercase-titles")])
            .expect("resolve");
        let document = SourceDocument::new("1", "one", "# hello");
        let mut tree = MarkdownTree::new(vec![MarkdownNode::Heading {
            depth: 1,
            children: vec![MarkdownNode::Text {
                value: "hello".to_string(),
            }],
        }]);

        runner
            .run_tree_hooks(&mut tree, &document, &[], "")
            .await
            .expect("hooks");

        assert_eq!(tree.children[0].first_text(), Some("HELLO"));
    }

    struct Failing;

    #[async_trait]
    impl MarkdownExtension for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn mutate_source(&self, _context: SourceContext<'_>) -> Result<(), ExtensionError> {
            Err(ExtensionError::new("no workspace access"))
        }
    }

    #[tokio::test]
    async fn hook_failures_carry_extension_name_and_hook_point() {
        let runner = HookRunner::new(vec![Arc::new(Failing)]);
        let document = SourceDocument::new("1", "one", "text");
        let mut source = document.content().to_string();

        let error = runner
            .run_source_hooks(&mut source, &document, &[])
            .await
            .expect_err("failure");
        assert_eq!(
            error,
            PipelineError::Extension {
                extension: "failing".to_string(),
                hook: HookPoint::MutateSource,
                message: "no workspace access".to_string(),
            }
        );
    }
}
