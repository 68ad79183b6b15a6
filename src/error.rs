//! Error taxonomy for the derivation pipeline.
//!
//! Every variant carries message strings rather than source errors so the
//! whole enum stays `Clone`: a coalesced computation hands the same failure
//! to every waiter that joined it.

use std::fmt;

use thiserror::Error;

/// The injection point at which an extension was running when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Factory construction while resolving the configured extension set.
    Build,
    /// Pre-parse source mutation.
    MutateSource,
    /// Post-parse tree mutation.
    MutateTree,
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HookPoint::Build => "construction",
            HookPoint::MutateSource => "source mutation",
            HookPoint::MutateTree => "tree mutation",
        };
        f.write_str(label)
    }
}

/// Failures surfaced by pipeline queries.
///
/// Store read and write failures never appear here: a failed read degrades to
/// a cache miss and a failed write degrades to lost persistence, both logged
/// at the cache layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("extension `{extension}` failed during {hook}: {message}")]
    Extension {
        extension: String,
        hook: HookPoint,
        message: String,
    },
    #[error("no extension registered for reference `{reference}`")]
    UnknownExtension { reference: String },
    #[error("failed to encode {stage} artifact: {message}")]
    Encode {
        stage: &'static str,
        message: String,
    },
    #[error("failed to decode {stage} artifact: {message}")]
    Decode {
        stage: &'static str,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_error_names_hook_point() {
        let error = PipelineError::Extension {
            extension: "wiki-links".to_string(),
            hook: HookPoint::MutateTree,
            message: "target not found".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "extension `wiki-links` failed during tree mutation: target not found"
        );
    }

    #[test]
    fn errors_are_cloneable_for_coalesced_waiters() {
        let error = PipelineError::UnknownExtension {
            reference: "missing".to_string(),
        };
        assert_eq!(error.clone(), error);
    }
}
