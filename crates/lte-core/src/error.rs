//! Error types for the document model.
//!
//! Reads never fail: a missing path or an unknown node kind produces an
//! empty or default result. Errors are reserved for loading input and for
//! structural edits the host should never have offered.

use thiserror::Error;

/// Failure to load or address a document.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The input is not JSON, or its root does not carry `w`, `h`, `fr`, `layers`.
    #[error("invalid animation document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// A dotted path string that does not follow the addressing grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid node path `{input}`: {reason}")]
pub struct PathError {
    pub input: String,
    pub reason: String,
}

/// A structural edit the model refuses to apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("layer index {index} is out of range ({len} top-level layers)")]
    LayerOutOfRange { index: usize, len: usize },

    /// Only `layers.<i>` can be deleted; nested precomposition layers cannot.
    #[error("`{path}` is not a top-level layer path")]
    NotTopLevel { path: String },

    /// NaN and infinities have no JSON spelling; the saved document would not load again.
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_name_the_offender() {
        let err = EditError::LayerOutOfRange { index: 7, len: 2 };
        assert_eq!(
            err.to_string(),
            "layer index 7 is out of range (2 top-level layers)"
        );

        let err = EditError::NotTopLevel {
            path: "assets.0.layers.1".into(),
        };
        assert!(err.to_string().contains("assets.0.layers.1"));

        let err = EditError::NonFinite { field: "framerate" };
        assert_eq!(err.to_string(), "framerate must be a finite number");
    }
}
