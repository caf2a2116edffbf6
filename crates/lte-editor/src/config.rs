//! Editor session configuration.

use serde::Deserialize;

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for `EditorSession`.
///
/// Loadable from JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo steps kept. Default: **100**.
    pub undo_depth: usize,

    /// Key the current document is persisted under. Default: **"animationJson"**.
    pub storage_key: String,

    /// Write the document to the store after every applied edit. Default: **true**.
    pub persist_on_edit: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_depth: 100,
            storage_key: "animationJson".to_string(),
            persist_on_edit: true,
        }
    }
}
