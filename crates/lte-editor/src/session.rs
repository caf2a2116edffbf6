//! Editor session: the single owner of the current document.
//!
//! The session holds the document slot plus the transient interaction state
//! around it (selection, hover, playback). Every mutation goes through the
//! pure edits in `lte_core::edit`, replaces the document as a whole, lands
//! in the undo history, and is written to the store.
//!
//! With no current document every mutation is a no-op reporting `false`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lte_core::{Document, Edit, EditError, NodePath, RgbaColor, ShapeInfo, resolve_shape};

use crate::commands::CommandStack;
use crate::config::EditorConfig;
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("failed to persist document: {0}")]
    Store(#[from] StoreError),
}

/// What the presentation layer reports. None of these touch the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    SelectShape { path: NodePath },
    Hover { paths: Vec<NodePath> },
    ClearHover,
    Play,
    Pause,
}

pub struct EditorSession<S: DocumentStore> {
    document: Option<Document>,
    loading: bool,
    selected: Option<NodePath>,
    hovered: Vec<NodePath>,
    playing: bool,
    commands: CommandStack,
    store: S,
    config: EditorConfig,
}

impl<S: DocumentStore> EditorSession<S> {
    /// A session with no document yet. Call `load_from_store` to restore
    /// the last persisted one.
    pub fn new(store: S, config: EditorConfig) -> Self {
        Self {
            document: None,
            loading: true,
            selected: None,
            hovered: Vec::new(),
            playing: true,
            commands: CommandStack::new(config.undo_depth),
            store,
            config,
        }
    }

    // ─── Document slot ───────────────────────────────────────────────────

    /// Restore the persisted document, if any. Returns whether one was found.
    ///
    /// Stored text that no longer parses is logged and treated as absent.
    pub fn load_from_store(&mut self) -> Result<bool, SessionError> {
        let stored = self.store.get(&self.config.storage_key);
        self.loading = false;
        let Some(text) = stored? else {
            log::debug!("no stored document under `{}`", self.config.storage_key);
            return Ok(false);
        };
        match Document::from_json(&text) {
            Ok(doc) => {
                log::info!("restored document `{}`", self.config.storage_key);
                self.replace_document(Some(doc));
                Ok(true)
            }
            Err(err) => {
                log::warn!("ignoring stored document `{}`: {err}", self.config.storage_key);
                Ok(false)
            }
        }
    }

    /// Replace the document wholesale (e.g. a newly opened file). History
    /// and selection are reset.
    pub fn set_document(&mut self, doc: Document) -> Result<(), SessionError> {
        self.loading = false;
        self.replace_document(Some(doc));
        self.persist()
    }

    /// Drop the document and its persisted copy.
    pub fn remove_document(&mut self) -> Result<(), SessionError> {
        self.replace_document(None);
        self.store.remove(&self.config.storage_key)?;
        Ok(())
    }

    fn replace_document(&mut self, doc: Option<Document>) {
        self.document = doc;
        self.selected = None;
        self.hovered.clear();
        self.commands.clear();
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // ─── Interaction state ───────────────────────────────────────────────

    pub fn select_shape(&mut self, path: NodePath) {
        self.selected = Some(path);
    }

    pub fn selected_path(&self) -> Option<&NodePath> {
        self.selected.as_ref()
    }

    /// The selected shape, described as the layer listing would describe it.
    pub fn selected_shape(&self) -> Option<ShapeInfo> {
        let doc = self.document.as_ref()?;
        let path = self.selected.as_ref()?;
        Some(resolve_shape(doc, path))
    }

    pub fn set_hovered(&mut self, paths: Vec<NodePath>) {
        self.hovered = paths;
    }

    pub fn hovered(&self) -> &[NodePath] {
        &self.hovered
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn handle_intent(&mut self, intent: Intent) {
        log::trace!("intent: {intent:?}");
        match intent {
            Intent::SelectShape { path } => self.select_shape(path),
            Intent::Hover { paths } => self.set_hovered(paths),
            Intent::ClearHover => self.hovered.clear(),
            Intent::Play => self.playing = true,
            Intent::Pause => self.playing = false,
        }
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Recolor the selected fill/stroke. `false` when nothing is selected.
    pub fn update_selected_shape_color(&mut self, color: RgbaColor) -> Result<bool, SessionError> {
        let Some(path) = self.selected.clone() else {
            return Ok(false);
        };
        self.apply(Edit::SetShapeColor { path, color })
    }

    pub fn update_framerate(&mut self, framerate: f64) -> Result<bool, SessionError> {
        self.apply(Edit::SetFramerate { framerate })
    }

    pub fn update_dimensions(&mut self, width: u32, height: u32) -> Result<bool, SessionError> {
        self.apply(Edit::SetDimensions { width, height })
    }

    /// Delete a top-level layer by index.
    pub fn delete_layer(&mut self, index: usize) -> Result<bool, SessionError> {
        self.apply(Edit::DeleteLayer {
            path: NodePath::layer(index),
        })
    }

    pub fn update_color_globally(
        &mut self,
        from: RgbaColor,
        to: RgbaColor,
    ) -> Result<bool, SessionError> {
        self.apply(Edit::ReplaceColor { from, to })
    }

    pub fn toggle_layer_hidden(&mut self, path: NodePath) -> Result<bool, SessionError> {
        self.apply(Edit::ToggleLayerHidden { path })
    }

    /// Apply any edit to the current document.
    ///
    /// Returns whether the document changed. An edit with no effect is
    /// neither recorded nor persisted.
    pub fn apply(&mut self, edit: Edit) -> Result<bool, SessionError> {
        let Some(current) = self.document.as_ref() else {
            log::debug!("ignoring `{}`: no document", edit.description());
            return Ok(false);
        };
        let next = self.commands.execute(current, &edit)?;
        if next == *current {
            log::debug!("`{}` changed nothing", edit.description());
            return Ok(false);
        }
        self.document = Some(next);
        self.persist()?;
        Ok(true)
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Start a gesture: edits until `end_gesture` undo as one step.
    pub fn begin_gesture(&mut self) {
        if let Some(doc) = &self.document {
            self.commands.begin_batch(doc);
        }
    }

    pub fn end_gesture(&mut self) {
        if let Some(doc) = &self.document {
            self.commands.end_batch(doc);
        }
    }

    /// Undo the last edit. Returns its description.
    pub fn undo(&mut self) -> Result<Option<String>, SessionError> {
        let Some((doc, description)) = self.commands.undo() else {
            return Ok(None);
        };
        self.document = Some(doc);
        self.persist()?;
        Ok(Some(description))
    }

    pub fn redo(&mut self) -> Result<Option<String>, SessionError> {
        let Some((doc, description)) = self.commands.redo() else {
            return Ok(None);
        };
        self.document = Some(doc);
        self.persist()?;
        Ok(Some(description))
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    fn persist(&mut self) -> Result<(), SessionError> {
        if !self.config.persist_on_edit {
            return Ok(());
        }
        if let Some(doc) = &self.document {
            self.store.set(&self.config.storage_key, &doc.to_json())?;
        }
        Ok(())
    }
}
