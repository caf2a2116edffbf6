//! Pure document edits.
//!
//! Every edit takes the current document by reference and returns a new one;
//! the input is never modified. Edits aimed at a path that does not resolve
//! return an unchanged copy. Structural edits that would remove the wrong
//! element are rejected with an `EditError` instead.

use serde::{Deserialize, Serialize};

use crate::color::{RgbaColor, channels_match, to_storage};
use crate::error::EditError;
use crate::model::{ColorProperty, ColorValue, Document, Extra, Shape};
use crate::path::{NodeMut, NodePath, resolve_mut};
use crate::query::layer_hidden;
use crate::walk::visit_paint_shapes;

/// Replace the color of the fill/stroke at `path`.
///
/// The whole `k` slot is overwritten, so an animated color collapses to a
/// static one and its keyframes are dropped. Other members of the color
/// property (`a`, `ix`, ...) are kept.
#[must_use]
pub fn set_shape_color(doc: &Document, path: &NodePath, color: RgbaColor) -> Document {
    let mut next = doc.clone();
    let paint = resolve_mut(&mut next, path)
        .and_then(NodeMut::into_shape)
        .and_then(Shape::paint_mut);
    match paint {
        Some(paint) => {
            let value = ColorValue::Static(to_storage(color));
            match paint.color.as_mut() {
                Some(prop) => prop.value = value,
                None => {
                    paint.color = Some(ColorProperty {
                        value,
                        extra: Extra::new(),
                    })
                }
            }
        }
        None => log::debug!("set_shape_color: no fill or stroke at {path}"),
    }
    next
}

/// Replace every occurrence of `from` with `to`, document-wide.
///
/// Static colors are matched as a whole. Animated colors are matched per
/// keyframe and per field (`s`, `e`, `k`): only the occurrences equal to
/// `from` change, other keyframes of the same property are left alone.
#[must_use]
pub fn replace_color_globally(doc: &Document, from: RgbaColor, to: RgbaColor) -> Document {
    if from.same_as(&to) {
        return doc.clone();
    }

    let mut targets = Vec::new();
    visit_paint_shapes(doc, |path, _| targets.push(path.clone()));

    let mut next = doc.clone();
    let replacement = to_storage(to);
    let mut rewritten = 0;
    for path in &targets {
        let prop = resolve_mut(&mut next, path)
            .and_then(NodeMut::into_shape)
            .and_then(Shape::paint_mut)
            .and_then(|paint| paint.color.as_mut());
        if let Some(prop) = prop {
            rewritten += recolor(prop, &from, &replacement);
        }
    }
    log::debug!(
        "replace_color_globally: {} -> {}: {rewritten} occurrences",
        from.to_hex(),
        to.to_hex()
    );
    next
}

/// Rewrite matching channel arrays in place, returning how many changed.
fn recolor(prop: &mut ColorProperty, from: &RgbaColor, replacement: &[f64]) -> usize {
    match &mut prop.value {
        ColorValue::Static(channels) => {
            if channels_match(channels, from) {
                *channels = replacement.to_vec();
                1
            } else {
                0
            }
        }
        ColorValue::Animated(keyframes) => {
            let mut count = 0;
            for keyframe in keyframes.iter_mut() {
                for slot in [&mut keyframe.start, &mut keyframe.end, &mut keyframe.value] {
                    if let Some(channels) = slot
                        && channels_match(channels, from)
                    {
                        *channels = replacement.to_vec();
                        count += 1;
                    }
                }
            }
            count
        }
        ColorValue::Raw(_) => 0,
    }
}

/// Set the hidden flag of the layer at `path` (top-level or nested).
#[must_use]
pub fn set_layer_hidden(doc: &Document, path: &NodePath, hidden: bool) -> Document {
    let mut next = doc.clone();
    match resolve_mut(&mut next, path).and_then(NodeMut::into_layer) {
        Some(layer) => layer.hidden = Some(hidden),
        None => log::debug!("set_layer_hidden: no layer at {path}"),
    }
    next
}

/// Flip the hidden flag of the layer at `path`. An absent flag reads as visible.
#[must_use]
pub fn toggle_layer_hidden(doc: &Document, path: &NodePath) -> Document {
    set_layer_hidden(doc, path, !layer_hidden(doc, path))
}

/// Remove one top-level layer by index, keeping the order of the rest.
pub fn delete_layer(doc: &Document, index: usize) -> Result<Document, EditError> {
    if index >= doc.layers.len() {
        return Err(EditError::LayerOutOfRange {
            index,
            len: doc.layers.len(),
        });
    }
    let mut next = doc.clone();
    next.layers.remove(index);
    Ok(next)
}

/// Remove the layer at `path`, which must be `layers.<i>`.
pub fn delete_layer_at(doc: &Document, path: &NodePath) -> Result<Document, EditError> {
    let index = path.top_level_layer_index().ok_or_else(|| EditError::NotTopLevel {
        path: path.to_string(),
    })?;
    delete_layer(doc, index)
}

/// Replace the canvas size. No range validation happens here.
#[must_use]
pub fn set_dimensions(doc: &Document, width: u32, height: u32) -> Document {
    Document {
        width,
        height,
        ..doc.clone()
    }
}

/// Replace the frame rate. Any finite value is accepted; NaN and the
/// infinities are rejected because they cannot be written back as JSON.
pub fn set_framerate(doc: &Document, framerate: f64) -> Result<Document, EditError> {
    if !framerate.is_finite() {
        return Err(EditError::NonFinite { field: "framerate" });
    }
    Ok(Document {
        framerate,
        ..doc.clone()
    })
}

// ─── Edit ────────────────────────────────────────────────────────────────

/// A single localized edit, as issued by a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    SetShapeColor { path: NodePath, color: RgbaColor },
    ReplaceColor { from: RgbaColor, to: RgbaColor },
    SetLayerHidden { path: NodePath, hidden: bool },
    ToggleLayerHidden { path: NodePath },
    DeleteLayer { path: NodePath },
    SetDimensions { width: u32, height: u32 },
    SetFramerate { framerate: f64 },
}

impl Edit {
    /// Apply to `doc`, producing the edited copy.
    pub fn apply(&self, doc: &Document) -> Result<Document, EditError> {
        if let Edit::SetShapeColor { color, .. } | Edit::ReplaceColor { to: color, .. } = self
            && !color.a.is_finite()
        {
            return Err(EditError::NonFinite { field: "alpha" });
        }
        Ok(match self {
            Edit::SetShapeColor { path, color } => set_shape_color(doc, path, *color),
            Edit::ReplaceColor { from, to } => replace_color_globally(doc, *from, *to),
            Edit::SetLayerHidden { path, hidden } => set_layer_hidden(doc, path, *hidden),
            Edit::ToggleLayerHidden { path } => toggle_layer_hidden(doc, path),
            Edit::DeleteLayer { path } => delete_layer_at(doc, path)?,
            Edit::SetDimensions { width, height } => set_dimensions(doc, *width, *height),
            Edit::SetFramerate { framerate } => set_framerate(doc, *framerate)?,
        })
    }

    /// Short label for undo history.
    pub fn description(&self) -> String {
        match self {
            Edit::SetShapeColor { path, color } => format!("Set {path} color to {}", color.to_hex()),
            Edit::ReplaceColor { from, to } => {
                format!("Replace {} with {}", from.to_hex(), to.to_hex())
            }
            Edit::SetLayerHidden { path, hidden: true } => format!("Hide {path}"),
            Edit::SetLayerHidden { path, hidden: false } => format!("Show {path}"),
            Edit::ToggleLayerHidden { path } => format!("Toggle {path} visibility"),
            Edit::DeleteLayer { path } => format!("Delete {path}"),
            Edit::SetDimensions { width, height } => format!("Resize to {width}x{height}"),
            Edit::SetFramerate { framerate } => format!("Set framerate to {framerate}"),
        }
    }
}
