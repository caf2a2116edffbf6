//! Color grouping: every fill/stroke color in the document, bucketed by
//! exact displayed value.
//!
//! Groups are a derived view, recomputed on demand. Output order is the
//! order in which each distinct color is first met in the traversal.

use std::collections::HashMap;

use serde::Serialize;

use crate::color::{ColorKey, RgbaColor, display_color};
use crate::model::Document;
use crate::path::NodePath;
use crate::walk::visit_paint_shapes;

/// All shapes sharing one exact displayed color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorGroup {
    pub color: RgbaColor,
    pub count: usize,
    pub shape_paths: Vec<NodePath>,
}

/// Group every decodable fill/stroke color in the document.
///
/// Shapes whose color cannot be decoded are left out. A precomposition
/// referenced by several layers contributes once per reference.
#[must_use]
pub fn group_colors(doc: &Document) -> Vec<ColorGroup> {
    let mut slots: HashMap<ColorKey, usize> = HashMap::new();
    let mut groups: Vec<ColorGroup> = Vec::new();

    visit_paint_shapes(doc, |path, shape| {
        let Some(color) = shape
            .paint()
            .and_then(|paint| paint.color.as_ref())
            .and_then(display_color)
        else {
            return;
        };
        let slot = *slots.entry(color.key()).or_insert_with(|| {
            groups.push(ColorGroup {
                color,
                count: 0,
                shape_paths: Vec::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.count += 1;
        group.shape_paths.push(path.clone());
    });

    log::trace!("group_colors: {} distinct colors", groups.len());
    groups
}
