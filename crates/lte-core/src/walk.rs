//! Tree walker: layer and shape listings annotated with their paths.
//!
//! Traversal is depth-first in document order. Precomposition layers
//! descend into the referenced asset's layers (addressed as
//! `assets.<a>.layers.<i>`), groups descend into their items (`.it.<k>`).
//! The same descent drives `visit_paint_shapes`, which color grouping and
//! global replacement are built on, so every entry point computes the same
//! path for the same node.

use serde::Serialize;

use crate::color::{DEFAULT_COLOR, RgbaColor, display_color};
use crate::model::{Document, Layer, LayerContent, PaintShape, Shape};
use crate::path::{NodePath, Segment};

/// A listed layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerInfo {
    pub path: NodePath,
    pub name: String,
    pub hidden: bool,
    /// Shapes of a shape layer; empty otherwise.
    pub shapes: Vec<ShapeInfo>,
    /// Layers of the referenced precomposition; empty when the reference
    /// is missing, not a precomposition, or cyclic.
    pub children: Vec<LayerInfo>,
}

/// What kind of shape a `ShapeInfo` describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShapeKind {
    Fill,
    Stroke,
    Group,
    /// A shape type the model does not edit.
    Other,
    /// Nothing at the path (or a `null` slot).
    Missing,
}

/// A listed (or directly selected) shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeInfo {
    pub path: NodePath,
    pub name: String,
    pub kind: ShapeKind,
    /// Decoded display color for fills/strokes, `DEFAULT_COLOR` otherwise.
    pub color: RgbaColor,
    /// Items of a group; empty otherwise.
    pub children: Vec<ShapeInfo>,
}

impl ShapeInfo {
    pub fn is_group(&self) -> bool {
        self.kind == ShapeKind::Group
    }
}

/// List every top-level layer, descending into precompositions.
pub fn list_layers(doc: &Document) -> Vec<LayerInfo> {
    log::trace!("list_layers: {} top-level layers", doc.layers.len());
    let mut stack = Vec::new();
    list_layer_slice(doc, &doc.layers, &NodePath::root(Segment::Layers), &mut stack)
}

fn list_layer_slice(
    doc: &Document,
    layers: &[Layer],
    base: &NodePath,
    stack: &mut Vec<usize>,
) -> Vec<LayerInfo> {
    layers
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let path = base.index(i);
            let mut info = LayerInfo {
                path: path.clone(),
                name: layer.display_name().to_string(),
                hidden: layer.is_hidden(),
                shapes: Vec::new(),
                children: Vec::new(),
            };
            match &layer.content {
                LayerContent::Shapes(shapes) => {
                    info.shapes = list_shapes(shapes, &path.field(Segment::Shapes));
                }
                LayerContent::Precomp { .. } => {
                    if let Some((nested, nested_base)) = enter_precomp(doc, layer, &path, stack) {
                        info.children = list_layer_slice(doc, nested, &nested_base, stack);
                        stack.pop();
                    }
                }
                LayerContent::Other => {}
            }
            info
        })
        .collect()
}

/// List a shape sequence rooted at `base` (e.g. `layers.0.shapes`).
/// `null` slots are skipped; their index is still consumed.
pub fn list_shapes(shapes: &[Shape], base: &NodePath) -> Vec<ShapeInfo> {
    shapes
        .iter()
        .enumerate()
        .filter(|(_, shape)| !matches!(shape, Shape::Empty))
        .map(|(i, shape)| describe_shape(Some(shape), base.index(i)))
        .collect()
}

/// Describe one shape the way a listing does.
///
/// Fills and strokes carry their decoded color (default when undecodable),
/// groups carry their listed items, anything else is a default leaf.
pub fn describe_shape(shape: Option<&Shape>, path: NodePath) -> ShapeInfo {
    let name = shape.map_or(Shape::UNNAMED, Shape::display_name).to_string();
    let mut info = ShapeInfo {
        path,
        name,
        kind: ShapeKind::Missing,
        color: DEFAULT_COLOR,
        children: Vec::new(),
    };
    match shape {
        Some(Shape::Fill(paint)) => {
            info.kind = ShapeKind::Fill;
            info.color = paint_color(paint);
        }
        Some(Shape::Stroke(paint)) => {
            info.kind = ShapeKind::Stroke;
            info.color = paint_color(paint);
        }
        Some(Shape::Group(group)) => {
            info.kind = ShapeKind::Group;
            info.children = list_shapes(&group.items, &info.path.field(Segment::It));
        }
        Some(Shape::Other(_)) => info.kind = ShapeKind::Other,
        Some(Shape::Empty) | None => {}
    }
    info
}

fn paint_color(paint: &PaintShape) -> RgbaColor {
    paint
        .color
        .as_ref()
        .and_then(display_color)
        .unwrap_or(DEFAULT_COLOR)
}

/// Call `f` for every fill and stroke in the document, in listing order.
pub fn visit_paint_shapes<'a>(doc: &'a Document, mut f: impl FnMut(&NodePath, &'a Shape)) {
    let mut stack = Vec::new();
    visit_layer_slice(doc, &doc.layers, &NodePath::root(Segment::Layers), &mut stack, &mut f);
}

fn visit_layer_slice<'a>(
    doc: &'a Document,
    layers: &'a [Layer],
    base: &NodePath,
    stack: &mut Vec<usize>,
    f: &mut dyn FnMut(&NodePath, &'a Shape),
) {
    for (i, layer) in layers.iter().enumerate() {
        let path = base.index(i);
        match &layer.content {
            LayerContent::Shapes(shapes) => visit_shape_slice(shapes, &path.field(Segment::Shapes), f),
            LayerContent::Precomp { .. } => {
                if let Some((nested, nested_base)) = enter_precomp(doc, layer, &path, stack) {
                    visit_layer_slice(doc, nested, &nested_base, stack, f);
                    stack.pop();
                }
            }
            LayerContent::Other => {}
        }
    }
}

fn visit_shape_slice<'a>(shapes: &'a [Shape], base: &NodePath, f: &mut dyn FnMut(&NodePath, &'a Shape)) {
    for (i, shape) in shapes.iter().enumerate() {
        match shape {
            Shape::Fill(_) | Shape::Stroke(_) => f(&base.index(i), shape),
            Shape::Group(group) => visit_shape_slice(&group.items, &base.index(i).field(Segment::It), f),
            Shape::Other(_) | Shape::Empty => {}
        }
    }
}

/// Resolve a precomposition layer's target and push it on the descent stack.
///
/// Returns the asset's layers and the base path they are addressed under.
/// The caller pops the stack after descending. An asset already on the
/// stack is a cycle and is not entered.
fn enter_precomp<'a>(
    doc: &'a Document,
    layer: &Layer,
    path: &NodePath,
    stack: &mut Vec<usize>,
) -> Option<(&'a [Layer], NodePath)> {
    let LayerContent::Precomp { ref_id: Some(ref_id) } = &layer.content else {
        return None;
    };
    let Some((asset, nested)) = doc.precomp(ref_id) else {
        log::debug!("{path}: precomposition `{ref_id}` does not resolve");
        return None;
    };
    if stack.contains(&asset) {
        log::warn!("{path}: precomposition `{ref_id}` references itself; not descending");
        return None;
    }
    stack.push(asset);
    let base = NodePath::root(Segment::Assets).index(asset).field(Segment::Layers);
    Some((nested, base))
}
