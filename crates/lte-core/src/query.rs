//! Point queries by path.
//!
//! A directly selected node is described exactly as it would appear inside
//! a full listing. Paths that do not resolve read as defaults.

use crate::model::Document;
use crate::path::{Node, NodePath, resolve};
use crate::walk::{ShapeInfo, describe_shape};

/// Describe the shape at `path`. Unresolvable paths give a default leaf.
pub fn resolve_shape(doc: &Document, path: &NodePath) -> ShapeInfo {
    let shape = resolve(doc, path).and_then(Node::as_shape);
    if shape.is_none() {
        log::debug!("resolve_shape: nothing at {path}");
    }
    describe_shape(shape, path.clone())
}

/// Hidden flag of the layer at `path`; `false` when there is no such layer.
pub fn layer_hidden(doc: &Document, path: &NodePath) -> bool {
    resolve(doc, path)
        .and_then(Node::as_layer)
        .is_some_and(|layer| layer.is_hidden())
}
