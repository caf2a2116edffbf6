//! Structural node paths.
//!
//! A path names one node of a document by the route taken from the root:
//! `layers.<i>` for a top-level layer, `layers.<i>.shapes.<j>` for a shape,
//! `...shapes.<j>.it.<k>` for a shape nested in a group, and
//! `assets.<a>.layers.<i>...` for anything reached through a precomposition.
//!
//! Paths are computed by traversal order and never stored in the document.
//! They are parsed from and printed to the dotted string form, and resolved
//! by walking the typed tree one `(field, index)` pair at a time. A route
//! that does not exist resolves to `None`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use winnow::combinator::{alt, separated};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::error::PathError;
use crate::model::{Asset, Document, Layer, Shape};

/// One step of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Layers,
    Shapes,
    It,
    Assets,
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Layers => f.write_str("layers"),
            Segment::Shapes => f.write_str("shapes"),
            Segment::It => f.write_str("it"),
            Segment::Assets => f.write_str("assets"),
            Segment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// An ordered sequence of segments. Paths are short, so they stay inline.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(SmallVec<[Segment; 8]>);

impl NodePath {
    /// A path consisting of a single field segment, e.g. `layers`.
    pub fn root(field: Segment) -> Self {
        let mut segments = SmallVec::new();
        segments.push(field);
        Self(segments)
    }

    /// `layers.<index>`.
    pub fn layer(index: usize) -> Self {
        Self::root(Segment::Layers).index(index)
    }

    /// This path extended by a field segment.
    pub fn field(&self, field: Segment) -> Self {
        let mut next = self.clone();
        next.0.push(field);
        next
    }

    /// This path extended by an index segment.
    pub fn index(&self, index: usize) -> Self {
        self.field(Segment::Index(index))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// `Some(i)` exactly when the path is `layers.<i>`.
    ///
    /// Only such paths may be deleted: a layer nested in a precomposition
    /// asset is not addressable as a top-level array operation.
    pub fn top_level_layer_index(&self) -> Option<usize> {
        match self.segments() {
            [Segment::Layers, Segment::Index(i)] => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePath({self})")
    }
}

impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed: Result<Vec<Segment>, _> = separated(1.., parse_segment, '.').parse(s);
        let segments = parsed.map_err(|e| PathError {
            input: s.to_string(),
            reason: format!("unexpected input at offset {}", e.offset()),
        })?;
        Ok(Self(segments.into_iter().collect()))
    }
}

impl Serialize for NodePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ─── Grammar ─────────────────────────────────────────────────────────────

fn parse_segment(input: &mut &str) -> ModalResult<Segment> {
    alt((
        "layers".value(Segment::Layers),
        "shapes".value(Segment::Shapes),
        "assets".value(Segment::Assets),
        "it".value(Segment::It),
        parse_index.map(Segment::Index),
    ))
    .parse_next(input)
}

/// Base-10, no leading zeros beyond a lone `0`.
fn parse_index(input: &mut &str) -> ModalResult<usize> {
    let digits: &str = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    digits
        .parse::<usize>()
        .map_err(|_| ErrMode::Backtrack(ContextError::new()))
}

// ─── Resolution ──────────────────────────────────────────────────────────

/// A node reached by a path.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Layer(&'a Layer),
    Asset(&'a Asset),
    Shape(&'a Shape),
}

impl<'a> Node<'a> {
    pub fn as_layer(self) -> Option<&'a Layer> {
        match self {
            Node::Layer(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_shape(self) -> Option<&'a Shape> {
        match self {
            Node::Shape(shape) => Some(shape),
            _ => None,
        }
    }
}

/// A node reached by a path, borrowed for editing.
#[derive(Debug)]
pub enum NodeMut<'a> {
    Layer(&'a mut Layer),
    Asset(&'a mut Asset),
    Shape(&'a mut Shape),
}

impl<'a> NodeMut<'a> {
    pub fn into_layer(self) -> Option<&'a mut Layer> {
        match self {
            NodeMut::Layer(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn into_shape(self) -> Option<&'a mut Shape> {
        match self {
            NodeMut::Shape(shape) => Some(shape),
            _ => None,
        }
    }
}

/// Walk `path` from the document root.
pub fn resolve<'a>(doc: &'a Document, path: &NodePath) -> Option<Node<'a>> {
    let mut steps = path.segments().chunks(2);
    let mut node = match steps.next()? {
        [Segment::Layers, Segment::Index(i)] => Node::Layer(doc.layers.get(*i)?),
        [Segment::Assets, Segment::Index(i)] => Node::Asset(doc.assets().get(*i)?),
        _ => return None,
    };
    for step in steps {
        node = match (node, step) {
            (Node::Asset(asset), [Segment::Layers, Segment::Index(i)]) => {
                Node::Layer(asset.layers.as_deref()?.get(*i)?)
            }
            (Node::Layer(layer), [Segment::Shapes, Segment::Index(i)]) => {
                Node::Shape(layer.shapes().get(*i)?)
            }
            (Node::Shape(Shape::Group(group)), [Segment::It, Segment::Index(i)]) => {
                Node::Shape(group.items.get(*i)?)
            }
            _ => return None,
        };
    }
    Some(node)
}

/// Walk `path` from the document root, borrowing mutably.
pub fn resolve_mut<'a>(doc: &'a mut Document, path: &NodePath) -> Option<NodeMut<'a>> {
    use crate::model::LayerContent;

    let mut steps = path.segments().chunks(2);
    let mut node = match steps.next()? {
        [Segment::Layers, Segment::Index(i)] => NodeMut::Layer(doc.layers.get_mut(*i)?),
        [Segment::Assets, Segment::Index(i)] => NodeMut::Asset(doc.assets.as_mut()?.get_mut(*i)?),
        _ => return None,
    };
    for step in steps {
        node = match (node, step) {
            (NodeMut::Asset(asset), [Segment::Layers, Segment::Index(i)]) => {
                NodeMut::Layer(asset.layers.as_mut()?.get_mut(*i)?)
            }
            (NodeMut::Layer(layer), [Segment::Shapes, Segment::Index(i)]) => match &mut layer.content {
                LayerContent::Shapes(shapes) => NodeMut::Shape(shapes.get_mut(*i)?),
                _ => return None,
            },
            (NodeMut::Shape(Shape::Group(group)), [Segment::It, Segment::Index(i)]) => {
                NodeMut::Shape(group.items.get_mut(*i)?)
            }
            _ => return None,
        };
    }
    Some(node)
}
