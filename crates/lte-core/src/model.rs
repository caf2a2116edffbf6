//! Typed document model for Lottie animations.
//!
//! The document is a tree: top-level layers, precomposition assets holding
//! nested layers, and shape layers holding shapes (fills, strokes, groups).
//! Only the subset the editor touches is modelled. Every JSON member the
//! model does not interpret is kept verbatim in an ordered `extra` map, and
//! members it does interpret keep their slot there as a placeholder (`null`,
//! or `[]` for lists), so re-serialization writes every field back in its
//! original position. Modelled numbers come back in canonical spelling:
//! `30.0` is written as `30`.
//!
//! Decoding is lenient below the document root: a shape, layer payload, or
//! color property whose known members have unexpected types degrades to an
//! opaque variant instead of failing the load.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::ModelError;

/// Ordered JSON members carried through untouched.
pub type Extra = Map<String, Value>;

/// Layer `ty` of a precomposition layer.
pub const LAYER_TYPE_PRECOMP: u64 = 0;
/// Layer `ty` of a shape layer.
pub const LAYER_TYPE_SHAPE: u64 = 4;

pub const SHAPE_TYPE_FILL: &str = "fl";
pub const SHAPE_TYPE_STROKE: &str = "st";
pub const SHAPE_TYPE_GROUP: &str = "gr";

// ─── Document ────────────────────────────────────────────────────────────

/// The root animation record.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Canvas width in pixels (`w`).
    pub width: u32,
    /// Canvas height in pixels (`h`).
    pub height: u32,
    /// Frames per second (`fr`).
    pub framerate: f64,
    pub layers: Vec<Layer>,
    /// `None` when the source has no `assets` member.
    pub assets: Option<Vec<Asset>>,
    pub extra: Extra,
}

impl Document {
    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Compact JSON text.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Indented JSON text.
    pub fn to_json_pretty(&self) -> String {
        format!("{:#}", self.to_value())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn framerate(&self) -> f64 {
        self.framerate
    }

    pub fn assets(&self) -> &[Asset] {
        self.assets.as_deref().unwrap_or_default()
    }

    /// Resolve a precomposition reference.
    ///
    /// Looks up the *first* asset carrying `ref_id`; if that asset has no
    /// layer sequence the reference resolves to nothing.
    pub fn precomp(&self, ref_id: &str) -> Option<(usize, &[Layer])> {
        let index = self
            .assets()
            .iter()
            .position(|a| a.id.as_deref() == Some(ref_id))?;
        let layers = self.assets()[index].layers.as_deref()?;
        Some((index, layers))
    }

    fn from_value(value: Value) -> Result<Self, String> {
        let mut extra = match value {
            Value::Object(obj) => obj,
            other => return Err(format!("expected an object, found {}", json_kind(&other))),
        };
        let width = claim_with(&mut extra, "w", as_u32).ok_or("missing or invalid `w`")?;
        let height = claim_with(&mut extra, "h", as_u32).ok_or("missing or invalid `h`")?;
        let framerate =
            claim_with(&mut extra, "fr", Value::as_f64).ok_or("missing or invalid `fr`")?;
        let layers = claim_array(&mut extra, "layers")
            .ok_or("missing or invalid `layers`")?
            .into_iter()
            .map(Layer::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        let assets = claim_array(&mut extra, "assets")
            .map(|items| items.into_iter().map(Asset::from_value).collect::<Result<Vec<_>, _>>())
            .transpose()?;
        Ok(Self {
            width,
            height,
            framerate,
            layers,
            assets,
            extra,
        })
    }

    pub fn to_value(&self) -> Value {
        emit(
            &self.extra,
            vec![
                ("w", Some(Value::from(self.width))),
                ("h", Some(Value::from(self.height))),
                ("fr", Some(number(self.framerate))),
                (
                    "layers",
                    Some(Value::Array(self.layers.iter().map(Layer::to_value).collect())),
                ),
                (
                    "assets",
                    self.assets
                        .as_ref()
                        .map(|a| Value::Array(a.iter().map(Asset::to_value).collect())),
                ),
            ],
        )
    }
}

// ─── Layers ──────────────────────────────────────────────────────────────

/// An entry in a composition's ordered drawing list.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Display name (`nm`).
    pub name: Option<String>,
    /// Hidden flag (`hd`).
    pub hidden: Option<bool>,
    pub content: LayerContent,
    pub extra: Extra,
}

/// What a layer draws, selected by its `ty` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerContent {
    /// `ty: 4`. Shapes drawn directly by the layer.
    Shapes(Vec<Shape>),
    /// `ty: 0`. Draws the layers of the asset named by `refId`.
    Precomp { ref_id: Option<String> },
    /// Any other layer type (image, solid, text, ...). Opaque.
    Other,
}

impl Layer {
    pub const UNNAMED: &'static str = "Unnamed Layer";

    /// A shape layer drawing `shapes`.
    pub fn shape_layer(name: &str, shapes: Vec<Shape>) -> Self {
        let mut extra = Extra::new();
        extra.insert("ty".into(), Value::from(LAYER_TYPE_SHAPE));
        Self {
            name: Some(name.to_string()),
            hidden: None,
            content: LayerContent::Shapes(shapes),
            extra,
        }
    }

    /// A precomposition layer drawing the asset `ref_id`.
    pub fn precomp_layer(name: &str, ref_id: &str) -> Self {
        let mut extra = Extra::new();
        extra.insert("ty".into(), Value::from(LAYER_TYPE_PRECOMP));
        Self {
            name: Some(name.to_string()),
            hidden: None,
            content: LayerContent::Precomp {
                ref_id: Some(ref_id.to_string()),
            },
            extra,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(Self::UNNAMED)
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.unwrap_or(false)
    }

    /// The layer's own shapes; empty for anything but a shape layer.
    pub fn shapes(&self) -> &[Shape] {
        match &self.content {
            LayerContent::Shapes(shapes) => shapes,
            _ => &[],
        }
    }

    fn from_value(value: Value) -> Result<Self, String> {
        let mut extra = match value {
            Value::Object(obj) => obj,
            other => return Err(format!("layer must be an object, found {}", json_kind(&other))),
        };
        let name = claim_with(&mut extra, "nm", as_string);
        let hidden = claim_with(&mut extra, "hd", Value::as_bool);
        let content = match extra.get("ty").and_then(Value::as_u64) {
            Some(LAYER_TYPE_SHAPE) => LayerContent::Shapes(
                claim_array(&mut extra, "shapes")
                    .map(|items| items.into_iter().map(Shape::from_value).collect())
                    .unwrap_or_default(),
            ),
            Some(LAYER_TYPE_PRECOMP) => LayerContent::Precomp {
                ref_id: claim_with(&mut extra, "refId", as_string),
            },
            _ => LayerContent::Other,
        };
        Ok(Self {
            name,
            hidden,
            content,
            extra,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut fields = vec![
            ("nm", self.name.clone().map(Value::String)),
            ("hd", self.hidden.map(Value::Bool)),
        ];
        match &self.content {
            LayerContent::Shapes(shapes) => fields.push((
                "shapes",
                present_list(&self.extra, "shapes", shapes, Shape::to_value),
            )),
            LayerContent::Precomp { ref_id } => {
                fields.push(("refId", ref_id.clone().map(Value::String)));
            }
            LayerContent::Other => {}
        }
        emit(&self.extra, fields)
    }
}

// ─── Assets ──────────────────────────────────────────────────────────────

/// An entry of the document's asset list.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: Option<String>,
    /// Present only on precomposition assets.
    pub layers: Option<Vec<Layer>>,
    pub extra: Extra,
}

impl Asset {
    pub fn precomp(id: &str, layers: Vec<Layer>) -> Self {
        Self {
            id: Some(id.to_string()),
            layers: Some(layers),
            extra: Extra::new(),
        }
    }

    fn from_value(value: Value) -> Result<Self, String> {
        let mut extra = match value {
            Value::Object(obj) => obj,
            other => return Err(format!("asset must be an object, found {}", json_kind(&other))),
        };
        let id = claim_with(&mut extra, "id", as_string);
        let layers = claim_array(&mut extra, "layers")
            .map(|items| items.into_iter().map(Layer::from_value).collect::<Result<Vec<_>, _>>())
            .transpose()?;
        Ok(Self { id, layers, extra })
    }

    pub fn to_value(&self) -> Value {
        emit(
            &self.extra,
            vec![
                ("id", self.id.clone().map(Value::String)),
                (
                    "layers",
                    self.layers
                        .as_ref()
                        .map(|l| Value::Array(l.iter().map(Layer::to_value).collect())),
                ),
            ],
        )
    }
}

// ─── Shapes ──────────────────────────────────────────────────────────────

/// A node in a shape layer's or group's ordered sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// `ty: "fl"`.
    Fill(PaintShape),
    /// `ty: "st"`.
    Stroke(PaintShape),
    /// `ty: "gr"`.
    Group(GroupShape),
    /// Any other shape kind, kept as raw JSON.
    Other(Value),
    /// A `null` slot in the sequence.
    Empty,
}

/// A fill or stroke: carries one color property (`c`).
#[derive(Debug, Clone, PartialEq)]
pub struct PaintShape {
    pub name: Option<String>,
    /// `None` when `c` is absent or not an object.
    pub color: Option<ColorProperty>,
    pub extra: Extra,
}

/// A shape group: carries nested shapes (`it`).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupShape {
    pub name: Option<String>,
    pub items: Vec<Shape>,
    pub extra: Extra,
}

impl Shape {
    pub const UNNAMED: &'static str = "Unnamed Shape";

    pub fn fill(name: &str, channels: &[f64]) -> Self {
        Shape::Fill(PaintShape::new(SHAPE_TYPE_FILL, name, channels))
    }

    pub fn stroke(name: &str, channels: &[f64]) -> Self {
        Shape::Stroke(PaintShape::new(SHAPE_TYPE_STROKE, name, channels))
    }

    pub fn group(name: &str, items: Vec<Shape>) -> Self {
        let mut extra = Extra::new();
        extra.insert("ty".into(), Value::from(SHAPE_TYPE_GROUP));
        Shape::Group(GroupShape {
            name: Some(name.to_string()),
            items,
            extra,
        })
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Shape::Fill(p) | Shape::Stroke(p) => p.name.as_deref(),
            Shape::Group(g) => g.name.as_deref(),
            Shape::Other(raw) => raw.get("nm").and_then(Value::as_str),
            Shape::Empty => None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(Self::UNNAMED)
    }

    /// The fill/stroke payload, if this is one.
    pub fn paint(&self) -> Option<&PaintShape> {
        match self {
            Shape::Fill(p) | Shape::Stroke(p) => Some(p),
            _ => None,
        }
    }

    pub fn paint_mut(&mut self) -> Option<&mut PaintShape> {
        match self {
            Shape::Fill(p) | Shape::Stroke(p) => Some(p),
            _ => None,
        }
    }

    /// Nested shapes of a group; empty otherwise.
    pub fn items(&self) -> &[Shape] {
        match self {
            Shape::Group(g) => &g.items,
            _ => &[],
        }
    }

    fn from_value(value: Value) -> Self {
        let obj = match value {
            Value::Object(obj) => obj,
            Value::Null => return Shape::Empty,
            other => return Shape::Other(other),
        };
        let ty = obj.get("ty").and_then(Value::as_str).map(str::to_owned);
        match ty.as_deref() {
            Some(SHAPE_TYPE_FILL) => Shape::Fill(PaintShape::from_object(obj)),
            Some(SHAPE_TYPE_STROKE) => Shape::Stroke(PaintShape::from_object(obj)),
            Some(SHAPE_TYPE_GROUP) => Shape::Group(GroupShape::from_object(obj)),
            _ => Shape::Other(Value::Object(obj)),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Shape::Fill(p) | Shape::Stroke(p) => p.to_value(),
            Shape::Group(g) => g.to_value(),
            Shape::Other(raw) => raw.clone(),
            Shape::Empty => Value::Null,
        }
    }
}

impl PaintShape {
    fn new(ty: &str, name: &str, channels: &[f64]) -> Self {
        let mut extra = Extra::new();
        extra.insert("ty".into(), Value::from(ty));
        Self {
            name: Some(name.to_string()),
            color: Some(ColorProperty::fixed(channels.to_vec())),
            extra,
        }
    }

    fn from_object(mut extra: Extra) -> Self {
        let name = claim_with(&mut extra, "nm", as_string);
        let color = match extra.get_mut("c") {
            Some(slot) if slot.is_object() => Some(ColorProperty::from_value(slot.take())),
            _ => None,
        };
        Self { name, color, extra }
    }

    fn to_value(&self) -> Value {
        emit(
            &self.extra,
            vec![
                ("nm", self.name.clone().map(Value::String)),
                ("c", self.color.as_ref().map(ColorProperty::to_value)),
            ],
        )
    }
}

impl GroupShape {
    fn from_object(mut extra: Extra) -> Self {
        let name = claim_with(&mut extra, "nm", as_string);
        let items = claim_array(&mut extra, "it")
            .map(|items| items.into_iter().map(Shape::from_value).collect())
            .unwrap_or_default();
        Self { name, items, extra }
    }

    fn to_value(&self) -> Value {
        emit(
            &self.extra,
            vec![
                ("nm", self.name.clone().map(Value::String)),
                ("it", present_list(&self.extra, "it", &self.items, Shape::to_value)),
            ],
        )
    }
}

// ─── Color properties ────────────────────────────────────────────────────

/// A fill/stroke color: static or keyframed (`{"a": .., "k": ..}`).
#[derive(Debug, Clone, PartialEq)]
pub struct ColorProperty {
    /// The `k` member.
    pub value: ColorValue,
    pub extra: Extra,
}

/// The shape of a color property's `k` member.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorValue {
    /// Normalized channels, alpha optional.
    Static(Vec<f64>),
    Animated(Vec<Keyframe>),
    /// Anything else, including an absent `k` (`Raw(Null)`).
    Raw(Value),
}

/// One sample of an animated color.
///
/// `start` (`s`), `end` (`e`) and the non-standard per-keyframe `k` are each
/// a normalized channel array when present.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub start: Option<Vec<f64>>,
    pub end: Option<Vec<f64>>,
    pub value: Option<Vec<f64>>,
    pub extra: Extra,
}

impl ColorProperty {
    /// A non-animated color.
    pub fn fixed(channels: Vec<f64>) -> Self {
        let mut extra = Extra::new();
        extra.insert("a".into(), Value::from(0));
        Self {
            value: ColorValue::Static(channels),
            extra,
        }
    }

    pub fn animated(keyframes: Vec<Keyframe>) -> Self {
        let mut extra = Extra::new();
        extra.insert("a".into(), Value::from(1));
        Self {
            value: ColorValue::Animated(keyframes),
            extra,
        }
    }

    fn from_value(value: Value) -> Self {
        let mut extra = match value {
            Value::Object(obj) => obj,
            other => {
                return Self {
                    value: ColorValue::Raw(other),
                    extra: Extra::new(),
                };
            }
        };
        let value = match extra.get_mut("k") {
            Some(slot) => ColorValue::from_value(slot.take()),
            None => ColorValue::Raw(Value::Null),
        };
        Self { value, extra }
    }

    fn to_value(&self) -> Value {
        let k = match &self.value {
            ColorValue::Raw(Value::Null) if !self.extra.contains_key("k") => None,
            other => Some(other.to_value()),
        };
        emit(&self.extra, vec![("k", k)])
    }
}

impl ColorValue {
    fn from_value(value: Value) -> Self {
        let items = match value {
            Value::Array(items) => items,
            other => return ColorValue::Raw(other),
        };
        if let Some(channels) = numeric_array(&items).filter(|c| !c.is_empty()) {
            return ColorValue::Static(channels);
        }
        if !items.is_empty() && items.iter().all(Value::is_object) {
            return ColorValue::Animated(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(obj) => Some(Keyframe::from_object(obj)),
                        _ => None,
                    })
                    .collect(),
            );
        }
        ColorValue::Raw(Value::Array(items))
    }

    fn to_value(&self) -> Value {
        match self {
            ColorValue::Static(channels) => channels_value(channels),
            ColorValue::Animated(keyframes) => {
                Value::Array(keyframes.iter().map(Keyframe::to_value).collect())
            }
            ColorValue::Raw(raw) => raw.clone(),
        }
    }
}

impl Keyframe {
    /// A keyframe at time `t` holding only a start value.
    pub fn at(t: f64, start: Vec<f64>) -> Self {
        let mut extra = Extra::new();
        extra.insert("t".into(), number(t));
        Self {
            start: Some(start),
            end: None,
            value: None,
            extra,
        }
    }

    fn from_object(mut extra: Extra) -> Self {
        Self {
            start: claim_channels(&mut extra, "s"),
            end: claim_channels(&mut extra, "e"),
            value: claim_channels(&mut extra, "k"),
            extra,
        }
    }

    fn to_value(&self) -> Value {
        emit(
            &self.extra,
            vec![
                ("s", self.start.as_deref().map(channels_value)),
                ("e", self.end.as_deref().map(channels_value)),
                ("k", self.value.as_deref().map(channels_value)),
            ],
        )
    }
}

// ─── serde glue ──────────────────────────────────────────────────────────

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Document::from_value(value).map_err(D::Error::custom)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Shape::from_value(Value::deserialize(deserializer)?))
    }
}

impl Serialize for Shape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

// ─── Member helpers ──────────────────────────────────────────────────────

/// Take `key` out of `obj` when `parse` accepts it, leaving a `null`
/// placeholder in its slot. Rejected values stay in place untouched.
fn claim_with<T>(obj: &mut Extra, key: &str, parse: impl FnOnce(&Value) -> Option<T>) -> Option<T> {
    let slot = obj.get_mut(key)?;
    let parsed = parse(slot)?;
    *slot = Value::Null;
    Some(parsed)
}

/// Take an array member by value, leaving an empty array as its
/// placeholder. A raw `null` is never a claimed list slot.
fn claim_array(obj: &mut Extra, key: &str) -> Option<Vec<Value>> {
    match obj.get_mut(key)? {
        Value::Array(items) => Some(std::mem::take(items)),
        _ => None,
    }
}

fn claim_channels(obj: &mut Extra, key: &str) -> Option<Vec<f64>> {
    claim_with(obj, key, |v| v.as_array().and_then(|a| numeric_array(a)))
}

fn numeric_array(items: &[Value]) -> Option<Vec<f64>> {
    items.iter().map(Value::as_f64).collect()
}

fn as_string(v: &Value) -> Option<String> {
    v.as_str().map(str::to_string)
}

fn as_u32(v: &Value) -> Option<u32> {
    if let Some(n) = v.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = v.as_f64()?;
    (f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX)).then_some(f as u32)
}

/// A list member is written back over its placeholder, or appended when it
/// gained items. A rejected raw member with no typed items is left alone.
fn present_list<T>(extra: &Extra, key: &str, items: &[T], f: fn(&T) -> Value) -> Option<Value> {
    let write = match extra.get(key) {
        Some(Value::Array(_)) => true,
        _ => !items.is_empty(),
    };
    write.then(|| Value::Array(items.iter().map(f).collect()))
}

/// Rebuild a JSON object from its carried members and the typed fields.
///
/// Typed fields overwrite their placeholder slot; typed fields with no slot
/// are appended in the order given. A `None` typed field leaves its slot's
/// raw value as-is.
fn emit(extra: &Extra, mut fields: Vec<(&str, Option<Value>)>) -> Value {
    let mut out = Map::with_capacity(extra.len() + fields.len());
    for (key, raw) in extra {
        let typed = fields
            .iter_mut()
            .find(|(name, _)| *name == key.as_str())
            .and_then(|(_, v)| v.take());
        out.insert(key.clone(), typed.unwrap_or_else(|| raw.clone()));
    }
    for (key, value) in fields {
        if let Some(value) = value
            && !out.contains_key(key)
        {
            out.insert(key.to_string(), value);
        }
    }
    Value::Object(out)
}

/// Integral values are written as JSON integers so untouched colors keep
/// their source spelling (`1`, not `1.0`).
fn number(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < 9.0e15 {
        Value::from(v as i64)
    } else {
        Number::from_f64(v).map_or(Value::Null, Value::Number)
    }
}

fn channels_value(channels: &[f64]) -> Value {
    Value::Array(channels.iter().copied().map(number).collect())
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
