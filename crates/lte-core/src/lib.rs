pub mod color;
pub mod edit;
pub mod error;
pub mod model;
pub mod palette;
pub mod path;
pub mod query;
pub mod walk;

pub use color::{DEFAULT_COLOR, RgbaColor, parse_hex_rgb};
pub use edit::{
    Edit, delete_layer, delete_layer_at, replace_color_globally, set_dimensions, set_framerate,
    set_layer_hidden, set_shape_color, toggle_layer_hidden,
};
pub use error::{EditError, ModelError, PathError};
pub use model::*;
pub use palette::{ColorGroup, group_colors};
pub use path::{NodePath, Segment};
pub use query::{layer_hidden, resolve_shape};
pub use walk::{LayerInfo, ShapeInfo, ShapeKind, list_layers};
