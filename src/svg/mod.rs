//! SVG input: document tree, path data, basic shapes and the tree walker
//! that turns a document into curves.

pub mod document;
pub mod path;
pub mod shapes;
pub mod walker;

pub use document::{Document, Element};
pub use path::{Path, parse_path_data};
pub use shapes::{parse_length, shape_to_path_data};
pub use walker::{WalkOptions, canvas_height, parse_root, parse_string};
