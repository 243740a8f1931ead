//! Depth-first traversal of an SVG element tree into a flat list of curves.

use super::document::{Document, Element, INKSCAPE_NAMESPACE};
use super::path::Path;
use super::shapes::{parse_length, shape_to_path_data};
use crate::error::{DocumentError, DocumentResult};
use crate::geometry::{Curve, Transformation};
use tracing::{debug, warn};

/// How a document should be turned into curves.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkOptions {
    /// Flip from SVG's top-left origin to a bottom-left Cartesian origin.
    pub transform_origin: bool,
    /// Height used by the flip. Read from the root `height` when `None`.
    pub canvas_height: Option<f64>,
    /// Draw elements even when `visibility` hides them.
    pub draw_hidden: bool,
    /// Applied outside every element transform.
    pub root_transformation: Transformation,
    /// Only draw inside the layer with this label.
    pub layer_name: Option<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            transform_origin: true,
            canvas_height: None,
            draw_hidden: false,
            root_transformation: Transformation::identity(),
            layer_name: None,
        }
    }
}

/// State handed from a parent to each of its children. It is copied, never
/// shared, so siblings cannot observe each other.
#[derive(Debug, Clone, Copy)]
struct TraversalContext<'a> {
    transformation: Transformation,
    visible: bool,
    /// Target layer still being searched for. `None` once it matched, or
    /// when no filtering was requested.
    layer_name: Option<&'a str>,
}

struct Walker {
    flip_height: Option<f64>,
    draw_hidden: bool,
}

/// Parse an SVG string into curves.
pub fn parse_string(svg: &str, options: &WalkOptions) -> DocumentResult<Vec<Curve>> {
    let document = Document::parse(svg)?;
    parse_root(&document.root, options)
}

/// Collect the curves drawn by the children of `root`. The root itself is
/// never drawn.
pub fn parse_root(root: &Element, options: &WalkOptions) -> DocumentResult<Vec<Curve>> {
    let flip_height = if options.transform_origin {
        Some(match options.canvas_height {
            Some(height) => height,
            None => canvas_height(root)?,
        })
    } else {
        None
    };

    let walker = Walker {
        flip_height,
        draw_hidden: options.draw_hidden,
    };
    let context = TraversalContext {
        transformation: options.root_transformation,
        visible: true,
        layer_name: options.layer_name.as_deref(),
    };

    let mut curves = Vec::new();
    walker.walk(root, context, &mut curves)?;
    debug!("Collected {} curves from <{}>", curves.len(), root.name);
    Ok(curves)
}

/// Height of the canvas as declared on the root element.
pub fn canvas_height(root: &Element) -> DocumentResult<f64> {
    let height = root.attribute("height").unwrap_or_default();
    parse_length(height).ok_or_else(|| DocumentError::UnresolvableHeight(height.to_string()))
}

fn is_layer(element: &Element) -> bool {
    element.attribute_ns(INKSCAPE_NAMESPACE, "groupmode") == Some("layer")
}

impl Walker {
    fn walk(
        &self,
        element: &Element,
        context: TraversalContext<'_>,
        curves: &mut Vec<Curve>,
    ) -> DocumentResult<()> {
        // Entering a layer either unlocks everything below it or prunes it.
        let mut layer_name = context.layer_name;
        if let Some(target) = layer_name
            && is_layer(element)
        {
            if element.attribute_ns(INKSCAPE_NAMESPACE, "label") != Some(target) {
                return Ok(());
            }
            debug!("Entering layer '{}'", target);
            layer_name = None;
        }

        for child in &element.children {
            if child.has_style("display", "none") || child.is_svg("defs") {
                continue;
            }

            let transformation = match child.attribute("transform") {
                Some(transform) => context.transformation.add_transform(transform)?,
                None => context.transformation,
            };

            let hidden =
                child.has_style("visibility", "hidden") || child.has_style("visibility", "collapse");
            let visible = (context.visible && !hidden) || child.has_style("visibility", "visible");

            if (self.draw_hidden || visible) && layer_name.is_none() {
                self.draw(child, &transformation, curves)?;
            }

            let child_context = TraversalContext {
                transformation,
                visible,
                layer_name,
            };
            self.walk(child, child_context, curves)?;
        }

        Ok(())
    }

    fn draw(
        &self,
        element: &Element,
        transformation: &Transformation,
        curves: &mut Vec<Curve>,
    ) -> DocumentResult<()> {
        if element.is_svg("path") {
            let d = element
                .attribute("d")
                .ok_or_else(|| DocumentError::MissingAttribute {
                    element: element.name.clone(),
                    attribute: "d".to_string(),
                })?;
            let path = Path::parse(d, transformation, self.flip_height)?;
            curves.extend(path.curves);
        } else if let Some(data) = shape_to_path_data(element) {
            let path = Path::parse(&data, transformation, self.flip_height)?;
            curves.extend(path.curves);
        } else if is_drawable_shape(element) {
            warn!("Skipping <{}> element that cannot be converted", element.name);
        }
        Ok(())
    }
}

fn is_drawable_shape(element: &Element) -> bool {
    ["circle", "ellipse", "rect", "polyline", "polygon", "text", "image", "use"]
        .iter()
        .any(|kind| element.is_svg(kind))
}
