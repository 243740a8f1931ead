//! Basic shapes (circle, ellipse, rect, line, polyline, polygon) rewritten
//! as path data so they go through the same parser as `<path>`.

use super::document::Element;

/// Format a number for path data, treating -0 as 0
fn f(n: f64) -> String {
    let n = if n == 0.0 { 0.0 } else { n };
    format!("{}", n)
}

/// Parse a length such as `12`, `12.5px` or `3mm`. The unit is dropped, not
/// converted.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = ["px", "pt", "mm", "cm", "in", "pc"]
        .iter()
        .find_map(|unit| value.strip_suffix(unit))
        .unwrap_or(value);
    number.trim().parse().ok().filter(|n: &f64| n.is_finite())
}

fn length(element: &Element, name: &str, default: f64) -> f64 {
    element
        .attribute(name)
        .and_then(parse_length)
        .unwrap_or(default)
}

/// Path data equivalent to `element`, or `None` when it is not a basic shape
/// or has degenerate dimensions.
pub fn shape_to_path_data(element: &Element) -> Option<String> {
    let kind = ["circle", "ellipse", "rect", "line", "polyline", "polygon"]
        .into_iter()
        .find(|kind| element.is_svg(kind))?;

    match kind {
        "circle" => {
            let r = length(element, "r", 0.0);
            ellipse(
                length(element, "cx", 0.0),
                length(element, "cy", 0.0),
                r,
                r,
            )
        }
        "ellipse" => ellipse(
            length(element, "cx", 0.0),
            length(element, "cy", 0.0),
            length(element, "rx", 0.0),
            length(element, "ry", 0.0),
        ),
        "rect" => rect(element),
        "line" => Some(format!(
            "M {},{} L {},{}",
            f(length(element, "x1", 0.0)),
            f(length(element, "y1", 0.0)),
            f(length(element, "x2", 0.0)),
            f(length(element, "y2", 0.0))
        )),
        "polyline" => poly(element, false),
        "polygon" => poly(element, true),
        _ => None,
    }
}

/// Two half-turn arcs from the leftmost point round to the rightmost and back.
fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Option<String> {
    if rx <= 0.0 || ry <= 0.0 {
        return None;
    }
    Some(format!(
        "M {},{} A {},{} 0 1,1 {},{} A {},{} 0 1,1 {},{} Z",
        f(cx - rx),
        f(cy),
        f(rx),
        f(ry),
        f(cx + rx),
        f(cy),
        f(rx),
        f(ry),
        f(cx - rx),
        f(cy)
    ))
}

fn rect(element: &Element) -> Option<String> {
    let x = length(element, "x", 0.0);
    let y = length(element, "y", 0.0);
    let width = length(element, "width", 0.0);
    let height = length(element, "height", 0.0);
    if width <= 0.0 || height <= 0.0 {
        return None;
    }

    let positive = |name: &str| Some(length(element, name, 0.0)).filter(|v| *v > 0.0);
    let (rx, ry) = match (positive("rx"), positive("ry")) {
        (None, None) => {
            return Some(format!(
                "M {},{} L {},{} L {},{} L {},{} Z",
                f(x),
                f(y),
                f(x + width),
                f(y),
                f(x + width),
                f(y + height),
                f(x),
                f(y + height)
            ));
        }
        (Some(rx), None) => (rx, rx),
        (None, Some(ry)) => (ry, ry),
        (Some(rx), Some(ry)) => (rx, ry),
    };
    let rx = rx.min(width / 2.0);
    let ry = ry.min(height / 2.0);
    let corner = format!("A {},{} 0 0,1", f(rx), f(ry));

    Some(format!(
        "M {},{} L {},{} {corner} {},{} L {},{} {corner} {},{} L {},{} {corner} {},{} L {},{} {corner} {},{} Z",
        f(x + rx),
        f(y),
        f(x + width - rx),
        f(y),
        f(x + width),
        f(y + ry),
        f(x + width),
        f(y + height - ry),
        f(x + width - rx),
        f(y + height),
        f(x + rx),
        f(y + height),
        f(x),
        f(y + height - ry),
        f(x),
        f(y + ry),
        f(x + rx),
        f(y),
    ))
}

fn poly(element: &Element, closed: bool) -> Option<String> {
    let coords: Vec<f64> = element
        .attribute("points")?
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect::<Option<_>>()?;

    if coords.len() < 4 || coords.len() % 2 != 0 {
        return None;
    }

    let mut data = format!("M {},{}", f(coords[0]), f(coords[1]));
    for pair in coords[2..].chunks_exact(2) {
        data.push_str(&format!(" L {},{}", f(pair[0]), f(pair[1])));
    }
    if closed {
        data.push_str(" Z");
    }
    Some(data)
}
