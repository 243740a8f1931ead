//! # svg2laser
//!
//! A Rust library for turning SVG drawings into laser cutter G-code.
//!
//! ## Features
//!
//! - **SVG parsing**: paths and basic shapes, nested transforms, visibility
//!   rules and Inkscape layer filtering
//! - **G-code generation**: travel/cut moves with feed-rate tracking,
//!   multiple passes, custom laser on/off commands
//!
//! ## Example
//!
//! ```rust,ignore
//! use svg2laser::{ConversionConfig, convert_svg_str};
//!
//! let svg = std::fs::read_to_string("drawing.svg").unwrap();
//! let lines = convert_svg_str(&svg, &ConversionConfig::default()).unwrap();
//! std::fs::write("drawing.gcode", lines.join("\n")).unwrap();
//! ```

pub mod compiler;
pub mod config;
pub mod converter;
pub mod error;
pub mod geometry;
pub mod svg;

// Re-export commonly used items
pub use config::{ConversionConfig, MachineOrigin, Unit};
pub use converter::{
    build_header_footer, build_transformation, convert_document, convert_svg_file,
    convert_svg_str,
};
pub use error::{ConversionError, ConversionResult};
