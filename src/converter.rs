//! End-to-end conversion: SVG document plus [`ConversionConfig`] in,
//! G-code lines out.

use crate::compiler::{CommandTemplates, Compiler, Gcode, Interface, MotionSettings};
use crate::config::{ConversionConfig, MachineOrigin};
use crate::error::{ConversionResult, DocumentError, DocumentResult, InterfaceResult};
use crate::geometry::{Transformation, precision_for};
use crate::svg::{Document, Element, WalkOptions, parse_length, parse_root};
use std::path::{Path, PathBuf};
use tracing::info;

/// Bed dimensions, either configured or taken from the document.
pub fn bed_size(root: &Element, config: &ConversionConfig) -> DocumentResult<(f64, f64)> {
    if !config.use_document_size {
        return Ok((config.bed_width, config.bed_height));
    }

    let width = root.attribute("width").and_then(parse_length);
    let height = root.attribute("height").and_then(parse_length);
    match (width, height) {
        (Some(width), Some(height)) => Ok((width, height)),
        _ => Err(DocumentError::MissingDimensions),
    }
}

/// Offsets, scale and machine origin as a single transformation.
pub fn build_transformation(
    config: &ConversionConfig,
    bed_width: f64,
    bed_height: f64,
) -> Transformation {
    let transformation = Transformation::identity()
        .translate(config.horizontal_offset, config.vertical_offset)
        .scale(config.scaling_factor);

    match config.machine_origin {
        MachineOrigin::BottomLeft => transformation,
        MachineOrigin::Center => transformation.translate(-bed_width / 2.0, bed_height / 2.0),
        MachineOrigin::TopLeft => transformation.translate(0.0, bed_height),
    }
}

/// The stock dialect, with the configured laser commands.
pub fn interface_for(config: &ConversionConfig) -> Gcode {
    Gcode::with_templates(
        precision_for(config.approximation_tolerance),
        CommandTemplates {
            laser_off: config.tool_off_command.clone(),
            laser_power: config.tool_power_command.clone(),
        },
    )
}

/// Program header and footer lines.
pub fn build_header_footer(config: &ConversionConfig) -> InterfaceResult<(Vec<String>, Vec<String>)> {
    let mut interface = interface_for(config);
    let mut header = config.header.clone();
    let mut footer = Vec::new();

    header.push(interface.set_absolute_coordinates());
    header.push(interface.set_unit(config.unit));
    if config.zero_machine {
        header.push(interface.set_origin_at_position());
    }
    if config.do_laser_off_start {
        header.push(interface.laser_off());
    }
    header.push(interface.set_movement_speed(config.travel_speed));
    if config.do_z_axis_start {
        header.push(interface.linear_move(None, None, Some(config.z_axis_start))?);
    }
    if config.dwell_time > 0 {
        header.push(interface.dwell(config.dwell_time));
    }

    if config.do_laser_off_end {
        footer.push(interface.laser_off());
    }
    if config.move_to_origin_end {
        footer.push(interface.set_movement_speed(config.travel_speed));
        footer.push(interface.linear_move(Some(0.0), Some(0.0), None)?);
    }
    footer.extend(config.footer.iter().cloned());

    header.retain(|line| !line.is_empty());
    footer.retain(|line| !line.is_empty());
    Ok((header, footer))
}

/// Convert a parsed document into program lines.
///
/// The Y flip uses the bed height from [`bed_size`] as canvas height, not the
/// document's own height, unless `use_document_size` makes them equal.
pub fn convert_document(document: &Document, config: &ConversionConfig) -> ConversionResult<Vec<String>> {
    config.validate()?;

    let (bed_width, bed_height) = bed_size(&document.root, config)?;
    let options = WalkOptions {
        transform_origin: !config.invert_y_axis,
        canvas_height: Some(bed_height),
        draw_hidden: false,
        root_transformation: build_transformation(config, bed_width, bed_height),
        layer_name: config.layer().map(str::to_string),
    };
    let curves = parse_root(&document.root, &options)?;
    info!(
        "Parsed {} curves (bed {}x{} {})",
        curves.len(),
        bed_width,
        bed_height,
        config.unit
    );

    let (header, footer) = build_header_footer(config)?;
    let settings = MotionSettings {
        travel_speed: config.travel_speed,
        cutting_speed: config.cutting_speed,
        pass_depth: config.pass_depth,
        tolerance: config.approximation_tolerance,
    };
    let mut compiler = Compiler::new(interface_for(config), settings, header, footer);
    compiler.append_curves(&curves)?;
    Ok(compiler.compile(config.passes)?)
}

pub fn convert_svg_str(svg: &str, config: &ConversionConfig) -> ConversionResult<Vec<String>> {
    let document = Document::parse(svg)?;
    convert_document(&document, config)
}

/// Convert `input` and write the program to `output`. Nothing is written
/// unless the whole conversion succeeds.
pub fn convert_svg_file(input: &Path, output: &Path, config: &ConversionConfig) -> ConversionResult<()> {
    let svg = std::fs::read_to_string(input)?;
    let lines = convert_svg_str(&svg, config)?;

    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(output, content)?;

    info!(
        "Wrote {} lines to {}",
        lines.len(),
        output.display()
    );
    Ok(())
}

/// `drawing.svg` becomes `drawing.gcode`, or `drawing_<layer>.gcode` when a
/// single layer is converted.
pub fn default_output_path(input: &Path, layer: Option<&str>) -> PathBuf {
    match layer {
        Some(layer) => {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            input.with_file_name(format!("{}_{}.gcode", stem, layer))
        }
        None => input.with_extension("gcode"),
    }
}
