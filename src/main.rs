use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use svg2laser::converter::default_output_path;
use svg2laser::{ConversionConfig, MachineOrigin, Unit, convert_svg_file};
use tracing::info;

/// Convert an SVG drawing to laser cutter G-code.
///
/// Flags override values loaded with --config; anything not given keeps its
/// default.
#[derive(Parser, Debug)]
#[command(name = "svg2laser", version, about)]
struct Cli {
    /// Input SVG file
    svg_file: PathBuf,

    /// Output G-code file [default: input with .gcode extension]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Base configuration (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Process only the layer with this Inkscape label
    #[arg(short, long)]
    layer: Option<String>,

    /// Unit of measurement: mm or in [default: mm]
    #[arg(short, long)]
    unit: Option<Unit>,

    /// Travel speed, unit/min [default: 3000]
    #[arg(short, long)]
    travel_speed: Option<f64>,

    /// Cutting speed, unit/min [default: 750]
    #[arg(short, long)]
    cutting_speed: Option<f64>,

    /// Number of passes [default: 1]
    #[arg(short, long)]
    passes: Option<u32>,

    /// Z descent between passes, unit [default: 1]
    #[arg(long)]
    pass_depth: Option<f64>,

    /// Pause before the job, ms [default: 0]
    #[arg(long)]
    dwell_time: Option<u64>,

    /// Maximum curve approximation error [default: 0.01]
    #[arg(long)]
    approximation_tolerance: Option<f64>,

    /// Laser power command [default: "M3 S255;"]
    #[arg(long, allow_hyphen_values = true)]
    tool_power_command: Option<String>,

    /// Laser off command [default: "M5;"]
    #[arg(long, allow_hyphen_values = true)]
    tool_off_command: Option<String>,

    /// Machine origin: bottom-left, center or top-left [default: bottom-left]
    #[arg(long)]
    machine_origin: Option<MachineOrigin>,

    /// Zero machine coordinates at start (G92)
    #[arg(long)]
    zero_machine: bool,

    /// Keep SVG's downward Y axis
    #[arg(long)]
    invert_y_axis: bool,

    /// Use the document width/height as bed size
    #[arg(long)]
    use_document_size: bool,

    /// Bed width, unit [default: 200]
    #[arg(long)]
    bed_width: Option<f64>,

    /// Bed height, unit [default: 200]
    #[arg(long)]
    bed_height: Option<f64>,

    /// X offset, unit [default: 0]
    #[arg(long, allow_negative_numbers = true)]
    horizontal_offset: Option<f64>,

    /// Y offset, unit [default: 0]
    #[arg(long, allow_negative_numbers = true)]
    vertical_offset: Option<f64>,

    /// Scaling factor [default: 1]
    #[arg(long)]
    scaling_factor: Option<f64>,

    /// Move Z to this absolute position before the job
    #[arg(long, allow_negative_numbers = true)]
    z_axis_start: Option<f64>,

    /// Return to the origin when done
    #[arg(long)]
    move_to_origin_end: bool,

    /// Don't turn the laser off before the job
    #[arg(long)]
    no_laser_off_start: bool,

    /// Don't turn the laser off after the job
    #[arg(long)]
    no_laser_off_end: bool,

    /// File with extra G-code lines for the start of the program
    #[arg(long, value_name = "FILE")]
    header_file: Option<PathBuf>,

    /// File with extra G-code lines for the end of the program
    #[arg(long, value_name = "FILE")]
    footer_file: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self, mut config: ConversionConfig) -> Result<ConversionConfig> {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        set(&mut config.layer_name, self.layer.map(Some));
        set(&mut config.unit, self.unit);
        set(&mut config.travel_speed, self.travel_speed);
        set(&mut config.cutting_speed, self.cutting_speed);
        set(&mut config.passes, self.passes);
        set(&mut config.pass_depth, self.pass_depth);
        set(&mut config.dwell_time, self.dwell_time);
        set(&mut config.approximation_tolerance, self.approximation_tolerance);
        set(&mut config.tool_power_command, self.tool_power_command);
        set(&mut config.tool_off_command, self.tool_off_command);
        set(&mut config.machine_origin, self.machine_origin);
        set(&mut config.bed_width, self.bed_width);
        set(&mut config.bed_height, self.bed_height);
        set(&mut config.horizontal_offset, self.horizontal_offset);
        set(&mut config.vertical_offset, self.vertical_offset);
        set(&mut config.scaling_factor, self.scaling_factor);

        if let Some(z) = self.z_axis_start {
            config.do_z_axis_start = true;
            config.z_axis_start = z;
        }
        config.zero_machine |= self.zero_machine;
        config.invert_y_axis |= self.invert_y_axis;
        config.use_document_size |= self.use_document_size;
        config.move_to_origin_end |= self.move_to_origin_end;
        if self.no_laser_off_start {
            config.do_laser_off_start = false;
        }
        if self.no_laser_off_end {
            config.do_laser_off_end = false;
        }

        if let Some(path) = &self.header_file {
            config.header = read_lines(path)?;
        }
        if let Some(path) = &self.footer_file {
            config.footer = read_lines(path)?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    Ok(content.lines().map(str::to_string).collect())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let base = match &cli.config {
        Some(path) => ConversionConfig::load(path)
            .with_context(|| format!("Invalid configuration '{}'", path.display()))?,
        None => ConversionConfig::default(),
    };

    let input = cli.svg_file.clone();
    let output = cli.output.clone();
    let config = cli.into_config(base)?;
    let output = output.unwrap_or_else(|| default_output_path(&input, config.layer()));

    convert_svg_file(&input, &output, &config)
        .with_context(|| format!("Failed to convert '{}'", input.display()))?;

    info!(
        "Successfully converted {} to {}",
        input.display(),
        output.display()
    );
    Ok(())
}
