//! Conversion settings.
//!
//! A [`ConversionConfig`] is built once per conversion, either from defaults,
//! from a TOML file or from command line flags, and is read-only afterwards.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Length unit of the generated program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "in")]
    Inches,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millimeters => write!(f, "mm"),
            Self::Inches => write!(f, "in"),
        }
    }
}

impl FromStr for Unit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" => Ok(Self::Millimeters),
            "in" => Ok(Self::Inches),
            _ => Err(ConfigError::UnknownUnit(s.to_string())),
        }
    }
}

/// Where the machine's origin sits relative to the bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MachineOrigin {
    #[default]
    BottomLeft,
    Center,
    TopLeft,
}

impl fmt::Display for MachineOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BottomLeft => write!(f, "bottom-left"),
            Self::Center => write!(f, "center"),
            Self::TopLeft => write!(f, "top-left"),
        }
    }
}

impl FromStr for MachineOrigin {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bottom-left" => Ok(Self::BottomLeft),
            "center" => Ok(Self::Center),
            "top-left" => Ok(Self::TopLeft),
            _ => Err(ConfigError::UnknownOrigin(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub unit: Unit,
    /// Travel speed in unit/min
    pub travel_speed: f64,
    /// Cutting speed in unit/min
    pub cutting_speed: f64,
    pub passes: u32,
    /// Z descent between passes
    pub pass_depth: f64,
    /// Pause before the job starts, in milliseconds
    pub dwell_time: u64,
    /// Maximum deviation from the true curve, also sets output decimals
    pub approximation_tolerance: f64,
    pub tool_power_command: String,
    pub tool_off_command: String,
    pub machine_origin: MachineOrigin,
    /// Emit G92 to zero the machine at the start
    pub zero_machine: bool,
    /// Keep SVG's downward Y axis instead of flipping it
    pub invert_y_axis: bool,
    /// Take the bed size from the document's width/height
    pub use_document_size: bool,
    pub bed_width: f64,
    pub bed_height: f64,
    pub horizontal_offset: f64,
    pub vertical_offset: f64,
    pub scaling_factor: f64,
    pub do_z_axis_start: bool,
    pub z_axis_start: f64,
    pub move_to_origin_end: bool,
    pub do_laser_off_start: bool,
    pub do_laser_off_end: bool,
    /// Only convert the layer with this label
    pub layer_name: Option<String>,
    /// Extra lines at the start of the program
    pub header: Vec<String>,
    /// Extra lines at the end of the program
    pub footer: Vec<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            unit: Unit::Millimeters,
            travel_speed: 3000.0,
            cutting_speed: 750.0,
            passes: 1,
            pass_depth: 1.0,
            dwell_time: 0,
            approximation_tolerance: 0.01,
            tool_power_command: "M3 S255;".to_string(),
            tool_off_command: "M5;".to_string(),
            machine_origin: MachineOrigin::BottomLeft,
            zero_machine: false,
            invert_y_axis: false,
            use_document_size: false,
            bed_width: 200.0,
            bed_height: 200.0,
            horizontal_offset: 0.0,
            vertical_offset: 0.0,
            scaling_factor: 1.0,
            do_z_axis_start: false,
            z_axis_start: 0.0,
            move_to_origin_end: false,
            do_laser_off_start: true,
            do_laser_off_end: true,
            layer_name: None,
            header: Vec::new(),
            footer: Vec::new(),
        }
    }
}

impl ConversionConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The layer filter, or `None` when it is unset or blank.
    pub fn layer(&self) -> Option<&str> {
        self.layer_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |name: &str, reason: &str| {
            Err(ConfigError::InvalidValue {
                name: name.to_string(),
                reason: reason.to_string(),
            })
        };

        if self.passes < 1 {
            return invalid("passes", "must be at least 1");
        }
        if !(self.approximation_tolerance.is_finite() && self.approximation_tolerance > 0.0) {
            return invalid("approximation_tolerance", "must be greater than 0");
        }
        for (name, speed) in [
            ("travel_speed", self.travel_speed),
            ("cutting_speed", self.cutting_speed),
        ] {
            if !(speed.is_finite() && speed > 0.0) {
                return invalid(name, "must be a positive number");
            }
        }
        for (name, value) in [
            ("pass_depth", self.pass_depth),
            ("bed_width", self.bed_width),
            ("bed_height", self.bed_height),
            ("horizontal_offset", self.horizontal_offset),
            ("vertical_offset", self.vertical_offset),
            ("scaling_factor", self.scaling_factor),
            ("z_axis_start", self.z_axis_start),
        ] {
            if !value.is_finite() {
                return invalid(name, "must be a finite number");
            }
        }

        Ok(())
    }
}
