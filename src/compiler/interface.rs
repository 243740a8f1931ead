//! Machine command dialects.
//!
//! An [`Interface`] turns abstract motion requests into instruction text.
//! [`Gcode`] is the stock laser G-code dialect; its laser commands can be
//! replaced with literal templates through [`CommandTemplates`].

use crate::config::Unit;
use crate::error::{InterfaceError, InterfaceResult};
use crate::geometry::Point;
use tracing::{trace, warn};

/// One instruction per call. An empty string means "nothing to emit".
pub trait Interface {
    /// Select travel mode at `speed`. Travel moves are rapid and unpowered.
    fn set_movement_speed(&mut self, speed: f64) -> String;

    /// Select cutting mode at `speed`.
    fn set_cutting_speed(&mut self, speed: f64) -> String;

    /// Move in a straight line. Omitted axes keep their value.
    fn linear_move(
        &mut self,
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
    ) -> InterfaceResult<String>;

    fn laser_off(&self) -> String;

    /// Laser power as a fraction in `[0, 1]`.
    fn set_laser_power(&self, power: f64) -> InterfaceResult<String>;

    fn set_absolute_coordinates(&self) -> String;

    fn set_relative_coordinates(&self) -> String;

    fn dwell(&self, milliseconds: u64) -> String;

    /// Declare the current position to be the origin.
    fn set_origin_at_position(&mut self) -> String;

    fn set_unit(&self, unit: Unit) -> String;

    fn home_axes(&self) -> String;

    /// Last known XY position, if any move has fixed it yet.
    fn position(&self) -> Option<Point>;
}

/// Literal replacements for the laser on/off commands.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTemplates {
    pub laser_off: String,
    pub laser_power: String,
}

/// Maximum spindle value the `M3 S` power command scales to.
const MAX_POWER: f64 = 255.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Gcode {
    precision: usize,
    templates: Option<CommandTemplates>,
    position: Option<Point>,
    next_speed: Option<f64>,
    /// Feed rate last written on a `G1`. Rapid moves leave it alone.
    cutting_feed: Option<f64>,
    is_travel_move: bool,
}

impl Gcode {
    /// `precision` is the number of decimals written for coordinates.
    pub fn new(precision: usize) -> Self {
        Self {
            precision,
            templates: None,
            position: None,
            next_speed: None,
            cutting_feed: None,
            is_travel_move: false,
        }
    }

    pub fn with_templates(precision: usize, templates: CommandTemplates) -> Self {
        Self {
            templates: Some(templates),
            ..Self::new(precision)
        }
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    fn axis(&self, command: &mut String, name: char, value: Option<f64>) {
        if let Some(value) = value {
            command.push_str(&format!(" {}{:.*}", name, self.precision, value));
        }
    }
}

impl Interface for Gcode {
    fn set_movement_speed(&mut self, speed: f64) -> String {
        self.next_speed = Some(speed);
        self.is_travel_move = true;
        String::new()
    }

    fn set_cutting_speed(&mut self, speed: f64) -> String {
        self.next_speed = Some(speed);
        self.is_travel_move = false;
        String::new()
    }

    fn linear_move(
        &mut self,
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
    ) -> InterfaceResult<String> {
        let next_speed = self.next_speed.ok_or(InterfaceError::UndefinedSpeed)?;

        if x.is_none() && y.is_none() && z.is_none() {
            warn!("linear_move invoked without arguments");
            return Ok(String::new());
        }

        let mut command = if self.is_travel_move {
            "G0".to_string()
        } else if self.cutting_feed != Some(next_speed) {
            self.cutting_feed = Some(next_speed);
            format!("G1 F{}", next_speed)
        } else {
            "G1".to_string()
        };

        self.axis(&mut command, 'X', x);
        self.axis(&mut command, 'Y', y);
        self.axis(&mut command, 'Z', z);

        match (self.position, x, y) {
            (_, Some(x), Some(y)) => self.position = Some(Point::new(x, y)),
            (Some(p), x, y) => {
                self.position = Some(Point::new(x.unwrap_or(p.x), y.unwrap_or(p.y)));
            }
            (None, _, _) => {}
        }

        trace!("Move to {:?}, {:?}, {:?}", x, y, z);
        command.push(';');
        Ok(command)
    }

    fn laser_off(&self) -> String {
        match &self.templates {
            Some(templates) => templates.laser_off.clone(),
            None => "M5;".to_string(),
        }
    }

    fn set_laser_power(&self, power: f64) -> InterfaceResult<String> {
        if !(0.0..=1.0).contains(&power) {
            return Err(InterfaceError::PowerOutOfRange(power));
        }

        Ok(match &self.templates {
            Some(templates) => templates.laser_power.clone(),
            None => format!("M3 S{};", MAX_POWER * power),
        })
    }

    fn set_absolute_coordinates(&self) -> String {
        "G90;".to_string()
    }

    fn set_relative_coordinates(&self) -> String {
        "G91;".to_string()
    }

    fn dwell(&self, milliseconds: u64) -> String {
        format!("G4 P{};", milliseconds)
    }

    fn set_origin_at_position(&mut self) -> String {
        self.position = Some(Point::ORIGIN);
        "G92 X0 Y0 Z0;".to_string()
    }

    fn set_unit(&self, unit: Unit) -> String {
        match unit {
            Unit::Millimeters => "G21;".to_string(),
            Unit::Inches => "G20;".to_string(),
        }
    }

    fn home_axes(&self) -> String {
        "G28;".to_string()
    }

    fn position(&self) -> Option<Point> {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_requires_speed() {
        let mut gcode = Gcode::new(2);
        assert_eq!(
            gcode.linear_move(Some(1.0), Some(2.0), None),
            Err(InterfaceError::UndefinedSpeed)
        );
    }

    #[test]
    fn test_feed_rate_emitted_once_per_change() {
        let mut gcode = Gcode::new(2);
        gcode.set_cutting_speed(750.0);
        assert_eq!(
            gcode.linear_move(Some(1.0), Some(2.0), None).unwrap(),
            "G1 F750 X1.00 Y2.00;"
        );
        assert_eq!(
            gcode.linear_move(Some(3.0), Some(4.0), None).unwrap(),
            "G1 X3.00 Y4.00;"
        );

        gcode.set_movement_speed(3000.0);
        assert_eq!(
            gcode.linear_move(Some(0.0), Some(0.0), None).unwrap(),
            "G0 X0.00 Y0.00;"
        );

        // G0 does not change the modal feed, so 750 is still in effect.
        gcode.set_cutting_speed(750.0);
        assert_eq!(
            gcode.linear_move(Some(5.0), None, None).unwrap(),
            "G1 X5.00;"
        );

        gcode.set_cutting_speed(500.0);
        assert_eq!(
            gcode.linear_move(Some(6.0), None, None).unwrap(),
            "G1 F500 X6.00;"
        );
    }

    #[test]
    fn test_feed_rate_when_travel_and_cut_speeds_match() {
        let mut gcode = Gcode::new(2);
        gcode.set_movement_speed(1000.0);
        assert_eq!(
            gcode.linear_move(Some(0.0), Some(0.0), None).unwrap(),
            "G0 X0.00 Y0.00;"
        );

        gcode.set_cutting_speed(1000.0);
        assert_eq!(
            gcode.linear_move(Some(1.0), Some(0.0), None).unwrap(),
            "G1 F1000 X1.00 Y0.00;"
        );
        assert_eq!(
            gcode.linear_move(Some(2.0), Some(0.0), None).unwrap(),
            "G1 X2.00 Y0.00;"
        );
    }

    #[test]
    fn test_zero_argument_move_is_noop() {
        let mut gcode = Gcode::new(3);
        gcode.set_cutting_speed(100.0);
        gcode.linear_move(Some(1.0), Some(1.0), None).unwrap();

        assert_eq!(gcode.linear_move(None, None, None).unwrap(), "");
        assert_eq!(gcode.position(), Some(Point::new(1.0, 1.0)));
        // The no-op must not swallow the next feed-rate decision either.
        assert_eq!(
            gcode.linear_move(Some(2.0), Some(2.0), None).unwrap(),
            "G1 X2.000 Y2.000;"
        );
    }

    #[test]
    fn test_position_tracking() {
        let mut gcode = Gcode::new(1);
        gcode.set_movement_speed(10.0);

        gcode.linear_move(Some(4.0), None, None).unwrap();
        assert_eq!(gcode.position(), None);

        gcode.linear_move(Some(4.0), Some(5.0), None).unwrap();
        assert_eq!(gcode.position(), Some(Point::new(4.0, 5.0)));

        gcode.linear_move(None, Some(7.0), Some(-1.0)).unwrap();
        assert_eq!(gcode.position(), Some(Point::new(4.0, 7.0)));

        assert_eq!(gcode.set_origin_at_position(), "G92 X0 Y0 Z0;");
        assert_eq!(gcode.position(), Some(Point::ORIGIN));
    }

    #[test]
    fn test_laser_power() {
        let gcode = Gcode::new(2);
        assert_eq!(gcode.set_laser_power(1.0).unwrap(), "M3 S255;");
        assert_eq!(gcode.set_laser_power(0.0).unwrap(), "M3 S0;");
        assert_eq!(
            gcode.set_laser_power(1.5),
            Err(InterfaceError::PowerOutOfRange(1.5))
        );
        assert!(gcode.set_laser_power(-0.1).is_err());
        assert_eq!(gcode.laser_off(), "M5;");
    }

    #[test]
    fn test_custom_templates() {
        let gcode = Gcode::with_templates(
            2,
            CommandTemplates {
                laser_off: "M107".to_string(),
                laser_power: "M106 S200".to_string(),
            },
        );
        assert_eq!(gcode.laser_off(), "M107");
        assert_eq!(gcode.set_laser_power(0.3).unwrap(), "M106 S200");
        assert!(gcode.set_laser_power(2.0).is_err());
        // Everything else is inherited from the stock dialect.
        assert_eq!(gcode.set_absolute_coordinates(), "G90;");
    }

    #[test]
    fn test_fixed_commands() {
        let gcode = Gcode::new(2);
        assert_eq!(gcode.set_unit(Unit::Millimeters), "G21;");
        assert_eq!(gcode.set_unit(Unit::Inches), "G20;");
        assert_eq!(gcode.set_relative_coordinates(), "G91;");
        assert_eq!(gcode.dwell(250), "G4 P250;");
        assert_eq!(gcode.home_axes(), "G28;");
    }
}
