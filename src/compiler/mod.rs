//! Compile curves into a laser motion program.
//!
//! The body (one travel plus a run of cutting moves per curve) is generated
//! once by [`Compiler::append_curves`] and then repeated for every pass by
//! [`Compiler::compile`], wrapped in the header and footer lines.

pub mod interface;

pub use interface::{CommandTemplates, Gcode, Interface};

use crate::error::InterfaceResult;
use crate::geometry::{Curve, precision_for};
use tracing::{debug, warn};

/// Motion parameters used while compiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSettings {
    pub travel_speed: f64,
    pub cutting_speed: f64,
    /// Z step between passes. Zero or less disables the step.
    pub pass_depth: f64,
    /// Maximum deviation when sampling curves.
    pub tolerance: f64,
}

pub struct Compiler<I: Interface> {
    interface: I,
    settings: MotionSettings,
    header: Vec<String>,
    footer: Vec<String>,
    body: Vec<String>,
}

impl<I: Interface> Compiler<I> {
    pub fn new(
        interface: I,
        settings: MotionSettings,
        header: Vec<String>,
        footer: Vec<String>,
    ) -> Self {
        Self {
            interface,
            settings,
            header,
            footer,
            body: Vec::new(),
        }
    }

    pub fn body(&self) -> &[String] {
        &self.body
    }

    fn push(&mut self, line: String) {
        if !line.is_empty() {
            self.body.push(line);
        }
    }

    /// Append the moves for one curve. A travel is only emitted when the head
    /// is not already at the curve's start.
    pub fn append_curve(&mut self, curve: &Curve) -> InterfaceResult<()> {
        let start = curve.start();
        let tolerance = self.settings.tolerance;
        let connected = self
            .interface
            .position()
            .is_some_and(|p| p.distance(&start) <= tolerance);

        if !connected {
            let line = self.interface.laser_off();
            self.push(line);
            let line = self.interface.set_movement_speed(self.settings.travel_speed);
            self.push(line);
            let line = self.interface.linear_move(Some(start.x), Some(start.y), None)?;
            self.push(line);
            let line = self.interface.set_cutting_speed(self.settings.cutting_speed);
            self.push(line);
            let line = self.interface.set_laser_power(1.0)?;
            self.push(line);
        }

        for point in curve.flatten(tolerance) {
            let line = self.interface.linear_move(Some(point.x), Some(point.y), None)?;
            self.push(line);
        }

        Ok(())
    }

    pub fn append_curves(&mut self, curves: &[Curve]) -> InterfaceResult<()> {
        for curve in curves {
            self.append_curve(curve)?;
        }
        debug!(
            "Appended {} curves, body has {} lines",
            curves.len(),
            self.body.len()
        );
        Ok(())
    }

    /// Relative Z steps taken between passes. Each step is the difference of
    /// two rounded cumulative depths, so the steps sum to the rounded total.
    fn pass_steps(&self, passes: u32) -> Vec<f64> {
        let scale = 10f64.powi(precision_for(self.settings.tolerance) as i32);
        let depth = self.settings.pass_depth;
        let ticks = |pass: u32| (depth * f64::from(pass) * scale).round();

        (1..passes)
            .map(|pass| (ticks(pass) - ticks(pass - 1)) / scale)
            .collect()
    }

    /// The complete program: header, the body `passes` times, footer.
    pub fn compile(&mut self, passes: u32) -> InterfaceResult<Vec<String>> {
        let mut program: Vec<String> = self.header.clone();
        let steps = self.pass_steps(passes);

        if self.body.is_empty() {
            warn!("Compile with an empty body (no curves). Is this intentional?");
        } else {
            for pass in 1..=passes {
                program.extend(self.body.iter().cloned());

                if let Some(step) = steps.get(pass as usize - 1) {
                    program.push(self.interface.laser_off());
                    if self.settings.pass_depth > 0.0 {
                        program.push(self.interface.set_relative_coordinates());
                        program.push(self.interface.linear_move(None, None, Some(-step))?);
                        program.push(self.interface.set_absolute_coordinates());
                    }
                }
            }
        }

        program.extend(self.footer.iter().cloned());
        program.retain(|line| !line.is_empty());
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{EllipticalArc, Point};

    fn settings() -> MotionSettings {
        MotionSettings {
            travel_speed: 3000.0,
            cutting_speed: 750.0,
            pass_depth: 0.0,
            tolerance: 0.01,
        }
    }

    fn square() -> Vec<Curve> {
        let p = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        (0..4).map(|i| Curve::line(p[i], p[(i + 1) % 4])).collect()
    }

    fn compiler(settings: MotionSettings) -> Compiler<Gcode> {
        Compiler::new(
            Gcode::new(2),
            settings,
            vec!["G90;".to_string()],
            vec!["M5;".to_string()],
        )
    }

    #[test]
    fn test_square_program() {
        let mut compiler = compiler(settings());
        compiler.append_curves(&square()).unwrap();
        let program = compiler.compile(1).unwrap();

        assert_eq!(
            program,
            vec![
                "G90;",
                "M5;",
                "G0 X0.00 Y0.00;",
                "M3 S255;",
                "G1 F750 X10.00 Y0.00;",
                "G1 X10.00 Y10.00;",
                "G1 X0.00 Y10.00;",
                "G1 X0.00 Y0.00;",
                "M5;",
            ]
        );
    }

    #[test]
    fn test_disjoint_curves_travel_between() {
        let curves = vec![
            Curve::line(Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
            Curve::line(Point::new(5.0, 5.0), Point::new(6.0, 5.0)),
        ];
        let mut compiler = compiler(settings());
        compiler.append_curves(&curves).unwrap();

        let travels = compiler.body().iter().filter(|l| l.starts_with("G0")).count();
        assert_eq!(travels, 2);
        // Travel never carries a feed rate and does not reset the cutting feed.
        assert!(compiler.body().iter().filter(|l| l.starts_with("G0")).all(|l| !l.contains('F')));
        let feeds = compiler.body().iter().filter(|l| l.contains("F750")).count();
        assert_eq!(feeds, 1);
    }

    #[test]
    fn test_curves_are_flattened_to_tolerance() {
        let arc = EllipticalArc::from_endpoints(
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            10.0,
            10.0,
            0.0,
            true,
            true,
        )
        .unwrap();
        let mut compiler = compiler(settings());
        compiler.append_curve(&arc).unwrap();

        let cuts: Vec<_> = compiler.body().iter().filter(|l| l.starts_with("G1")).collect();
        assert!(cuts.len() > 8);
        assert_eq!(cuts.last().unwrap().as_str(), "G1 X20.00 Y0.00;");
    }

    #[test]
    fn test_multipass_repeats_body() {
        let mut compiler = compiler(MotionSettings {
            pass_depth: 1.5,
            ..settings()
        });
        compiler.append_curves(&square()).unwrap();
        let body = compiler.body().to_vec();
        let program = compiler.compile(3).unwrap();

        let mut expected = vec!["G90;".to_string()];
        for pass in 1..=3 {
            expected.extend(body.iter().cloned());
            if pass < 3 {
                expected.extend(
                    ["M5;", "G91;", "G1 Z-1.50;", "G90;"]
                        .iter()
                        .map(|s| s.to_string()),
                );
            }
        }
        expected.push("M5;".to_string());
        assert_eq!(program, expected);
    }

    #[test]
    fn test_pass_depth_does_not_drift() {
        let mut compiler = compiler(MotionSettings {
            pass_depth: 0.125,
            ..settings()
        });
        compiler.append_curves(&square()).unwrap();
        let program = compiler.compile(5).unwrap();

        let steps: Vec<_> = program
            .iter()
            .filter(|l| l.starts_with("G1 Z"))
            .map(String::as_str)
            .collect();
        assert_eq!(steps, vec!["G1 Z-0.13;", "G1 Z-0.12;", "G1 Z-0.13;", "G1 Z-0.12;"]);

        let total: f64 = steps
            .iter()
            .map(|l| l["G1 Z".len()..l.len() - 1].parse::<f64>().unwrap())
            .sum();
        assert!((total + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_equal_travel_and_cutting_speed_sets_feed() {
        let mut compiler = compiler(MotionSettings {
            travel_speed: 1000.0,
            cutting_speed: 1000.0,
            ..settings()
        });
        compiler.append_curves(&square()).unwrap();

        let cuts: Vec<_> = compiler.body().iter().filter(|l| l.starts_with("G1")).collect();
        assert_eq!(cuts[0], "G1 F1000 X10.00 Y0.00;");
        assert_eq!(cuts.iter().filter(|l| l.contains('F')).count(), 1);
    }

    #[test]
    fn test_empty_body_still_compiles() {
        let mut compiler = compiler(settings());
        compiler.append_curves(&[]).unwrap();
        assert_eq!(compiler.compile(4).unwrap(), vec!["G90;", "M5;"]);
    }

    #[test]
    fn test_custom_templates_in_body() {
        let mut compiler = Compiler::new(
            Gcode::with_templates(
                2,
                CommandTemplates {
                    laser_off: "M107".to_string(),
                    laser_power: "M106 S128".to_string(),
                },
            ),
            settings(),
            Vec::new(),
            Vec::new(),
        );
        compiler.append_curves(&square()).unwrap();
        assert_eq!(compiler.body()[0], "M107");
        assert_eq!(compiler.body()[2], "M106 S128");
    }
}
