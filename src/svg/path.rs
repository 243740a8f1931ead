//! SVG path data (`d` attribute) parsing.
//!
//! Supports the full command set (M L H V C S Q T A Z, absolute and
//! relative), implicit command repetition and the compact number syntax
//! SVG allows (`10-5`, `.5.5`, `1e-3`, packed arc flags).

use crate::error::{PathError, PathResult};
use crate::geometry::{Curve, EllipticalArc, Point, Transformation};

/// The curves drawn by one path data string.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub curves: Vec<Curve>,
}

impl Path {
    /// Parse `d`, mapping every coordinate through `transformation` and then,
    /// when `flip_height` is given, mirroring it with `y' = flip_height - y`.
    pub fn parse(
        d: &str,
        transformation: &Transformation,
        flip_height: Option<f64>,
    ) -> PathResult<Self> {
        let mapping = match flip_height {
            Some(height) => Transformation::vertical_flip(height).compose(transformation),
            None => *transformation,
        };

        let curves = parse_path_data(d)?;
        let curves = if mapping.is_identity() {
            curves
        } else {
            curves.iter().map(|c| c.transformed(&mapping)).collect()
        };

        Ok(Self { curves })
    }
}

/// Parse path data into curves in raw user-space coordinates.
pub fn parse_path_data(d: &str) -> PathResult<Vec<Curve>> {
    PathBuilder::new(d).run()
}

/// Which kind of control point the previous segment left behind, for the
/// smooth S and T commands.
#[derive(Debug, Clone, Copy)]
enum LastControl {
    None,
    Cubic(Point),
    Quadratic(Point),
}

struct PathBuilder<'a> {
    lexer: Lexer<'a>,
    curves: Vec<Curve>,
    current: Point,
    subpath_start: Point,
    last_control: LastControl,
}

impl<'a> PathBuilder<'a> {
    fn new(d: &'a str) -> Self {
        Self {
            lexer: Lexer::new(d),
            curves: Vec::new(),
            current: Point::ORIGIN,
            subpath_start: Point::ORIGIN,
            last_control: LastControl::None,
        }
    }

    fn run(mut self) -> PathResult<Vec<Curve>> {
        let mut previous: Option<char> = None;

        loop {
            self.lexer.skip_separators();
            let Some(ch) = self.lexer.peek() else {
                break;
            };
            let position = self.lexer.pos;

            let command = if ch.is_ascii_alphabetic() {
                self.lexer.bump();
                ch
            } else if self.lexer.at_number() {
                // A bare number repeats the previous command; M turns into L.
                match previous {
                    Some('M') => 'L',
                    Some('m') => 'l',
                    Some(p) if p != 'Z' && p != 'z' => p,
                    _ => return Err(PathError::UnexpectedCharacter { ch, position }),
                }
            } else {
                return Err(PathError::UnexpectedCharacter { ch, position });
            };

            if previous.is_none() && !matches!(command, 'M' | 'm') {
                return Err(PathError::MissingMoveTo { command });
            }

            self.execute(command, position)?;
            previous = Some(command);
        }

        Ok(self.curves)
    }

    fn execute(&mut self, command: char, position: usize) -> PathResult<()> {
        let relative = command.is_ascii_lowercase();
        let origin = if relative {
            self.current
        } else {
            Point::ORIGIN
        };

        match command.to_ascii_uppercase() {
            'M' => {
                let p = origin + self.lexer.point(command)?;
                self.current = p;
                self.subpath_start = p;
                self.last_control = LastControl::None;
            }
            'L' => {
                let p = origin + self.lexer.point(command)?;
                self.line_to(p);
            }
            'H' => {
                let x = self.lexer.number(command)?;
                let x = if relative { self.current.x + x } else { x };
                self.line_to(Point::new(x, self.current.y));
            }
            'V' => {
                let y = self.lexer.number(command)?;
                let y = if relative { self.current.y + y } else { y };
                self.line_to(Point::new(self.current.x, y));
            }
            'C' => {
                let control1 = origin + self.lexer.point(command)?;
                let control2 = origin + self.lexer.point(command)?;
                let end = origin + self.lexer.point(command)?;
                self.cubic_to(control1, control2, end);
            }
            'S' => {
                let control1 = match self.last_control {
                    LastControl::Cubic(c) => self.current * 2.0 - c,
                    _ => self.current,
                };
                let control2 = origin + self.lexer.point(command)?;
                let end = origin + self.lexer.point(command)?;
                self.cubic_to(control1, control2, end);
            }
            'Q' => {
                let control = origin + self.lexer.point(command)?;
                let end = origin + self.lexer.point(command)?;
                self.quadratic_to(control, end);
            }
            'T' => {
                let control = match self.last_control {
                    LastControl::Quadratic(c) => self.current * 2.0 - c,
                    _ => self.current,
                };
                let end = origin + self.lexer.point(command)?;
                self.quadratic_to(control, end);
            }
            'A' => {
                let rx = self.lexer.number(command)?;
                let ry = self.lexer.number(command)?;
                let rotation = self.lexer.number(command)?;
                let large_arc = self.lexer.flag()?;
                let sweep = self.lexer.flag()?;
                let end = origin + self.lexer.point(command)?;

                if let Some(arc) = EllipticalArc::from_endpoints(
                    self.current,
                    end,
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                ) {
                    self.curves.push(arc);
                }
                self.current = end;
                self.last_control = LastControl::None;
            }
            'Z' => {
                if self.current != self.subpath_start {
                    self.curves
                        .push(Curve::line(self.current, self.subpath_start));
                }
                self.current = self.subpath_start;
                self.last_control = LastControl::None;
            }
            _ => {
                return Err(PathError::UnexpectedCharacter {
                    ch: command,
                    position,
                });
            }
        }

        Ok(())
    }

    fn line_to(&mut self, end: Point) {
        self.curves.push(Curve::line(self.current, end));
        self.current = end;
        self.last_control = LastControl::None;
    }

    fn cubic_to(&mut self, control1: Point, control2: Point, end: Point) {
        self.curves.push(Curve::CubicBezier {
            start: self.current,
            control1,
            control2,
            end,
        });
        self.current = end;
        self.last_control = LastControl::Cubic(control2);
    }

    fn quadratic_to(&mut self, control: Point, end: Point) {
        self.curves.push(Curve::QuadraticBezier {
            start: self.current,
            control,
            end,
        });
        self.current = end;
        self.last_control = LastControl::Quadratic(control);
    }
}

/// Byte cursor over path data.
struct Lexer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(d: &'a str) -> Self {
        Self {
            data: d.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.data.get(self.pos).map(|&b| b as char)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_separators(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_whitespace() || ch == ',' {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn at_number(&self) -> bool {
        matches!(self.peek(), Some(ch) if ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.'))
    }

    fn point(&mut self, command: char) -> PathResult<Point> {
        let x = self.number(command)?;
        let y = self.number(command)?;
        Ok(Point::new(x, y))
    }

    fn number(&mut self, command: char) -> PathResult<f64> {
        self.skip_separators();
        let start = self.pos;
        let error = PathError::ExpectedNumber {
            command,
            position: start,
        };

        if matches!(self.peek(), Some('-' | '+')) {
            self.bump();
        }

        let int_digits = self.digits();
        let mut frac_digits = 0;
        if self.peek() == Some('.') {
            self.bump();
            frac_digits = self.digits();
        }
        if int_digits == 0 && frac_digits == 0 {
            self.pos = start;
            return Err(error);
        }

        // Only treat 'e' as an exponent when digits actually follow.
        if matches!(self.peek(), Some('e' | 'E')) {
            let mark = self.pos;
            self.bump();
            if matches!(self.peek(), Some('-' | '+')) {
                self.bump();
            }
            if self.digits() == 0 {
                self.pos = mark;
            }
        }

        std::str::from_utf8(&self.data[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(error)
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.bump();
        }
        self.pos - start
    }

    /// Arc flags are a single `0` or `1` and need no separator after them.
    fn flag(&mut self) -> PathResult<bool> {
        self.skip_separators();
        let position = self.pos;
        let value = match self.peek() {
            Some('0') => false,
            Some('1') => true,
            _ => return Err(PathError::InvalidFlag { position }),
        };
        self.bump();
        Ok(value)
    }
}
