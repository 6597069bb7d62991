//! G-Code command model
//!
//! A [`GcodeCommand`] is one motion/control instruction of the toolpath
//! stream. Commands are immutable once created: the optimizer never edits an
//! instruction in place, it constructs a new one whenever a derived
//! instruction (bridging rapid, power toggle, axis lift) is needed.
//!
//! Synthetic commands are reconstructed textually from their numeric fields:
//! coordinates use fixed-point `{:.3}` formatting, power and mode codes are
//! formatted as integers.

use crate::error::GcodeError;
use crate::geometry::Point;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A parsed, immutable G-Code command.
///
/// Any field may be absent; absent axis targets mean "unchanged" under modal
/// interpretation. Only the words relevant to laser toolpaths are resolved;
/// arc center offsets (I, J, K) and similar parameters are tolerated in the
/// text but carry no meaning here, since arcs contribute only their declared
/// endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcodeCommand {
    /// Original (or synthesized) command text.
    pub text: String,
    /// Motion mode word (G0=rapid, G1=feed, G2/G3=arc by endpoint).
    pub g: Option<u8>,
    /// Mode code word (M3/M4=power on, M5=power off).
    pub m: Option<u16>,
    /// X-axis target.
    pub x: Option<f64>,
    /// Y-axis target.
    pub y: Option<f64>,
    /// Z-axis target.
    pub z: Option<f64>,
    /// Power level (S word).
    pub s: Option<f64>,
    /// Feed rate (F word).
    pub f: Option<f64>,
}

fn word_regex() -> &'static Regex {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    WORD_REGEX.get_or_init(|| {
        Regex::new(r"([A-Z])\s*([-+]?[0-9]*\.?[0-9]+)").expect("invalid word regex")
    })
}

fn comment_regex() -> &'static Regex {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    COMMENT_REGEX.get_or_init(|| Regex::new(r"\([^)]*\)|;.*").expect("invalid comment regex"))
}

impl GcodeCommand {
    /// Parse a single command line.
    ///
    /// Comments (`;` to end of line, `(...)` inline) are stripped before
    /// tokenizing. Leftover text that is not a letter+number word is a syntax
    /// error, and negative power levels or feed rates are invalid parameters.
    /// Repeated words keep the last occurrence.
    pub fn parse(line: &str) -> Result<Self, GcodeError> {
        let cleaned = comment_regex().replace_all(line, "").to_uppercase();

        let mut cmd = Self {
            text: line.trim().to_string(),
            g: None,
            m: None,
            x: None,
            y: None,
            z: None,
            s: None,
            f: None,
        };

        for caps in word_regex().captures_iter(&cleaned) {
            let letter = caps[1].chars().next().expect("regex group 1 is one letter");
            let number: f64 =
                caps[2]
                    .parse()
                    .map_err(|_| GcodeError::InvalidParameter {
                        param: letter,
                        line: line.trim().to_string(),
                        reason: "not a number".to_string(),
                    })?;

            match letter {
                // Only motion modes are resolved; G21/G90 and friends are
                // modal housekeeping this system passes through untouched.
                'G' => {
                    let code = number as u8;
                    if number.fract() == 0.0 && code <= 3 {
                        cmd.g = Some(code);
                    }
                }
                'M' => cmd.m = Some(number as u16),
                'X' => cmd.x = Some(number),
                'Y' => cmd.y = Some(number),
                'Z' => cmd.z = Some(number),
                'S' => {
                    if number < 0.0 {
                        return Err(GcodeError::InvalidParameter {
                            param: 'S',
                            line: line.trim().to_string(),
                            reason: "negative power level".to_string(),
                        });
                    }
                    cmd.s = Some(number);
                }
                'F' => {
                    if number < 0.0 {
                        return Err(GcodeError::InvalidParameter {
                            param: 'F',
                            line: line.trim().to_string(),
                            reason: "negative feed rate".to_string(),
                        });
                    }
                    cmd.f = Some(number);
                }
                // Arc offsets, dwell times, line numbers: tolerated, ignored.
                _ => {}
            }
        }

        // Anything left after removing recognized words is not G-Code.
        let leftover = word_regex().replace_all(&cleaned, "");
        if leftover.chars().any(|c| !c.is_whitespace()) {
            return Err(GcodeError::InvalidSyntax {
                line: line.trim().to_string(),
                reason: "unrecognized text".to_string(),
            });
        }

        Ok(cmd)
    }

    /// Synthetic rapid travel to a 2D point (bridging move between groups).
    pub fn rapid_to(target: Point) -> Self {
        Self {
            text: format!("G0 X{:.3} Y{:.3}", target.x, target.y),
            g: Some(0),
            m: None,
            x: Some(target.x),
            y: Some(target.y),
            z: None,
            s: None,
            f: None,
        }
    }

    /// Synthetic power-on toggle at the given level.
    pub fn power_on(mode: u16, level: f64) -> Self {
        let level = level.round();
        Self {
            text: format!("M{} S{}", mode, level as i64),
            g: None,
            m: Some(mode),
            x: None,
            y: None,
            z: None,
            s: Some(level),
            f: None,
        }
    }

    /// Synthetic power-off toggle.
    pub fn power_off() -> Self {
        Self {
            text: "M5".to_string(),
            g: None,
            m: Some(5),
            x: None,
            y: None,
            z: None,
            s: None,
            f: None,
        }
    }

    /// Synthetic working-axis move in the given motion mode.
    pub fn axis_move(g: u8, z: f64) -> Self {
        Self {
            text: format!("G{} Z{:.3}", g, z),
            g: Some(g),
            m: None,
            x: None,
            y: None,
            z: Some(z),
            s: None,
            f: None,
        }
    }

    /// Synthetic rapid move of the working axis (lift or drop).
    pub fn lift_to(z: f64) -> Self {
        Self::axis_move(0, z)
    }

    /// Canonical motion rewrite: `G{g} X.. Y..` plus feed when one is in
    /// effect. Used by the redundant-toggle collapse pass, which discards the
    /// original command text.
    pub fn feed_move(g: u8, target: Point, feed: Option<f64>) -> Self {
        let text = match feed {
            Some(f) => format!("G{} X{:.3} Y{:.3} F{:.1}", g, target.x, target.y, f),
            None => format!("G{} X{:.3} Y{:.3}", g, target.x, target.y),
        };
        Self {
            text,
            g: Some(g),
            m: None,
            x: Some(target.x),
            y: Some(target.y),
            z: None,
            s: None,
            f: feed,
        }
    }

    /// Whether this command moves any axis.
    pub fn is_motion(&self) -> bool {
        self.g.is_some() && (self.x.is_some() || self.y.is_some() || self.z.is_some())
    }

    /// Whether this command carries an explicit power-on mode code (M3/M4).
    pub fn is_power_on(&self) -> bool {
        matches!(self.m, Some(3) | Some(4))
    }

    /// Whether this command carries an explicit power-off mode code (M5).
    pub fn is_power_off(&self) -> bool {
        self.m == Some(5)
    }
}

impl fmt::Display for GcodeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_motion_command() {
        let cmd = GcodeCommand::parse("G1 X10.5 Y-20.25 F600").unwrap();
        assert_eq!(cmd.g, Some(1));
        assert_eq!(cmd.x, Some(10.5));
        assert_eq!(cmd.y, Some(-20.25));
        assert_eq!(cmd.f, Some(600.0));
        assert!(cmd.is_motion());
    }

    #[test]
    fn test_parse_power_command() {
        let cmd = GcodeCommand::parse("M4 S750").unwrap();
        assert_eq!(cmd.m, Some(4));
        assert_eq!(cmd.s, Some(750.0));
        assert!(cmd.is_power_on());
        assert!(!cmd.is_motion());
    }

    #[test]
    fn test_parse_strips_comments() {
        let cmd = GcodeCommand::parse("G0 X1 (rapid) ; to start").unwrap();
        assert_eq!(cmd.g, Some(0));
        assert_eq!(cmd.x, Some(1.0));
    }

    #[test]
    fn test_parse_ignores_arc_offsets() {
        let cmd = GcodeCommand::parse("G2 X10 Y0 I5 J0").unwrap();
        assert_eq!(cmd.g, Some(2));
        assert_eq!(cmd.x, Some(10.0));
        assert_eq!(cmd.y, Some(0.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            GcodeCommand::parse("hello world"),
            Err(GcodeError::InvalidSyntax { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_negative_power_and_feed() {
        assert!(matches!(
            GcodeCommand::parse("G1 X10 S-100"),
            Err(GcodeError::InvalidParameter { param: 'S', .. })
        ));
        assert!(matches!(
            GcodeCommand::parse("G1 X10 F-600"),
            Err(GcodeError::InvalidParameter { param: 'F', .. })
        ));
    }

    #[test]
    fn test_nonmotion_g_codes_pass_through() {
        let cmd = GcodeCommand::parse("G21 G90").unwrap();
        assert_eq!(cmd.g, None);
        assert!(!cmd.is_motion());
    }

    #[test]
    fn test_command_serde_roundtrip() {
        let cmd = GcodeCommand::parse("G1 X10.5 Y-20.25 S800 F600").unwrap();
        let json = serde_json::to_string(&cmd).unwrap();
        let back: GcodeCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn test_synthetic_formatting() {
        assert_eq!(
            GcodeCommand::rapid_to(Point::new(5.0, 100.0)).text,
            "G0 X5.000 Y100.000"
        );
        assert_eq!(GcodeCommand::power_on(3, 500.0).text, "M3 S500");
        assert_eq!(GcodeCommand::power_off().text, "M5");
        assert_eq!(GcodeCommand::lift_to(1.0).text, "G0 Z1.000");
        assert_eq!(
            GcodeCommand::feed_move(1, Point::new(1.0, 2.0), Some(600.0)).text,
            "G1 X1.000 Y2.000 F600.0"
        );
    }
}
