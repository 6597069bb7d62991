//! Modal state tracking
//!
//! G-Code is modal: most words are "sticky" and stay in effect until another
//! command changes them. [`ModalState`] replays a command stream one
//! instruction at a time and resolves, per instruction, the absolute
//! position, power level, feed, and the derived "power active" flag.
//!
//! Resolution is strictly sequential: every instruction's resolved state
//! depends on all earlier instructions in the same list. Whenever a list is
//! regrouped, reordered, or logically reversed, a fresh `ModalState` must be
//! replayed from the start.

use crate::command::GcodeCommand;
use crate::error::GcodeError;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// A modal value exposing both the resolved value before and after the most
/// recently analyzed instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackedValue {
    /// Value in effect before the last analyzed instruction.
    pub previous: f64,
    /// Value in effect after the last analyzed instruction.
    pub current: f64,
}

impl TrackedValue {
    fn update(&mut self, word: Option<f64>) {
        self.previous = self.current;
        if let Some(value) = word {
            self.current = value;
        }
    }

    /// Whether the last analyzed instruction changed this value.
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Modal interpreter state for a laser toolpath stream.
///
/// Starts at the origin with power off, level 0, rapid motion mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModalState {
    /// Resolved X position.
    pub x: TrackedValue,
    /// Resolved Y position.
    pub y: TrackedValue,
    /// Resolved Z position.
    pub z: TrackedValue,
    /// Resolved power level (S).
    pub s: TrackedValue,
    /// Resolved feed rate (F).
    pub f: TrackedValue,
    motion_mode: u8,
    power_mode: Option<u16>,
}

impl ModalState {
    /// Create a fresh interpreter state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze one instruction, advancing the modal state.
    ///
    /// Fails on a mode code this system cannot resolve; the caller must abort
    /// the whole run, partial output is not safe to use. M2/M30 program-end
    /// codes are tolerated as no-ops.
    pub fn analyze(&mut self, cmd: &GcodeCommand) -> Result<(), GcodeError> {
        match cmd.m {
            None | Some(3) | Some(4) | Some(5) | Some(2) | Some(30) => {}
            Some(code) => {
                return Err(GcodeError::UnknownCode {
                    code,
                    line: cmd.text.clone(),
                })
            }
        }

        self.x.update(cmd.x);
        self.y.update(cmd.y);
        self.z.update(cmd.z);
        self.s.update(cmd.s);
        self.f.update(cmd.f);

        if let Some(g) = cmd.g {
            self.motion_mode = g;
        }
        match cmd.m {
            Some(3) | Some(4) => self.power_mode = cmd.m,
            Some(5) => self.power_mode = None,
            _ => {}
        }

        Ok(())
    }

    /// Whether the cutting power is active after the last instruction:
    /// a power-on mode (M3/M4) is in effect and the level is above zero.
    pub fn power_active(&self) -> bool {
        self.power_mode.is_some() && self.s.current > 0.0
    }

    /// Active power-on mode code (M3/M4), if any.
    pub fn power_mode(&self) -> Option<u16> {
        self.power_mode
    }

    /// Motion mode in effect after the last instruction.
    pub fn motion_mode(&self) -> u8 {
        self.motion_mode
    }

    /// XY position after the last instruction.
    pub fn position(&self) -> Point {
        Point::new(self.x.current, self.y.current)
    }

    /// XY position before the last instruction.
    pub fn previous_position(&self) -> Point {
        Point::new(self.x.previous, self.y.previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(line: &str) -> GcodeCommand {
        GcodeCommand::parse(line).unwrap()
    }

    #[test]
    fn test_words_are_sticky() {
        let mut state = ModalState::new();
        state.analyze(&cmd("G1 X10 Y20 F600")).unwrap();
        state.analyze(&cmd("X15")).unwrap();

        assert_eq!(state.position(), Point::new(15.0, 20.0));
        assert_eq!(state.previous_position(), Point::new(10.0, 20.0));
        assert_eq!(state.f.current, 600.0);
        assert_eq!(state.motion_mode(), 1);
    }

    #[test]
    fn test_power_active_needs_mode_and_level() {
        let mut state = ModalState::new();
        state.analyze(&cmd("S500")).unwrap();
        assert!(!state.power_active(), "level without M3/M4 is not active");

        state.analyze(&cmd("M3")).unwrap();
        assert!(state.power_active());

        state.analyze(&cmd("S0")).unwrap();
        assert!(!state.power_active(), "level 0 is not active");

        state.analyze(&cmd("M3 S300")).unwrap();
        state.analyze(&cmd("M5")).unwrap();
        assert!(!state.power_active());
        assert_eq!(state.power_mode(), None);
    }

    #[test]
    fn test_unknown_mode_code_is_hard_failure() {
        let mut state = ModalState::new();
        let err = state.analyze(&cmd("M62")).unwrap_err();
        assert!(matches!(err, GcodeError::UnknownCode { code: 62, .. }));
    }

    #[test]
    fn test_program_end_codes_tolerated() {
        let mut state = ModalState::new();
        state.analyze(&cmd("M3 S100")).unwrap();
        state.analyze(&cmd("M2")).unwrap();
        // M2 is a no-op for power tracking here.
        assert!(state.power_active());
    }
}
