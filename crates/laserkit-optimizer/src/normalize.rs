//! Power-stream normalization passes
//!
//! Vector conversion output often carries its power intent implicitly: an S
//! word changes the level mid-stream with no M3/M5 toggle, and nothing lifts
//! the working axis while the head travels. These passes make the stream
//! explicit and minimal:
//!
//! - [`insert_power_toggles`](StreamNormalizer::insert_power_toggles) adds
//!   the missing M3/M5 toggles.
//! - [`insert_axis_lifts`](StreamNormalizer::insert_axis_lifts) pairs every
//!   toggle with a working-axis move.
//! - [`collapse_redundant_toggles`](StreamNormalizer::collapse_redundant_toggles)
//!   removes toggles with no observable effect, rewriting motion commands
//!   canonically.
//!
//! Each pass fully replaces the list; they are never run concurrently over
//! one list. Modal resolution is sequential, so every pass replays a fresh
//! interpreter from the start. The combined [`normalize`](StreamNormalizer::normalize)
//! driver orders them toggles, collapse, lifts, so the canonical rewrite
//! settles before lift moves are paired with the surviving toggles.

use crate::error::{OptimizeError, OptimizeResult};
use laserkit_core::{CancelToken, GcodeCommand, ModalState, Point};
use tracing::debug;

/// Depths used by the axis-lift pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizerSettings {
    /// Working-axis depth while burning.
    pub engrave_z: f64,
    /// Working-axis height for travel between burns.
    pub travel_z: f64,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            engrave_z: 0.0,
            travel_z: 1.0,
        }
    }
}

/// Runs the three normalization passes over a command list.
#[derive(Debug, Default)]
pub struct StreamNormalizer {
    settings: NormalizerSettings,
    cancel: CancelToken,
}

impl StreamNormalizer {
    /// Create a normalizer with default lift depths and no cancellation
    /// source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with explicit lift depths.
    pub fn with_settings(settings: NormalizerSettings) -> Self {
        Self {
            settings,
            cancel: CancelToken::new(),
        }
    }

    /// Attach a cancellation token, polled between passes.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run all three passes, checking for cancellation at each pass
    /// boundary. Toggles are made explicit first, collapsed to the minimal
    /// set next, and axis lifts are paired with the surviving toggles last.
    /// On cancellation the list keeps whatever the already completed passes
    /// produced; no pass leaves it half-rewritten.
    pub fn normalize(&self, commands: &mut Vec<GcodeCommand>) -> OptimizeResult<()> {
        type Pass = fn(&StreamNormalizer, &mut Vec<GcodeCommand>) -> OptimizeResult<()>;
        let passes: [(Pass, &str); 3] = [
            (Self::insert_power_toggles, "insert power toggles"),
            (Self::collapse_redundant_toggles, "collapse redundant toggles"),
            (Self::insert_axis_lifts, "insert axis lifts"),
        ];
        for (pass, name) in passes {
            if self.cancel.is_cancelled() {
                return Err(OptimizeError::Cancelled);
            }
            pass(self, commands)?;
            debug!(pass = name, commands = commands.len(), "normalization pass done");
        }
        Ok(())
    }

    /// Insert an explicit power toggle wherever the resolved power level
    /// changes across a command that carries no M word of its own: `M3 S{n}`
    /// before a step up to level `n`, `M5` before a step to zero.
    ///
    /// Idempotent: once every level change is preceded by an explicit
    /// toggle, a second run inserts nothing.
    pub fn insert_power_toggles(&self, commands: &mut Vec<GcodeCommand>) -> OptimizeResult<()> {
        let mut state = ModalState::new();
        let mut out = Vec::with_capacity(commands.len());

        // Level established by the last power-relevant event, explicit or
        // inserted. A command triggers a toggle only when it carries an S
        // change that no toggle has covered yet; comparing against this
        // level (rather than the raw modal S, which an M5 does not reset)
        // is what makes the pass idempotent. Toggles emit integer levels,
        // so the comparison rounds both sides: a fractional level already
        // established by a rounded toggle counts as unchanged.
        let mut level: f64 = 0.0;
        for cmd in commands.iter() {
            state.analyze(cmd)?;
            if cmd.m.is_none() {
                if state.s.changed() && state.s.current.round() != level.round() {
                    level = state.s.current;
                    if level.round() > 0.0 {
                        out.push(GcodeCommand::power_on(3, level));
                    } else {
                        out.push(GcodeCommand::power_off());
                    }
                }
            } else if cmd.is_power_off() {
                level = 0.0;
            } else if cmd.is_power_on() {
                level = state.s.current;
            }
            out.push(cmd.clone());
        }

        *commands = out;
        Ok(())
    }

    /// Insert a rapid working-axis move after every explicit power toggle:
    /// down to the engrave depth after M3/M4, up to the travel height after
    /// M5. The forward replay also validates the stream. A toggle already
    /// followed by its lift is left alone, so the pass can be re-run.
    pub fn insert_axis_lifts(&self, commands: &mut Vec<GcodeCommand>) -> OptimizeResult<()> {
        let mut state = ModalState::new();
        let mut out = Vec::with_capacity(commands.len());

        let lifted = |next: Option<&GcodeCommand>, depth: f64| {
            next.is_some_and(|cmd| {
                cmd.g == Some(0) && cmd.x.is_none() && cmd.y.is_none() && cmd.z == Some(depth)
            })
        };

        for (i, cmd) in commands.iter().enumerate() {
            state.analyze(cmd)?;
            out.push(cmd.clone());

            let depth = if cmd.is_power_on() {
                self.settings.engrave_z
            } else if cmd.is_power_off() {
                self.settings.travel_z
            } else {
                continue;
            };
            if !lifted(commands.get(i + 1), depth) {
                out.push(GcodeCommand::lift_to(depth));
            }
        }

        *commands = out;
        Ok(())
    }

    /// Remove power toggles with no observable effect.
    ///
    /// A forward replay captures, per motion command, the effective
    /// (power, motion mode, feed) state and resolved target. A reverse
    /// iteration over the captured records then re-derives the emitted power
    /// state and only keeps a toggle where the state actually changes
    /// between two adjacent motions (or at the stream boundaries). Motion
    /// commands are rewritten canonically, `G{g} X.. Y.. F..` in the plane
    /// and `G{g} Z..` for working-axis moves; the original text, and any
    /// command that is neither a motion nor an effective toggle, is
    /// discarded.
    pub fn collapse_redundant_toggles(&self, commands: &mut Vec<GcodeCommand>) -> OptimizeResult<()> {
        enum MotionKind {
            Planar(Point),
            Vertical(f64),
        }
        struct MotionRecord {
            motion_mode: u8,
            power: Option<(u16, f64)>,
            feed: Option<f64>,
            kind: MotionKind,
        }

        let mut state = ModalState::new();
        let mut records = Vec::new();
        for cmd in commands.iter() {
            state.analyze(cmd)?;
            if cmd.is_motion() {
                let power = if state.power_active() {
                    state.power_mode().map(|mode| (mode, state.s.current))
                } else {
                    None
                };
                let feed = (state.f.current > 0.0).then_some(state.f.current);
                let kind = if cmd.x.is_some() || cmd.y.is_some() {
                    MotionKind::Planar(state.position())
                } else {
                    MotionKind::Vertical(state.z.current)
                };
                records.push(MotionRecord {
                    motion_mode: state.motion_mode(),
                    power,
                    feed,
                    kind,
                });
            }
        }

        let toggle_for = |power: Option<(u16, f64)>| match power {
            Some((mode, level)) => GcodeCommand::power_on(mode, level),
            None => GcodeCommand::power_off(),
        };

        // Built back-to-front, reversed at the end. The stream must end
        // powered off, so a final burn gets a trailing M5 up front.
        let mut reversed: Vec<GcodeCommand> = Vec::with_capacity(records.len() + 2);
        if let Some(last) = records.last() {
            if last.power.is_some() {
                reversed.push(GcodeCommand::power_off());
            }
        }

        let mut later_power: Option<Option<(u16, f64)>> = None;
        for record in records.iter().rev() {
            reversed.push(match record.kind {
                MotionKind::Planar(target) => {
                    GcodeCommand::feed_move(record.motion_mode, target, record.feed)
                }
                MotionKind::Vertical(z) => GcodeCommand::axis_move(record.motion_mode, z),
            });
            if let Some(later) = later_power {
                if later != record.power {
                    // The state required by the next-in-original-order
                    // motion; lands between this motion and the next.
                    reversed.push(toggle_for(later));
                }
            }
            later_power = Some(record.power);
        }

        // The stream starts powered off; a leading burn needs its toggle.
        if let Some(Some((mode, level))) = later_power {
            reversed.push(GcodeCommand::power_on(mode, level));
        }

        reversed.reverse();
        *commands = reversed;
        Ok(())
    }
}
