//! Burn-group extraction
//!
//! Partitions a command stream into ordered [`CommandGroup`]s: maximal runs
//! of commands during which the cutting power stays active, bounded by
//! power-off transitions. Every input command lands in exactly one group, in
//! original order; the tour builder then reorders whole groups.

use crate::error::OptimizeResult;
use laserkit_core::{GcodeCommand, ModalState, Point};

/// Which transition closes the current group.
///
/// The two triggers are equivalent only once power toggles are explicit;
/// call sites must pick the one matching their input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBoundary {
    /// Close whenever the resolved power is inactive after a command. Use
    /// for freshly converted output, where toggles may still be implicit
    /// (carried by S words alone).
    PowerInactive,
    /// Close on an explicit M5. Use after normalization has inserted
    /// explicit toggles.
    ExplicitPowerOff,
}

/// An ordered, non-empty run of commands sharing one continuous
/// power-active interval, with its derived 2D endpoints.
#[derive(Debug, Clone, Default)]
pub struct CommandGroup {
    commands: Vec<GcodeCommand>,
    start: Point,
    end: Point,
}

impl CommandGroup {
    /// Create an empty group. A group must receive at least one command
    /// before it is meaningful; `build_groups` never emits an empty one.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command with its resolved position.
    ///
    /// The first push fixes the group's start point; every push moves the
    /// end point.
    pub fn push(&mut self, command: GcodeCommand, position: Point) {
        if self.commands.is_empty() {
            self.start = position;
        }
        self.end = position;
        self.commands.push(command);
    }

    /// Resolved position of the group's first command.
    pub fn start(&self) -> Point {
        self.start
    }

    /// Resolved position after the group's last command.
    pub fn end(&self) -> Point {
        self.end
    }

    /// The group's commands, in original order.
    pub fn commands(&self) -> &[GcodeCommand] {
        &self.commands
    }

    /// Number of commands in the group.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the group holds no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Consume the group, yielding its commands in original order.
    pub fn into_commands(self) -> Vec<GcodeCommand> {
        self.commands
    }
}

/// Partition `commands` into ordered burn groups.
///
/// Runs the modal interpreter forward, appending each command to the
/// current group and closing it when `boundary` fires. A trailing open
/// group with at least one command is emitted; an empty one is discarded.
pub fn build_groups(
    commands: &[GcodeCommand],
    boundary: GroupBoundary,
) -> OptimizeResult<Vec<CommandGroup>> {
    let mut state = ModalState::new();
    let mut groups = Vec::new();
    let mut group = CommandGroup::new();

    for cmd in commands {
        state.analyze(cmd)?;
        group.push(cmd.clone(), state.position());

        let closed = match boundary {
            GroupBoundary::PowerInactive => !state.power_active(),
            GroupBoundary::ExplicitPowerOff => cmd.is_power_off(),
        };
        if closed {
            groups.push(std::mem::take(&mut group));
        }
    }

    if !group.is_empty() {
        groups.push(group);
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use laserkit_core::parse_program;

    const PROGRAM: &str = "\
G0 X10 Y10
M3 S500
G1 X20 Y10 F600
G1 X20 Y20
M5
G0 X50 Y50
M3 S500
G1 X60 Y50
M5";

    #[test]
    fn test_groups_cover_every_command_once() {
        let commands = parse_program(PROGRAM).unwrap();
        let groups = build_groups(&commands, GroupBoundary::PowerInactive).unwrap();

        let total: usize = groups.iter().map(CommandGroup::len).sum();
        assert_eq!(total, commands.len());

        let flattened: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.commands().iter().map(|c| c.text.as_str()))
            .collect();
        let original: Vec<&str> = commands.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(flattened, original);
    }

    #[test]
    fn test_power_inactive_boundary() {
        let commands = parse_program(PROGRAM).unwrap();
        let groups = build_groups(&commands, GroupBoundary::PowerInactive).unwrap();

        // Rapid prelude moves close as singleton groups; each burn run
        // closes with its M5 included.
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].len(), 1);
        assert_eq!(groups[0].start(), Point::new(10.0, 10.0));
        assert_eq!(groups[1].len(), 4);
        assert_eq!(groups[1].start(), Point::new(10.0, 10.0));
        assert_eq!(groups[1].end(), Point::new(20.0, 20.0));
        assert_eq!(groups[3].start(), Point::new(50.0, 50.0));
        assert_eq!(groups[3].end(), Point::new(60.0, 50.0));
    }

    #[test]
    fn test_explicit_power_off_boundary() {
        let commands = parse_program(PROGRAM).unwrap();
        let groups = build_groups(&commands, GroupBoundary::ExplicitPowerOff).unwrap();

        // Prelude rapids stay attached to the burn run that follows them.
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 5);
        assert_eq!(groups[0].end(), Point::new(20.0, 20.0));
        assert_eq!(groups[1].len(), 4);
    }

    #[test]
    fn test_trailing_open_group_is_emitted() {
        let commands = parse_program("G0 X1 Y1\nM3 S200\nG1 X2 Y2 F100").unwrap();
        let groups = build_groups(&commands, GroupBoundary::PowerInactive).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].end(), Point::new(2.0, 2.0));
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        let groups = build_groups(&[], GroupBoundary::PowerInactive).unwrap();
        assert!(groups.is_empty());
    }
}
