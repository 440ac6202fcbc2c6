//! Source filtering.
//!
//! Everything outside `><+-.,[]` is a comment and is dropped here, so the
//! rest of the crate only ever sees a dense command stream.

use std::fmt;

/// One of the eight Brainfuck commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `>`
    Right,
    /// `<`
    Left,
    /// `+`
    Increment,
    /// `-`
    Decrement,
    /// `.`
    Output,
    /// `,`
    Input,
    /// `[`
    LoopStart,
    /// `]`
    LoopEnd,
}

impl Command {
    pub fn from_char(c: char) -> Option<Command> {
        match c {
            '>' => Some(Command::Right),
            '<' => Some(Command::Left),
            '+' => Some(Command::Increment),
            '-' => Some(Command::Decrement),
            '.' => Some(Command::Output),
            ',' => Some(Command::Input),
            '[' => Some(Command::LoopStart),
            ']' => Some(Command::LoopEnd),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Command::Right => '>',
            Command::Left => '<',
            Command::Increment => '+',
            Command::Decrement => '-',
            Command::Output => '.',
            Command::Input => ',',
            Command::LoopStart => '[',
            Command::LoopEnd => ']',
        }
    }
}

/// A parsed program: the command stream plus where each command came from.
///
/// `offsets[i]` is the character (not byte) offset in the original source of
/// `commands[i]`. Offsets are only used to point at errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    commands: Vec<Command>,
    offsets: Vec<usize>,
}

impl Program {
    /// Filter `source` down to its commands. Never fails; an empty or
    /// comment-only source yields an empty program.
    pub fn parse(source: &str) -> Self {
        let (commands, offsets) = source
            .chars()
            .enumerate()
            .filter_map(|(offset, c)| Command::from_char(c).map(|cmd| (cmd, offset)))
            .unzip();

        Self { commands, offsets }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Command> {
        self.commands.get(index).copied()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Character offset in the source of the command at `index`.
    pub fn source_offset(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cmd in &self.commands {
            write!(f, "{}", cmd.as_char())?;
        }
        Ok(())
    }
}
