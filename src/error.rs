use std::fmt;

/// Errors that can occur while resolving or executing a Brainfuck program.
///
/// Bracket errors are raised before execution begins. Everything else is
/// raised mid-run and halts the program immediately.
#[derive(Debug, thiserror::Error)]
pub enum BrainfuckError {
    /// A `[` was never closed.
    #[error("Unmatched bracket '[' at instruction {index} (source offset {offset})")]
    UnmatchedOpenBracket { index: usize, offset: usize },

    /// A `]` appeared with no open loop to close.
    #[error("Unmatched bracket ']' at instruction {index} (source offset {offset})")]
    UnmatchedCloseBracket { index: usize, offset: usize },

    /// The data pointer attempted to move left of cell 0.
    #[error("Tape underflow at instruction {ip}: pointer moved left of cell 0")]
    TapeUnderflow { ip: usize },

    /// The data pointer attempted to move past the last cell of a bounded tape.
    #[error("Tape overflow at instruction {ip}: pointer {ptr} is past the last cell ({limit} cells)")]
    TapeOverflow { ip: usize, ptr: usize, limit: usize },

    /// The tape could not be allocated or grown to `cells` cells.
    #[error("Tape allocation failed: cannot hold {cells} cells")]
    TapeAlloc { cells: usize },

    /// Reading input or writing output failed.
    #[error("I/O error at instruction {ip}: {source}")]
    IoFailure {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout)
    #[error("Execution aborted: cancelled")]
    Canceled,
}

/// Coarse classification of a [`BrainfuckError`], used for exit statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Bracket,
    Tape,
    Io,
    Aborted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Bracket => write!(f, "bracket error"),
            ErrorKind::Tape => write!(f, "tape error"),
            ErrorKind::Io => write!(f, "I/O failure"),
            ErrorKind::Aborted => write!(f, "aborted"),
        }
    }
}

impl BrainfuckError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BrainfuckError::UnmatchedOpenBracket { .. }
            | BrainfuckError::UnmatchedCloseBracket { .. } => ErrorKind::Bracket,
            BrainfuckError::TapeUnderflow { .. }
            | BrainfuckError::TapeOverflow { .. }
            | BrainfuckError::TapeAlloc { .. } => ErrorKind::Tape,
            BrainfuckError::IoFailure { .. } => ErrorKind::Io,
            BrainfuckError::StepLimitExceeded { .. } | BrainfuckError::Canceled => {
                ErrorKind::Aborted
            }
        }
    }

    /// Process exit status reported by the `bf` binary for this error.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Bracket => 3,
            ErrorKind::Tape => 4,
            ErrorKind::Io => 5,
            ErrorKind::Aborted => 6,
        }
    }

    /// Command-stream index the error points at, when it has one.
    pub fn instruction(&self) -> Option<usize> {
        match self {
            BrainfuckError::UnmatchedOpenBracket { index, .. }
            | BrainfuckError::UnmatchedCloseBracket { index, .. } => Some(*index),
            BrainfuckError::TapeUnderflow { ip }
            | BrainfuckError::TapeOverflow { ip, .. }
            | BrainfuckError::IoFailure { ip, .. } => Some(*ip),
            BrainfuckError::TapeAlloc { .. }
            | BrainfuckError::StepLimitExceeded { .. }
            | BrainfuckError::Canceled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let bracket = BrainfuckError::UnmatchedOpenBracket { index: 0, offset: 0 };
        let tape = BrainfuckError::TapeUnderflow { ip: 3 };
        let io = BrainfuckError::IoFailure {
            ip: 1,
            source: std::io::Error::other("boom"),
        };
        let aborted = BrainfuckError::StepLimitExceeded { limit: 10 };

        assert_eq!(bracket.exit_code(), 3);
        assert_eq!(tape.exit_code(), 4);
        assert_eq!(io.exit_code(), 5);
        assert_eq!(aborted.exit_code(), 6);
        assert_eq!(BrainfuckError::Canceled.kind(), ErrorKind::Aborted);
        assert_eq!(BrainfuckError::TapeAlloc { cells: 1 }.exit_code(), 4);
    }

    #[test]
    fn messages_name_the_offending_position() {
        let err = BrainfuckError::UnmatchedCloseBracket { index: 4, offset: 9 };
        let msg = err.to_string();
        assert!(msg.contains("']'"));
        assert!(msg.contains("instruction 4"));
        assert!(msg.contains("offset 9"));
        assert_eq!(err.instruction(), Some(4));
    }
}
