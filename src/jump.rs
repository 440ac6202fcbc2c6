use crate::error::BrainfuckError;
use crate::lexer::{Command, Program};

/// Matching bracket positions for a [`Program`].
///
/// `targets[i]` holds the index of the partner bracket for a `[` or `]` at
/// index `i`. For non-bracket positions, it is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTable {
    targets: Vec<Option<usize>>,
}

impl JumpTable {
    /// Pair every `[` with its `]` in a single left-to-right scan.
    ///
    /// Fails on the first `]` with nothing open, or, after the scan, on the
    /// innermost `[` still open.
    pub fn build(program: &Program) -> Result<Self, BrainfuckError> {
        let offset_of = |i: usize| program.source_offset(i).unwrap_or(i);

        let mut targets: Vec<Option<usize>> = vec![None; program.len()];
        let mut stack: Vec<usize> = Vec::new();

        for (i, &cmd) in program.commands().iter().enumerate() {
            match cmd {
                Command::LoopStart => stack.push(i),
                Command::LoopEnd => {
                    let Some(open_index) = stack.pop() else {
                        return Err(BrainfuckError::UnmatchedCloseBracket {
                            index: i,
                            offset: offset_of(i),
                        });
                    };
                    targets[open_index] = Some(i);
                    targets[i] = Some(open_index);
                }
                _ => {}
            }
        }

        if let Some(unmatched_open) = stack.last().copied() {
            return Err(BrainfuckError::UnmatchedOpenBracket {
                index: unmatched_open,
                offset: offset_of(unmatched_open),
            });
        }

        Ok(Self { targets })
    }

    /// Partner of the bracket at `index`, or `None` if `index` is not a bracket.
    pub fn matching(&self, index: usize) -> Option<usize> {
        self.targets.get(index).copied().flatten()
    }

    /// Number of matched pairs.
    pub fn pairs(&self) -> usize {
        self.targets.iter().filter(|t| t.is_some()).count() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(src: &str) -> Result<JumpTable, BrainfuckError> {
        JumpTable::build(&Program::parse(src))
    }

    #[test]
    fn nested_loops_pair_innermost_first() {
        let table = build("[[][]]").unwrap();
        assert_eq!(table.matching(0), Some(5));
        assert_eq!(table.matching(1), Some(2));
        assert_eq!(table.matching(3), Some(4));
        assert_eq!(table.pairs(), 3);
    }

    #[test]
    fn table_is_an_involution_over_brackets() {
        let src = "+[>[-]<[>+<-]]>[.]";
        let program = Program::parse(src);
        let table = JumpTable::build(&program).unwrap();
        for (i, cmd) in program.commands().iter().enumerate() {
            match cmd {
                Command::LoopStart | Command::LoopEnd => {
                    let partner = table.matching(i).unwrap();
                    assert_ne!(program.get(partner), Some(*cmd));
                    assert_eq!(table.matching(partner), Some(i));
                }
                _ => assert_eq!(table.matching(i), None),
            }
        }
    }

    #[test]
    fn extra_close_reports_its_position() {
        let err = build("[]]").unwrap_err();
        assert!(matches!(
            err,
            BrainfuckError::UnmatchedCloseBracket { index: 2, offset: 2 }
        ));
    }

    #[test]
    fn close_before_any_open_fails_immediately() {
        let err = build("][").unwrap_err();
        assert!(matches!(err, BrainfuckError::UnmatchedCloseBracket { index: 0, .. }));
    }

    #[test]
    fn extra_open_reports_topmost_unclosed() {
        let err = build("[[]").unwrap_err();
        assert!(matches!(err, BrainfuckError::UnmatchedOpenBracket { index: 0, .. }));

        let err = build("[][[").unwrap_err();
        assert!(matches!(err, BrainfuckError::UnmatchedOpenBracket { index: 3, .. }));
    }

    #[test]
    fn offsets_skip_comments() {
        let err = build("ab [ cd").unwrap_err();
        assert!(matches!(
            err,
            BrainfuckError::UnmatchedOpenBracket { index: 0, offset: 3 }
        ));
    }

    #[test]
    fn program_without_brackets_has_no_pairs() {
        let table = build("+-.,<>").unwrap();
        assert_eq!(table.pairs(), 0);
        assert_eq!(table.matching(0), None);
        assert_eq!(table.matching(99), None);
    }
}
