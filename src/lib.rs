//! A Brainfuck executor.
//!
//! Source text goes through three stages:
//! - [`lexer`] drops every character outside `><+-.,[]`,
//! - [`jump`] pairs up the loops, rejecting unbalanced programs before they run,
//! - [`executor`] walks the command stream over a tape of `u8` cells.
//!
//! Features and behaviors:
//! - Memory tape (default 30,000 cells) initialized to 0; it grows on demand
//!   unless a bounded tape is requested.
//! - Moving left from cell 0 is an error.
//! - Cell arithmetic wraps (255 + 1 = 0, 0 - 1 = 255).
//! - Input `,` reads a single byte; on EOF the current cell is set to 0.
//! - Output `.` writes the byte at the current cell, nothing more.
//! - Infinite loops are valid; use [`StepControl`] to bound or cancel a run.
//!
//! Quick start:
//!
//! ```
//! use bf_exec::Interpreter;
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let bf = Interpreter::new(code).expect("brackets should balance");
//! let mut out = Vec::new();
//! bf.run(&mut std::io::empty(), &mut out).expect("program should run");
//! assert_eq!(out, b"Hello World!\n");
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod jump;
pub mod lexer;
pub mod tape;

pub use error::{BrainfuckError, ErrorKind};
pub use executor::{ExecConfig, ExecutionState, Interpreter, StepControl};
pub use jump::JumpTable;
pub use lexer::{Command, Program};
pub use tape::{DEFAULT_TAPE_SIZE, Tape, TapePolicy};
