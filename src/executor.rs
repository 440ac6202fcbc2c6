//! Program execution.
//!
//! [`Interpreter`] parses and resolves a source once; every call to one of
//! its `run*` methods builds a fresh [`ExecutionState`] and walks the command
//! stream until the instruction pointer falls off the end.

use std::io::{self, Read, Write};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tracing::debug;

use crate::error::BrainfuckError;
use crate::jump::JumpTable;
use crate::lexer::{Command, Program};
use crate::tape::{DEFAULT_TAPE_SIZE, MAX_TAPE_SIZE, Tape, TapeFault, TapePolicy};

/// Controls for cooperative cancellation and step limiting.
#[derive(Debug, Clone, Default)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }

    /// Ask a running program to stop before its next instruction.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }
}

/// Tape settings applied to each run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecConfig {
    pub memory_size: usize,
    pub tape_policy: TapePolicy,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_TAPE_SIZE,
            tape_policy: TapePolicy::Growable,
        }
    }
}

/// Mutable state of one run. Discarded (or handed back) when the run ends.
#[derive(Debug, Clone)]
pub struct ExecutionState {
    pub tape: Tape,
    pub ip: usize,
    pub steps: usize,
}

impl ExecutionState {
    fn new(config: &ExecConfig) -> Result<Self, BrainfuckError> {
        let tape = Tape::new(config.memory_size, config.tape_policy)
            .map_err(|fault| tape_error(fault, 0))?;
        Ok(Self { tape, ip: 0, steps: 0 })
    }
}

/// A validated program ready to run any number of times.
#[derive(Debug, Clone)]
pub struct Interpreter {
    program: Program,
    jumps: JumpTable,
    config: ExecConfig,
}

impl Interpreter {
    /// Parse `source` and resolve its loops with the default tape settings.
    ///
    /// Bracket errors are reported here, so a program that fails to build
    /// never starts executing.
    pub fn new(source: &str) -> Result<Self, BrainfuckError> {
        Self::with_config(source, ExecConfig::default())
    }

    /// Like [`Interpreter::new`], but also rejects an initial tape larger
    /// than [`MAX_TAPE_SIZE`] with [`BrainfuckError::TapeAlloc`].
    pub fn with_config(source: &str, config: ExecConfig) -> Result<Self, BrainfuckError> {
        if config.memory_size > MAX_TAPE_SIZE {
            return Err(BrainfuckError::TapeAlloc { cells: config.memory_size });
        }
        let program = Program::parse(source);
        let jumps = JumpTable::build(&program)?;
        Ok(Self { program, jumps, config })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn jump_table(&self) -> &JumpTable {
        &self.jumps
    }

    pub fn config(&self) -> ExecConfig {
        self.config
    }

    /// Run to completion against `input` and `output`.
    pub fn run<R: Read, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<ExecutionState, BrainfuckError> {
        Executor::new(self)?.run(input, output, None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn run_with_control<R: Read, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
        step_control: &StepControl,
    ) -> Result<ExecutionState, BrainfuckError> {
        Executor::new(self)?.run(input, output, Some(step_control))
    }

    /// Run against the process's stdin and stdout.
    pub fn run_stdio(&self, step_control: Option<&StepControl>) -> Result<ExecutionState, BrainfuckError> {
        let mut stdin = io::stdin().lock();
        let mut stdout = io::stdout().lock();
        Executor::new(self)?.run(&mut stdin, &mut stdout, step_control)
    }
}

/// Walks one [`Interpreter`]'s program with its own [`ExecutionState`].
struct Executor<'a> {
    program: &'a Program,
    jumps: &'a JumpTable,
    state: ExecutionState,
}

impl<'a> Executor<'a> {
    fn new(interpreter: &'a Interpreter) -> Result<Self, BrainfuckError> {
        Ok(Self {
            program: &interpreter.program,
            jumps: &interpreter.jumps,
            state: ExecutionState::new(&interpreter.config)?,
        })
    }

    fn run<R: Read, W: Write>(
        mut self,
        input: &mut R,
        output: &mut W,
        step_control: Option<&StepControl>,
    ) -> Result<ExecutionState, BrainfuckError> {
        debug!(
            commands = self.program.len(),
            cells = self.state.tape.len(),
            policy = ?self.state.tape.policy(),
            "run starting"
        );

        let result = self.execute(input, output, step_control);
        let flushed = output.flush();

        match result {
            Ok(()) => {
                flushed.map_err(|source| BrainfuckError::IoFailure {
                    ip: self.state.ip,
                    source,
                })?;
                debug!(steps = self.state.steps, "run finished");
                Ok(self.state)
            }
            Err(err) => {
                debug!(steps = self.state.steps, error = %err, "run failed");
                Err(err)
            }
        }
    }

    fn execute<R: Read, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
        step_control: Option<&StepControl>,
    ) -> Result<(), BrainfuckError> {
        let state = &mut self.state;

        while let Some(cmd) = self.program.get(state.ip) {
            if let Some(ctrl) = step_control {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    return Err(BrainfuckError::Canceled);
                }
                if let Some(max) = ctrl.max_steps {
                    if state.steps >= max {
                        return Err(BrainfuckError::StepLimitExceeded { limit: max });
                    }
                }
            }

            let ip = state.ip;
            match cmd {
                Command::Right => state.tape.move_right().map_err(|f| tape_error(f, ip))?,
                Command::Left => state.tape.move_left().map_err(|f| tape_error(f, ip))?,
                Command::Increment => state.tape.increment(),
                Command::Decrement => state.tape.decrement(),
                Command::Output => output
                    .write_all(&[state.tape.get()])
                    .map_err(|source| BrainfuckError::IoFailure { ip, source })?,
                Command::Input => {
                    // Prompts written so far must be visible before we block.
                    output
                        .flush()
                        .map_err(|source| BrainfuckError::IoFailure { ip, source })?;
                    let byte = read_byte(input)
                        .map_err(|source| BrainfuckError::IoFailure { ip, source })?;
                    // EOF: common BF behavior is to set cell to 0
                    state.tape.set(byte.unwrap_or(0));
                }
                Command::LoopStart => {
                    if state.tape.get() == 0 {
                        let Some(target) = self.jumps.matching(ip) else {
                            return Err(unmatched(self.program, ip, cmd));
                        };
                        state.ip = target;
                    }
                }
                Command::LoopEnd => {
                    if state.tape.get() != 0 {
                        let Some(target) = self.jumps.matching(ip) else {
                            return Err(unmatched(self.program, ip, cmd));
                        };
                        state.ip = target;
                    }
                }
            }

            state.steps += 1;
            // A taken jump lands on the partner bracket; advancing from there
            // is the same as re-evaluating it.
            state.ip += 1;
        }

        Ok(())
    }
}

fn tape_error(fault: TapeFault, ip: usize) -> BrainfuckError {
    match fault {
        TapeFault::Underflow => BrainfuckError::TapeUnderflow { ip },
        TapeFault::Overflow { ptr, limit } => BrainfuckError::TapeOverflow { ip, ptr, limit },
        TapeFault::Alloc { cells } => BrainfuckError::TapeAlloc { cells },
    }
}

/// A bracket the jump table has no partner for.
fn unmatched(program: &Program, index: usize, cmd: Command) -> BrainfuckError {
    let offset = program.source_offset(index).unwrap_or(index);
    match cmd {
        Command::LoopEnd => BrainfuckError::UnmatchedCloseBracket { index, offset },
        _ => BrainfuckError::UnmatchedOpenBracket { index, offset },
    }
}

/// Read exactly one byte, `None` on EOF.
fn read_byte<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
