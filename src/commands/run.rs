use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use clap::Args;
use tracing::{debug, warn};

use crate::cli_util::print_error;
use crate::commands::{LoadError, SourceArgs};
use crate::config::{self, resolve, resolve_where};
use crate::error::BrainfuckError;
use crate::executor::{ExecConfig, Interpreter, StepControl};
use crate::lexer::Program;
use crate::tape::{DEFAULT_TAPE_SIZE, TapePolicy};

/// How often the waiting thread checks for timeout and Ctrl+C.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long to give a cancelled run to flush its output before exiting.
const CANCEL_GRACE: Duration = Duration::from_millis(200);

/// Exit status after Ctrl+C, following the shell's 128 + SIGINT.
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// Initial tape size in cells (fallback BF_MEMORY; default 30000)
    #[arg(long = "memory", value_name = "CELLS", value_parser = clap::value_parser!(u64).range(1..))]
    pub memory: Option<u64>,

    /// Fail with a tape overflow instead of growing the tape (fallback BF_TAPE)
    #[arg(long = "bounded", conflicts_with = "growable")]
    pub bounded: bool,

    /// Grow the tape on demand, overriding BF_TAPE and the config file
    #[arg(long = "growable", conflicts_with = "bounded")]
    pub growable: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

enum Outcome {
    Finished(Result<(), BrainfuckError>),
    TimedOut,
    Interrupted,
    Lost,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let code_str = match args.source.load(program) {
        Ok(s) => s,
        Err(LoadError::Usage) => usage_and_exit(program, 2),
        Err(LoadError::Exit(code)) => return code,
    };

    // Resolve limits: flags -> env -> config file -> defaults
    let file = config::settings();
    let memory_flag = args.memory.map(|m| usize::try_from(m).unwrap_or(usize::MAX));
    let memory_size = resolve_where(memory_flag, "BF_MEMORY", file.memory, |&n| n > 0)
        .unwrap_or(DEFAULT_TAPE_SIZE);
    let tape_flag = match (args.bounded, args.growable) {
        (true, _) => Some(TapePolicy::Bounded),
        (_, true) => Some(TapePolicy::Growable),
        _ => None,
    };
    let tape_policy = resolve(tape_flag, "BF_TAPE", file.tape).unwrap_or_default();
    let timeout_ms = resolve(args.timeout_ms, "BF_TIMEOUT_MS", file.timeout_ms);
    let max_steps = resolve(args.max_steps, "BF_MAX_STEPS", file.max_steps);

    let exec_config = ExecConfig { memory_size, tape_policy };
    let bf = match Interpreter::with_config(&code_str, exec_config) {
        Ok(bf) => bf,
        Err(err) => {
            print_error(program, &code_str, &Program::parse(&code_str), &err);
            return err.exit_code();
        }
    };
    let parsed = bf.program().clone();

    // Ctrl+C cancels the run; the waiting loop below turns it into an exit.
    let cancel = Arc::new(AtomicBool::new(false));
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        let interrupted = interrupted.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            interrupted.store(true, Ordering::Relaxed);
            cancel.store(true, Ordering::Relaxed);
        }) {
            warn!(error = %e, "failed to set ctrl+c handler");
        }
    }

    // Execute on a worker thread with cooperative cancellation
    let ctrl = StepControl::new(max_steps, cancel);
    let worker_ctrl = ctrl.clone();
    let (tx, rx) = mpsc::channel::<Result<(), BrainfuckError>>();
    thread::spawn(move || {
        let res = bf.run_stdio(Some(&worker_ctrl)).map(|state| {
            debug!(steps = state.steps, pointer = state.tape.pointer(), "worker done");
        });
        let _ = tx.send(res);
    });

    let deadline = timeout_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
    let outcome = loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(res) => break Outcome::Finished(res),
            Err(mpsc::RecvTimeoutError::Disconnected) => break Outcome::Lost,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if interrupted.load(Ordering::Relaxed) {
                    break Outcome::Interrupted;
                }
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    ctrl.cancel();
                    break Outcome::TimedOut;
                }
            }
        }
    };

    if matches!(outcome, Outcome::TimedOut | Outcome::Interrupted) {
        // Let the worker notice the flag and flush what it has written.
        let _ = rx.recv_timeout(CANCEL_GRACE);
    }

    let exit_code = match outcome {
        Outcome::Finished(Ok(())) => 0,
        Outcome::Finished(Err(BrainfuckError::Canceled)) | Outcome::Interrupted
            if interrupted.load(Ordering::Relaxed) =>
        {
            eprintln!("Execution aborted: interrupted");
            EXIT_INTERRUPTED
        }
        Outcome::Finished(Err(BrainfuckError::Canceled)) | Outcome::TimedOut => {
            let ms = timeout_ms.unwrap_or_default();
            eprintln!("Execution aborted: wall-clock timeout exceeded ({ms} ms)");
            BrainfuckError::Canceled.exit_code()
        }
        Outcome::Finished(Err(err @ BrainfuckError::StepLimitExceeded { .. })) => {
            eprintln!("{err}");
            err.exit_code()
        }
        Outcome::Finished(Err(err)) => {
            print_error(program, &code_str, &parsed, &err);
            err.exit_code()
        }
        Outcome::Interrupted => EXIT_INTERRUPTED,
        Outcome::Lost => {
            eprintln!("{program}: interpreter thread exited unexpectedly");
            1
        }
    };

    let _ = io::stderr().flush();
    exit_code
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>  Read Brainfuck code from PATH instead of positional "<code>"
  --timeout <MS>      Abort after MS milliseconds of wall-clock time
  --max-steps <N>     Abort after N executed instructions
  --memory <CELLS>    Initial tape size (default 30000)
  --bounded           Treat moving past the last cell as an error instead of growing the tape
  --growable          Grow the tape on demand (the default)
  --help,  -h         Show this help

Notes:
- Characters outside of Brainfuck's ><+-.,[] are comments and are ignored.
- Input (`,`) reads a single byte from stdin; on EOF the current cell is set to 0.
- Moving left of cell 0 is an error.
- Flags override BF_TIMEOUT_MS, BF_MAX_STEPS, BF_MEMORY and BF_TAPE, which
  override the [run] section of bf.toml.
- Put `--` before code that starts with `-`.

Exit status:
  0 success, 1 unreadable file, 2 usage, 3 unmatched bracket,
  4 tape underflow/overflow, 5 I/O failure, 6 step limit or timeout,
  130 interrupted

Examples:
- Load Brainfuck code from a file:
    {0} run --file ./program.bf
- Read bytes from a file as stdin (`,` will consume file input):
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
