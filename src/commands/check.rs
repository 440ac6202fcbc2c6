use std::io::{self, Write};

use clap::Args;

use crate::cli_util::print_error;
use crate::commands::{LoadError, SourceArgs};
use crate::executor::Interpreter;
use crate::lexer::Program;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Parse and resolve loops without executing anything.
pub fn run(program: &str, args: CheckArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let code_str = match args.source.load(program) {
        Ok(s) => s,
        Err(LoadError::Usage) => usage_and_exit(program, 2),
        Err(LoadError::Exit(code)) => return code,
    };

    match Interpreter::new(&code_str) {
        Ok(bf) => {
            println!(
                "ok: {} commands, {} loops",
                bf.program().len(),
                bf.jump_table().pairs()
            );
            let _ = io::stdout().flush();
            0
        }
        Err(err) => {
            print_error(program, &code_str, &Program::parse(&code_str), &err);
            err.exit_code()
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} check "<code>"
  {0} check --file <PATH>

Options:
  --file,  -f <PATH>  Read Brainfuck code from PATH instead of positional "<code>"
  --help,  -h         Show this help

Description:
  Validates that every '[' has a matching ']' without running the program.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
