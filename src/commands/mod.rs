pub mod check;
pub mod run;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;

/// Where a subcommand gets its Brainfuck source from.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,
}

/// Outcome of [`SourceArgs::load`] when no source could be produced.
pub enum LoadError {
    /// Neither or both of `--file` and positional code were given.
    Usage,
    /// The file could not be read; carries the exit status.
    Exit(i32),
}

impl SourceArgs {
    /// Read the whole program text. The file is read in full before anything
    /// is parsed.
    pub fn load(&self, program: &str) -> Result<String, LoadError> {
        match (&self.file, self.code.is_empty()) {
            (None, true) => Err(LoadError::Usage),
            (Some(_), false) => {
                eprintln!("{program}: cannot use positional code together with --file");
                Err(LoadError::Usage)
            }
            (Some(path), true) => fs::read_to_string(path).map_err(|e| {
                eprintln!("{program}: failed to read code file {}: {e}", path.display());
                let _ = io::stderr().flush();
                LoadError::Exit(1)
            }),
            (None, false) => Ok(self.code.join("")),
        }
    }
}
