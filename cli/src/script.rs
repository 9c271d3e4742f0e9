//! Non-interactive execution of a command file.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    command,
    session::{Flow, Session},
};

#[derive(Error, Debug)]
pub(crate) enum ScriptError {
    #[error("cannot read script {}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}, column {column}: expected {expected}")]
    Parse {
        line: usize,
        column: usize,
        expected: String,
    },
    #[error("failed to write output")]
    Output(#[from] io::Error),
}

pub(crate) fn load_script(path: &Path) -> Result<String, ScriptError> {
    fs::read_to_string(path).map_err(|source| ScriptError::Load {
        path: path.to_owned(),
        source,
    })
}

/// Executes `src` line by line and returns the number of commands run.
///
/// Stops at the first unparsable line or at `quit`.
pub(crate) fn run_script(
    src: &str,
    session: &mut Session<impl io::Write>,
) -> Result<usize, ScriptError> {
    let mut executed = 0;
    for (i, line) in src.lines().enumerate() {
        let parsed = command::parse_command(line).map_err(|e| ScriptError::Parse {
            line: i + 1,
            column: e.location.column,
            expected: e.expected.to_string(),
        })?;
        let Some(parsed) = parsed else {
            continue;
        };
        log::trace!("line {}: {parsed:?}", i + 1);
        executed += 1;
        if session.execute(parsed)? == Flow::Quit {
            break;
        }
    }
    Ok(executed)
}
