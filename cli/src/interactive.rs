use std::io::{BufRead, Write};

use anyhow::Result;

use crate::{
    command,
    session::{Flow, Session},
};

/// Prompts on `out` and runs each line read from `input` until EOF or quit.
pub(crate) fn execute_interactive(
    session: &mut Session<impl Write>,
    mut input: impl BufRead,
    mut out: impl Write,
) -> Result<()> {
    writeln!(out, "entering interactive. type \"help\" to list commands.")?;
    let mut buf = Vec::new();
    loop {
        write!(out, "(r/w/p/q) > ")?;
        out.flush()?;
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            // EOF
            writeln!(out)?;
            break;
        }
        let Ok(str) = std::str::from_utf8(&buf) else {
            writeln!(out, "invalid input: line is not UTF-8")?;
            continue;
        };
        let parsed = match command::parse_command(str) {
            Ok(Some(p)) => p,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "parse error: expected {}", e.expected)?;
                continue;
            }
        };
        log::debug!("command: {parsed:?}");
        if session.execute(parsed)? == Flow::Quit {
            break;
        }
    }
    writeln!(out, "exiting interactive.")?;
    Ok(())
}
