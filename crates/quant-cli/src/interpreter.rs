use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use quant_core::QuantSystem;

use crate::parser::{Command, parse_line};

/// Counters for one run over an input stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: usize,
    pub errors: usize,
}

/// Execute `command`, returning the text to print on success.
pub fn execute(system: &mut QuantSystem, command: Command) -> quant_core::Result<Option<String>> {
    let reply = match command {
        Command::Skip => return Ok(None),
        Command::Declare(h) => {
            system.declare(&h);
            "OK".to_string()
        }
        Command::Remove(h) => {
            system.remove(&h);
            "OK".to_string()
        }
        Command::Valid(h) => (if system.valid(&h) { "YES" } else { "NO" }).to_string(),
        Command::EnergyCheck(h) => system.energy(&h)?.to_string(),
        Command::EnergySet(h, energy) => {
            system.set_energy(&h, energy)?;
            "OK".to_string()
        }
        Command::Equal(a, b) => {
            system.equal(&a, &b)?;
            "OK".to_string()
        }
    };
    Ok(Some(reply))
}

/// Feed every line of `input` through `system`.
///
/// Replies go to `out`, one `ERROR` per failed line goes to `err`. A final
/// line cut off by end of input is reported as an error and not executed.
pub fn run(
    system: &mut QuantSystem,
    mut input: impl BufRead,
    mut out: impl Write,
    mut err: impl Write,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    let mut line = Vec::new();

    for line_no in 1usize.. {
        line.clear();
        let read = input
            .read_until(b'\n', &mut line)
            .with_context(|| format!("failed to read line {line_no}"))?;
        if read == 0 {
            break;
        }
        if line.pop() != Some(b'\n') {
            tracing::debug!(line_no, "input ended mid-line");
            writeln!(err, "ERROR")?;
            summary.errors += 1;
            break;
        }

        let outcome = parse_line(&line)
            .map_err(|e| e.to_string())
            .and_then(|cmd| execute(system, cmd).map_err(|e| e.to_string()));
        match outcome {
            Ok(None) => {}
            Ok(Some(reply)) => {
                writeln!(out, "{reply}")?;
                summary.executed += 1;
            }
            Err(reason) => {
                tracing::debug!(line_no, %reason, "command failed");
                writeln!(err, "ERROR")?;
                summary.errors += 1;
            }
        }
    }

    out.flush()?;
    Ok(summary)
}
