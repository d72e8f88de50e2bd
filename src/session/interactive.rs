use std::fs::File;
use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Result;
use log::info;

use super::command::{Command, HELP};
use super::{Outcome, Session};
use crate::presenter::{csv_export, no_data_notice, render_summary};

/// Text shown for a pipeline outcome.
pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::AwaitingFile => "Upload a transactions CSV to begin (`load <path>`).".to_string(),
        Outcome::AwaitingDates => "Choose a start and end date (`start <date>`, `end <date>`).".to_string(),
        Outcome::Report(summary) => render_summary(summary),
        Outcome::NoData(range) => no_data_notice(*range),
        Outcome::Rejected(err) => format!("error: {}", err),
    }
}

/// Writes the export for the current inputs, returning the message to show.
pub fn export(session: &mut Session, path: &Path) -> Result<String> {
    let outcome = session.run();
    let Outcome::Report(summary) = &outcome else {
        return Ok(render_outcome(&outcome));
    };

    match csv_export(summary)? {
        Some(bytes) => {
            File::create(path)?.write_all(&bytes)?;
            info!("wrote {} bytes to {}", bytes.len(), path.display());
            Ok(format!("Wrote {}", path.display()))
        },
        None => Ok(no_data_notice(summary.range())),
    }
}

/// Reads commands line by line and re-runs the pipeline after every input
/// change, until `quit` or end of input.
pub fn run_loop<R: BufRead, W: Write>(session: &mut Session, input: R, mut output: W) -> Result<()> {
    writeln!(output, "{}", render_outcome(&session.run()))?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let message = match line.parse::<Command>() {
            Ok(Command::Event(event)) => render_outcome(&session.handle(event)),
            Ok(Command::Show) => render_outcome(&session.run()),
            Ok(Command::Export(path)) => match export(session, &path) {
                Ok(message) => message,
                Err(err) => format!("error: export failed: {}", err),
            },
            Ok(Command::Help) => HELP.to_string(),
            Ok(Command::Quit) => break,
            Err(err) => format!("error: {}", err),
        };

        writeln!(output, "{}", message)?;
        output.flush()?;
    }

    Ok(())
}
