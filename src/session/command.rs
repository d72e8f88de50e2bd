use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

use super::events::{SetEndDate, SetStartDate, Upload};
use super::Event;
use crate::presenter::EXPORT_FILE_NAME;

pub const HELP: &str = "\
commands:
  load <path>      upload a transactions CSV
  start <date>     set the first day of the window (YYYY-MM-DD)
  end <date>       set the last day of the window (YYYY-MM-DD)
  show             print the current report
  export [path]    write the vendor table as CSV (default vendor_summary.csv)
  help             show this message
  quit             leave";

#[derive(Debug, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown command {0:?}, type `help` for a list")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// One line of interactive input.
#[derive(Debug)]
pub enum Command {
    Event(Event),
    Show,
    Export(PathBuf),
    Help,
    Quit,
}

fn parse_date(value: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| CommandError::InvalidDate(value.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, argument) = match line.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (line, ""),
        };

        let required = |name: &'static str| {
            if argument.is_empty() {
                Err(CommandError::MissingArgument(name))
            } else {
                Ok(argument)
            }
        };

        match name {
            "load" => Ok(Command::Event(Upload::from_path(required("load")?).into())),
            "start" => Ok(Command::Event(SetStartDate::new(parse_date(required("start")?)?).into())),
            "end" => Ok(Command::Event(SetEndDate::new(parse_date(required("end")?)?).into())),
            "show" => Ok(Command::Show),
            "export" if argument.is_empty() => Ok(Command::Export(PathBuf::from(EXPORT_FILE_NAME))),
            "export" => Ok(Command::Export(PathBuf::from(argument))),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
