use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;

use vendor_summary::presenter::{csv_export, EXPORT_FILE_NAME};
use vendor_summary::session::events::{SetEndDate, SetStartDate, Upload};
use vendor_summary::session::interactive::{render_outcome, run_loop};
use vendor_summary::session::{Outcome, Session};

#[derive(Parser, Debug)]
#[command(name = "vendor-summary", version, about = "Summarize a transaction export by vendor")]
struct Cli {
    /// Transactions CSV with `Transaction date`, `Company`, `Credit` and `Debit` columns
    #[arg(required_unless_present = "interactive")]
    file: Option<PathBuf>,

    /// First day of the window, defaults to the earliest transaction
    #[arg(long, value_name = "YYYY-MM-DD")]
    start: Option<NaiveDate>,

    /// Last day of the window, defaults to the latest transaction
    #[arg(long, value_name = "YYYY-MM-DD")]
    end: Option<NaiveDate>,

    /// Write the vendor table as CSV, to `vendor_summary.csv` unless given `--export=PATH`
    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = EXPORT_FILE_NAME
    )]
    export: Option<PathBuf>,

    /// Read commands from stdin and re-run the report after every change
    #[arg(short, long)]
    interactive: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut session = Session::new();
    if let Some(file) = &cli.file {
        if let Err(err) = session.apply(Upload::from_path(file).into()) {
            fail(&err.to_string(), cli.interactive);
        }
    }
    if let Some(start) = cli.start {
        session.apply(SetStartDate::new(start).into())?;
    }
    if let Some(end) = cli.end {
        session.apply(SetEndDate::new(end).into())?;
    }

    if cli.interactive {
        let stdin = io::stdin();
        return run_loop(&mut session, stdin.lock(), io::stdout());
    }

    let outcome = session.run();
    if let Outcome::Rejected(err) = &outcome {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
    println!("{}", render_outcome(&outcome));

    if let (Some(path), Outcome::Report(summary)) = (&cli.export, &outcome) {
        if let Some(bytes) = csv_export(summary)? {
            File::create(path)?.write_all(&bytes)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn fail(message: &str, interactive: bool) {
    if interactive {
        // The loop starts without a file, the user can load another one.
        println!("error: {}", message);
        return;
    }

    eprintln!("error: {}", message);
    std::process::exit(1);
}
