use std::{
    fs::File,
    io::{self, Write},
    os::fd::AsFd,
};

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use navmon::{DecodedReport, NavStream, ReportHandler, StreamEnd};

mod cli;
mod format;

use cli::{Args, OutputFormat};

/// Writes reports, remembering the first output failure.
struct Printer<W: Write> {
    out: W,
    format: OutputFormat,
    failed: Option<io::Error>,
}

impl<W: Write> Printer<W> {
    fn print(&mut self, report: &DecodedReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", format::text_line(report)),
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, report)?;
                writeln!(self.out)
            },
        }
    }
}

impl<W: Write> ReportHandler for Printer<W> {
    fn handle(&mut self, report: DecodedReport) {
        if self.failed.is_some() {
            return;
        }
        if let Err(e) = self.print(&report) {
            error!("cannot write report: {}", e);
            self.failed = Some(e);
        }
    }
}

fn open_input(args: &Args) -> anyhow::Result<File> {
    match &args.input {
        Some(path) => {
            File::open(path).with_context(|| format!("cannot open {}", path.display()))
        },
        None => {
            let fd = io::stdin()
                .as_fd()
                .try_clone_to_owned()
                .context("cannot duplicate stdin")?;
            Ok(File::from(fd))
        },
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .format_timestamp(None)
        .format_target(false)
        .filter_level(log::LevelFilter::Info)
        .parse_env("NAVDUMP_LOG")
        .init();

    let args = Args::parse();
    let input = open_input(&args)?;
    let mut stream = NavStream::new(input, args.ingest_config());

    let stdout = io::stdout();
    let mut printer = Printer {
        out: io::BufWriter::new(stdout.lock()),
        format: args.format,
        failed: None,
    };

    let end = stream
        .process(&mut printer)
        .context("reading navmon stream")?;
    printer.out.flush().context("flushing output")?;
    if let Some(e) = printer.failed {
        return Err(e).context("writing reports");
    }

    match end {
        StreamEnd::Eof => info!("done"),
        StreamEnd::Timeout => info!("no frame within the timeout, stopping"),
    }
    Ok(())
}
