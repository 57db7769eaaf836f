use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use navmon::{IngestConfig, TowTracking};

#[derive(Parser)]
#[command(author, version, about = "Dump the navigation messages of a navmon stream")]
pub struct Args {
    /// Read frames from this file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Give up when a frame takes longer than this to arrive (ms)
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,

    /// Age Galileo almanacs against each satellite's own time of week
    #[arg(long)]
    pub per_sv_tow: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human readable line per frame
    Text,
    /// One JSON object per frame
    Json,
}

impl Args {
    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            frame_timeout: self.timeout_ms.map(Duration::from_millis),
            tow_tracking: if self.per_sv_tow {
                TowTracking::PerSatellite
            } else {
                TowTracking::Shared
            },
        }
    }
}
