//! Logging setup and report files

use color_eyre::eyre::{Result, WrapErr};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, fmt::writer::BoxMakeWriter,
    layer::SubscriberExt, util::SubscriberInitExt, Registry,
};

/// Wall-clock HH:MM:SS timestamps (UTC)
struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() % 86_400)
            .unwrap_or_default();
        write!(w, "{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
    }
}

/// Send log records to `output_path`, or to stdout when it is None.
pub fn setup_output(output_path: Option<&String>) -> Result<()> {
    let (writer, ansi) = match output_path {
        Some(path) => {
            let log = File::create(path)
                .wrap_err_with(|| format!("Could not create output file: {}", path))?;
            (BoxMakeWriter::new(Mutex::new(log)), false)
        }
        None => (BoxMakeWriter::new(std::io::stdout), true),
    };

    Registry::default()
        .with(
            layer()
                .with_writer(writer)
                .with_timer(ClockTime)
                .with_ansi(ansi),
        )
        .try_init()
        .wrap_err("Failed to install the log subscriber")?;

    match output_path {
        Some(path) => info!("Output will be written to: {}", path),
        None => info!("Output will be printed to stdout"),
    }
    Ok(())
}

/// Write the run report as pretty-printed JSON
pub fn write_report<T: Serialize>(path: &str, report: &T) -> Result<()> {
    let file =
        File::create(path).wrap_err_with(|| format!("Could not create report file: {}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .wrap_err_with(|| format!("Failed to write report to {}", path))?;
    info!("Report written to {}", path);
    Ok(())
}
