//! Common utility functions shared across CLI commands.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};

/// Write machine-readable lines to `out`, surfacing write failures
/// (closed pipe, full disk) as errors instead of panicking.
pub fn write_lines<W, I, S>(out: &mut W, lines: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for line in lines {
        writeln!(out, "{}", line.as_ref()).context("Failed to write output")?;
    }
    out.flush().context("Failed to write output")
}

/// [`write_lines`] to stdout.
pub fn emit<I, S>(lines: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    write_lines(&mut std::io::stdout().lock(), lines)
}

/// Format a Unix timestamp (milliseconds) as a human-readable UTC string.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        _ => format!("{}ms", timestamp_ms),
    }
}

/// Format an age in seconds as `1h 02m`, `3m 05s` or `12s`.
pub fn format_age(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}
