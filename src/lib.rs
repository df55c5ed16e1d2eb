// src/lib.rs
pub mod aggregate;
pub mod config;
pub mod error;
pub mod report;
pub mod source;

use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

pub use aggregate::{AggregateStats, UserDepartmentMap};
pub use config::Config;
pub use error::ExtractError;

/// What a completed run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: AggregateStats,
    pub lines: usize,
}

/// Read the configured export, fold it into a user → department map and
/// write the sorted report to `out`. Nothing is written unless the whole
/// input was read successfully.
#[tracing::instrument(level = "info", skip_all, fields(input = %config.input.display()))]
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<RunSummary> {
    let mut src = source::RecordSource::open(&config.input)?;
    info!(
        path = %src.path().display(),
        columns = src.headers().len(),
        "opened export"
    );

    let (map, stats) = aggregate::fold_records(src.records())?;
    drop(src);
    info!(
        rows = stats.rows,
        kept = stats.kept,
        skipped = stats.skipped(),
        overwritten = stats.overwritten,
        users = map.len(),
        "aggregated"
    );

    let lines = report::write_report(&map, out).context("writing report")?;
    info!(lines, "report written");
    Ok(RunSummary { stats, lines })
}
