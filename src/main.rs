use anyhow::Result;
use deptroster::{run, Config};
use std::io::{self, BufWriter};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging (stderr; stdout carries the report) ─────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,deptroster=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) configure input ──────────────────────────────────────────
    let config = Config::from_args(std::env::args().skip(1))?;
    info!(input = %config.input.display(), "startup");

    // ─── 3) read, aggregate, report ──────────────────────────────────
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = run(&config, &mut out)?;

    info!(users = summary.lines, "all done");
    Ok(())
}
