use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

pub const CLI_PREFIX: &str = "cli";

/// Number of daily log files kept in the state directory.
const KEPT_LOG_FILES: usize = 5;

const DEFAULT_LEVEL: &str = "debug";

/// Only this crate's events are logged, other crates (clap, tokio) stay quiet.
fn crate_filter(level: &str) -> String {
    format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"))
}

/// `--log` wins over `RUST_LOG`, which wins over [DEFAULT_LEVEL]. A `RUST_LOG` holding full
/// directives (`growthtrack=info,fs4=debug`) is used as is.
fn resolve_filter(log_level: Option<LevelFilter>, env_filter: Option<String>) -> String {
    match (log_level, env_filter) {
        (Some(level), _) => crate_filter(&level.to_string()),
        (None, Some(directives)) if directives.contains('=') => directives,
        (None, Some(level)) if !level.is_empty() => crate_filter(&level),
        _ => crate_filter(DEFAULT_LEVEL),
    }
}

/// Every invocation appends to a daily rotated file under `state_dir/logs`. Stdout carries command
/// output (`analytics` dumps JSON there), so with `echo_stderr` events are copied to stderr.
pub fn enable_logging(
    prefix: &str,
    state_dir: &Path,
    log_level: Option<LevelFilter>,
    echo_stderr: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(KEPT_LOG_FILES)
        .filename_prefix(prefix)
        .build(state_dir.join("logs"))?;

    let stderr = std::io::stderr.with_filter(move |_| echo_stderr);
    let filter = resolve_filter(log_level, std::env::var("RUST_LOG").ok());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stderr.and(appender))
        .pretty()
        .init();
    Ok(())
}

/// Deref once at the start of a test to route this crate's events to the test output.
pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(crate_filter("trace")))
        .with_test_writer()
        .compact()
        .init()
});
