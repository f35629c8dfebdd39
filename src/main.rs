use anyhow::Result;
use growthtrack::{cli::run_cli, utils::runtime::single_thread_runtime};
use tracing::error;

fn main() -> Result<()> {
    single_thread_runtime()?
        .block_on(run_cli())
        .inspect_err(|e| {
            error!("Error running cli {e:?}");
        })?;
    Ok(())
}
