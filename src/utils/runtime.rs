use anyhow::Result;

/// Every invocation is short lived and sequential, one thread is all it needs.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
