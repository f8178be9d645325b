use anyhow::Result;

/// Everything in the application runs on a single thread. Blocking stdin reads are the only
/// real waiting that happens.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
