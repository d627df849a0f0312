//! Shared CLI helpers.

use console::style;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::Config;
use crate::error::PipelineError;
use crate::repository::DbContext;

/// Open the configured database, creating the schema if needed.
pub async fn open_db(config: &Config) -> anyhow::Result<DbContext> {
    let path = config.database_path();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let ctx = DbContext::new(&path);
    ctx.init_schema().await?;
    Ok(ctx)
}

/// A token cancelled on Ctrl+C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, cancelling");
            trigger.cancel();
        }
    });
    cancel
}

/// Print the outcome of a stage that aborted.
pub fn report_stage_error(stage: &str, err: &PipelineError) {
    if err.is_cancelled() {
        println!("{} {} cancelled", style("!").yellow(), stage);
    } else {
        println!("{} {} failed: {}", style("✗").red(), stage, err);
    }
}
