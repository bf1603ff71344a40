//! Runs a rewrite on a background thread and applies its result when it arrives.

use std::sync::Arc;
use std::sync::mpsc::{self, TryRecvError};
use std::time::Instant;
use tokio::runtime::Runtime;

use crate::core::completion::{CompletionClient, CompletionError, CompletionRequest};
use crate::core::config::Config;
use crate::core::editor::RewriteJob;

use crate::tui::app::{App, PendingRewrite};

/// Spawn the completion for `job`. The editor is only touched again in [`poll_rewrite`].
pub(super) fn spawn_rewrite(rt: &Arc<Runtime>, config: Arc<Config>, job: RewriteJob) -> PendingRewrite {
    let (result_tx, result_rx) = mpsc::channel();
    let rt_clone = Arc::clone(rt);
    let request = job.request;
    std::thread::spawn(move || {
        let result = rt_clone.block_on(improve(config.as_ref(), &request));
        let _ = result_tx.send(result);
    });
    PendingRewrite {
        target: job.target,
        result_rx,
        started_at: Instant::now(),
    }
}

async fn improve(config: &Config, request: &CompletionRequest) -> Result<String, CompletionError> {
    let client = CompletionClient::from_config(config)?;
    client.improve(request).await
}

/// Check the running rewrite, if any, and commit or report its result.
pub(crate) fn poll_rewrite(app: &mut App) {
    let Some(pending) = app.pending_rewrite.as_ref() else {
        return;
    };
    let result = match pending.result_rx.try_recv() {
        Ok(result) => result,
        Err(TryRecvError::Empty) => return,
        Err(TryRecvError::Disconnected) => {
            app.pending_rewrite = None;
            app.show_error("Rewrite stopped unexpectedly");
            return;
        }
    };
    let target = pending.target;
    let elapsed = pending.started_at.elapsed();
    app.pending_rewrite = None;
    match app.editor.finish_rewrite(target, result) {
        Ok(()) => app.show_info(format!(
            "Message {} rewritten ({:.1}s)",
            target.message_index,
            elapsed.as_secs_f32()
        )),
        Err(e) => app.show_error(format!("Rewrite failed: {}", e)),
    }
}
