use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use kindling_core::{AggregateError, StoryView};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Fires the request token when the handler future is dropped, which is how
/// axum signals a vanished client. In-flight upstream work aborts instead
/// of running to completion for nobody.
struct CancelOnDrop(CancellationToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

pub async fn best_stories_handler(
    Path(n): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoryView>>> {
    info!(requested = n, "request received for best stories");

    if n <= 0 {
        return Err(AppError(AggregateError::InvalidCount(n.max(0) as usize)));
    }

    let cancel = CancellationToken::new();
    let _guard = CancelOnDrop(cancel.clone());

    let stories = state.stories().best_stories(n as usize, &cancel).await?;

    info!(returned = stories.len(), "retrieved best stories");
    Ok(Json(stories))
}
