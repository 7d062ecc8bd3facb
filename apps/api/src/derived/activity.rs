use chrono::{DateTime, Utc};

use crate::models::application::{ApplicationRow, CommentRow};
use crate::models::stage::StageEntryRow;

/// Most recent touch on an application: its own `updated_at`, the latest
/// ledger append, or the latest comment. Used for sorting and display only.
pub fn last_activity(
    app: &ApplicationRow,
    entries: &[StageEntryRow],
    comments: &[CommentRow],
) -> DateTime<Utc> {
    let latest_entry = entries.iter().map(|e| e.created_at).max();
    let latest_comment = comments.iter().map(|c| c.created_at).max();

    [Some(app.updated_at), latest_entry, latest_comment]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(app.updated_at)
}
