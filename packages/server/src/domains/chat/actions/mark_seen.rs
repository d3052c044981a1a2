//! Mark messages as seen.

use serde_json::json;
use tracing::info;

use crate::common::auth::{RuleContext, Viewer};
use crate::common::{AppError, MessageId};
use crate::domains::chat::models::MARK_SEEN;
use crate::kernel::ServerDeps;

/// Set `seen = true` on the given messages, skipping any the caller
/// authored. Succeeds regardless of how many (if any) matched; the flag is
/// one-way and never resets.
pub async fn mark_messages_as_seen(
    message_ids: &[MessageId],
    viewer: &Viewer,
    deps: &ServerDeps,
) -> Result<(), AppError> {
    let ctx = RuleContext::new(
        Some(viewer.clone()),
        json!({ "messageIds": message_ids }),
        deps.graph.clone(),
    );
    deps.guard
        .assert("Mutation", "MarkMessagesAsSeen", &ctx)
        .await?;

    info!(count = message_ids.len(), user_id = %viewer.id, "Marking messages as seen");

    let ids: Vec<String> = message_ids.iter().map(MessageId::to_string).collect();
    let mut tx = deps.graph.write_transaction().await?;
    tx.run(MARK_SEEN, json!({ "messageIds": ids, "userId": viewer.id }))
        .await?;
    tx.commit().await?;

    Ok(())
}
