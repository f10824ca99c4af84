//! Context window manager.
//!
//! The persistence collaborator hands us the full dialogue; only a
//! bounded suffix goes to the provider. System-role entries are dropped
//! after slicing — the assembled system prompt is the single system
//! message on the wire, so stored system entries never ride along.

use ragline_core::message::{DialogueMessage, PromptMessage, Role};

/// Default maximum number of history messages per request.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Project a bounded suffix of the dialogue onto the wire shape.
///
/// Takes the last `max_messages` entries, removes system-role messages,
/// and drops timestamps and comparison content. Order is preserved.
pub fn window(history: &[DialogueMessage], max_messages: usize) -> Vec<PromptMessage> {
    let start = history.len().saturating_sub(max_messages);
    history[start..]
        .iter()
        .filter(|m| m.role != Role::System)
        .map(PromptMessage::from)
        .collect()
}
