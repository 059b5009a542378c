//! Token estimation and history truncation.
//!
//! Uses a character-based heuristic: ~4 characters per token. No real
//! tokenizer; the estimate only shapes the LLM request and never
//! mutates persisted history.

use taskmind_core::message::Message;

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters, rounded down.
pub fn estimate_tokens(text: &str) -> usize {
    text.len() / 4
}

/// Estimate tokens for a single message.
pub fn estimate_message_tokens(message: &Message) -> usize {
    estimate_tokens(&message.content)
}

/// Keep the most recent messages that fit within `max_tokens`.
///
/// Walks from the newest message backward, accumulating estimated cost,
/// and returns the longest contiguous suffix that stays within budget.
/// If everything fits, the input is returned unchanged. The suffix is
/// never empty: when even the newest message alone exceeds the budget
/// it is kept anyway, since a request without the user's message is
/// useless.
pub fn truncate(messages: Vec<Message>, max_tokens: usize) -> Vec<Message> {
    if messages.is_empty() {
        return messages;
    }

    let mut total = 0usize;
    let mut start = messages.len();
    for (i, message) in messages.iter().enumerate().rev() {
        let cost = estimate_message_tokens(message);
        if total + cost > max_tokens {
            break;
        }
        total += cost;
        start = i;
    }

    if start == messages.len() {
        start = messages.len() - 1;
    }

    if start == 0 {
        messages
    } else {
        tracing::debug!(
            kept = messages.len() - start,
            dropped = start,
            "Truncated conversation context to fit token budget"
        );
        messages[start..].to_vec()
    }
}
