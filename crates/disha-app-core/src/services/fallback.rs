//! User-facing replies used when the model cannot answer.

pub const RATE_LIMITED_REPLY: &str = "Too many requests. Please try again in a moment.";
pub const TECHNICAL_ERROR_REPLY: &str = "Technical error. Please try again in a moment.";
pub const SAFETY_BLOCKED_REPLY: &str =
    "I cannot answer that as it flagged my safety guidelines. Let's try asking something else.";
pub const GENERIC_FAILURE_REPLY: &str = "I apologize, but I'm having trouble processing your request right now. Please try again in a moment.";

const SAFETY_FILTER_REPLY: &str =
    "I'm sorry, I cannot respond to that message due to safety filters.";

/// Pick the fallback for a failed model call from its error text.
///
/// Best-effort substring sniffing: the model client does not expose a
/// stable error taxonomy, so markers are checked in priority order.
pub fn reply_for_model_error(error: &str) -> &'static str {
    let error = error.to_lowercase();
    if error.contains("429") || error.contains("quota") {
        RATE_LIMITED_REPLY
    } else if error.contains("400") || error.contains("key") {
        TECHNICAL_ERROR_REPLY
    } else if error.contains("safety") || error.contains("blocked") {
        SAFETY_BLOCKED_REPLY
    } else {
        GENERIC_FAILURE_REPLY
    }
}

/// Reply for a call that succeeded but produced no text.
pub fn reply_for_empty_output(finish_reason: Option<&str>) -> String {
    match finish_reason {
        Some(reason) if !reason.is_empty() => format!("{SAFETY_FILTER_REPLY} (Reason: {reason})"),
        _ => SAFETY_FILTER_REPLY.to_owned(),
    }
}
