//! Client request normalization.

use crate::protocol::messages::{unix_secs, ClientRequest, UpstreamRequest};

/// Cut `message` down to at most `max_len` bytes.
///
/// The cut backs off to the previous UTF-8 character boundary, so the result is
/// always a prefix of the input.
pub fn truncate_message(message: &str, max_len: usize) -> &str {
    if message.len() <= max_len {
        return message;
    }
    let mut end = max_len;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

/// Build the backend request for a parsed client request.
///
/// An absent or empty message produces no `sms` field.
pub fn to_upstream(request: &ClientRequest, max_message_len: usize) -> UpstreamRequest {
    let sms = request
        .message
        .as_deref()
        .filter(|m| !m.is_empty())
        .map(|m| truncate_message(m, max_message_len).to_string());

    UpstreamRequest {
        request_id: request.tx_id.clone(),
        node_id: request.wallet_id.clone(),
        sms,
        timestamp: unix_secs(),
    }
}
