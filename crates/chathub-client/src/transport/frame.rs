//! Record framing for the socket sub-protocol.

/// Terminates every JSON record on the wire.
pub const RECORD_SEPARATOR: char = '\u{1e}';

pub const HANDSHAKE_FRAME: &str = r#"{"protocol":"json","version":1}"#;
pub const PING_FRAME: &str = r#"{"type":6}"#;

/// Append the record separator.
pub(crate) fn encode_frame(payload: &str) -> String {
    let mut frame = String::with_capacity(payload.len() + 1);
    frame.push_str(payload);
    frame.push(RECORD_SEPARATOR);
    frame
}

/// Split one socket message into its non-empty records.
///
/// Records are delimited by the record separator or by newlines.
pub fn split_records(batch: &str) -> Vec<String> {
    batch
        .split(|c| c == RECORD_SEPARATOR || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a keep-alive ping is due at `now_secs` (unix seconds).
pub(crate) fn keep_alive_due(now_secs: u64, period_secs: u64) -> bool {
    period_secs != 0 && now_secs % period_secs == 0
}

pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
