use serde_json::Value;
use tracing::warn;

const DATA_PREFIX: &str = "data: ";

/// Payloads of every `data: ` line in an event-stream body, in order.
///
/// Each line is treated on its own; multi-line events are not joined because the
/// servers we talk to emit one JSON-RPC message per `data:` line.
pub fn data_lines(body: &str) -> impl Iterator<Item = &str> {
    body.lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter_map(|l| l.strip_prefix(DATA_PREFIX))
}

/// First `data: ` payload that parses as JSON. Unparseable lines are skipped.
pub fn first_json_data_line(body: &str) -> Option<Value> {
    data_lines(body).find_map(|payload| match serde_json::from_str::<Value>(payload) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(error = %e, "skipping unparseable event-stream line");
            None
        }
    })
}
