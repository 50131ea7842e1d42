#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let _ = salesdesk_mcp::first_json_data_line(&s);
    let _ = salesdesk_mcp::decode("text/event-stream", &s);
    let _ = salesdesk_mcp::decode("application/json", &s);
});
