#![no_main]

use libfuzzer_sys::fuzz_target;
use radio_codeplug::protocol::{NoProgress, Session};
use radio_codeplug::transport::ScriptedTransport;
use radio_codeplug::SessionConfig;
use std::time::Duration;

fuzz_target!(|data: &[u8]| {
    // Arbitrary radio replies must fail cleanly, never panic
    let mut port = ScriptedTransport::new(38_400);
    for chunk in data.chunks(257) {
        port.reply(chunk.to_vec());
    }
    let config = SessionConfig {
        handshake_poll_interval: Duration::ZERO,
        page_retry_backoff: Duration::ZERO,
        ..SessionConfig::default()
    };
    let mut session = Session::new(port, config);
    let _ = session.download(&mut NoProgress);
});
