use std::sync::atomic::{AtomicU32, Ordering};

/// Generates correlation tokens for outbound device messages.
///
/// A token packs the low byte of the node identifier with a 12-bit counter
/// in bits 8..20 and renders as five lowercase hex digits. The counter
/// wraps, so tokens repeat after 4096 messages per node.
#[derive(Debug, Default)]
pub struct MsgTokenGenerator {
    node_id: u8,
    counter: AtomicU32,
}

impl MsgTokenGenerator {
    /// Creates a generator for `node_id`; only its low byte is used.
    pub fn new(node_id: i64) -> Self {
        Self {
            node_id: (node_id & 0xff) as u8,
            counter: AtomicU32::new(0),
        }
    }

    /// Node byte carried in every token.
    pub fn node_id(&self) -> u8 {
        self.node_id
    }

    /// Returns the next token.
    pub fn next_token(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let token = u32::from(self.node_id) | ((n << 8) & 0xfff00);
        format!("{token:05x}")
    }
}
