//! Order numbers and the confirmation-email ledger.
//!
//! There is no local order table: the payment intent's metadata is the only
//! durable record of an order. The ledger below is what keeps a reloaded
//! confirmation page from mailing the buyer twice.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;

/// Timestamp-derived order number, e.g. `ORD-1754450000000`.
///
/// Not globally unique by construction; uniqueness in practice comes from
/// millisecond resolution and low order volume. It lives only inside the
/// payment intent metadata.
pub fn order_number() -> String {
    format!("ORD-{}", Utc::now().timestamp_millis())
}

/// Human-readable order date for emails, e.g. "Aug 06, 2025".
pub fn order_date() -> String {
    Utc::now().format("%b %d, %Y").to_string()
}

/// Compare-and-set claim set keyed by payment intent id.
///
/// A confirmation email may only be dispatched by the caller that wins the
/// claim; the claim is released if the send fails so a later poll can retry.
/// This is process-local - the `emailSent` flag written back onto the intent
/// metadata covers restarts, best-effort.
#[derive(Clone, Default)]
pub struct EmailLedger {
    sent: Arc<Mutex<HashSet<String>>>,
}

impl EmailLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim the intent. Returns false if already claimed.
    pub fn try_claim(&self, intent_id: &str) -> bool {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(intent_id.to_string())
    }

    /// Release a claim after a failed send.
    pub fn release(&self, intent_id: &str) {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(intent_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_shape() {
        let n = order_number();
        assert!(n.starts_with("ORD-"));
        assert!(n[4..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn claim_is_exclusive_until_released() {
        let ledger = EmailLedger::new();
        assert!(ledger.try_claim("pi_123"));
        assert!(!ledger.try_claim("pi_123"), "second claim must lose");
        assert!(ledger.try_claim("pi_456"), "other intents unaffected");

        ledger.release("pi_123");
        assert!(ledger.try_claim("pi_123"), "released claim can be retaken");
    }
}
