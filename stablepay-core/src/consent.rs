//! Consent Gate.
//!
//! Nothing that moves funds or grants an allowance is submitted until the
//! user has accepted a [`ConsentRequest`]. Declining and dismissing are the
//! same answer: `false`.

use alloy::primitives::Address;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};

/// What the user is asked to agree to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentRequest {
    pub token: Address,
    pub token_symbol: String,
    pub amount: Decimal,
    pub destination: Address,
    pub chain_id: u64,
    pub native_symbol: String,
    pub is_native: bool,
    /// An approval transaction will be requested before the transfer.
    pub requires_approval: bool,
}

impl std::fmt::Display for ConsentRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Send {} {} to {} on chain {}",
            self.amount, self.token_symbol, self.destination, self.chain_id
        )?;
        if self.requires_approval {
            write!(f, " (an approval transaction is required first)")?;
        }
        Ok(())
    }
}

#[async_trait]
pub trait ConsentGate: Send + Sync {
    /// `true` only on an explicit accept.
    async fn request_consent(&self, request: &ConsentRequest) -> bool;
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct AutoConsent {
    accept: bool,
}

impl AutoConsent {
    pub const fn accept() -> Self {
        Self { accept: true }
    }

    pub const fn decline() -> Self {
        Self { accept: false }
    }
}

#[async_trait]
impl ConsentGate for AutoConsent {
    async fn request_consent(&self, _request: &ConsentRequest) -> bool {
        self.accept
    }
}

/// A consent prompt waiting for an answer from whoever owns the receiver.
#[derive(Debug)]
pub struct PendingConsent {
    pub request: ConsentRequest,
    responder: oneshot::Sender<bool>,
}

impl PendingConsent {
    pub fn respond(self, accepted: bool) {
        let _ = self.responder.send(accepted);
    }
}

/// Forwards each prompt to another task, e.g. a UI event loop.
///
/// Dropping a [`PendingConsent`] without responding, or dropping the
/// receiver, counts as a dismissal.
#[derive(Debug, Clone)]
pub struct ChannelConsent {
    tx: mpsc::Sender<PendingConsent>,
}

impl ChannelConsent {
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<PendingConsent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ConsentGate for ChannelConsent {
    async fn request_consent(&self, request: &ConsentRequest) -> bool {
        let (responder, answer) = oneshot::channel();
        let pending = PendingConsent {
            request: request.clone(),
            responder,
        };
        if self.tx.send(pending).await.is_err() {
            return false;
        }
        answer.await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_registry::NATIVE_SENTINEL;
    use crate::testing::custody;

    fn request() -> ConsentRequest {
        ConsentRequest {
            token: NATIVE_SENTINEL,
            token_symbol: "ETH".to_string(),
            amount: Decimal::new(5, 1),
            destination: custody(),
            chain_id: 1,
            native_symbol: "ETH".to_string(),
            is_native: true,
            requires_approval: false,
        }
    }

    #[tokio::test]
    async fn test_channel_consent_forwards_answer() {
        let (gate, mut rx) = ChannelConsent::new(1);
        let ui = tokio::spawn(async move {
            let pending = rx.recv().await.unwrap();
            assert_eq!(pending.request.chain_id, 1);
            pending.respond(true);
        });
        assert!(gate.request_consent(&request()).await);
        ui.await.unwrap();
    }

    #[tokio::test]
    async fn test_dismissal_is_decline() {
        let (gate, mut rx) = ChannelConsent::new(1);
        let ui = tokio::spawn(async move {
            drop(rx.recv().await.unwrap());
        });
        assert!(!gate.request_consent(&request()).await);
        ui.await.unwrap();

        let (gate, rx) = ChannelConsent::new(1);
        drop(rx);
        assert!(!gate.request_consent(&request()).await);
    }

    #[test]
    fn test_prompt_text_mentions_approval() {
        let mut r = request();
        assert!(!r.to_string().contains("approval"));
        r.requires_approval = true;
        assert!(r.to_string().ends_with("(an approval transaction is required first)"));
    }
}
