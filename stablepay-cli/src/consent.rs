use async_trait::async_trait;
use stablepay_core::consent::{ConsentGate, ConsentRequest};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Asks on the terminal. Anything but an explicit yes, including EOF,
/// declines.
pub(crate) struct TerminalConsent;

#[async_trait]
impl ConsentGate for TerminalConsent {
    async fn request_consent(&self, request: &ConsentRequest) -> bool {
        let mut stderr = tokio::io::stderr();
        let prompt = format!("{request}\nProceed? [y/N] ");
        if stderr.write_all(prompt.as_bytes()).await.is_err() || stderr.flush().await.is_err() {
            return false;
        }

        let mut line = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&line),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
