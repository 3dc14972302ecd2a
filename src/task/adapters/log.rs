//! Notifier that writes outbound messages to the tracing log.

use async_trait::async_trait;
use tracing::info;

use crate::task::ports::{Notification, Notifier, NotifierResult};

/// Logs every outbound message instead of handing it to a gateway.
///
/// Useful when the chat gateway runs out of process and consumes the log,
/// and for local runs of the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: &Notification) -> NotifierResult<()> {
        let actions: Vec<&str> = notification
            .actions
            .iter()
            .map(|action| action.id.as_str())
            .collect();
        info!(
            recipient = %notification.recipient,
            actions = ?actions,
            "outbound message:\n{}",
            notification.body
        );
        Ok(())
    }
}
