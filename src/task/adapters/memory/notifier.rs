//! In-memory notifier that records outbound messages.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::task::{
    domain::Identity,
    ports::{Notification, Notifier, NotifierError, NotifierResult},
};

/// Notifier that keeps every delivered message in memory.
///
/// Recipients registered with [`RecordingNotifier::fail_for`] are rejected
/// with [`NotifierError::DeliveryFailure`] and are not recorded.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    state: Arc<Mutex<RecordingState>>,
}

#[derive(Debug, Default)]
struct RecordingState {
    delivered: Vec<Notification>,
    failing: HashSet<Identity>,
}

impl RecordingNotifier {
    /// Creates a notifier with no recorded messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later delivery to `recipient` fail.
    pub fn fail_for(&self, recipient: Identity) {
        self.lock().failing.insert(recipient);
    }

    /// Returns a copy of every delivered message, oldest first.
    #[must_use]
    pub fn delivered(&self) -> Vec<Notification> {
        self.lock().delivered.clone()
    }

    /// Returns the messages delivered to one recipient.
    #[must_use]
    pub fn delivered_to(&self, recipient: &Identity) -> Vec<Notification> {
        self.lock()
            .delivered
            .iter()
            .filter(|notification| notification.recipient == *recipient)
            .cloned()
            .collect()
    }

    /// Returns the number of delivered messages.
    #[must_use]
    pub fn delivered_count(&self) -> usize {
        self.lock().delivered.len()
    }

    /// Forgets every delivered message.
    pub fn clear(&self) {
        self.lock().delivered.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> NotifierResult<()> {
        let mut state = self.lock();
        if state.failing.contains(&notification.recipient) {
            return Err(NotifierError::DeliveryFailure {
                recipient: notification.recipient.clone(),
                reason: "recipient configured to fail".to_owned(),
            });
        }
        state.delivered.push(notification.clone());
        Ok(())
    }
}
