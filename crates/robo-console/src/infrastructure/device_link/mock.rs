//! Scripted device link for tests.
//!
//! Acknowledgments are taken from a queue; when the queue runs dry the
//! default answer is used.  Every call is recorded.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use robo_core::{ControlAction, Tablet, TabletId};

use crate::application::ports::DeviceLink;

/// A [`DeviceLink`] whose answers are chosen by the test.
#[derive(Debug)]
pub struct ScriptedDeviceLink {
    latency: Duration,
    default_ack: bool,
    script: Mutex<VecDeque<bool>>,
    sent: Mutex<Vec<(TabletId, ControlAction)>>,
}

impl ScriptedDeviceLink {
    /// Answers `default_ack` after `latency` unless scripted otherwise.
    pub fn new(latency: Duration, default_ack: bool) -> Self {
        Self {
            latency,
            default_ack,
            script: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Queues the answers for the next calls, in order.
    pub fn push_outcomes(&self, outcomes: impl IntoIterator<Item = bool>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(outcomes);
    }

    /// Every `(tablet, action)` sent so far.
    pub fn sent(&self) -> Vec<(TabletId, ControlAction)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DeviceLink for ScriptedDeviceLink {
    async fn send(&self, tablet: &Tablet, action: ControlAction) -> bool {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((tablet.id.clone(), action));
        tokio::time::sleep(self.latency).await;
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.default_ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::backend::placeholder::placeholder_tablets;

    #[tokio::test(start_paused = true)]
    async fn test_scripted_outcomes_then_default() {
        // Arrange
        let link = ScriptedDeviceLink::new(Duration::from_millis(5), true);
        link.push_outcomes([false, false]);
        let tablet = placeholder_tablets().remove(1);

        // Act
        let answers = [
            link.send(&tablet, ControlAction::TurnOn).await,
            link.send(&tablet, ControlAction::TurnOn).await,
            link.send(&tablet, ControlAction::Restart).await,
        ];

        // Assert
        assert_eq!(answers, [false, false, true]);
        let sent = link.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[2], ("dummy2".to_string(), ControlAction::Restart));
    }
}
