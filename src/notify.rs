use tokio::sync::mpsc;

use crate::models::{Notification, NotificationCategory};

/// Receives user-facing events from the controller; rendering is up to the implementor
pub trait Notifier: Send {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.category {
            NotificationCategory::System => {
                tracing::info!(target: "nexusbot::ui", "[SYS] {}", notification.message)
            }
            NotificationCategory::Buy => {
                tracing::info!(target: "nexusbot::ui", "[BUY] {}", notification.message)
            }
            NotificationCategory::Sell => {
                tracing::info!(target: "nexusbot::ui", "[SELL] {}", notification.message)
            }
        }
    }
}

/// Forwards notifications to a UI task over a channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // A closed UI must not stop trading
        if self.sender.send(notification).is_err() {
            tracing::debug!("Notification receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_notifier_forwards() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notification::system("hello"));

        let received = rx.try_recv().unwrap();
        assert_eq!(received.message, "hello");
        assert_eq!(received.category, NotificationCategory::System);
    }

    #[test]
    fn test_channel_notifier_ignores_closed_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notification::system("nobody listening"));
    }
}
