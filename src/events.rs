use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Named signals the game emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEvent {
    /// Game was initialized and its first task set populated.
    Initialized,
    /// A play-through completed: every task fired.
    Finished,
}

impl GameEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameEvent::Initialized => "initialized",
            GameEvent::Finished => "finished",
        }
    }
}

impl std::fmt::Display for GameEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivers game events to whoever is listening.
pub trait EventBus: Send + Sync {
    fn notify(&self, event: GameEvent);
}

/// Event bus backed by a tokio broadcast channel.
///
/// Events sent while nobody is subscribed are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastBus {
    tx: broadcast::Sender<GameEvent>,
}

impl BroadcastBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new(16)
    }
}

impl EventBus for BroadcastBus {
    fn notify(&self, event: GameEvent) {
        match self.tx.send(event) {
            Ok(listeners) => tracing::debug!("Sent {} to {} listener(s)", event, listeners),
            Err(_) => tracing::debug!("No listeners for {}", event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events_in_order() {
        let bus = BroadcastBus::default();
        let mut rx = bus.subscribe();

        bus.notify(GameEvent::Initialized);
        bus.notify(GameEvent::Finished);

        assert_eq!(rx.recv().await.unwrap(), GameEvent::Initialized);
        assert_eq!(rx.recv().await.unwrap(), GameEvent::Finished);
    }

    #[test]
    fn test_notify_without_listeners_is_silent() {
        let bus = BroadcastBus::new(0);
        bus.notify(GameEvent::Finished);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(GameEvent::Initialized.to_string(), "initialized");
        assert_eq!(
            serde_json::to_string(&GameEvent::Finished).unwrap(),
            "\"finished\""
        );
    }
}
