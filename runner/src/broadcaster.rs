use tokio::sync::mpsc;

use snake_common::games::GameBroadcaster;
use snake_common::games::snake::{GameOverSummary, GameSnapshot};
use snake_common::log;

#[derive(Debug)]
pub enum SessionEvent {
    State(GameSnapshot),
    GameOver(GameOverSummary),
}

/// Forwards everything the session publishes to the runner's main loop.
#[derive(Clone)]
pub struct ChannelBroadcaster {
    sender: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelBroadcaster {
    pub fn new(sender: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { sender }
    }

    fn send(&self, event: SessionEvent) {
        if let Err(e) = self.sender.send(event) {
            log!("Dropping session event, runner is gone: {:?}", e.0);
        }
    }
}

impl GameBroadcaster for ChannelBroadcaster {
    async fn broadcast_state(&self, snapshot: GameSnapshot) {
        self.send(SessionEvent::State(snapshot));
    }

    async fn broadcast_game_over(&self, summary: GameOverSummary) {
        self.send(SessionEvent::GameOver(summary));
    }
}
