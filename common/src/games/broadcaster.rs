use std::future::Future;

use super::snake::{GameOverSummary, GameSnapshot};

/// Sink for everything a running session publishes. Drawing layers, loggers
/// and tests implement this; the session never knows who is listening.
pub trait GameBroadcaster: Send + Sync + Clone + 'static {
    fn broadcast_state(&self, snapshot: GameSnapshot) -> impl Future<Output = ()> + Send;

    fn broadcast_game_over(&self, summary: GameOverSummary) -> impl Future<Output = ()> + Send;
}
