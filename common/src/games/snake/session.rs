use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep};

use crate::games::GameBroadcaster;
use crate::log;
use super::direction::{KeyEvent, PressedKeys, RawKey};
use super::engine::{MAX_LEVEL, SnakeEngine};
use super::game_state::TickEvent;
use super::snapshot::GameOverSummary;

pub const MAX_PLAYERS: usize = 2;

/// Keys currently held by each player. Written by input handlers at any time
/// and sampled once per tick by the session loop.
#[derive(Clone, Default)]
pub struct InputState {
    keys: Arc<Mutex<[PressedKeys; MAX_PLAYERS]>>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn press(&self, player: usize, key: RawKey) {
        self.apply(player, KeyEvent::Press(key)).await;
    }

    pub async fn release(&self, player: usize, key: RawKey) {
        self.apply(player, KeyEvent::Release(key)).await;
    }

    pub async fn apply(&self, player: usize, event: KeyEvent) {
        let mut keys = self.keys.lock().await;
        match keys.get_mut(player) {
            Some(pressed) => pressed.apply(event),
            None => log!("Ignoring {:?} for unknown player {}", event, player),
        }
    }

    /// Replaces a player's whole key set, for callers that compute it themselves.
    pub async fn set(&self, player: usize, pressed: PressedKeys) {
        let mut keys = self.keys.lock().await;
        match keys.get_mut(player) {
            Some(slot) => *slot = pressed,
            None => log!("Ignoring key set for unknown player {}", player),
        }
    }

    pub async fn sample(&self) -> [PressedKeys; MAX_PLAYERS] {
        *self.keys.lock().await
    }

    pub async fn clear(&self) {
        let mut keys = self.keys.lock().await;
        for pressed in keys.iter_mut() {
            pressed.clear();
        }
    }
}

#[derive(Clone)]
pub struct SnakeSessionState {
    pub engine: Arc<Mutex<SnakeEngine>>,
    pub input: InputState,
}

impl SnakeSessionState {
    pub fn new(engine: SnakeEngine, input: InputState) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            input,
        }
    }
}

pub struct SnakeSession;

impl SnakeSession {
    /// Drives the engine until the game ends or `stop_rx` fires. Owns the only
    /// tick interval and the only speed-boost expiry timer of the session.
    pub async fn run(
        state: SnakeSessionState,
        broadcaster: impl GameBroadcaster,
        mut stop_rx: oneshot::Receiver<()>,
    ) -> GameOverSummary {
        let (initial_snapshot, mut period) = {
            let engine = state.engine.lock().await;
            (engine.snapshot(), engine.tick_interval())
        };
        let mut ticker = create_ticker(period);
        let boost_timer = sleep(Duration::ZERO);
        tokio::pin!(boost_timer);
        let mut pending_boost: Option<u64> = None;

        log!("Session started, tick interval {:?}", period);
        let mut running = initial_snapshot.is_running();
        broadcaster.broadcast_state(initial_snapshot).await;

        while running {
            tokio::select! {
                _ = &mut stop_rx => {
                    log!("Session stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let inputs = state.input.sample().await;
                    let mut engine = state.engine.lock().await;
                    let outcome = engine.tick(&inputs);

                    for event in &outcome.events {
                        if let TickEvent::SpeedBoostStarted { generation } = event {
                            boost_timer.as_mut().reset(Instant::now() + engine.speed_boost_duration());
                            pending_boost = Some(*generation);
                        }
                    }

                    let next_period = engine.tick_interval();
                    running = engine.is_running();
                    drop(engine);

                    broadcaster.broadcast_state(outcome.snapshot).await;
                    if running && next_period != period {
                        log!("Tick interval changed from {:?} to {:?}", period, next_period);
                        period = next_period;
                        ticker = create_ticker(period);
                    }
                }
                _ = &mut boost_timer, if pending_boost.is_some() => {
                    if let Some(generation) = pending_boost.take() {
                        let mut engine = state.engine.lock().await;
                        engine.expire_speed_boost(generation);
                        let next_period = engine.tick_interval();
                        drop(engine);

                        if next_period != period {
                            log!("Tick interval changed from {:?} to {:?}", period, next_period);
                            period = next_period;
                            ticker = create_ticker(period);
                        }
                    }
                }
            }
        }

        let summary = state.engine.lock().await.summary();
        match summary.reason {
            Some(reason) => log!("Game over ({}) with score {} at level {}", reason, summary.score, summary.level),
            None => log!("Session ended early with score {} at level {}", summary.score, summary.level),
        }
        broadcaster.broadcast_game_over(summary.clone()).await;
        summary
    }
}

fn create_ticker(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

struct RunningSession {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<GameOverSummary>,
}

/// Owns at most one live session and the engine it drives.
pub struct SessionController<B: GameBroadcaster> {
    broadcaster: B,
    input: InputState,
    engine: Option<Arc<Mutex<SnakeEngine>>>,
    running: Option<RunningSession>,
}

impl<B: GameBroadcaster> SessionController<B> {
    pub fn new(broadcaster: B) -> Self {
        Self {
            broadcaster,
            input: InputState::new(),
            engine: None,
            running: None,
        }
    }

    pub fn input(&self) -> InputState {
        self.input.clone()
    }

    pub fn engine(&self) -> Option<Arc<Mutex<SnakeEngine>>> {
        self.engine.clone()
    }

    pub fn is_active(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// Stops whatever is running and starts a session for `engine`.
    pub async fn start(&mut self, engine: SnakeEngine) {
        self.stop().await;
        let engine = Arc::new(Mutex::new(engine));
        self.engine = Some(engine.clone());
        self.spawn(engine).await;
    }

    pub async fn restart(&mut self) -> Result<(), String> {
        let engine = self.stop_for_reuse().await?;
        engine.lock().await.restart();
        log!("Session restarting");
        self.spawn(engine).await;
        Ok(())
    }

    /// Moves the game one level up and starts a fresh session for it. At the
    /// top level this fails and the live session keeps running.
    pub async fn advance_level(&mut self) -> Result<(), String> {
        let engine = self
            .engine
            .clone()
            .ok_or_else(|| "No game has been started".to_string())?;
        let level = engine.lock().await.state().level;
        if level >= MAX_LEVEL {
            return Err(format!("Already at the last level ({})", MAX_LEVEL));
        }

        self.stop().await;
        engine.lock().await.advance_level()?;
        self.spawn(engine).await;
        Ok(())
    }

    /// Signals the live session to stop and waits for its summary. Calling it
    /// with nothing running returns `None`.
    pub async fn stop(&mut self) -> Option<GameOverSummary> {
        let running = self.running.take()?;
        // The session may already have finished and dropped its receiver.
        let _ = running.stop_tx.send(());
        Self::join(running.handle).await
    }

    /// Waits for the live session to end on its own.
    pub async fn wait(&mut self) -> Option<GameOverSummary> {
        let running = self.running.take()?;
        let RunningSession { stop_tx, handle } = running;
        let summary = Self::join(handle).await;
        drop(stop_tx);
        summary
    }

    async fn stop_for_reuse(&mut self) -> Result<Arc<Mutex<SnakeEngine>>, String> {
        self.stop().await;
        self.engine
            .clone()
            .ok_or_else(|| "No game has been started".to_string())
    }

    async fn spawn(&mut self, engine: Arc<Mutex<SnakeEngine>>) {
        self.input.clear().await;
        let (stop_tx, stop_rx) = oneshot::channel();
        let state = SnakeSessionState {
            engine,
            input: self.input.clone(),
        };
        let broadcaster = self.broadcaster.clone();
        let handle = tokio::spawn(async move { SnakeSession::run(state, broadcaster, stop_rx).await });
        self.running = Some(RunningSession { stop_tx, handle });
    }

    async fn join(handle: JoinHandle<GameOverSummary>) -> Option<GameOverSummary> {
        match handle.await {
            Ok(summary) => Some(summary),
            Err(e) => {
                log!("Session task failed: {}", e);
                None
            }
        }
    }
}
