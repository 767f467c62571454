use std::time::Duration;

use crate::config::Validate;
use crate::games::SessionRng;
use crate::log;
use super::direction::PressedKeys;
use super::game_state::{SnakeGameState, TickEvent};
use super::mode::{GameMode, ModeRules};
use super::progression::tick_interval;
use super::settings::SnakeSettings;
use super::snapshot::{GameOverSummary, GameSnapshot};

pub const MAX_LEVEL: u32 = 99;

#[derive(Clone, Debug, PartialEq)]
pub struct TickOutcome {
    pub events: Vec<TickEvent>,
    pub snapshot: GameSnapshot,
}

/// Sole owner of a game's state. Holds no timers: whoever schedules ticks
/// asks `tick_interval` how long to wait before the next `tick`.
pub struct SnakeEngine {
    settings: SnakeSettings,
    rules: ModeRules,
    start_level: u32,
    rng: SessionRng,
    state: SnakeGameState,
}

impl SnakeEngine {
    pub fn start(mode: GameMode, level: u32, settings: SnakeSettings, seed: u64) -> Result<Self, String> {
        settings.validate()?;
        validate_level(level)?;

        let rules = ModeRules::for_mode(mode, &settings);
        let mut rng = SessionRng::new(seed);
        let state = SnakeGameState::new(
            rules.clone(),
            settings.grid(),
            level,
            settings.initial_food,
            &mut rng,
        );

        log!(
            "Starting {} on a {}x{} grid at level {} (seed {})",
            mode,
            settings.grid_width,
            settings.grid_height,
            level,
            seed
        );

        Ok(Self {
            settings,
            rules,
            start_level: level,
            rng,
            state,
        })
    }

    /// Throws the current game away and starts over at the starting level.
    pub fn restart(&mut self) {
        self.state = self.fresh_state(self.start_level);
        log!("Restarted {} at level {}", self.rules.mode, self.start_level);
    }

    /// Re-initializes the board one level up. The score carries over.
    pub fn advance_level(&mut self) -> Result<(), String> {
        let next_level = self.state.level + 1;
        validate_level(next_level)?;

        let mut state = self.fresh_state(next_level);
        state.score = self.state.score;
        state.difficulty = state.difficulty.and(self.state.difficulty);
        for (fresh, previous) in state.snakes.iter_mut().zip(&self.state.snakes) {
            fresh.score = previous.score;
        }

        self.state = state;
        log!("Advanced to level {}", next_level);
        Ok(())
    }

    pub fn tick(&mut self, inputs: &[PressedKeys]) -> TickOutcome {
        let events = self.state.update(inputs, &mut self.rng);
        TickOutcome {
            events,
            snapshot: self.snapshot(),
        }
    }

    pub fn expire_speed_boost(&mut self, generation: u64) -> bool {
        let expired = self.state.expire_speed_boost(generation);
        if expired {
            log!("Speed boost {} expired", generation);
        }
        expired
    }

    pub fn tick_interval(&self) -> Duration {
        tick_interval(&self.rules, self.state.level, self.state.speed_boost_active)
    }

    pub fn speed_boost_duration(&self) -> Duration {
        self.rules.speed_boost_duration
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::from(&self.state)
    }

    pub fn summary(&self) -> GameOverSummary {
        GameOverSummary::from(&self.state)
    }

    pub fn state(&self) -> &SnakeGameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut SnakeGameState {
        &mut self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn mode(&self) -> GameMode {
        self.rules.mode
    }

    pub fn player_count(&self) -> usize {
        self.rules.player_count
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    fn fresh_state(&mut self, level: u32) -> SnakeGameState {
        SnakeGameState::new(
            self.rules.clone(),
            self.settings.grid(),
            level,
            self.settings.initial_food,
            &mut self.rng,
        )
    }
}

fn validate_level(level: u32) -> Result<(), String> {
    if !(1..=MAX_LEVEL).contains(&level) {
        return Err(format!("Level must be between 1 and {}, got {}", MAX_LEVEL, level));
    }
    Ok(())
}
