use serde::Serialize;

use super::game_state::SnakeGameState;
use super::grid::Grid;
use super::mode::GameMode;
use super::progression::tick_interval;
use super::types::{Cell, EndReason, GameStatus, Heading, Item};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnakeView {
    pub cells: Vec<Cell>,
    pub heading: Heading,
    pub score: u32,
    pub alive: bool,
}

/// Read-only picture of the game after a tick, for whoever draws it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub tick: u64,
    pub mode: GameMode,
    pub grid: Grid,
    pub wrap: bool,
    pub allows_diagonals: bool,
    pub snakes: Vec<SnakeView>,
    pub food: Option<Cell>,
    pub power_ups: Vec<Item>,
    pub obstacles: Vec<Cell>,
    pub score: u32,
    pub level: u32,
    pub status: GameStatus,
    pub end_reason: Option<EndReason>,
    pub time_left: Option<u32>,
    pub difficulty: Option<f32>,
    pub speed_boost_active: bool,
    pub tick_interval_ms: u64,
}

impl GameSnapshot {
    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    pub fn blocked_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.snakes
            .iter()
            .flat_map(|snake| snake.cells.iter().copied())
            .chain(self.obstacles.iter().copied())
    }
}

impl From<&SnakeGameState> for GameSnapshot {
    fn from(state: &SnakeGameState) -> Self {
        let mut obstacles: Vec<Cell> = state.obstacles.iter().copied().collect();
        obstacles.sort();

        Self {
            tick: state.tick,
            mode: state.rules.mode,
            grid: state.grid,
            wrap: state.rules.wrap,
            allows_diagonals: state.rules.allows_diagonals,
            snakes: state
                .snakes
                .iter()
                .map(|snake| SnakeView {
                    cells: snake.body.iter().copied().collect(),
                    heading: snake.heading,
                    score: snake.score,
                    alive: snake.is_alive(),
                })
                .collect(),
            food: state.food.map(|item| item.position),
            power_ups: state.power_ups.clone(),
            obstacles,
            score: state.score,
            level: state.level,
            status: state.status,
            end_reason: state.status.end_reason(),
            time_left: state.time_left,
            difficulty: state.difficulty,
            speed_boost_active: state.speed_boost_active,
            tick_interval_ms: tick_interval(&state.rules, state.level, state.speed_boost_active).as_millis() as u64,
        }
    }
}

/// Final word on a session, published once when it ends or is stopped.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameOverSummary {
    pub mode: GameMode,
    pub score: u32,
    pub level: u32,
    pub ticks: u64,
    pub player_scores: Vec<u32>,
    /// `None` when the session was stopped while the game was still running.
    pub reason: Option<EndReason>,
}

impl From<&SnakeGameState> for GameOverSummary {
    fn from(state: &SnakeGameState) -> Self {
        Self {
            mode: state.rules.mode,
            score: state.score,
            level: state.level,
            ticks: state.tick,
            player_scores: state.snakes.iter().map(|snake| snake.score).collect(),
            reason: state.status.end_reason(),
        }
    }
}
