use std::collections::HashSet;
use std::str::FromStr;

use crate::games::SessionRng;
use super::snapshot::GameSnapshot;
use super::types::{Cell, Heading};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotStrategy {
    /// Greedy walk towards the food, avoiding cells that kill on the next tick.
    Efficient,
    /// Any heading that survives the next tick.
    Random,
}

impl FromStr for BotStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "efficient" => Ok(BotStrategy::Efficient),
            "random" => Ok(BotStrategy::Random),
            other => Err(format!("Unknown bot strategy '{}', expected efficient or random", other)),
        }
    }
}

pub struct BotController;

impl BotController {
    /// Heading the bot wants for `player` on the next tick, or `None` when the
    /// snake is gone or the game is over.
    pub fn choose_heading(
        strategy: BotStrategy,
        snapshot: &GameSnapshot,
        player: usize,
        rng: &mut SessionRng,
    ) -> Option<Heading> {
        if !snapshot.is_running() {
            return None;
        }
        let snake = snapshot.snakes.get(player)?;
        if !snake.alive {
            return None;
        }

        match strategy {
            BotStrategy::Efficient => Self::efficient_move(snapshot, player, rng),
            BotStrategy::Random => Self::random_safe_move(snapshot, player, rng),
        }
    }

    fn efficient_move(snapshot: &GameSnapshot, player: usize, rng: &mut SessionRng) -> Option<Heading> {
        let Some(food) = snapshot.food else {
            return Self::random_safe_move(snapshot, player, rng);
        };

        let best = Self::safe_moves(snapshot, player)
            .into_iter()
            .min_by_key(|&(_, next)| Self::distance(next, food, snapshot))
            .map(|(heading, _)| heading);

        best.or_else(|| Self::random_safe_move(snapshot, player, rng))
    }

    fn random_safe_move(snapshot: &GameSnapshot, player: usize, rng: &mut SessionRng) -> Option<Heading> {
        let current = snapshot.snakes.get(player)?.heading;
        let safe: Vec<Heading> = Self::safe_moves(snapshot, player)
            .into_iter()
            .map(|(heading, _)| heading)
            .collect();

        Some(rng.choose(&safe).copied().unwrap_or(current))
    }

    fn candidate_headings(snapshot: &GameSnapshot, current: Heading) -> Vec<Heading> {
        let headings: &[Heading] = if snapshot.allows_diagonals {
            &Heading::ALL
        } else {
            &Heading::CARDINALS
        };
        headings
            .iter()
            .copied()
            .filter(|heading| !heading.is_opposite(&current))
            .collect()
    }

    fn safe_moves(snapshot: &GameSnapshot, player: usize) -> Vec<(Heading, Cell)> {
        let Some(snake) = snapshot.snakes.get(player) else {
            return Vec::new();
        };
        let Some(&head) = snake.cells.first() else {
            return Vec::new();
        };
        // The own tail moves away this tick unless the snake eats.
        let own_tail = snake.cells.last().copied().filter(|_| snake.cells.len() > 1);
        let blocked: HashSet<Cell> = snapshot.blocked_cells().collect();

        Self::candidate_headings(snapshot, snake.heading)
            .into_iter()
            .filter_map(|heading| {
                let next = snapshot.grid.advance(head, heading, snapshot.wrap).ok()?;
                let vacated = own_tail == Some(next) && snapshot.food != Some(next);
                (vacated || !blocked.contains(&next)).then_some((heading, next))
            })
            .collect()
    }

    fn distance(a: Cell, b: Cell, snapshot: &GameSnapshot) -> i32 {
        let mut dx = (a.x - b.x).abs();
        let mut dy = (a.y - b.y).abs();

        if snapshot.wrap {
            dx = dx.min(snapshot.grid.width - dx);
            dy = dy.min(snapshot.grid.height - dy);
        }

        if snapshot.allows_diagonals {
            dx.max(dy)
        } else {
            dx + dy
        }
    }
}
