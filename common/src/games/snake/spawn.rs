use std::collections::HashSet;

use crate::games::SessionRng;
use crate::log;
use super::grid::Grid;
use super::types::Cell;

pub const MAX_RANDOM_ATTEMPTS: usize = 64;

pub struct SpawnPlanner;

impl SpawnPlanner {
    /// Picks a free cell: uniform random draws first, then a full scan of the
    /// free cells once the draws keep landing on occupied ones. `None` means
    /// the grid has no free cell at all.
    pub fn place(occupied: &HashSet<Cell>, grid: &Grid, rng: &mut SessionRng) -> Option<Cell> {
        if occupied.len() < grid.cell_count() {
            for _ in 0..MAX_RANDOM_ATTEMPTS {
                let cell = Cell::new(
                    rng.random_range(0..grid.width),
                    rng.random_range(0..grid.height),
                );
                if !occupied.contains(&cell) {
                    return Some(cell);
                }
            }
        }

        let free: Vec<Cell> = grid.cells().filter(|c| !occupied.contains(c)).collect();
        if !free.is_empty() {
            log!(
                "Random placement gave up after {} draws, picking among {} free cells",
                MAX_RANDOM_ATTEMPTS,
                free.len()
            );
        }
        rng.choose(&free).copied()
    }

    /// Places up to `count` distinct cells. Returns fewer only when the grid runs out.
    pub fn place_batch(
        count: usize,
        occupied: &HashSet<Cell>,
        grid: &Grid,
        rng: &mut SessionRng,
    ) -> Vec<Cell> {
        let mut taken = occupied.clone();
        let mut placed = Vec::with_capacity(count);

        for _ in 0..count {
            let Some(cell) = Self::place(&taken, grid, rng) else {
                break;
            };
            taken.insert(cell);
            placed.push(cell);
        }

        placed
    }
}
