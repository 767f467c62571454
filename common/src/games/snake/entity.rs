use std::collections::{HashSet, VecDeque};

use super::types::{Cell, EndReason, Heading};

#[derive(Clone, Debug)]
pub struct Snake {
    pub body: VecDeque<Cell>,
    pub body_set: HashSet<Cell>,
    pub heading: Heading,
    pub death_reason: Option<EndReason>,
    pub score: u32,
}

impl Snake {
    pub fn new(start: Cell, heading: Heading) -> Self {
        Self {
            body: VecDeque::from([start]),
            body_set: HashSet::from([start]),
            heading,
            death_reason: None,
            score: 0,
        }
    }

    /// Builds a snake from head-first cells. Empty input is rejected.
    pub fn from_cells(cells: &[Cell], heading: Heading) -> Result<Self, String> {
        if cells.is_empty() {
            return Err("A snake needs at least one cell".to_string());
        }

        Ok(Self {
            body: cells.iter().copied().collect(),
            body_set: cells.iter().copied().collect(),
            heading,
            death_reason: None,
            score: 0,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.death_reason.is_none()
    }

    pub fn head(&self) -> Cell {
        *self.body.front().expect("Snake body should never be empty")
    }

    pub fn tail(&self) -> Cell {
        *self.body.back().expect("Snake body should never be empty")
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Pushes the new head; the tail is dropped unless the snake grows.
    pub fn advance_to(&mut self, next_head: Cell, grows: bool) {
        if !grows
            && let Some(tail) = self.body.pop_back()
        {
            self.body_set.remove(&tail);
        }
        self.body.push_front(next_head);
        self.body_set.insert(next_head);
    }
}
