use std::collections::HashSet;

use crate::games::SessionRng;
use crate::log;
use super::collision::{Collision, classify};
use super::direction::{PressedKeys, resolve_heading};
use super::entity::Snake;
use super::grid::Grid;
use super::mode::ModeRules;
use super::progression::{count_down, ramp_difficulty, reaches_level_up};
use super::spawn::SpawnPlanner;
use super::types::{Cell, EndReason, GameStatus, Heading, Item, ItemKind, PowerUpType};

#[derive(Clone, Debug, PartialEq)]
pub enum TickEvent {
    FoodEaten { player: usize, at: Cell },
    LevelUp { level: u32 },
    PowerUpCollected { player: usize, power_up: PowerUpType },
    PowerUpExpired { at: Cell },
    /// The scheduler arms its expiry timer for this generation.
    SpeedBoostStarted { generation: u64 },
    SnakeDied { player: usize, reason: EndReason },
    GameOver { reason: EndReason },
}

struct PlannedMove {
    player: usize,
    next_head: Cell,
    eats: bool,
}

#[derive(Clone, Debug)]
pub struct SnakeGameState {
    pub rules: ModeRules,
    pub grid: Grid,
    pub snakes: Vec<Snake>,
    /// Always `Some` while the game runs; `None` only once the board is full.
    pub food: Option<Item>,
    pub power_ups: Vec<Item>,
    pub obstacles: HashSet<Cell>,
    pub score: u32,
    pub level: u32,
    pub time_left: Option<u32>,
    pub difficulty: Option<f32>,
    pub speed_boost_active: bool,
    pub boost_generation: u64,
    pub tick: u64,
    pub status: GameStatus,
}

impl SnakeGameState {
    pub fn new(
        rules: ModeRules,
        grid: Grid,
        level: u32,
        initial_food: Option<Cell>,
        rng: &mut SessionRng,
    ) -> Self {
        let snakes = start_positions(&grid, rules.player_count)
            .into_iter()
            .map(|(cell, heading)| Snake::new(cell, heading))
            .collect();

        let mut state = Self {
            time_left: rules.uses_time_limit.then_some(rules.time_limit_ticks),
            difficulty: rules.uses_difficulty_ramp.then_some(0.0),
            rules,
            grid,
            snakes,
            food: None,
            power_ups: Vec::new(),
            obstacles: HashSet::new(),
            score: 0,
            level,
            speed_boost_active: false,
            boost_generation: 0,
            tick: 0,
            status: GameStatus::Running,
        };

        let occupied = state.occupied_cells();
        let food_cell = initial_food
            .filter(|cell| grid.contains(*cell) && !occupied.contains(cell))
            .or_else(|| SpawnPlanner::place(&occupied, &grid, rng));

        match food_cell {
            Some(cell) => state.food = Some(Item::food(cell)),
            None => state.status = GameStatus::GameOver(EndReason::BoardFilled),
        }

        state.spawn_level_batches(rng);
        state
    }

    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    /// Every cell a new item must avoid: snake bodies, food, power-ups and obstacles.
    pub fn occupied_cells(&self) -> HashSet<Cell> {
        let mut occupied: HashSet<Cell> = self
            .snakes
            .iter()
            .flat_map(|snake| snake.body.iter().copied())
            .collect();
        occupied.extend(self.food.iter().map(|item| item.position));
        occupied.extend(self.power_ups.iter().map(|item| item.position));
        occupied.extend(self.obstacles.iter().copied());
        occupied
    }

    /// Applies one step. `inputs[i]` holds the keys snake `i` had pressed
    /// when the tick fired. Ticks after game over change nothing.
    pub fn update(&mut self, inputs: &[PressedKeys], rng: &mut SessionRng) -> Vec<TickEvent> {
        let mut events = Vec::new();
        if !self.is_running() {
            return events;
        }

        self.tick += 1;

        for (snake, pressed) in self.snakes.iter_mut().zip(inputs) {
            if let Some(heading) = resolve_heading(*pressed, snake.heading, self.rules.allows_diagonals) {
                snake.heading = heading;
            }
        }

        let mut end_reason = None;
        let moves = match self.plan_moves() {
            Ok(moves) => moves,
            Err(deaths) => {
                for (player, reason) in deaths {
                    self.snakes[player].death_reason = Some(reason);
                    events.push(TickEvent::SnakeDied { player, reason });
                    log!("Snake {} {} at tick {}", player, reason, self.tick);
                    end_reason.get_or_insert(reason);
                }
                Vec::new()
            }
        };

        let eaters = self.apply_moves(&moves, &mut events);
        self.age_power_ups(&mut events);
        let foods_eaten = self.consume_food(&eaters, rng, &mut events);

        if let Some(time_left) = self.time_left {
            let time_left = count_down(time_left, foods_eaten, &self.rules);
            self.time_left = Some(time_left);
            if time_left == 0 {
                end_reason.get_or_insert(EndReason::TimeExpired);
            }
        }

        if let Some(difficulty) = self.difficulty {
            self.difficulty = Some(ramp_difficulty(difficulty, foods_eaten, &self.rules));
        }

        if self.food.is_none() {
            end_reason.get_or_insert(EndReason::BoardFilled);
        }

        if let Some(reason) = end_reason {
            self.finish(reason, &mut events);
        }

        events
    }

    /// Clears the boost if `generation` is still the latest pickup.
    pub fn expire_speed_boost(&mut self, generation: u64) -> bool {
        if !self.speed_boost_active || generation != self.boost_generation {
            return false;
        }
        self.speed_boost_active = false;
        true
    }

    fn finish(&mut self, reason: EndReason, events: &mut Vec<TickEvent>) {
        self.status = GameStatus::GameOver(reason);
        self.speed_boost_active = false;
        events.push(TickEvent::GameOver { reason });
        log!(
            "Game over ({}) after {} ticks: score {}, level {}",
            reason,
            self.tick,
            self.score,
            self.level
        );
    }

    /// Decides every live snake's move against the board as it will look
    /// after the tick. Either all moves are legal or the snakes that die are
    /// returned and nobody moves.
    fn plan_moves(&self) -> Result<Vec<PlannedMove>, Vec<(usize, EndReason)>> {
        let mut moves = Vec::new();
        let mut deaths = Vec::new();

        for (player, snake) in self.snakes.iter().enumerate() {
            if !snake.is_alive() {
                continue;
            }
            match self.grid.advance(snake.head(), snake.heading, self.rules.wrap) {
                Ok(next_head) => moves.push(PlannedMove {
                    player,
                    next_head,
                    eats: self.food.is_some_and(|food| food.position == next_head),
                }),
                Err(reason) => deaths.push((player, reason)),
            }
        }

        let mut bodies: Vec<HashSet<Cell>> = self.snakes.iter().map(|snake| snake.body_set.clone()).collect();
        for planned in &moves {
            let body = &mut bodies[planned.player];
            if !planned.eats {
                body.remove(&self.snakes[planned.player].tail());
            }
            body.insert(planned.next_head);
        }

        for planned in &moves {
            let snake = &self.snakes[planned.player];
            let vacated_tail = (!planned.eats).then(|| snake.tail());
            let other_bodies: Vec<&HashSet<Cell>> = bodies
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != planned.player)
                .map(|(_, body)| body)
                .collect();

            let mut collision = classify(
                planned.next_head,
                &snake.body_set,
                vacated_tail,
                &self.obstacles,
                &other_bodies,
            );
            if collision == Collision::None && self.swaps_heads(planned, &moves) {
                collision = Collision::OtherSnake;
            }
            if let Some(reason) = collision.end_reason() {
                deaths.push((planned.player, reason));
            }
        }

        if deaths.is_empty() {
            Ok(moves)
        } else {
            deaths.sort_by_key(|(player, _)| *player);
            Err(deaths)
        }
    }

    /// Two heads trading cells pass through each other, which counts as a hit.
    fn swaps_heads(&self, planned: &PlannedMove, moves: &[PlannedMove]) -> bool {
        let head = self.snakes[planned.player].head();
        moves.iter().any(|other| {
            other.player != planned.player
                && other.next_head == head
                && planned.next_head == self.snakes[other.player].head()
        })
    }

    /// Moves every snake and collects power-ups. Returns who ate, and where.
    fn apply_moves(&mut self, moves: &[PlannedMove], events: &mut Vec<TickEvent>) -> Vec<(usize, Cell)> {
        let mut eaters = Vec::new();

        for planned in moves {
            self.snakes[planned.player].advance_to(planned.next_head, planned.eats);
            if planned.eats {
                self.food = None;
                eaters.push((planned.player, planned.next_head));
            }

            if let Some(idx) = self.power_ups.iter().position(|item| item.position == planned.next_head) {
                let item = self.power_ups.remove(idx);
                if let ItemKind::PowerUp(power_up) = item.kind {
                    self.apply_power_up(planned.player, power_up, events);
                }
            }
        }

        eaters
    }

    fn consume_food(&mut self, eaters: &[(usize, Cell)], rng: &mut SessionRng, events: &mut Vec<TickEvent>) -> u32 {
        for &(player, at) in eaters {
            self.snakes[player].score += 1;
            self.score += 1;
            events.push(TickEvent::FoodEaten { player, at });
            log!("Snake {} ate food at {}. Score: {}", player, at, self.score);

            if self.food.is_none() {
                self.respawn_food(rng);
            }

            if reaches_level_up(self.score, &self.rules) {
                self.level += 1;
                events.push(TickEvent::LevelUp { level: self.level });
                log!("Level up: {}", self.level);
                self.spawn_level_batches(rng);
            }
        }

        eaters.len() as u32
    }

    fn respawn_food(&mut self, rng: &mut SessionRng) {
        let occupied = self.occupied_cells();
        match SpawnPlanner::place(&occupied, &self.grid, rng) {
            Some(cell) => self.food = Some(Item::food(cell)),
            None => log!("No free cell left for food"),
        }
    }

    fn apply_power_up(&mut self, player: usize, power_up: PowerUpType, events: &mut Vec<TickEvent>) {
        events.push(TickEvent::PowerUpCollected { player, power_up });
        match power_up {
            PowerUpType::Speed => {
                self.speed_boost_active = true;
                self.boost_generation += 1;
                events.push(TickEvent::SpeedBoostStarted {
                    generation: self.boost_generation,
                });
                log!("Snake {} picked up a speed boost", player);
            }
        }
    }

    fn age_power_ups(&mut self, events: &mut Vec<TickEvent>) {
        for item in &mut self.power_ups {
            if let Some(ttl) = item.ttl.as_mut() {
                *ttl = ttl.saturating_sub(1);
            }
        }

        self.power_ups.retain(|item| {
            let expired = item.ttl == Some(0);
            if expired {
                events.push(TickEvent::PowerUpExpired { at: item.position });
            }
            !expired
        });
    }

    /// Replaces power-ups and obstacles with fresh batches of `level` items
    /// in the modes that use them.
    fn spawn_level_batches(&mut self, rng: &mut SessionRng) {
        let count = self.level as usize;

        if self.rules.spawns_obstacles {
            self.obstacles.clear();
            let mut occupied = self.occupied_cells();
            occupied.extend(self.cells_ahead_of_heads());
            let cells = SpawnPlanner::place_batch(count, &occupied, &self.grid, rng);
            self.obstacles.extend(cells);
        }

        if self.rules.spawns_power_ups {
            self.power_ups.clear();
            let occupied = self.occupied_cells();
            let ttl = self.rules.power_up_ttl_ticks;
            self.power_ups = SpawnPlanner::place_batch(count, &occupied, &self.grid, rng)
                .into_iter()
                .map(|cell| Item::power_up(cell, PowerUpType::Speed, ttl))
                .collect();
        }
    }

    fn cells_ahead_of_heads(&self) -> Vec<Cell> {
        self.snakes
            .iter()
            .filter_map(|snake| self.grid.advance(snake.head(), snake.heading, self.rules.wrap).ok())
            .collect()
    }
}

/// One snake starts in the middle heading right, like the classic board.
/// Two snakes start in opposite quarters facing away from each other's row.
fn start_positions(grid: &Grid, player_count: usize) -> Vec<(Cell, Heading)> {
    if player_count <= 1 {
        return vec![(grid.center(), Heading::Right)];
    }

    vec![
        (Cell::new(grid.width / 4, grid.height / 4), Heading::Right),
        (
            Cell::new(grid.width - 1 - grid.width / 4, grid.height - 1 - grid.height / 4),
            Heading::Left,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::snake::direction::RawKey;
    use crate::games::snake::mode::GameMode;
    use crate::games::snake::settings::SnakeSettings;

    fn create_state(mode: GameMode) -> (SnakeGameState, SessionRng) {
        let settings = SnakeSettings::default();
        let mut rng = SessionRng::new(42);
        let rules = ModeRules::for_mode(mode, &settings);
        let state = SnakeGameState::new(rules, settings.grid(), 1, None, &mut rng);
        (state, rng)
    }

    fn place_snake(state: &mut SnakeGameState, cells: &[(i32, i32)], heading: Heading) {
        let cells: Vec<Cell> = cells.iter().map(|&(x, y)| Cell::new(x, y)).collect();
        state.snakes[0] = Snake::from_cells(&cells, heading).unwrap();
    }

    fn place_food(state: &mut SnakeGameState, x: i32, y: i32) {
        state.food = Some(Item::food(Cell::new(x, y)));
    }

    fn no_input() -> [PressedKeys; 2] {
        [PressedKeys::new(); 2]
    }

    fn assert_invariants(state: &SnakeGameState) {
        for snake in &state.snakes {
            assert!(snake.body.iter().all(|cell| state.grid.contains(*cell)));
            if state.is_running() {
                let unique: HashSet<Cell> = snake.body.iter().copied().collect();
                assert_eq!(unique.len(), snake.len());
                assert_eq!(unique, snake.body_set);
            }
        }
    }

    #[test]
    fn test_new_state_defaults() {
        let (state, _) = create_state(GameMode::Classic);
        assert_eq!(state.snakes.len(), 1);
        assert_eq!(state.snakes[0].body, [Cell::new(10, 10)]);
        assert_eq!(state.snakes[0].heading, Heading::Right);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert!(state.is_running());
        assert!(state.power_ups.is_empty());
        assert!(state.obstacles.is_empty());
        assert!(state.time_left.is_none());
        assert!(state.difficulty.is_none());

        let food = state.food.unwrap();
        assert_ne!(food.position, Cell::new(10, 10));
        assert!(state.grid.contains(food.position));
    }

    #[test]
    fn test_initial_food_setting_is_used() {
        let settings = SnakeSettings::default();
        let mut rng = SessionRng::new(1);
        let rules = ModeRules::for_mode(GameMode::Classic, &settings);
        let state = SnakeGameState::new(rules, settings.grid(), 1, Some(Cell::new(15, 15)), &mut rng);
        assert_eq!(state.food.unwrap().position, Cell::new(15, 15));
    }

    #[test]
    fn test_eating_food_grows_and_scores() {
        let (mut state, mut rng) = create_state(GameMode::Classic);
        place_snake(&mut state, &[(10, 10)], Heading::Right);
        place_food(&mut state, 11, 10);

        let events = state.update(&no_input(), &mut rng);

        assert_eq!(state.snakes[0].body, [Cell::new(11, 10), Cell::new(10, 10)]);
        assert_eq!(state.score, 1);
        assert_eq!(state.snakes[0].score, 1);
        assert!(state.is_running());
        let food = state.food.unwrap();
        assert!(!state.snakes[0].body_set.contains(&food.position));
        assert!(events.contains(&TickEvent::FoodEaten { player: 0, at: Cell::new(11, 10) }));
    }

    #[test]
    fn test_length_constant_without_food() {
        let (mut state, mut rng) = create_state(GameMode::Classic);
        place_snake(&mut state, &[(5, 5), (4, 5), (3, 5)], Heading::Right);
        place_food(&mut state, 0, 0);

        state.update(&no_input(), &mut rng);

        assert_eq!(state.snakes[0].body, [Cell::new(6, 5), Cell::new(5, 5), Cell::new(4, 5)]);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_wall_hit_leaves_snake_unchanged() {
        let (mut state, mut rng) = create_state(GameMode::Classic);
        place_snake(&mut state, &[(19, 10), (18, 10)], Heading::Right);
        place_food(&mut state, 0, 0);
        let before = state.snakes[0].body.clone();

        let events = state.update(&no_input(), &mut rng);

        assert_eq!(state.status, GameStatus::GameOver(EndReason::Wall));
        assert_eq!(state.snakes[0].body, before);
        assert!(events.contains(&TickEvent::GameOver { reason: EndReason::Wall }));
    }

    #[test]
    fn test_no_borders_wraps() {
        let (mut state, mut rng) = create_state(GameMode::NoBorders);
        place_snake(&mut state, &[(19, 10)], Heading::Right);
        place_food(&mut state, 5, 5);

        state.update(&no_input(), &mut rng);

        assert_eq!(state.snakes[0].head(), Cell::new(0, 10));
        assert!(state.is_running());

        place_snake(&mut state, &[(0, 3)], Heading::Left);
        state.update(&no_input(), &mut rng);
        assert_eq!(state.snakes[0].head(), Cell::new(19, 3));
    }

    #[test]
    fn test_self_collision_ends_game() {
        let (mut state, mut rng) = create_state(GameMode::Classic);
        // Head at (5,5) heading down into (5,6), which the body still occupies.
        place_snake(
            &mut state,
            &[(5, 5), (6, 5), (6, 6), (5, 6), (4, 6)],
            Heading::Down,
        );
        place_food(&mut state, 0, 0);
        let before = state.snakes[0].body.clone();

        state.update(&no_input(), &mut rng);

        assert_eq!(state.status, GameStatus::GameOver(EndReason::SelfCollision));
        assert_eq!(state.snakes[0].body, before);
    }

    #[test]
    fn test_following_own_tail_is_legal() {
        let (mut state, mut rng) = create_state(GameMode::Classic);
        place_snake(&mut state, &[(5, 5), (6, 5), (6, 6), (5, 6)], Heading::Down);
        place_food(&mut state, 0, 0);

        state.update(&no_input(), &mut rng);

        assert!(state.is_running());
        assert_eq!(state.snakes[0].head(), Cell::new(5, 6));
        assert_invariants(&state);
    }

    #[test]
    fn test_obstacle_collision() {
        let (mut state, mut rng) = create_state(GameMode::Classic);
        place_snake(&mut state, &[(3, 3)], Heading::Right);
        place_food(&mut state, 0, 0);
        state.obstacles.insert(Cell::new(4, 3));

        state.update(&no_input(), &mut rng);

        assert_eq!(state.status, GameStatus::GameOver(EndReason::ObstacleCollision));
    }

    #[test]
    fn test_reversal_input_is_ignored() {
        let (mut state, mut rng) = create_state(GameMode::Classic);
        place_snake(&mut state, &[(5, 5), (4, 5)], Heading::Right);
        place_food(&mut state, 0, 0);

        let inputs = [PressedKeys::from_keys(&[RawKey::Left]), PressedKeys::new()];
        state.update(&inputs, &mut rng);

        assert_eq!(state.snakes[0].heading, Heading::Right);
        assert_eq!(state.snakes[0].head(), Cell::new(6, 5));
        assert!(state.is_running());
    }

    #[test]
    fn test_turn_input_is_committed() {
        let (mut state, mut rng) = create_state(GameMode::Classic);
        place_snake(&mut state, &[(5, 5)], Heading::Right);
        place_food(&mut state, 0, 0);

        let inputs = [PressedKeys::from_keys(&[RawKey::Up]), PressedKeys::new()];
        state.update(&inputs, &mut rng);

        assert_eq!(state.snakes[0].heading, Heading::Up);
        assert_eq!(state.snakes[0].head(), Cell::new(5, 4));
    }

    #[test]
    fn test_ticks_after_game_over_are_noops() {
        let (mut state, mut rng) = create_state(GameMode::Classic);
        place_snake(&mut state, &[(19, 10)], Heading::Right);
        state.update(&no_input(), &mut rng);
        let tick = state.tick;

        let events = state.update(&no_input(), &mut rng);

        assert!(events.is_empty());
        assert_eq!(state.tick, tick);
        assert_eq!(state.status, GameStatus::GameOver(EndReason::Wall));
    }

    #[test]
    fn test_level_up_every_five_points() {
        let (mut state, mut rng) = create_state(GameMode::Classic);
        place_snake(&mut state, &[(2, 2)], Heading::Right);
        state.score = 4;
        place_food(&mut state, 3, 2);

        let events = state.update(&no_input(), &mut rng);

        assert_eq!(state.score, 5);
        assert_eq!(state.level, 2);
        assert!(events.contains(&TickEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn test_time_attack_expiry() {
        let (mut state, mut rng) = create_state(GameMode::TimeAttack);
        assert_eq!(state.time_left, Some(300));
        place_snake(&mut state, &[(5, 5)], Heading::Right);
        place_food(&mut state, 0, 0);
        state.time_left = Some(1);

        state.update(&no_input(), &mut rng);

        assert_eq!(state.time_left, Some(0));
        assert_eq!(state.status, GameStatus::GameOver(EndReason::TimeExpired));
    }

    #[test]
    fn test_time_attack_food_adds_bonus() {
        let (mut state, mut rng) = create_state(GameMode::TimeAttack);
        place_snake(&mut state, &[(5, 5)], Heading::Right);
        place_food(&mut state, 6, 5);
        state.time_left = Some(1);

        state.update(&no_input(), &mut rng);

        assert_eq!(state.time_left, Some(5));
        assert!(state.is_running());
    }

    #[test]
    fn test_time_attack_collision_reason_wins() {
        let (mut state, mut rng) = create_state(GameMode::TimeAttack);
        place_snake(&mut state, &[(19, 5)], Heading::Right);
        state.time_left = Some(1);

        state.update(&no_input(), &mut rng);

        assert_eq!(state.time_left, Some(0));
        assert_eq!(state.status, GameStatus::GameOver(EndReason::Wall));
    }

    #[test]
    fn test_survival_difficulty_ramps() {
        let (mut state, mut rng) = create_state(GameMode::Survival);
        assert_eq!(state.obstacles.len(), 1);
        state.obstacles.clear();
        place_snake(&mut state, &[(5, 5)], Heading::Right);
        place_food(&mut state, 6, 5);

        state.update(&no_input(), &mut rng);
        let after_food = state.difficulty.unwrap();
        assert!((after_food - 0.51).abs() < 1e-5);

        place_food(&mut state, 0, 0);
        state.update(&no_input(), &mut rng);
        let after_tick = state.difficulty.unwrap();
        assert!((after_tick - 0.52).abs() < 1e-5);
        assert!(state.is_running());
    }

    #[test]
    fn test_power_up_starts_speed_boost() {
        let (mut state, mut rng) = create_state(GameMode::PowerUps);
        assert_eq!(state.power_ups.len(), 1);
        assert_eq!(state.obstacles.len(), 1);
        state.obstacles.clear();
        place_snake(&mut state, &[(5, 5)], Heading::Right);
        place_food(&mut state, 0, 0);
        state.power_ups = vec![Item::power_up(Cell::new(6, 5), PowerUpType::Speed, Some(10))];

        let events = state.update(&no_input(), &mut rng);

        assert!(state.speed_boost_active);
        assert!(state.power_ups.is_empty());
        assert_eq!(state.snakes[0].len(), 1);
        assert!(events.contains(&TickEvent::SpeedBoostStarted { generation: 1 }));

        assert!(!state.expire_speed_boost(0));
        assert!(state.expire_speed_boost(1));
        assert!(!state.speed_boost_active);
    }

    #[test]
    fn test_power_up_ttl_expires() {
        let (mut state, mut rng) = create_state(GameMode::PowerUps);
        state.obstacles.clear();
        place_snake(&mut state, &[(5, 5)], Heading::Right);
        place_food(&mut state, 0, 0);
        state.power_ups = vec![Item::power_up(Cell::new(15, 15), PowerUpType::Speed, Some(1))];

        let events = state.update(&no_input(), &mut rng);

        assert!(state.power_ups.is_empty());
        assert!(events.contains(&TickEvent::PowerUpExpired { at: Cell::new(15, 15) }));
    }

    #[test]
    fn test_power_up_collectable_for_whole_ttl() {
        let (mut state, mut rng) = create_state(GameMode::PowerUps);
        state.obstacles.clear();
        place_snake(&mut state, &[(5, 5)], Heading::Right);
        place_food(&mut state, 0, 0);
        state.power_ups = vec![Item::power_up(Cell::new(7, 5), PowerUpType::Speed, Some(2))];

        state.update(&no_input(), &mut rng);
        assert_eq!(state.power_ups[0].ttl, Some(1));

        let events = state.update(&no_input(), &mut rng);

        assert!(state.speed_boost_active);
        assert!(state.power_ups.is_empty());
        assert!(!events.iter().any(|event| matches!(event, TickEvent::PowerUpExpired { .. })));
    }

    #[test]
    fn test_level_up_respawns_batches() {
        let (mut state, mut rng) = create_state(GameMode::PowerUps);
        state.obstacles.clear();
        state.power_ups.clear();
        place_snake(&mut state, &[(2, 2)], Heading::Right);
        state.score = 4;
        place_food(&mut state, 3, 2);

        state.update(&no_input(), &mut rng);

        assert_eq!(state.level, 2);
        assert_eq!(state.obstacles.len(), 2);
        assert_eq!(state.power_ups.len(), 2);
        let occupied: HashSet<Cell> = state.snakes[0].body.iter().copied().collect();
        assert!(state.obstacles.is_disjoint(&occupied));
        assert!(!state.obstacles.contains(&Cell::new(4, 2)));
    }

    #[test]
    fn test_multiplayer_collision_with_other_snake() {
        let (mut state, mut rng) = create_state(GameMode::Multiplayer);
        assert_eq!(state.snakes.len(), 2);
        place_food(&mut state, 0, 0);
        state.snakes[0] = Snake::from_cells(&[Cell::new(5, 5)], Heading::Right).unwrap();
        state.snakes[1] =
            Snake::from_cells(&[Cell::new(6, 4), Cell::new(6, 5), Cell::new(6, 6)], Heading::Up).unwrap();

        state.update(&no_input(), &mut rng);

        assert_eq!(state.status, GameStatus::GameOver(EndReason::OtherSnakeCollision));
        assert!(!state.snakes[0].is_alive());
        assert!(state.snakes[1].is_alive());
    }

    #[test]
    fn test_multiplayer_inputs_are_per_player() {
        let (mut state, mut rng) = create_state(GameMode::Multiplayer);
        place_food(&mut state, 0, 0);
        let p1 = state.snakes[0].head();
        let p2 = state.snakes[1].head();

        let inputs = [
            PressedKeys::from_keys(&[RawKey::Down]),
            PressedKeys::from_keys(&[RawKey::Up]),
        ];
        state.update(&inputs, &mut rng);

        assert_eq!(state.snakes[0].head(), p1.offset(0, 1));
        assert_eq!(state.snakes[1].head(), p2.offset(0, -1));
    }

    fn place_players(
        state: &mut SnakeGameState,
        first: (&[(i32, i32)], Heading),
        second: (&[(i32, i32)], Heading),
        swapped: bool,
    ) -> (usize, usize) {
        let (a, b) = if swapped { (1, 0) } else { (0, 1) };
        for (player, (cells, heading)) in [(a, first), (b, second)] {
            let cells: Vec<Cell> = cells.iter().map(|&(x, y)| Cell::new(x, y)).collect();
            state.snakes[player] = Snake::from_cells(&cells, heading).unwrap();
        }
        (a, b)
    }

    #[test]
    fn test_entering_vacated_tail_of_other_snake_is_legal() {
        for swapped in [false, true] {
            let (mut state, mut rng) = create_state(GameMode::Multiplayer);
            place_food(&mut state, 0, 0);
            let (mover, other) = place_players(
                &mut state,
                (&[(5, 5)], Heading::Right),
                (&[(6, 3), (6, 4), (6, 5)], Heading::Up),
                swapped,
            );

            state.update(&no_input(), &mut rng);

            assert!(state.is_running(), "swapped: {}", swapped);
            assert_eq!(state.snakes[mover].head(), Cell::new(6, 5));
            assert_eq!(state.snakes[other].head(), Cell::new(6, 2));
            assert_invariants(&state);
        }
    }

    #[test]
    fn test_entering_tail_of_growing_snake_collides() {
        for swapped in [false, true] {
            let (mut state, mut rng) = create_state(GameMode::Multiplayer);
            place_food(&mut state, 6, 2);
            let (mover, other) = place_players(
                &mut state,
                (&[(5, 5)], Heading::Right),
                (&[(6, 3), (6, 4), (6, 5)], Heading::Up),
                swapped,
            );

            state.update(&no_input(), &mut rng);

            assert_eq!(state.status, GameStatus::GameOver(EndReason::OtherSnakeCollision));
            assert!(!state.snakes[mover].is_alive());
            assert!(state.snakes[other].is_alive());
            assert_eq!(state.score, 0);
            assert_eq!(state.snakes[other].len(), 3);
        }
    }

    #[test]
    fn test_head_on_into_same_cell_kills_both() {
        for swapped in [false, true] {
            let (mut state, mut rng) = create_state(GameMode::Multiplayer);
            place_food(&mut state, 0, 0);
            place_players(
                &mut state,
                (&[(5, 5), (4, 5)], Heading::Right),
                (&[(7, 5), (8, 5)], Heading::Left),
                swapped,
            );

            let events = state.update(&no_input(), &mut rng);

            assert_eq!(state.status, GameStatus::GameOver(EndReason::OtherSnakeCollision));
            assert!(state.snakes.iter().all(|snake| !snake.is_alive()));
            assert!(events.contains(&TickEvent::SnakeDied { player: 0, reason: EndReason::OtherSnakeCollision }));
            assert!(events.contains(&TickEvent::SnakeDied { player: 1, reason: EndReason::OtherSnakeCollision }));
            assert!(!state.snakes.iter().any(|snake| snake.body_set.contains(&Cell::new(6, 5))));
        }
    }

    #[test]
    fn test_head_swap_kills_both() {
        for swapped in [false, true] {
            let (mut state, mut rng) = create_state(GameMode::Multiplayer);
            place_food(&mut state, 0, 0);
            place_players(&mut state, (&[(5, 5)], Heading::Right), (&[(6, 5)], Heading::Left), swapped);

            state.update(&no_input(), &mut rng);

            assert_eq!(state.status, GameStatus::GameOver(EndReason::OtherSnakeCollision));
            assert!(state.snakes.iter().all(|snake| !snake.is_alive()));
        }
    }

    #[test]
    fn test_survivor_does_not_score_on_terminal_tick() {
        for swapped in [false, true] {
            let (mut state, mut rng) = create_state(GameMode::Multiplayer);
            place_food(&mut state, 9, 10);
            let (walled, eater) = place_players(
                &mut state,
                (&[(0, 5)], Heading::Left),
                (&[(8, 10)], Heading::Right),
                swapped,
            );

            let events = state.update(&no_input(), &mut rng);

            assert_eq!(state.status, GameStatus::GameOver(EndReason::Wall));
            assert!(!state.snakes[walled].is_alive());
            assert!(state.snakes[eater].is_alive());
            assert_eq!(state.snakes[eater].body, [Cell::new(8, 10)]);
            assert_eq!(state.score, 0);
            assert_eq!(state.food.map(|food| food.position), Some(Cell::new(9, 10)));
            assert!(!events.iter().any(|event| matches!(event, TickEvent::FoodEaten { .. })));
        }
    }

    #[test]
    fn test_board_filled_ends_game() {
        let settings = SnakeSettings {
            grid_width: 5,
            grid_height: 5,
            ..SnakeSettings::default()
        };
        let mut rng = SessionRng::new(8);
        let rules = ModeRules::for_mode(GameMode::NoBorders, &settings);
        let mut state = SnakeGameState::new(rules, settings.grid(), 1, None, &mut rng);

        // Zig-zag through every row; the first cell of the path holds the food.
        let mut cells = Vec::new();
        for y in (0..5).rev() {
            let xs: Vec<i32> = if y % 2 == 0 { (0..5).collect() } else { (0..5).rev().collect() };
            for x in xs {
                cells.push(Cell::new(x, y));
            }
        }
        let food = cells.remove(0);
        state.snakes[0] = Snake::from_cells(&cells, Heading::Left).unwrap();
        state.food = Some(Item::food(food));
        assert_eq!(state.grid.advance(cells[0], Heading::Left, true), Ok(food));

        state.update(&no_input(), &mut rng);

        assert_eq!(state.snakes[0].len(), 25);
        assert_eq!(state.status, GameStatus::GameOver(EndReason::BoardFilled));
    }

    #[test]
    fn test_random_walk_keeps_invariants() {
        let (mut state, mut rng) = create_state(GameMode::NoBorders);
        let keys = [RawKey::Up, RawKey::Left, RawKey::Down, RawKey::Right];
        for step in 0..500 {
            if !state.is_running() {
                break;
            }
            let key = keys[rng.random_range(0..keys.len())];
            let before = state.snakes[0].len();
            let food = state.food.map(|f| f.position);
            let inputs = [PressedKeys::from_keys(&[key]), PressedKeys::new()];

            state.update(&inputs, &mut rng);

            assert_invariants(&state);
            if state.is_running() {
                let grew = food == Some(state.snakes[0].head());
                let expected = if grew { before + 1 } else { before };
                assert_eq!(state.snakes[0].len(), expected, "step {}", step);
            }
        }
    }
}
