//! # Environment
//!
//! The controller never touches the authoritative board. It talks to an
//! [`Environment`], which reports [`Observation`]s, accepts one action per
//! step, resolves where the agent actually went, and publishes the
//! stochastic [`ActionModel`] it uses to do so.
//!
//! [`SimulatedGame`] is the reference environment: a seeded simulation of the
//! pressure-plate game used by the tests and the demo.
//!
//! ## Action model
//!
//! For every intended action the model holds a probability distribution over
//! the direction actually executed, ordered as [`Direction::ALL`]
//! (`U`, `L`, `R`, `D`):
//!
//! ```
//! use plate_planner::{ActionModel, Direction};
//!
//! let model = ActionModel::new([
//!     [0.9, 0.05, 0.05, 0.0],
//!     [0.1, 0.8, 0.075, 0.025],
//!     [0.05, 0.05, 0.85, 0.05],
//!     [0.05, 0.1, 0.15, 0.7],
//! ])
//! .unwrap();
//! assert_eq!(model.probability(Direction::Right, Direction::Right), 0.85);
//! assert_eq!(model.probability(Direction::Up, Direction::Down), 0.0);
//! ```

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cell::{Cell, Direction, Position};
use crate::config::GameConfig;
use crate::error::{PlateError, Result};
use crate::layout::Layout;

/// Per-action distribution over executed directions.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionModel {
    outcomes: [[f64; 4]; 4],
}

impl ActionModel {
    /// Builds a model from one row per intended action, rows and columns both
    /// ordered as [`Direction::ALL`].
    ///
    /// # Errors
    ///
    /// [`PlateError::InvalidProbabilities`] when a row has a negative entry or
    /// does not sum to one.
    pub fn new(outcomes: [[f64; 4]; 4]) -> Result<Self> {
        for (direction, row) in Direction::ALL.iter().zip(outcomes.iter()) {
            let total: f64 = row.iter().sum();
            if row.iter().any(|&p| p < 0.0) || (total - 1.0).abs() > 1e-6 {
                return Err(PlateError::InvalidProbabilities {
                    action: direction.label(),
                });
            }
        }
        Ok(Self { outcomes })
    }

    /// Every action executes exactly as intended.
    pub fn deterministic() -> Self {
        let mut outcomes = [[0.0; 4]; 4];
        for (i, row) in outcomes.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self { outcomes }
    }

    pub fn distribution(&self, intended: Direction) -> &[f64; 4] {
        &self.outcomes[intended.index()]
    }

    pub fn probability(&self, intended: Direction, executed: Direction) -> f64 {
        self.outcomes[intended.index()][executed.index()]
    }

    /// Chance that `intended` is executed as intended.
    pub fn reliability(&self, intended: Direction) -> f64 {
        self.probability(intended, intended)
    }

    /// Draws the direction actually executed for `intended`.
    pub fn sample<R: Rng>(&self, intended: Direction, rng: &mut R) -> Direction {
        let roll: f64 = rng.random();
        let mut cumulative = 0.0;
        for (direction, &p) in Direction::ALL.iter().zip(self.distribution(intended)) {
            cumulative += p;
            if roll < cumulative {
                return *direction;
            }
        }
        intended
    }
}

/// What the environment reports before each decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub board: Layout,
    pub agent: Position,
    pub steps: u32,
    pub done: bool,
    pub success: bool,
}

/// The live game the controller plays against.
pub trait Environment {
    /// The stochastic action-outcome model.
    fn model(&self) -> &ActionModel;

    fn current_state(&self) -> Observation;

    /// Resolves the stochastic outcome of `action` and advances one step.
    fn submit_next_action(&mut self, action: Direction);
}

/// Seeded simulation of the pressure-plate game.
///
/// A block pushed onto a matching plate is consumed and the plate turns into
/// wall. Once every plate of a type is pressed, all doors of that type turn
/// into path. A block pushed into a closed door is lost. Blocks may cover the
/// goal; the goal counts as reached whenever the agent steps onto its cell.
/// The agent never steps onto plates.
#[derive(Debug, Clone)]
pub struct SimulatedGame {
    board: Layout,
    /// Terrain under the player and the blocks
    floor: Layout,
    agent: Position,
    requirements: BTreeMap<u8, u32>,
    pressed: BTreeMap<u8, u32>,
    config: GameConfig,
    rng: StdRng,
    steps: u32,
    reward: i64,
    done: bool,
    success: bool,
}

impl SimulatedGame {
    pub fn new(layout: &Layout, config: GameConfig) -> Result<Self> {
        if layout.find(Cell::Goal).is_none() {
            return Err(PlateError::MissingGoal);
        }
        let agent = layout.find(Cell::Player).ok_or(PlateError::MissingPlayer)?;

        let mut floor = layout.clone();
        let mut requirements = BTreeMap::new();
        for (pos, cell) in layout.cells() {
            match cell {
                Cell::Plate(kind) => *requirements.entry(kind).or_insert(0) += 1,
                Cell::Player | Cell::Block(_) => floor.set(pos, Cell::Path),
                _ => {}
            }
        }

        Ok(Self {
            board: layout.clone(),
            floor,
            agent,
            requirements,
            pressed: BTreeMap::new(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            steps: 0,
            reward: 0,
            done: false,
            success: false,
        })
    }

    pub fn board(&self) -> &Layout {
        &self.board
    }

    pub fn reward(&self) -> i64 {
        self.reward
    }

    pub fn max_steps(&self) -> u32 {
        self.config.max_steps
    }

    fn execute(&mut self, direction: Direction) {
        let mid = self.agent.step(direction);
        let far = self.agent.offset(direction, 2);
        let Some(mid_cell) = self.board.get(mid) else {
            return;
        };

        match mid_cell {
            Cell::Empty | Cell::Path | Cell::Goal => self.move_agent(mid),
            Cell::Block(kind) => match self.board.get(far).unwrap_or(Cell::Wall) {
                Cell::Empty | Cell::Path | Cell::Goal => {
                    self.board.set(far, Cell::Block(kind));
                    self.move_agent(mid);
                }
                Cell::Plate(plate) if plate == kind => {
                    self.board.set(far, Cell::Wall);
                    self.floor.set(far, Cell::Wall);
                    self.move_agent(mid);
                    self.press_plate(kind);
                }
                Cell::Door(door) => {
                    log::debug!("block of type {} lost in door of type {}", kind, door);
                    self.move_agent(mid);
                }
                Cell::Wall | Cell::Block(_) | Cell::Plate(_) | Cell::Player => {}
            },
            Cell::Wall | Cell::Plate(_) | Cell::Door(_) | Cell::Player => {}
        }
    }

    fn move_agent(&mut self, to: Position) {
        let left_behind = self.floor.get(self.agent).unwrap_or(Cell::Path);
        self.board.set(self.agent, left_behind);
        self.board.set(to, Cell::Player);
        self.agent = to;

        if self.floor.get(to) == Some(Cell::Goal) {
            self.reward += self.config.finished_reward;
            self.done = true;
            self.success = true;
            log::info!("goal reached after {} steps", self.steps);
        }
    }

    fn press_plate(&mut self, kind: u8) {
        let count = self.pressed.entry(kind).or_insert(0);
        *count += 1;
        if Some(&*count) != self.requirements.get(&kind) {
            return;
        }

        let doors: Vec<Position> = self
            .floor
            .cells()
            .filter(|&(_, cell)| cell == Cell::Door(kind))
            .map(|(pos, _)| pos)
            .collect();
        for pos in &doors {
            self.floor.set(*pos, Cell::Path);
            self.board.set(*pos, Cell::Path);
        }
        self.reward += self.config.door_rewards.get(&kind).copied().unwrap_or(0);
        log::debug!("plates of type {} pressed, {} doors opened", kind, doors.len());
    }
}

impl Environment for SimulatedGame {
    fn model(&self) -> &ActionModel {
        &self.config.action_model
    }

    fn current_state(&self) -> Observation {
        Observation {
            board: self.board.clone(),
            agent: self.agent,
            steps: self.steps,
            done: self.done,
            success: self.success,
        }
    }

    fn submit_next_action(&mut self, action: Direction) {
        if self.done {
            log::warn!("action {} submitted after the game ended", action);
            return;
        }

        self.steps += 1;
        self.reward += self.config.step_punishment;

        let executed = self.config.action_model.sample(action, &mut self.rng);
        if executed != action {
            log::debug!("intended {} but executed {}", action, executed);
        }
        self.execute(executed);

        if !self.done && self.steps >= self.config.max_steps {
            self.done = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(rows: &[&[u8]]) -> SimulatedGame {
        SimulatedGame::new(&Layout::from_rows(rows).unwrap(), GameConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_distributions() {
        let mut rows = [[0.25; 4]; 4];
        rows[2] = [0.5, 0.5, 0.5, 0.0];
        assert_eq!(
            ActionModel::new(rows),
            Err(PlateError::InvalidProbabilities { action: 'R' })
        );

        rows[2] = [1.2, -0.2, 0.0, 0.0];
        assert!(ActionModel::new(rows).is_err());
    }

    #[test]
    fn test_deterministic_model_never_slips() {
        let model = ActionModel::deterministic();
        let mut rng = StdRng::seed_from_u64(7);
        for direction in Direction::ALL {
            assert_eq!(model.reliability(direction), 1.0);
            for _ in 0..20 {
                assert_eq!(model.sample(direction, &mut rng), direction);
            }
        }
    }

    #[test]
    fn test_sampling_follows_distribution() {
        let model = ActionModel::new([
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.5, 0.0, 0.0, 0.5],
            [0.0, 0.0, 0.0, 1.0],
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert_eq!(model.sample(Direction::Up, &mut rng), Direction::Left);
            let slipped = model.sample(Direction::Right, &mut rng);
            assert!(slipped == Direction::Up || slipped == Direction::Down);
        }
    }

    #[test]
    fn test_walk_to_goal() {
        let mut game = game(&[&[1, 98, 2]]);
        game.submit_next_action(Direction::Right);
        let state = game.current_state();
        assert_eq!(state.agent, Position::new(0, 1));
        assert_eq!(state.board.get(Position::new(0, 0)), Some(Cell::Path));
        assert!(!state.done);

        game.submit_next_action(Direction::Right);
        let state = game.current_state();
        assert!(state.done);
        assert!(state.success);
        assert_eq!(state.steps, 2);
        assert_eq!(game.reward(), 350 - 4);
    }

    #[test]
    fn test_push_onto_plate_opens_doors() {
        let mut game = game(&[&[1, 13, 23, 98], &[99, 99, 43, 2]]);
        game.submit_next_action(Direction::Right);
        let board = game.current_state().board;
        assert_eq!(board.get(Position::new(0, 1)), Some(Cell::Player));
        assert_eq!(board.get(Position::new(0, 2)), Some(Cell::Wall));
        assert_eq!(board.get(Position::new(1, 2)), Some(Cell::Path));
        assert_eq!(game.reward(), -2 + 11);
    }

    #[test]
    fn test_block_pushed_over_goal_uncovers_it() {
        let mut game = game(&[&[1, 10, 2, 98, 99]]);
        game.submit_next_action(Direction::Right);
        assert_eq!(game.board().get(Position::new(0, 2)), Some(Cell::Block(0)));
        assert!(!game.current_state().done);

        game.submit_next_action(Direction::Right);
        let state = game.current_state();
        assert_eq!(state.board.get(Position::new(0, 3)), Some(Cell::Block(0)));
        assert_eq!(state.agent, Position::new(0, 2));
        assert!(state.success);
    }

    #[test]
    fn test_block_pushed_into_closed_door_is_lost() {
        let mut game = game(&[&[1, 10, 41, 2], &[98, 98, 98, 21]]);
        game.submit_next_action(Direction::Right);
        let board = game.board();
        assert_eq!(board.get(Position::new(0, 1)), Some(Cell::Player));
        assert_eq!(board.get(Position::new(0, 2)), Some(Cell::Door(1)));
        assert!(board.cells().all(|(_, cell)| !matches!(cell, Cell::Block(_))));
    }

    #[test]
    fn test_bumping_keeps_position_but_counts_step() {
        let mut game = game(&[&[1, 99, 2], &[20, 98, 98]]);
        game.submit_next_action(Direction::Right);
        game.submit_next_action(Direction::Down);
        let state = game.current_state();
        assert_eq!(state.agent, Position::new(0, 0));
        assert_eq!(state.steps, 2);
    }

    #[test]
    fn test_step_limit_ends_game() {
        let layout = Layout::from_rows(&[[1u8, 98, 98, 2]]).unwrap();
        let mut game =
            SimulatedGame::new(&layout, GameConfig::default().with_max_steps(1)).unwrap();
        game.submit_next_action(Direction::Left);
        let state = game.current_state();
        assert!(state.done);
        assert!(!state.success);

        game.submit_next_action(Direction::Right);
        assert_eq!(game.current_state().steps, 1);
    }
}
