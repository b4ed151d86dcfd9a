//! Tunables for the heuristic, the controller and the simulator.
//!
//! Every struct has a `Default` carrying the values the planner was tuned
//! with, and `with_*` builders for the knobs callers usually touch.

use std::collections::BTreeMap;

use crate::environment::ActionModel;

/// Weights of the heuristic's penalty terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicWeights {
    /// Added once per door type blocking every route from goal to agent
    pub blocked_door_penalty: u32,
    /// Added once per plate type not yet fully activated
    pub unactivated_plate_weight: u32,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            blocked_door_penalty: 50,
            unactivated_plate_weight: 10,
        }
    }
}

/// Configuration for the adaptive controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Consecutive unchanged positions tolerated before the plan is dropped
    pub stuck_limit: u32,
    /// Boards up to this many cells get the small search budget
    pub small_board_area: usize,
    pub small_board_budget: usize,
    pub large_board_budget: usize,
    /// Seed for the emergency-move RNG; `None` seeds from the OS
    pub seed: Option<u64>,
    pub weights: HeuristicWeights,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            stuck_limit: 3,
            small_board_area: 100,
            small_board_budget: 50_000,
            large_board_budget: 150_000,
            seed: None,
            weights: HeuristicWeights::default(),
        }
    }
}

impl ControllerConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_weights(mut self, weights: HeuristicWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_budgets(mut self, small: usize, large: usize) -> Self {
        self.small_board_budget = small;
        self.large_board_budget = large;
        self
    }

    /// Node-expansion budget for a board of `area` cells.
    pub fn budget_for_area(&self, area: usize) -> usize {
        if area <= self.small_board_area {
            self.small_board_budget
        } else {
            self.large_board_budget
        }
    }
}

/// Rules and rewards of the simulated game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub action_model: ActionModel,
    pub finished_reward: i64,
    /// Reward for opening the doors of a type, keyed by door type
    pub door_rewards: BTreeMap<u8, i64>,
    pub step_punishment: i64,
    pub seed: u64,
    pub max_steps: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            action_model: ActionModel::deterministic(),
            finished_reward: 350,
            door_rewards: (0..10u8).map(|kind| (kind, 5 + 2 * i64::from(kind))).collect(),
            step_punishment: -2,
            seed: 42,
            max_steps: 200,
        }
    }
}

impl GameConfig {
    pub fn with_action_model(mut self, action_model: ActionModel) -> Self {
        self.action_model = action_model;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }
}
