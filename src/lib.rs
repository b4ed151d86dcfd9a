mod board;
mod cell;
mod config;
mod controller;
mod environment;
mod error;
mod heuristic;
mod layout;
mod problem;
mod reachability;
mod search;
mod state;
mod successor;

pub use cell::{Cell, Direction, Position};
pub use config::{ControllerConfig, GameConfig, HeuristicWeights};
pub use controller::{expected_position, Controller};
pub use environment::{ActionModel, Environment, Observation, SimulatedGame};
pub use error::{PlateError, Result, SearchFailure};
pub use heuristic::PlateHeuristic;
pub use layout::Layout;
pub use problem::{PressurePlateProblem, Puzzle};
pub use search::{
    AStarSearch, DijkstraSearch, HeuristicStrategy, PathStep, SearchAlgorithm, SearchProblem,
    Solution, ZeroHeuristic,
};
pub use state::{Block, PuzzleState};
