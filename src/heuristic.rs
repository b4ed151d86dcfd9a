//! Distance-to-solved estimate for puzzle states.
//!
//! The estimate is the agent's Manhattan distance to the goal, plus a large
//! penalty per door type that cuts the goal off from the agent, plus, while
//! any plate type is still locked, a weight per locked type and the distance
//! of every still-needed block to its nearest matching plate.
//!
//! The penalty terms can exceed the true remaining cost, so the heuristic is
//! not admissible and A* guided by it may return a longer plan than
//! necessary. Searches run under a node-expansion budget, where steering
//! away from door-locked branches early matters more than optimality.

use crate::config::HeuristicWeights;
use crate::problem::{PressurePlateProblem, Puzzle};
use crate::search::HeuristicStrategy;
use crate::state::PuzzleState;

#[derive(Debug, Clone, Copy, Default)]
pub struct PlateHeuristic {
    weights: HeuristicWeights,
}

impl PlateHeuristic {
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }

    pub fn evaluate(&self, puzzle: &Puzzle, state: &PuzzleState) -> u32 {
        let mut h = state.agent().manhattan(puzzle.goal());

        let blocking = puzzle.blocking_doors(state);
        h += self.weights.blocked_door_penalty * blocking.len() as u32;

        if state.locked_mask() == 0 {
            return h;
        }

        h += self.weights.unactivated_plate_weight * state.locked_plate_types();
        h + block_distances(puzzle, state)
    }
}

/// Sum over blocks of a locked type of the distance to the nearest plate of
/// that type. Blocks whose type has no plate add nothing.
fn block_distances(puzzle: &Puzzle, state: &PuzzleState) -> u32 {
    state
        .blocks()
        .iter()
        .filter(|block| state.is_plate_locked(block.kind))
        .filter_map(|block| {
            puzzle
                .plates()
                .iter()
                .filter(|&&(_, kind)| kind == block.kind)
                .map(|&(pos, _)| block.pos.manhattan(pos))
                .min()
        })
        .sum()
}

impl HeuristicStrategy<PressurePlateProblem> for PlateHeuristic {
    fn estimate(&self, problem: &PressurePlateProblem, state: &PuzzleState) -> u32 {
        self.evaluate(problem.puzzle(), state)
    }
}
