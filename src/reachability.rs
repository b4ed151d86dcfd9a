//! Reverse reachability from the goal.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::cell::{Cell, Direction};
use crate::problem::Puzzle;
use crate::state::PuzzleState;

impl Puzzle {
    /// Door types standing between the goal and the agent.
    ///
    /// Runs a breadth-first search over the board view starting at the goal.
    /// Walls and blocks stop the search; a closed door stops it too but its
    /// type is recorded. If the agent is reached the result is empty,
    /// otherwise every door type met on the way is returned.
    ///
    /// This only biases the heuristic. It may report doors that lie on no
    /// shortest path, and an empty result does not prove solvability.
    pub fn blocking_doors(&self, state: &PuzzleState) -> BTreeSet<u8> {
        let view = self.board_view(state);
        let agent = state.agent();
        let goal = self.goal();

        let mut queue = VecDeque::from([goal]);
        let mut visited = HashSet::from([goal]);
        let mut blocking = BTreeSet::new();

        while let Some(pos) = queue.pop_front() {
            if pos == agent {
                return BTreeSet::new();
            }

            for direction in Direction::ALL {
                let next = pos.step(direction);
                if visited.contains(&next) {
                    continue;
                }
                match view.get(next) {
                    None | Some(Cell::Wall) | Some(Cell::Block(_)) => {}
                    Some(Cell::Door(kind)) => {
                        if !state.is_door_open(kind) {
                            blocking.insert(kind);
                        }
                    }
                    Some(_) => {
                        visited.insert(next);
                        queue.push_back(next);
                    }
                }
            }
        }

        blocking
    }
}
