//! Move and push physics.

use crate::cell::{Cell, Direction};
use crate::problem::Puzzle;
use crate::state::{Block, PuzzleState};

impl Puzzle {
    /// The state reached by moving the agent one step in `direction`, or
    /// `None` when the move is illegal.
    ///
    /// The agent walks onto empty, path and goal cells. Walls, plates, closed
    /// doors and the board edge stop it. A block ahead can be pushed unless
    /// the cell behind it is a wall, another block, a plate of another type or
    /// off the board. Onto empty, path or goal the block slides. Onto a plate
    /// of its own type it is consumed and the plate's activation count rises.
    /// Into a closed door it is lost without pressing anything.
    pub fn apply(&self, state: &PuzzleState, direction: Direction) -> Option<PuzzleState> {
        let agent = state.agent();
        let mid = agent.step(direction);
        let far = agent.offset(direction, 2);

        let view = self.board_view(state);
        let mid_cell = view.get(mid)?;
        let far_cell = view.get(far).unwrap_or(Cell::Wall);

        match mid_cell {
            Cell::Empty | Cell::Path | Cell::Goal => Some(state.with_agent(mid)),
            Cell::Block(kind) => {
                let block = Block { pos: mid, kind };
                match far_cell {
                    Cell::Empty | Cell::Path | Cell::Goal => {
                        Some(state.with_block_moved(block, far))
                    }
                    Cell::Plate(plate) if plate == kind => {
                        Some(state.with_block_on_plate(block, self.requirement(kind)))
                    }
                    Cell::Door(_) => Some(state.with_block_dropped(block)),
                    Cell::Wall | Cell::Block(_) | Cell::Plate(_) | Cell::Player => None,
                }
            }
            Cell::Wall | Cell::Plate(_) | Cell::Door(_) | Cell::Player => None,
        }
    }
}
