//! Full-board views of a puzzle state.

use crate::cell::Cell;
use crate::layout::Layout;
use crate::problem::Puzzle;
use crate::state::PuzzleState;

impl Puzzle {
    /// Renders `state` on top of the base layout.
    ///
    /// Open doors become path, blocks overwrite their cells, fully activated
    /// plates turn into wall and the agent's cell carries the player marker.
    /// Move validation and reachability both read this view; it is rebuilt for
    /// every state and never cached.
    pub fn board_view(&self, state: &PuzzleState) -> Layout {
        let mut view = self.base_layout().clone();

        for &(pos, kind) in self.doors() {
            if state.is_door_open(kind) {
                view.set(pos, Cell::Path);
            }
        }

        for block in state.blocks() {
            view.set(block.pos, Cell::Block(block.kind));
        }

        for &(pos, kind) in self.plates() {
            if state.plate_count(kind) == self.requirement(kind) {
                view.set(pos, Cell::Wall);
            }
        }

        view.set(state.agent(), Cell::Player);
        view
    }
}

#[cfg(test)]
mod tests {
    use crate::cell::{Cell, Position};
    use crate::layout::Layout;
    use crate::problem::Puzzle;
    use crate::state::Block;

    fn puzzle() -> Puzzle {
        let board = Layout::from_rows(&[
            [99u8, 99, 99, 99, 99, 99],
            [99, 1, 10, 20, 40, 99],
            [99, 98, 98, 98, 2, 99],
            [99, 99, 99, 99, 99, 99],
        ])
        .unwrap();
        Puzzle::from_layout(&board).unwrap()
    }

    #[test]
    fn test_initial_view_matches_raw_board() {
        let puzzle = puzzle();
        let view = puzzle.board_view(puzzle.initial_state());
        assert_eq!(view.get(Position::new(1, 1)), Some(Cell::Player));
        assert_eq!(view.get(Position::new(1, 2)), Some(Cell::Block(0)));
        assert_eq!(view.get(Position::new(1, 3)), Some(Cell::Plate(0)));
        assert_eq!(view.get(Position::new(1, 4)), Some(Cell::Door(0)));
        assert_eq!(view.get(Position::new(2, 4)), Some(Cell::Goal));
    }

    #[test]
    fn test_activated_plate_and_open_door() {
        let puzzle = puzzle();
        let pushed = puzzle
            .initial_state()
            .with_block_on_plate(Block::new(1, 2, 0), puzzle.requirement(0));
        let view = puzzle.board_view(&pushed);

        assert_eq!(view.get(Position::new(1, 1)), Some(Cell::Path));
        assert_eq!(view.get(Position::new(1, 2)), Some(Cell::Player));
        assert_eq!(view.get(Position::new(1, 3)), Some(Cell::Wall));
        assert_eq!(view.get(Position::new(1, 4)), Some(Cell::Path));
    }

    #[test]
    fn test_moved_block_is_rendered_at_new_cell() {
        let puzzle = puzzle();
        let state = puzzle
            .initial_state()
            .with_agent(Position::new(2, 1))
            .with_block_moved(Block::new(1, 2, 0), Position::new(0, 2));
        let view = puzzle.board_view(&state);
        assert_eq!(view.get(Position::new(1, 2)), Some(Cell::Player));
        assert_eq!(view.get(Position::new(0, 2)), Some(Cell::Block(0)));
        assert_eq!(view.get(Position::new(2, 1)), Some(Cell::Path));
    }
}
