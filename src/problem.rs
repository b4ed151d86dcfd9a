//! # Problem formulation
//!
//! [`Puzzle`] holds what never changes while a puzzle is played: the base
//! layout with the player and blocks stripped out, the goal, where the doors
//! and plates are, and how many plates of each type must be pressed to open
//! the matching doors. It is derived once from a raw board.
//!
//! [`PressurePlateProblem`] wraps a puzzle for the search engine. Board views,
//! successor generation and reachability are implemented on [`Puzzle`] in
//! their own modules; the problem adds the goal test and transition
//! deduplication.
//!
//! ```
//! use plate_planner::{Layout, PressurePlateProblem, SearchProblem};
//!
//! let layout = Layout::from_rows(&[[1u8, 10, 20, 40, 2]]).unwrap();
//! let mut problem = PressurePlateProblem::new(&layout).unwrap();
//! let start = problem.initial_state();
//! assert_eq!(problem.successors(&start).len(), 1);
//! ```

use std::collections::{BTreeMap, HashSet};

use crate::cell::{Cell, Direction, Position};
use crate::error::{PlateError, Result};
use crate::layout::Layout;
use crate::search::SearchProblem;
use crate::state::{type_bit, Block, PuzzleState};

/// Static description of a puzzle instance.
#[derive(Debug, Clone)]
pub struct Puzzle {
    base: Layout,
    goal: Position,
    doors: Vec<(Position, u8)>,
    plates: Vec<(Position, u8)>,
    requirements: BTreeMap<u8, u32>,
    initial: PuzzleState,
}

impl Puzzle {
    /// Derives the static puzzle and its initial state from a raw board.
    ///
    /// # Errors
    ///
    /// [`PlateError::MissingGoal`] or [`PlateError::MissingPlayer`] when the
    /// board lacks either marker.
    pub fn from_layout(layout: &Layout) -> Result<Self> {
        let mut base = layout.clone();
        let mut goal = None;
        let mut player = None;
        let mut blocks = Vec::new();
        let mut doors = Vec::new();
        let mut plates = Vec::new();
        let mut requirements = BTreeMap::new();
        let mut locked_mask = 0u16;

        for (pos, cell) in layout.cells() {
            match cell {
                Cell::Goal => goal = Some(pos),
                Cell::Player => {
                    player = Some(pos);
                    base.set(pos, Cell::Path);
                }
                Cell::Block(kind) => {
                    blocks.push(Block { pos, kind });
                    base.set(pos, Cell::Path);
                }
                Cell::Plate(kind) => {
                    plates.push((pos, kind));
                    *requirements.entry(kind).or_insert(0) += 1;
                    locked_mask |= type_bit(kind);
                }
                Cell::Door(kind) => doors.push((pos, kind)),
                Cell::Empty | Cell::Wall | Cell::Path => {}
            }
        }

        let goal = goal.ok_or(PlateError::MissingGoal)?;
        let player = player.ok_or(PlateError::MissingPlayer)?;

        Ok(Self {
            base,
            goal,
            doors,
            plates,
            requirements,
            initial: PuzzleState::new(player, blocks, locked_mask),
        })
    }

    /// The layout with the player and blocks replaced by path.
    pub fn base_layout(&self) -> &Layout {
        &self.base
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn doors(&self) -> &[(Position, u8)] {
        &self.doors
    }

    pub fn plates(&self) -> &[(Position, u8)] {
        &self.plates
    }

    /// Number of plates of `kind`, zero when the type has no plates.
    pub fn requirement(&self, kind: u8) -> u32 {
        self.requirements.get(&kind).copied().unwrap_or(0)
    }

    pub fn initial_state(&self) -> &PuzzleState {
        &self.initial
    }

    pub fn is_solved(&self, state: &PuzzleState) -> bool {
        state.agent() == self.goal
    }
}

/// The pressure-plate puzzle as seen by the search engine.
///
/// Each `(direction, resulting state)` transition is reported at most once
/// over the lifetime of the instance. The set backing this starts empty and
/// is never shared; build a fresh problem for each planning attempt.
#[derive(Debug)]
pub struct PressurePlateProblem {
    puzzle: Puzzle,
    seen: HashSet<(Direction, PuzzleState)>,
}

impl PressurePlateProblem {
    pub fn new(layout: &Layout) -> Result<Self> {
        Ok(Self::from_puzzle(Puzzle::from_layout(layout)?))
    }

    pub fn from_puzzle(puzzle: Puzzle) -> Self {
        Self {
            puzzle,
            seen: HashSet::new(),
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    /// Number of distinct transitions reported so far.
    pub fn transitions_seen(&self) -> usize {
        self.seen.len()
    }
}

impl SearchProblem for PressurePlateProblem {
    type State = PuzzleState;
    type Action = Direction;

    fn initial_state(&self) -> PuzzleState {
        self.puzzle.initial.clone()
    }

    fn is_goal(&self, state: &PuzzleState) -> bool {
        self.puzzle.is_solved(state)
    }

    fn successors(&mut self, state: &PuzzleState) -> Vec<(Direction, PuzzleState)> {
        let mut result = Vec::new();
        for direction in Direction::ALL {
            if let Some(next) = self.puzzle.apply(state, direction) {
                if self.seen.insert((direction, next.clone())) {
                    result.push((direction, next));
                }
            }
        }
        result
    }
}
