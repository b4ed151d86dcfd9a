//! # Puzzle State
//!
//! This module provides [`PuzzleState`], the canonical snapshot of everything
//! that can change while the puzzle is being played:
//!
//! - the agent's position,
//! - the movable blocks still on the board,
//! - the door types that have been opened,
//! - how many blocks of each type sit on plates of that type,
//! - a bitmask of plate types that are not yet fully activated.
//!
//! Walls, plates, doors and the goal never move and live in the
//! [`Puzzle`](crate::problem::Puzzle) instead.
//!
//! ## Canonical form
//!
//! Blocks are kept sorted, so two states holding the same blocks compare and
//! hash equal no matter in which order the blocks were listed. That is what
//! lets the search engine recognise a configuration it has already seen.
//!
//! ```
//! use plate_planner::{Block, Position, PuzzleState};
//!
//! let a = PuzzleState::new(
//!     Position::new(1, 1),
//!     vec![Block::new(2, 2, 0), Block::new(0, 3, 1)],
//!     0b11,
//! );
//! let b = PuzzleState::new(
//!     Position::new(1, 1),
//!     vec![Block::new(0, 3, 1), Block::new(2, 2, 0)],
//!     0b11,
//! );
//! assert_eq!(a, b);
//! ```
//!
//! ## Activation
//!
//! A plate type counts as activated once its activation count reaches the
//! number of plates of that type. Activation is permanent: the door type is
//! recorded as open and its mask bit is cleared, and nothing in the successor
//! generator ever sets the bit again.

use std::collections::{BTreeMap, BTreeSet};

use crate::cell::Position;

/// A movable block: where it is and which plate type it fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Block {
    pub pos: Position,
    pub kind: u8,
}

impl Block {
    pub fn new(row: i32, col: i32, kind: u8) -> Self {
        Self {
            pos: Position::new(row, col),
            kind,
        }
    }
}

/// Canonical, hashable puzzle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PuzzleState {
    agent: Position,
    blocks: Vec<Block>,
    open_doors: BTreeSet<u8>,
    plate_counts: BTreeMap<u8, u32>,
    locked_mask: u16,
}

impl PuzzleState {
    /// Creates a state with no plate activity yet.
    ///
    /// `locked_mask` has a bit set for every plate type present on the board.
    pub fn new(agent: Position, mut blocks: Vec<Block>, locked_mask: u16) -> Self {
        blocks.sort_unstable();
        Self {
            agent,
            blocks,
            open_doors: BTreeSet::new(),
            plate_counts: BTreeMap::new(),
            locked_mask,
        }
    }

    pub fn agent(&self) -> Position {
        self.agent
    }

    /// Blocks still on the board, sorted.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block_at(&self, pos: Position) -> Option<Block> {
        self.blocks.iter().copied().find(|b| b.pos == pos)
    }

    pub fn open_doors(&self) -> &BTreeSet<u8> {
        &self.open_doors
    }

    pub fn is_door_open(&self, kind: u8) -> bool {
        self.open_doors.contains(&kind)
    }

    /// Blocks of `kind` that have been pushed onto plates of `kind`.
    pub fn plate_count(&self, kind: u8) -> u32 {
        self.plate_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Bitmask of plate types not yet fully activated.
    pub fn locked_mask(&self) -> u16 {
        self.locked_mask
    }

    /// Kinds outside the mask width are never locked.
    pub fn is_plate_locked(&self, kind: u8) -> bool {
        self.locked_mask & type_bit(kind) != 0
    }

    pub fn locked_plate_types(&self) -> u32 {
        self.locked_mask.count_ones()
    }

    /// The same configuration with the agent somewhere else.
    pub(crate) fn with_agent(&self, agent: Position) -> Self {
        Self {
            agent,
            ..self.clone()
        }
    }

    /// The agent moves onto `block.pos` and the block slides to `to`.
    pub(crate) fn with_block_moved(&self, block: Block, to: Position) -> Self {
        let mut next = self.with_agent(block.pos);
        next.blocks.retain(|b| *b != block);
        next.blocks.push(Block {
            pos: to,
            kind: block.kind,
        });
        next.blocks.sort_unstable();
        next
    }

    /// The agent moves onto `block.pos` and the block leaves the board without
    /// pressing anything.
    pub(crate) fn with_block_dropped(&self, block: Block) -> Self {
        let mut next = self.with_agent(block.pos);
        next.blocks.retain(|b| *b != block);
        next
    }

    /// The agent moves onto `block.pos` and the block is consumed by a plate.
    ///
    /// When the count reaches `requirement` the door type opens and its mask
    /// bit clears.
    pub(crate) fn with_block_on_plate(&self, block: Block, requirement: u32) -> Self {
        let mut next = self.with_agent(block.pos);
        next.blocks.retain(|b| *b != block);
        let count = next.plate_counts.entry(block.kind).or_insert(0);
        *count += 1;
        if *count == requirement {
            next.open_doors.insert(block.kind);
            next.locked_mask &= !type_bit(block.kind);
        }
        next
    }
}

/// Mask bit of a plate type, zero when `kind` does not fit the mask.
pub(crate) fn type_bit(kind: u8) -> u16 {
    1u16.checked_shl(u32::from(kind)).unwrap_or(0)
}
