//! Cell codes, grid positions and movement directions.
//!
//! Boards are exchanged as grids of small integer codes. The code ranges are
//! semantic categories; blocks, plates and doors carry their type in the last
//! decimal digit, so a block `13` fits plate `23` and opens door `43`.

use std::fmt;

pub const EMPTY: u8 = 0;
pub const PLAYER: u8 = 1;
pub const GOAL: u8 = 2;
pub const PATH: u8 = 98;
pub const WALL: u8 = 99;

const BLOCK_BASE: u8 = 10;
const PLATE_BASE: u8 = 20;
const DOOR_BASE: u8 = 40;

/// Decoded meaning of a single cell code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Wall,
    Path,
    Player,
    Goal,
    Block(u8),
    Plate(u8),
    Door(u8),
}

impl Cell {
    /// Decodes a raw cell code, `None` for codes outside every category.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            EMPTY => Some(Cell::Empty),
            PLAYER => Some(Cell::Player),
            GOAL => Some(Cell::Goal),
            PATH => Some(Cell::Path),
            WALL => Some(Cell::Wall),
            10..=19 => Some(Cell::Block(code % 10)),
            20..=29 => Some(Cell::Plate(code % 10)),
            40..=49 => Some(Cell::Door(code % 10)),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Cell::Empty => EMPTY,
            Cell::Wall => WALL,
            Cell::Path => PATH,
            Cell::Player => PLAYER,
            Cell::Goal => GOAL,
            Cell::Block(kind) => BLOCK_BASE + kind,
            Cell::Plate(kind) => PLATE_BASE + kind,
            Cell::Door(kind) => DOOR_BASE + kind,
        }
    }

    /// Whether the agent may step here, judged on the raw board alone.
    ///
    /// Used by the emergency fallback: plates count as passable there even
    /// though the planner never steps on them.
    pub fn is_open_ground(self) -> bool {
        matches!(
            self,
            Cell::Empty | Cell::Path | Cell::Goal | Cell::Plate(_)
        )
    }
}

/// A (row, column) grid coordinate. Signed so that offsets can leave the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The position `steps` cells away in `direction`.
    pub fn offset(self, direction: Direction, steps: i32) -> Self {
        let (dr, dc) = direction.delta();
        Self {
            row: self.row + dr * steps,
            col: self.col + dc * steps,
        }
    }

    pub fn step(self, direction: Direction) -> Self {
        self.offset(direction, 1)
    }

    pub fn manhattan(self, other: Position) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four agent actions. Rows grow downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Left,
    Right,
    Down,
}

impl Direction {
    /// All directions, in the order action-outcome distributions use.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Right,
        Direction::Down,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn label(self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }

    pub fn from_label(label: char) -> Option<Self> {
        match label {
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }

    /// Index into [`Direction::ALL`].
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Left => 1,
            Direction::Right => 2,
            Direction::Down => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip_for_typed_cells() {
        assert_eq!(Cell::from_code(13), Some(Cell::Block(3)));
        assert_eq!(Cell::from_code(27), Some(Cell::Plate(7)));
        assert_eq!(Cell::from_code(40), Some(Cell::Door(0)));
        assert_eq!(Cell::Door(5).code(), 45);
    }

    #[test]
    fn test_unknown_codes_rejected() {
        for code in [3, 9, 30, 39, 50, 97, 100] {
            assert_eq!(Cell::from_code(code), None, "code {code}");
        }
    }

    #[test]
    fn test_labels_match_deltas() {
        assert_eq!(Direction::from_label('R').unwrap().delta(), (0, 1));
        assert_eq!(Direction::from_label('L').unwrap().delta(), (0, -1));
        assert_eq!(Direction::from_label('U').unwrap().delta(), (-1, 0));
        assert_eq!(Direction::from_label('D').unwrap().delta(), (1, 0));
        assert_eq!(Direction::from_label('X'), None);
        for (i, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }

    #[test]
    fn test_offset_and_manhattan() {
        let p = Position::new(2, 2);
        assert_eq!(p.offset(Direction::Right, 2), Position::new(2, 4));
        assert_eq!(p.step(Direction::Up), Position::new(1, 2));
        assert_eq!(p.manhattan(Position::new(0, 5)), 5);
    }
}
