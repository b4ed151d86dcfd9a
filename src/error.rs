use thiserror::Error;

/// Errors raised while building puzzles, layouts and action models.
///
/// Illegal moves are never errors: the successor generator simply yields
/// nothing for them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlateError {
    /// The layout has no rows or no columns
    #[error("Layout is empty")]
    EmptyLayout,

    /// A row differs in length from the first row
    #[error("Layout row {row} has {found} cells, expected {expected}")]
    RaggedLayout {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A cell holds a code outside every known category
    #[error("Unknown cell code {code} at ({row}, {col})")]
    UnknownCellCode { code: u8, row: usize, col: usize },

    #[error("Layout has no goal cell")]
    MissingGoal,

    #[error("Layout has no player cell")]
    MissingPlayer,

    /// An action-outcome distribution is negative or does not sum to one
    #[error("Invalid outcome probabilities for action {action}")]
    InvalidProbabilities { action: char },
}

/// Why a search produced no plan.
///
/// The controller recovers from every kind the same way (empty cached plan,
/// emergency move) but logs them differently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    /// The reachable state space was exhausted without meeting the goal
    #[error("No solution exists from this configuration")]
    NoSolution,

    /// The node-expansion budget ran out first
    #[error("Search budget exhausted after {expanded} expansions")]
    BudgetExhausted { expanded: usize },

    /// Planning could not even start, e.g. the snapshot is malformed
    #[error("Internal planning fault: {0}")]
    InternalFault(String),
}

impl From<PlateError> for SearchFailure {
    fn from(err: PlateError) -> Self {
        SearchFailure::InternalFault(err.to_string())
    }
}

/// Result type alias for puzzle construction.
pub type Result<T> = std::result::Result<T, PlateError>;
