use crate::board::Move;

pub type Score = i32;

/// Sentinel for won/lost scores. Strictly outside the range any material +
/// piece-square sum can reach, with headroom for window arithmetic.
pub const SCORE_INFINITY: Score = 1_000_000_000;

pub const DEFAULT_TT_CAPACITY: usize = 1 << 20;

/// Outcome of a root search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchResult {
    pub best_move: Move,
    pub score: Score,
    pub depth: u8,
    pub nodes: u64,
}
