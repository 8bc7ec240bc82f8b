use crate::board::{Color, Move, Position};
use crate::evaluation::{evaluate, evaluate_terminal};
use crate::error::SearchError;
use crate::tt::TranspositionTable;
use crate::types::{Score, SearchResult, DEFAULT_TT_CAPACITY, SCORE_INFINITY};

/// How a cached score relates to the true value of its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Bound {
    #[default]
    Exact,
    /// search failed high: true value >= score
    Lower,
    /// search failed low: true value <= score
    Upper,
}

/// Cached search result for one position at one depth.
#[derive(Clone, Copy, Debug, Default)]
pub struct TtEntry {
    pub depth: u8,
    pub score: Score,
    pub bound: Bound,
}

/// Owns the transposition table and node counter for a sequence of searches.
///
/// All drivers keep two scores from White's perspective: White maximizes,
/// Black minimizes. The table is never cleared between iterative-deepening
/// rounds; deeper results overwrite shallower ones.
pub struct Searcher {
    tt: TranspositionTable<TtEntry>,
    nodes: u64,
}

impl Searcher {
    pub fn new() -> Self {
        Searcher::with_capacity(DEFAULT_TT_CAPACITY)
    }

    /// Bound the transposition table to `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Searcher {
            tt: TranspositionTable::new(capacity),
            nodes: 0,
        }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Fixed-depth alpha-beta from the root with a full window.
    pub fn alpha_beta(
        &mut self,
        position: &Position,
        depth: u8,
    ) -> Result<SearchResult, SearchError> {
        if depth == 0 {
            return Err(SearchError::ZeroDepth);
        }
        self.nodes = 0;
        let (score, best_move) = self.root(position, depth, -SCORE_INFINITY, SCORE_INFINITY)?;
        Ok(SearchResult { best_move, score, depth, nodes: self.nodes })
    }

    /// Iterative deepening: full-window alpha-beta at depths 1..=max_depth.
    /// The table carries over between iterations, so deeper rounds start
    /// from the shallower rounds' scores.
    pub fn iterative(
        &mut self,
        position: &Position,
        max_depth: u8,
    ) -> Result<SearchResult, SearchError> {
        if max_depth == 0 {
            return Err(SearchError::ZeroDepth);
        }
        self.nodes = 0;
        let mut result = None;
        for depth in 1..=max_depth {
            let (score, best_move) =
                self.root(position, depth, -SCORE_INFINITY, SCORE_INFINITY)?;
            result = Some(SearchResult { best_move, score, depth, nodes: self.nodes });
        }
        // the loop ran at least once
        result.ok_or(SearchError::ZeroDepth)
    }

    /// MTD(f): converge on the value with zero-window probes around the
    /// guess. Each probe is the same alpha-beta as everywhere else; the
    /// table makes the repeated sub-searches cheap.
    pub fn mtdf(
        &mut self,
        position: &Position,
        depth: u8,
        first_guess: Score,
    ) -> Result<SearchResult, SearchError> {
        if depth == 0 {
            return Err(SearchError::ZeroDepth);
        }
        self.nodes = 0;
        let (score, best_move) = self.mtdf_at(position, depth, first_guess)?;
        Ok(SearchResult { best_move, score, depth, nodes: self.nodes })
    }

    /// Iterative deepening driven by MTD(f), feeding each depth's score to
    /// the next as the first guess.
    pub fn iterative_mtdf(
        &mut self,
        position: &Position,
        max_depth: u8,
    ) -> Result<SearchResult, SearchError> {
        if max_depth == 0 {
            return Err(SearchError::ZeroDepth);
        }
        self.nodes = 0;
        let mut guess = 0;
        let mut result = None;
        for depth in 1..=max_depth {
            let (score, best_move) = self.mtdf_at(position, depth, guess)?;
            guess = score;
            result = Some(SearchResult { best_move, score, depth, nodes: self.nodes });
        }
        result.ok_or(SearchError::ZeroDepth)
    }

    fn mtdf_at(
        &mut self,
        position: &Position,
        depth: u8,
        first_guess: Score,
    ) -> Result<(Score, Move), SearchError> {
        let mut g = first_guess;
        let mut lower = -SCORE_INFINITY;
        let mut upper = SCORE_INFINITY;
        let mut best_move = None;

        loop {
            let beta = if g == lower { g + 1 } else { g };
            let (score, mv) = self.root(position, depth, beta - 1, beta)?;
            g = score;
            best_move = Some(mv);
            if g < beta {
                upper = g;
            } else {
                lower = g;
            }
            if lower >= upper {
                break;
            }
        }

        // at least one probe ran, so a move was recorded
        best_move.map(|mv| (g, mv)).ok_or(SearchError::TerminalPosition)
    }

    /// Search the root: like the inner nodes, but tracks which move produced
    /// the best score. A root with no successors is a caller error.
    fn root(
        &mut self,
        position: &Position,
        depth: u8,
        mut alpha: Score,
        mut beta: Score,
    ) -> Result<(Score, Move), SearchError> {
        self.nodes += 1;
        let white = position.active_side() == Color::White;
        let mut best = if white { -SCORE_INFINITY } else { SCORE_INFINITY };
        let mut best_move = None;

        for (mv, child) in position.successors() {
            let value = self.alphabeta(&child, depth - 1, alpha, beta);
            if white {
                if value > best || best_move.is_none() {
                    best = value;
                    best_move = Some(mv);
                }
                if best > alpha {
                    alpha = best;
                }
            } else {
                if value < best || best_move.is_none() {
                    best = value;
                    best_move = Some(mv);
                }
                if best < beta {
                    beta = best;
                }
            }
            if alpha >= beta {
                break;
            }
        }

        match best_move {
            Some(mv) => Ok((best, mv)),
            None => Err(SearchError::TerminalPosition),
        }
    }

    /// Alpha-beta over White-perspective scores with transposition caching.
    /// Table entries apply only at exactly the depth they were stored at, so
    /// a cached search never changes what a fixed-depth search would return.
    fn alphabeta(&mut self, position: &Position, depth: u8, mut alpha: Score, mut beta: Score) -> Score {
        self.nodes += 1;

        if depth == 0 {
            return evaluate(position);
        }

        let hash = position.hash();
        if let Some(entry) = self.tt.get(hash) {
            if entry.depth == depth {
                match entry.bound {
                    Bound::Exact => return entry.score,
                    Bound::Lower => {
                        if entry.score >= beta {
                            return entry.score;
                        }
                        if entry.score > alpha {
                            alpha = entry.score;
                        }
                    }
                    Bound::Upper => {
                        if entry.score <= alpha {
                            return entry.score;
                        }
                        if entry.score < beta {
                            beta = entry.score;
                        }
                    }
                }
            }
        }

        let (alpha0, beta0) = (alpha, beta);
        let white = position.active_side() == Color::White;
        let mut best = if white { -SCORE_INFINITY } else { SCORE_INFINITY };
        let mut moved = false;

        for (_, child) in position.successors() {
            moved = true;
            let value = self.alphabeta(&child, depth - 1, alpha, beta);
            if white {
                if value > best {
                    best = value;
                }
                if best > alpha {
                    alpha = best;
                }
            } else {
                if value < best {
                    best = value;
                }
                if best < beta {
                    beta = best;
                }
            }
            if alpha >= beta {
                break;
            }
        }

        if !moved {
            return evaluate_terminal(position);
        }

        let bound = if best <= alpha0 {
            Bound::Upper
        } else if best >= beta0 {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.add(hash, TtEntry { depth, score: best, bound });

        best
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Searcher::new()
    }
}


// White maximizes, Black minimizes, both on the same White-perspective score. Negamax would halve
// the code, but keeping both sides explicit keeps the driver aligned with how the evaluation is
// defined, and the cutoff condition is the same `alpha >= beta` either way.

// Table entries are only trusted at the exact depth they were computed for. A deeper entry is a
// better answer to a different question; trusting it would make search results depend on table
// history.
