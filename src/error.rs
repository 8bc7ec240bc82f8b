use thiserror::Error;

/// A FEN string that does not satisfy the six-field grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid FEN: {0}")]
pub struct InvalidFen(pub String);

/// Failures while binding a SAN string to a legal move in a position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SanError {
    #[error("cannot parse {0:?} as a move")]
    Parse(String),
    #[error("move {0:?} matches more than one piece")]
    AmbiguousMove(String),
    #[error("no piece can play {0:?}")]
    NoSuchMove(String),
}

/// Why `Position::apply` rejected a move. All validation runs before any
/// successor state is built; a failed apply leaves no trace.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("source square is empty")]
    SourceEmpty,
    #[error("piece on source square belongs to the opponent")]
    WrongColor,
    #[error("destination square holds a piece of the moving side")]
    DestinationOccupiedBySelf,
    #[error("capture flag disagrees with destination occupancy")]
    CaptureFlagMismatch,
    #[error("promotion flag disagrees with pawn reaching the back rank")]
    PromotionMismatch,
    #[error("move does not match the piece's movement pattern")]
    IllegalGeometry,
    #[error("a piece blocks the path to the destination")]
    BlockedPath,
    #[error("castling is not available")]
    CastlingNotAllowed,
    #[error("move would leave own king in check")]
    LeavesOwnKingInCheck,
}

/// Caller contract violations on the search drivers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error("search invoked on a terminal position")]
    TerminalPosition,
    #[error("search invoked with depth zero")]
    ZeroDepth,
}
