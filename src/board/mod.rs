mod attacks;
mod bitboard;
mod chessmove;
mod movegen;
mod piece;
mod position;
mod square;
mod zobrist;

pub use bitboard::{BitBoard, EMPTY};
pub use chessmove::{Castling, Move};
pub use movegen::{LegalMoves, Successors};
pub use piece::{Color, Piece};
pub use position::{PlayerView, Position, BK, BQ, STARTING_FEN, WK, WQ};
pub use square::{File, Rank, Square, ALL_SQUARES};
