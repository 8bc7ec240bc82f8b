use std::fmt;
use std::str::FromStr;

use super::attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};
use super::bitboard::{BitBoard, EMPTY};
use super::chessmove::{Castling, Move};
use super::movegen::{LegalMoves, Successors};
use super::piece::{Color, Piece};
use super::square::{File, Rank, Square};
use super::zobrist;
use crate::error::{InvalidFen, MoveError};

/// The standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Castling rights stored as a 4-bit mask
/// Bit 0: White kingside, Bit 1: White queenside
/// Bit 2: Black kingside, Bit 3: Black queenside
pub const WK: u8 = 1;
pub const WQ: u8 = 2;
pub const BK: u8 = 4;
pub const BQ: u8 = 8;

/// Per-side snapshot: occupied squares, castling rights, king square.
#[derive(Clone, Copy, Debug)]
pub struct PlayerView {
    pub occupied: BitBoard,
    pub king: Option<Square>,
    pub kingside: bool,
    pub queenside: bool,
}

/// An immutable chess position. `apply` returns a fresh value and never
/// touches the receiver; a failed apply leaves no trace anywhere.
#[derive(Clone, Copy, Debug)]
pub struct Position {
    pieces: [BitBoard; 6], // per piece kind
    colors: [BitBoard; 2], // per color
    side_to_move: Color,
    castling: u8, // 4-bit castling rights
    halfmove_clock: u16,
    fullmove_number: u16,
    hash: u64,
}

impl Position {
    /// The standard initial position.
    pub fn start() -> Position {
        STARTING_FEN.parse().expect("starting FEN is valid")
    }

    pub fn from_fen(fen: &str) -> Result<Position, InvalidFen> {
        fen.parse()
    }

    pub fn to_fen(&self) -> String {
        self.to_string()
    }

    #[inline]
    pub fn active_side(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn opposing_side(&self) -> Color {
        !self.side_to_move
    }

    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        let bb = BitBoard::from_square(sq);
        Piece::ALL.into_iter().find(|&p| !(self.pieces[p.to_index()] & bb).is_empty())
    }

    pub fn color_on(&self, sq: Square) -> Option<Color> {
        let bb = BitBoard::from_square(sq);
        if !(self.colors[0] & bb).is_empty() {
            Some(Color::White)
        } else if !(self.colors[1] & bb).is_empty() {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Occupant of (file, rank), if any.
    pub fn square(&self, file: File, rank: Rank) -> Option<(Color, Piece)> {
        let sq = Square::make_square(rank, file);
        match (self.color_on(sq), self.piece_on(sq)) {
            (Some(c), Some(p)) => Some((c, p)),
            _ => None,
        }
    }

    pub fn player(&self, side: Color) -> PlayerView {
        let (ks, qs) = match side {
            Color::White => (WK, WQ),
            Color::Black => (BK, BQ),
        };
        PlayerView {
            occupied: self.colors[side.to_index()],
            king: self.king_square(side),
            kingside: self.castling & ks != 0,
            queenside: self.castling & qs != 0,
        }
    }

    #[inline]
    pub fn color_combined(&self, color: Color) -> BitBoard {
        self.colors[color.to_index()]
    }

    #[inline]
    pub fn pieces(&self, piece: Piece) -> BitBoard {
        self.pieces[piece.to_index()]
    }

    #[inline]
    pub fn occupied(&self) -> BitBoard {
        self.colors[0] | self.colors[1]
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn castling_rights(&self) -> u8 {
        self.castling
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    pub fn king_square(&self, side: Color) -> Option<Square> {
        (self.pieces[Piece::King.to_index()] & self.colors[side.to_index()]).first()
    }

    /// Is `sq` attacked by any piece of `by`?
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        let attackers = self.colors[by.to_index()];
        let occupied = self.occupied();

        if !(knight_attacks(sq) & self.pieces[Piece::Knight.to_index()] & attackers).is_empty() {
            return true;
        }
        // a pawn of `by` on square T attacks sq iff a pawn of the other color
        // on sq would capture toward T
        if !(pawn_attacks(!by, sq) & self.pieces[Piece::Pawn.to_index()] & attackers).is_empty() {
            return true;
        }
        if !(bishop_attacks(sq, occupied)
            & (self.pieces[Piece::Bishop.to_index()] | self.pieces[Piece::Queen.to_index()])
            & attackers)
            .is_empty()
        {
            return true;
        }
        if !(rook_attacks(sq, occupied)
            & (self.pieces[Piece::Rook.to_index()] | self.pieces[Piece::Queen.to_index()])
            & attackers)
            .is_empty()
        {
            return true;
        }
        if !(king_attacks(sq) & self.pieces[Piece::King.to_index()] & attackers).is_empty() {
            return true;
        }
        false
    }

    /// Is the side to move in check?
    pub fn is_check(&self) -> bool {
        match self.king_square(self.side_to_move) {
            Some(king_sq) => self.is_attacked(king_sq, !self.side_to_move),
            None => false,
        }
    }

    /// No legal move for the side to move.
    pub fn is_terminal(&self) -> bool {
        !self.has_legal_move()
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_check() && self.is_terminal()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && self.is_terminal()
    }

    pub fn legal_moves(&self) -> LegalMoves {
        LegalMoves::new(self)
    }

    pub fn successors(&self) -> Successors {
        Successors::new(self)
    }

    /// Movement-rule test for the piece on `from`, ignoring castling and
    /// whether the mover's king would be left in check.
    pub fn is_move_possible(&self, from: Square, to: Square) -> bool {
        self.check_geometry(from, to).is_ok()
    }

    /// Validate and apply a move, producing the successor position.
    pub fn apply(&self, mv: Move) -> Result<Position, MoveError> {
        let src = mv.source();
        let dst = mv.dest();
        let us = self.side_to_move;

        // basic checks
        let piece = self.piece_on(src).ok_or(MoveError::SourceEmpty)?;
        if self.color_on(src) != Some(us) {
            return Err(MoveError::WrongColor);
        }
        if self.color_on(dst) == Some(us) {
            return Err(MoveError::DestinationOccupiedBySelf);
        }

        let reaches_back_rank =
            piece == Piece::Pawn && dst.rank().to_index() == us.promotion_rank();
        match mv.promotion() {
            None if reaches_back_rank => return Err(MoveError::PromotionMismatch),
            Some(_) if !reaches_back_rank => return Err(MoveError::PromotionMismatch),
            Some(Piece::Pawn) | Some(Piece::King) => return Err(MoveError::PromotionMismatch),
            _ => {}
        }

        let captured = self.piece_on(dst);
        if let Some(claim) = mv.capture() {
            if claim != captured.is_some() {
                return Err(MoveError::CaptureFlagMismatch);
            }
        }

        // movement legality
        if mv.castling() != Castling::None {
            self.check_castle(mv.castling(), piece, src)?;
        } else {
            self.check_geometry(src, dst)?;
        }

        // build the successor
        let mut next = *self;
        let us_idx = us.to_index();
        let them_idx = (!us).to_index();
        let src_bb = BitBoard::from_square(src);
        let dst_bb = BitBoard::from_square(dst);

        next.hash ^= zobrist::castling_key(next.castling);

        next.pieces[piece.to_index()] ^= src_bb;
        next.colors[us_idx] ^= src_bb;
        next.hash ^= zobrist::piece_key(piece.to_index(), us_idx, src.to_index());

        if let Some(cap) = captured {
            next.pieces[cap.to_index()] ^= dst_bb;
            next.colors[them_idx] ^= dst_bb;
            next.hash ^= zobrist::piece_key(cap.to_index(), them_idx, dst.to_index());
        }

        let placed = mv.promotion().unwrap_or(piece);
        next.pieces[placed.to_index()] ^= dst_bb;
        next.colors[us_idx] ^= dst_bb;
        next.hash ^= zobrist::piece_key(placed.to_index(), us_idx, dst.to_index());

        // castle moves carry the rook along
        let rank = src.rank();
        match mv.castling() {
            Castling::Kingside => {
                let rook_src = Square::make_square(rank, File::from_index(7));
                let rook_dst = Square::make_square(rank, File::from_index(5));
                next.move_piece(Piece::Rook, us, rook_src, rook_dst);
            }
            Castling::Queenside => {
                let rook_src = Square::make_square(rank, File::from_index(0));
                let rook_dst = Square::make_square(rank, File::from_index(3));
                next.move_piece(Piece::Rook, us, rook_src, rook_dst);
            }
            Castling::None => {}
        }

        next.castling &= CASTLING_MASK[src.to_index()];
        next.castling &= CASTLING_MASK[dst.to_index()];
        next.hash ^= zobrist::castling_key(next.castling);

        // reject self-check before the move counts as made
        if let Some(king_sq) = next.king_square(us) {
            if next.is_attacked(king_sq, !us) {
                return Err(MoveError::LeavesOwnKingInCheck);
            }
        }

        next.side_to_move = !us;
        next.hash ^= zobrist::side_key();

        if piece == Piece::Pawn || captured.is_some() {
            next.halfmove_clock = 0;
        } else {
            next.halfmove_clock = self.halfmove_clock + 1;
        }
        if us == Color::Black {
            next.fullmove_number = self.fullmove_number + 1;
        }

        Ok(next)
    }

    /// Piece movement pattern + path clearance, ignoring castling and
    /// self-check. Distinguishes "wrong shape" from "blocked".
    fn check_geometry(&self, from: Square, to: Square) -> Result<(), MoveError> {
        let piece = self.piece_on(from).ok_or(MoveError::SourceEmpty)?;
        let color = self.color_on(from).ok_or(MoveError::SourceEmpty)?;
        if from == to {
            return Err(MoveError::IllegalGeometry);
        }

        let df = to.file().to_index() as i8 - from.file().to_index() as i8;
        let dr = to.rank().to_index() as i8 - from.rank().to_index() as i8;
        let occupied = self.occupied();

        match piece {
            Piece::Knight => {
                if knight_attacks(from).contains(to) {
                    Ok(())
                } else {
                    Err(MoveError::IllegalGeometry)
                }
            }
            Piece::King => {
                if king_attacks(from).contains(to) {
                    Ok(())
                } else {
                    Err(MoveError::IllegalGeometry)
                }
            }
            Piece::Bishop => {
                if df.abs() == dr.abs() && df != 0 {
                    if bishop_attacks(from, occupied).contains(to) {
                        Ok(())
                    } else {
                        Err(MoveError::BlockedPath)
                    }
                } else {
                    Err(MoveError::IllegalGeometry)
                }
            }
            Piece::Rook => {
                if (df == 0) != (dr == 0) {
                    if rook_attacks(from, occupied).contains(to) {
                        Ok(())
                    } else {
                        Err(MoveError::BlockedPath)
                    }
                } else {
                    Err(MoveError::IllegalGeometry)
                }
            }
            Piece::Queen => {
                let diagonal = df.abs() == dr.abs() && df != 0;
                let straight = (df == 0) != (dr == 0);
                if diagonal || straight {
                    if queen_attacks(from, occupied).contains(to) {
                        Ok(())
                    } else {
                        Err(MoveError::BlockedPath)
                    }
                } else {
                    Err(MoveError::IllegalGeometry)
                }
            }
            Piece::Pawn => {
                let forward = color.forward();
                if df == 0 {
                    if dr == forward {
                        if occupied.contains(to) {
                            Err(MoveError::BlockedPath)
                        } else {
                            Ok(())
                        }
                    } else if dr == 2 * forward && from.rank().to_index() == color.home_rank() {
                        let mid = from.shifted(0, forward);
                        if occupied.contains(mid) || occupied.contains(to) {
                            Err(MoveError::BlockedPath)
                        } else {
                            Ok(())
                        }
                    } else {
                        Err(MoveError::IllegalGeometry)
                    }
                } else if df.abs() == 1 && dr == forward {
                    if self.color_on(to) == Some(!color) {
                        Ok(())
                    } else {
                        Err(MoveError::IllegalGeometry)
                    }
                } else {
                    Err(MoveError::IllegalGeometry)
                }
            }
        }
    }

    fn check_castle(&self, wing: Castling, piece: Piece, src: Square) -> Result<(), MoveError> {
        let us = self.side_to_move;
        let rank = Rank::from_index(us.back_rank());

        if piece != Piece::King || src != Square::make_square(rank, File::from_index(4)) {
            return Err(MoveError::CastlingNotAllowed);
        }

        let right = match (us, wing) {
            (Color::White, Castling::Kingside) => WK,
            (Color::White, Castling::Queenside) => WQ,
            (Color::Black, Castling::Kingside) => BK,
            (Color::Black, Castling::Queenside) => BQ,
            (_, Castling::None) => return Err(MoveError::CastlingNotAllowed),
        };
        if self.castling & right == 0 {
            return Err(MoveError::CastlingNotAllowed);
        }

        let (rook_file, between, transit): (usize, &[usize], &[usize]) = match wing {
            Castling::Kingside => (7, &[5, 6], &[5, 6]),
            Castling::Queenside => (0, &[1, 2, 3], &[3, 2]),
            Castling::None => return Err(MoveError::CastlingNotAllowed),
        };

        // the right can outlive the rook on a hand-written FEN
        let rook_sq = Square::make_square(rank, File::from_index(rook_file));
        if !(self.pieces[Piece::Rook.to_index()] & self.colors[us.to_index()]).contains(rook_sq) {
            return Err(MoveError::CastlingNotAllowed);
        }

        let occupied = self.occupied();
        for &f in between {
            if occupied.contains(Square::make_square(rank, File::from_index(f))) {
                return Err(MoveError::CastlingNotAllowed);
            }
        }

        if self.is_attacked(src, !us) {
            return Err(MoveError::CastlingNotAllowed);
        }
        for &f in transit {
            if self.is_attacked(Square::make_square(rank, File::from_index(f)), !us) {
                return Err(MoveError::CastlingNotAllowed);
            }
        }

        Ok(())
    }

    /// Shift a piece between two squares (castle rook relocation).
    fn move_piece(&mut self, piece: Piece, color: Color, from: Square, to: Square) {
        let from_bb = BitBoard::from_square(from);
        let to_bb = BitBoard::from_square(to);
        let ci = color.to_index();
        let pi = piece.to_index();
        self.pieces[pi] ^= from_bb | to_bb;
        self.colors[ci] ^= from_bb | to_bb;
        self.hash ^= zobrist::piece_key(pi, ci, from.to_index());
        self.hash ^= zobrist::piece_key(pi, ci, to.to_index());
    }

    /// Compute hash from scratch (FEN parsing; consistency checks).
    fn compute_hash(&self) -> u64 {
        let mut h = 0u64;
        for piece in Piece::ALL {
            for color in [Color::White, Color::Black] {
                let bb = self.pieces[piece.to_index()] & self.colors[color.to_index()];
                for sq in bb.iter() {
                    h ^= zobrist::piece_key(piece.to_index(), color.to_index(), sq.to_index());
                }
            }
        }
        if self.side_to_move == Color::Black {
            h ^= zobrist::side_key();
        }
        h ^= zobrist::castling_key(self.castling);
        h
    }
}

// --- Castling rights update mask ---
// When piece moves from or to square, AND castling rights with this mask
// This handles rook captures and king/rook moves
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0xFFu8; 64];
    // A1 (index 0) = White queenside rook
    mask[0] = 0xFF ^ WQ;
    // H1 (index 7) = White kingside rook
    mask[7] = 0xFF ^ WK;
    // E1 (index 4) = White king
    mask[4] = 0xFF ^ (WK | WQ);
    // A8 (index 56) = Black queenside rook
    mask[56] = 0xFF ^ BQ;
    // H8 (index 63) = Black kingside rook
    mask[63] = 0xFF ^ BK;
    // E8 (index 60) = Black king
    mask[60] = 0xFF ^ (BK | BQ);
    mask
};

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.pieces == other.pieces
            && self.colors == other.colors
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
    }
}

impl Eq for Position {}

// --- FEN parsing ---

impl FromStr for Position {
    type Err = InvalidFen;

    fn from_str(fen: &str) -> Result<Self, InvalidFen> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(InvalidFen(format!("expected 6 fields, got {}", parts.len())));
        }

        let mut pieces = [EMPTY; 6];
        let mut colors = [EMPTY; 2];

        // piece placement: eight '/'-separated ranks, rank 8 first
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(InvalidFen(format!("expected 8 ranks, got {}", ranks.len())));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for ch in rank_str.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(InvalidFen(format!("bad empty-run digit: {}", ch)));
                    }
                    file += skip as usize;
                } else {
                    let piece = Piece::from_fen_char(ch)
                        .ok_or_else(|| InvalidFen(format!("unknown piece letter: {}", ch)))?;
                    if file >= 8 {
                        return Err(InvalidFen(format!("rank {} overflows", rank + 1)));
                    }
                    let color = if ch.is_ascii_uppercase() { Color::White } else { Color::Black };
                    let sq =
                        Square::make_square(Rank::from_index(rank), File::from_index(file));
                    let bb = BitBoard::from_square(sq);
                    pieces[piece.to_index()] |= bb;
                    colors[color.to_index()] |= bb;
                    file += 1;
                }
                if file > 8 {
                    return Err(InvalidFen(format!("rank {} overflows", rank + 1)));
                }
            }
            if file != 8 {
                return Err(InvalidFen(format!("rank {} covers {} files", rank + 1, file)));
            }
        }

        for color in [Color::White, Color::Black] {
            if (pieces[Piece::King.to_index()] & colors[color.to_index()]).popcnt() > 1 {
                return Err(InvalidFen(format!("{:?} has more than one king", color)));
            }
        }

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(InvalidFen(format!("bad active color: {}", other))),
        };

        let mut castling = 0u8;
        if parts[2] != "-" {
            if parts[2].is_empty() {
                return Err(InvalidFen("empty castling field".to_string()));
            }
            for ch in parts[2].chars() {
                match ch {
                    'K' => castling |= WK,
                    'Q' => castling |= WQ,
                    'k' => castling |= BK,
                    'q' => castling |= BQ,
                    _ => return Err(InvalidFen(format!("bad castling char: {}", ch))),
                }
            }
        }

        // en passant target: grammatically checked, then ignored
        if parts[3] != "-" {
            let bytes = parts[3].as_bytes();
            let ok = bytes.len() == 2
                && (b'a'..=b'h').contains(&bytes[0])
                && (b'1'..=b'8').contains(&bytes[1]);
            if !ok {
                return Err(InvalidFen(format!("bad en passant target: {}", parts[3])));
            }
        }

        let halfmove_clock: u16 = parts[4]
            .parse()
            .map_err(|_| InvalidFen(format!("bad halfmove clock: {}", parts[4])))?;
        let fullmove_number: u16 = parts[5]
            .parse()
            .map_err(|_| InvalidFen(format!("bad fullmove number: {}", parts[5])))?;

        let mut position = Position {
            pieces,
            colors,
            side_to_move,
            castling,
            halfmove_clock,
            fullmove_number,
            hash: 0,
        };
        position.hash = position.compute_hash();

        Ok(position)
    }
}

// --- FEN output (Display) ---

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Piece placement
        for rank in (0..8).rev() {
            let mut empty_count = 0;
            for file in 0..8 {
                let sq = Square::make_square(Rank::from_index(rank), File::from_index(file));
                if let Some(piece) = self.piece_on(sq) {
                    if empty_count > 0 {
                        write!(f, "{}", empty_count)?;
                        empty_count = 0;
                    }
                    let ch = if self.color_on(sq) == Some(Color::White) {
                        piece.fen_char().to_ascii_uppercase()
                    } else {
                        piece.fen_char()
                    };
                    write!(f, "{}", ch)?;
                } else {
                    empty_count += 1;
                }
            }
            if empty_count > 0 {
                write!(f, "{}", empty_count)?;
            }
            if rank > 0 {
                write!(f, "/")?;
            }
        }

        // Side to move
        write!(f, " {}", if self.side_to_move == Color::White { "w" } else { "b" })?;

        // Castling
        write!(f, " ")?;
        if self.castling == 0 {
            write!(f, "-")?;
        } else {
            if self.castling & WK != 0 { write!(f, "K")?; }
            if self.castling & WQ != 0 { write!(f, "Q")?; }
            if self.castling & BK != 0 { write!(f, "k")?; }
            if self.castling & BQ != 0 { write!(f, "q")?; }
        }

        // En passant is never tracked
        write!(f, " -")?;

        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)?;

        Ok(())
    }
}


// Position is a `Copy` value. Instead of a 64-element array of pieces, use bitboards: 6 `BitBoard`s
// for piece kinds and 2 for colors. To find what's on a square, check which bitboards have that
// bit set. Slightly slower for single-square queries, but much faster for pattern matching.

// CASTLING_MASK -> instead of checking "did king or rook move" w/ complex conditionals, can use
// 64-element lookup table. When ANY piece moves from or to square X, AND the castling rights with
// `CASTLING_MASK[X]`. Most entries are 0xFF (no change), but king and rook starting squares have
// specific bits cleared. This also handles the case where a rook is captured (destination square
// clears the opponent's castling rights).
