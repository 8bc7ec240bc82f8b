//! Standard Algebraic Notation, bound against a position.
//!
//! ```text
//! move      := moveDesc ('+' | '#')?
//! moveDesc  := castle | ordinary
//! castle    := 'O-O' | 'O-O-O'
//! ordinary  := pieceKind? source? 'x'? destination promo?
//! pieceKind := 'N' | 'B' | 'R' | 'Q' | 'K'
//! source    := FILE | RANK | square
//! promo     := '=' pieceKind
//! ```

use crate::board::{Castling, File, Move, Piece, Position, Rank, Square};
use crate::error::SanError;

/// Parse a SAN string and resolve it to a move in `position`.
///
/// The source square is inferred when the notation leaves it out: candidates
/// are the active side's pieces of the written kind, narrowed by the
/// disambiguator, then by whether the piece can reach the destination at
/// all. Exactly one square may survive. A trailing `+`/`#` is accepted and
/// not checked against the resulting position.
pub fn parse_san(position: &Position, input: &str) -> Result<Move, SanError> {
    let mut s = input.as_bytes();
    if s.is_empty() {
        return Err(SanError::Parse(input.to_string()));
    }

    // optional check/mate suffix
    if let [rest @ .., b'+'] | [rest @ .., b'#'] = s {
        s = rest;
    }

    if s == b"O-O" {
        return Ok(Move::castle(position.active_side(), Castling::Kingside));
    }
    if s == b"O-O-O" {
        return Ok(Move::castle(position.active_side(), Castling::Queenside));
    }

    // promotion suffix
    let mut promotion = None;
    if s.len() >= 2 && s[s.len() - 2] == b'=' {
        promotion = Some(promotion_kind(s[s.len() - 1], input)?);
        s = &s[..s.len() - 2];
    }

    // destination square
    if s.len() < 2 {
        return Err(SanError::Parse(input.to_string()));
    }
    let dest = parse_square(&s[s.len() - 2..], input)?;
    s = &s[..s.len() - 2];

    // leading piece kind; none means pawn
    let piece = match s.first().copied().and_then(piece_from_letter) {
        Some(kind) => {
            s = &s[1..];
            kind
        }
        None => Piece::Pawn,
    };

    // capture marker sits between the disambiguator and the destination
    let mut capture = false;
    if let [rest @ .., b'x'] = s {
        capture = true;
        s = rest;
    }

    // whatever is left restricts the source: file, rank, or full square
    let (src_file, src_rank) = match s {
        [] => (None, None),
        [f] if (b'a'..=b'h').contains(f) => (File::from_char(*f as char), None),
        [r] if (b'1'..=b'8').contains(r) => (None, Rank::from_char(*r as char)),
        [f, r] => {
            let sq = parse_square(&[*f, *r], input)?;
            (Some(sq.file()), Some(sq.rank()))
        }
        _ => return Err(SanError::Parse(input.to_string())),
    };

    let source = infer_source(position, piece, src_file, src_rank, dest, input)?;
    Ok(Move::new(source, dest, promotion).with_capture(capture))
}

fn infer_source(
    position: &Position,
    piece: Piece,
    src_file: Option<File>,
    src_rank: Option<Rank>,
    dest: Square,
    input: &str,
) -> Result<Square, SanError> {
    let candidates =
        position.pieces(piece) & position.color_combined(position.active_side());

    let mut found: Option<Square> = None;
    for sq in candidates.iter() {
        if let Some(f) = src_file {
            if sq.file() != f {
                continue;
            }
        }
        if let Some(r) = src_rank {
            if sq.rank() != r {
                continue;
            }
        }
        if !position.is_move_possible(sq, dest) {
            continue;
        }
        if found.is_some() {
            return Err(SanError::AmbiguousMove(input.to_string()));
        }
        found = Some(sq);
    }

    found.ok_or_else(|| SanError::NoSuchMove(input.to_string()))
}

fn parse_square(bytes: &[u8], input: &str) -> Result<Square, SanError> {
    debug_assert_eq!(bytes.len(), 2);
    let file = File::from_char(bytes[0] as char);
    let rank = Rank::from_char(bytes[1] as char);
    match (file, rank) {
        (Some(f), Some(r)) => Ok(Square::make_square(r, f)),
        _ => Err(SanError::Parse(input.to_string())),
    }
}

/// The piece kind a SAN letter names; pawns have no letter.
fn piece_from_letter(byte: u8) -> Option<Piece> {
    Piece::ALL.into_iter().find(|p| p.san_char() == Some(byte as char))
}

fn promotion_kind(byte: u8, input: &str) -> Result<Piece, SanError> {
    match piece_from_letter(byte) {
        Some(Piece::King) | None => Err(SanError::Parse(input.to_string())),
        Some(kind) => Ok(kind),
    }
}
