use std::sync::LazyLock;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

struct ZobristKeys {
    /// Zobrist keys: [piece_kind][color][square]
    piece: [[[u64; 64]; 2]; 6],
    /// key XORed when it's black's turn
    side: u64,
    /// keys for each castling rights combination (4 bits -> 16 values)
    castling: [u64; 16],
}

static KEYS: LazyLock<ZobristKeys> = LazyLock::new(|| {
    // fixed seed: deterministic keys across runs
    let mut rng = SmallRng::from_seed(*b"3.141592653589793238462643383279");

    let mut piece = [[[0u64; 64]; 2]; 6];
    for piece_keys in &mut piece {
        for color_keys in piece_keys {
            for key in color_keys {
                *key = rng.next_u64();
            }
        }
    }

    let side = rng.next_u64();

    let mut castling = [0u64; 16];
    for key in &mut castling {
        *key = rng.next_u64();
    }

    ZobristKeys { piece, side, castling }
});

#[inline]
pub fn piece_key(piece: usize, color: usize, sq: usize) -> u64 {
    KEYS.piece[piece][color][sq]
}

#[inline]
pub fn side_key() -> u64 {
    KEYS.side
}

#[inline]
pub fn castling_key(rights: u8) -> u64 {
    KEYS.castling[rights as usize & 0xF]
}


// zobrist hashing goal is to generate deterministic random keys for position hashing. Each
// position gets a near-unique 64-bit hash used for the transposition table.
// 1. pregenerate random 64 bit num for every piece, color, square triple, plus side-to-move
//    and castling rights
// 2. Position's hash = XOR of all applicable keys
// 3. When making move, incrementally update hash: XOR out removed pieces, XOR in placed pieces,
//    XOR the side key
// 4. XOR is its own inverse: `hash ^= key; hash ^= key;` restores original hash
// This all gives O(1) hash updates per move instead of O(# of pieces)

// The hash covers board + side + castling rights only; the move counters never enter it, so two
// positions that differ only in clocks share a hash and a transposition-table slot.
