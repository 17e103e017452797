//! Coordinate seeding.
//!
//! A tile's seed is the base seed plus an injective fold of its coordinate:
//! zig-zag maps each signed axis onto the naturals, Cantor pairing folds the
//! two naturals into one, and the result is truncated to 32 bits. The origin
//! folds to zero, so tile (0, 0) always runs on the unmodified base seed.
//!
//! All arithmetic wraps. Coordinates large enough to overflow 64 bits alias
//! other tiles; the plane is treated as bounded by that range.

/// Map a signed integer onto the naturals: 0, -1, 1, -2, 2, ... -> 0, 1, 2, 3, 4, ...
pub fn zigzag(c: i64) -> u64 {
    if c >= 0 {
        (c as u64).wrapping_mul(2)
    } else {
        c.unsigned_abs().wrapping_mul(2).wrapping_sub(1)
    }
}

/// Cantor pairing: `(a + b)(a + b + 1) / 2 + a`, exact modulo 2^64.
pub fn cantor_pair(a: u64, b: u64) -> u64 {
    let s = a.wrapping_add(b);
    // Halve whichever factor is even so the division is exact before wrapping.
    let triangle = if s % 2 == 0 {
        (s / 2).wrapping_mul(s.wrapping_add(1))
    } else {
        s.wrapping_mul(s.wrapping_add(1) / 2)
    };
    triangle.wrapping_add(a)
}

/// Seed for the tile at `(x, y)` under `base_seed`.
pub fn derive(base_seed: u32, x: i64, y: i64) -> u32 {
    let folded = cantor_pair(zigzag(x), zigzag(y));
    base_seed.wrapping_add(folded as u32)
}

/// A 32-bit seed, displayed the way seeds are usually quoted: `0x1234ABCD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct DerivedSeed(pub u32);

impl std::fmt::Display for DerivedSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeedParseError {
    #[error("seed is empty")]
    Empty,
    #[error("invalid hexadecimal seed: {0:?}")]
    InvalidHex(String),
    #[error("invalid decimal seed: {0:?}")]
    InvalidDecimal(String),
}

/// Parse a seed given either as decimal (`305419896`) or hex with a `0x` prefix (`0x12345678`).
pub fn parse_seed(src: &str) -> Result<u32, SeedParseError> {
    let src = src.trim();
    if src.is_empty() {
        return Err(SeedParseError::Empty);
    }
    match src.strip_prefix("0x").or_else(|| src.strip_prefix("0X")) {
        Some(hex) => {
            u32::from_str_radix(hex, 16).map_err(|_| SeedParseError::InvalidHex(src.to_string()))
        }
        None => src
            .parse::<u32>()
            .map_err(|_| SeedParseError::InvalidDecimal(src.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn zigzag_interleaves_signs() {
        let mapped: Vec<u64> = [0, -1, 1, -2, 2, -3].into_iter().map(zigzag).collect();
        assert_eq!(mapped, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn cantor_pair_small_values() {
        assert_eq!(cantor_pair(0, 0), 0);
        assert_eq!(cantor_pair(0, 1), 1);
        assert_eq!(cantor_pair(1, 0), 2);
        assert_eq!(cantor_pair(0, 2), 3);
        assert_eq!(cantor_pair(2, 0), 5);
        assert_eq!(cantor_pair(3, 4), 31);
    }

    #[test]
    fn origin_uses_base_seed() {
        for seed in [0, 1, 42, 0xDEAD_BEEF, u32::MAX] {
            assert_eq!(derive(seed, 0, 0), seed);
        }
    }

    #[test]
    fn derive_adds_folded_coordinate() {
        // zigzag(1) = 2, zigzag(0) = 0, pair(2, 0) = 5
        assert_eq!(derive(5, 1, 0), 10);
        // zigzag(-1) = 1, pair(0, 1) = 1
        assert_eq!(derive(5, 0, -1), 6);
    }

    #[test]
    fn derive_wraps_at_u32_max() {
        assert_eq!(derive(u32::MAX, 1, 0), 4);
    }

    #[test]
    fn extreme_coordinates_do_not_panic() {
        let _ = derive(7, i64::MAX, i64::MIN);
        let _ = derive(7, i64::MIN, i64::MIN);
        let _ = derive(7, i64::MAX, i64::MAX);
    }

    #[test]
    fn distinct_coordinates_get_distinct_seeds() {
        let mut seen = HashSet::new();
        for x in (-1000..=1000).step_by(7) {
            for y in (-1000..=1000).step_by(7) {
                assert!(seen.insert(derive(0x5EED, x, y)), "collision at ({x}, {y})");
            }
        }
    }

    #[test]
    fn neighbors_get_distinct_seeds() {
        let mut seen = HashSet::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                seen.insert(derive(99, 10 + dx, -20 + dy));
            }
        }
        assert_eq!(seen.len(), 9);
    }

    #[test]
    fn seed_display_is_hex() {
        assert_eq!(DerivedSeed(0x1234_abcd).to_string(), "0x1234ABCD");
        assert_eq!(DerivedSeed(1).to_string(), "0x00000001");
    }

    #[test]
    fn parse_seed_accepts_hex_and_decimal() {
        assert_eq!(parse_seed("0x1234ABCD"), Ok(0x1234_ABCD));
        assert_eq!(parse_seed("0Xff"), Ok(255));
        assert_eq!(parse_seed(" 42 "), Ok(42));
    }

    #[test]
    fn parse_seed_rejects_garbage() {
        assert_eq!(parse_seed(""), Err(SeedParseError::Empty));
        assert!(matches!(parse_seed("0xZZ"), Err(SeedParseError::InvalidHex(_))));
        assert!(matches!(
            parse_seed("4294967296"),
            Err(SeedParseError::InvalidDecimal(_))
        ));
    }
}
