//! Curve-level constants: the standard base point `B`, and the SPAKE2 mask
//! points `M` and `N`, each built once and cached for the lifetime of the
//! process.

use crate::group::{
    build_fixed_base_table, build_small_table, FixedBaseTable, SmallTable, P3,
};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// The standard edwards25519 base point, compressed encoding (`y = 4/5`,
/// `x` even). Matches the well-known RFC 8032 generator.
const BASE_POINT_BYTES: [u8; 32] = [
    0x58, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66,
];

/// Seeds used to deterministically derive the mask points `M` and `N`, in
/// the manner the documented algorithm describes: hash the seed, treat the
/// digest as a compressed point, and decompress.
const M_SEED: &[u8] = b"edwards25519 point generation seed (M)";
const N_SEED: &[u8] = b"edwards25519 point generation seed (N)";

fn derive_mask_point(seed: &[u8]) -> P3 {
    let digest: [u8; 32] = Sha256::digest(seed).into();
    P3::from_bytes_negate_vartime(&digest)
        .expect("mask point seed must decode to a valid curve point")
}

static BASE_POINT: OnceLock<P3> = OnceLock::new();
static BASE_TABLE: OnceLock<FixedBaseTable> = OnceLock::new();
static M_POINT: OnceLock<P3> = OnceLock::new();
static M_TABLE: OnceLock<SmallTable> = OnceLock::new();
static N_POINT: OnceLock<P3> = OnceLock::new();
static N_TABLE: OnceLock<SmallTable> = OnceLock::new();

/// The standard edwards25519 base point `B`.
pub fn base_point() -> P3 {
    *BASE_POINT.get_or_init(|| {
        P3::from_bytes_negate_vartime(&BASE_POINT_BYTES)
            .expect("the standard base point encoding always decodes")
    })
}

/// The 32-row fixed-base table over `B`, built once.
pub fn base_table() -> &'static FixedBaseTable {
    BASE_TABLE.get_or_init(|| build_fixed_base_table(&base_point()))
}

/// The Alice-side mask point `M`.
pub fn m_point() -> P3 {
    *M_POINT.get_or_init(|| derive_mask_point(M_SEED))
}

/// The 15-entry small table over `M`.
pub fn m_table() -> &'static SmallTable {
    M_TABLE.get_or_init(|| build_small_table(&m_point()))
}

/// The Bob-side mask point `N`.
pub fn n_point() -> P3 {
    *N_POINT.get_or_init(|| derive_mask_point(N_SEED))
}

/// The 15-entry small table over `N`.
pub fn n_table() -> &'static SmallTable {
    N_TABLE.get_or_init(|| build_small_table(&n_point()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_point_round_trips_through_compression() {
        let b = base_point();
        assert_eq!(b.compress(), BASE_POINT_BYTES);
    }

    #[test]
    fn mask_points_are_distinct_and_stable() {
        let m1 = m_point();
        let m2 = m_point();
        let n = n_point();
        assert_eq!(m1.compress(), m2.compress());
        assert_ne!(m1.compress(), n.compress());
    }

    #[test]
    fn tables_are_cached_across_calls() {
        let t1 = base_table() as *const FixedBaseTable;
        let t2 = base_table() as *const FixedBaseTable;
        assert_eq!(t1, t2);
    }
}
