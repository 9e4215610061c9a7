//! Scalar arithmetic modulo the group order ℓ, and the SPAKE2-layer 32-byte
//! scalar used only for the password-scalar compatibility hack.
//!
//! ℓ = 2^252 + 27742317777372353535851937790883648493. The reduction below
//! works directly on the 512-bit wide product/hash input and the 256-bit
//! modulus as little-endian `u64` limb arrays; per the spec, the
//! intermediate representation used during reduction is implementation-free
//! — only the canonical 32-byte output is observable.

/// ℓ, little-endian 64-bit limbs (256 bits, top bits beyond ~2^253 unused).
const L_LIMBS: [u64; 4] = [
    0x5812_631a_5cf5_d3ed,
    0x14de_f9de_a2f7_9cd6,
    0x0000_0000_0000_0000,
    0x1000_0000_0000_0000,
];

fn limbs_from_le_bytes(bytes: &[u8]) -> Vec<u64> {
    bytes
        .chunks(8)
        .map(|chunk| {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            u64::from_le_bytes(buf)
        })
        .collect()
}

fn le_bytes_from_limbs(limbs: &[u64], out_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(limbs.len() * 8);
    for limb in limbs {
        out.extend_from_slice(&limb.to_le_bytes());
    }
    out.truncate(out_len);
    out
}

fn is_zero(limbs: &[u64]) -> bool {
    limbs.iter().all(|&l| l == 0)
}

fn cmp(a: &[u64], b: &[u64]) -> std::cmp::Ordering {
    for i in (0..a.len().max(b.len())).rev() {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        if av != bv {
            return av.cmp(&bv);
        }
    }
    std::cmp::Ordering::Equal
}

fn sub_assign(a: &mut [u64], b: &[u64]) {
    let mut borrow: i128 = 0;
    for i in 0..a.len() {
        let bv = b.get(i).copied().unwrap_or(0) as i128;
        let diff = a[i] as i128 - bv - borrow;
        if diff < 0 {
            a[i] = (diff + (1i128 << 64)) as u64;
            borrow = 1;
        } else {
            a[i] = diff as u64;
            borrow = 0;
        }
    }
}

fn shl(limbs: &[u64], bits: u32, out_words: usize) -> Vec<u64> {
    let word_shift = (bits / 64) as usize;
    let bit_shift = bits % 64;
    let mut out = vec![0u64; out_words];
    for i in 0..limbs.len() {
        let dst = i + word_shift;
        if dst >= out_words {
            break;
        }
        if bit_shift == 0 {
            out[dst] |= limbs[i];
        } else {
            out[dst] |= limbs[i] << bit_shift;
            if dst + 1 < out_words {
                out[dst + 1] |= limbs[i] >> (64 - bit_shift);
            }
        }
    }
    out
}

fn bit_length(limbs: &[u64]) -> u32 {
    for i in (0..limbs.len()).rev() {
        if limbs[i] != 0 {
            return (i as u32) * 64 + (64 - limbs[i].leading_zeros());
        }
    }
    0
}

/// Reduces a 64-byte wide value (e.g. a SHA-512 digest) modulo ℓ, producing
/// the unique canonical 32-byte little-endian representative in `[0, ℓ)`.
pub fn reduce_wide(input: &[u8; 64]) -> [u8; 32] {
    reduce_bytes(input)
}

/// Reduces an arbitrary little-endian byte string modulo ℓ.
pub fn reduce_bytes(input: &[u8]) -> [u8; 32] {
    let mut acc = limbs_from_le_bytes(input);
    // Pad so shifted subtractions never index out of range.
    while acc.len() < 10 {
        acc.push(0);
    }

    let l_bits = bit_length(&L_LIMBS);
    let acc_bits = bit_length(&acc).max(l_bits);
    if acc_bits < l_bits {
        let mut out = [0u8; 32];
        let bytes = le_bytes_from_limbs(&acc, 32);
        out.copy_from_slice(&bytes);
        return out;
    }

    let mut shift = acc_bits - l_bits;
    loop {
        let shifted = shl(&L_LIMBS, shift, acc.len());
        if cmp(&acc, &shifted) != std::cmp::Ordering::Less {
            sub_assign(&mut acc, &shifted);
        }
        if shift == 0 {
            break;
        }
        shift -= 1;
    }

    // acc is now < 2*ℓ in the worst case due to the coarse top-bit estimate;
    // one more conditional subtraction makes it canonical.
    if cmp(&acc, &L_LIMBS) != std::cmp::Ordering::Less {
        sub_assign(&mut acc, &L_LIMBS);
    }

    let mut out = [0u8; 32];
    let bytes = le_bytes_from_limbs(&acc, 32);
    out.copy_from_slice(&bytes);
    out
}

/// ℓ itself as a `Scalar32`, used only to build the multiples added during
/// the password-scalar hack.
pub fn ell() -> Scalar32 {
    let bytes = le_bytes_from_limbs(&L_LIMBS, 32);
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Scalar32(out)
}

/// The SPAKE2-layer 32-byte scalar. Used exclusively for the password-scalar
/// hack (see [`crate::spake2`]); its `add`/`dbl` are plain 256-bit
/// little-endian arithmetic with overflow silently discarded past bit 256 —
/// deliberately *not* reduced mod ℓ, matching the documented BoringSSL
/// workaround semantics.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Scalar32(pub [u8; 32]);

impl Scalar32 {
    pub fn zero() -> Self {
        Scalar32([0u8; 32])
    }

    /// 256-bit little-endian addition, overflow past bit 256 discarded.
    pub fn add(&self, other: &Scalar32) -> Scalar32 {
        let mut out = [0u8; 32];
        let mut carry = 0u16;
        for i in 0..32 {
            let sum = self.0[i] as u16 + other.0[i] as u16 + carry;
            out[i] = sum as u8;
            carry = sum >> 8;
        }
        Scalar32(out)
    }

    /// Doubling, i.e. `add(self, self)`.
    pub fn dbl(&self) -> Scalar32 {
        self.add(self)
    }

    /// Left-shift within the 32-byte buffer by `bits` (0..=7), discarding
    /// bits shifted out past byte 31. Used to multiply by 8 when clearing
    /// the cofactor.
    pub fn shl_small(&self, bits: u32) -> Scalar32 {
        debug_assert!(bits < 8);
        let mut out = [0u8; 32];
        let mut carry = 0u16;
        for i in 0..32 {
            let shifted = (self.0[i] as u16) << bits;
            out[i] = (shifted | carry) as u8;
            carry = shifted >> 8;
        }
        Scalar32(out)
    }

    /// Bytewise select on a 32-bit mask expanded 8 times across the 32
    /// bytes: the little-endian bytes of `mask` are repeated over each of
    /// the eight `u32` words, and each output byte is `(self_byte & mask_byte)
    /// | (src_byte & !mask_byte)` — a set mask bit keeps `self`'s bit, a
    /// clear mask bit takes `src`'s bit. With `mask = 0` this returns `src`;
    /// with `mask = 0xffff_ffff` it returns `self`.
    pub fn cmov(&self, src: &Scalar32, mask: u32) -> Scalar32 {
        let mask_bytes = mask.to_le_bytes();
        let mut out = [0u8; 32];
        for i in 0..32 {
            let m = mask_bytes[i % 4];
            out[i] = (self.0[i] & m) | (src.0[i] & !m);
        }
        Scalar32(out)
    }

    /// `true` iff bit `i` (0-indexed from the low end) of byte 0 is set.
    pub fn byte0_bit(&self, i: u32) -> bool {
        (self.0[0] >> i) & 1 == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hexbytes32(s: &str) -> [u8; 32] {
        let v = hex::decode(s).unwrap();
        let mut out = [0u8; 32];
        let n = v.len().min(32);
        out[..n].copy_from_slice(&v[..n]);
        out
    }

    #[test]
    fn dbl_vector_matches_known_answer() {
        let s = Scalar32(hexbytes32(
            "edd3f55c1a631258d69cf7a2def9de1400000000000000000000000000000010",
        ));
        let expected = Scalar32(hexbytes32(
            "daa7ebb934c624b0ac39ef45bdf3bd2900000000000000000000000000000020",
        ));
        assert_eq!(s.dbl(), expected);
    }

    #[test]
    fn small_scalar_doubling() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x08;
        let s = Scalar32(bytes);
        let doubled = s.dbl();
        let mut expect = [0u8; 32];
        expect[0] = 0x10;
        assert_eq!(doubled, Scalar32(expect));
    }

    #[test]
    fn cmov_all_ones_and_all_zero_masks_select_whole_operand() {
        let mut a = [0u8; 32];
        a[0] = 0xAA;
        let zero = Scalar32::zero();
        let sa = Scalar32(a);
        assert_eq!(sa.cmov(&zero, 0), zero);
        assert_eq!(sa.cmov(&zero, 0xffff_ffff), sa);
    }

    #[test]
    fn cmov_vector_0x11() {
        let s = Scalar32(hexbytes32(
            "edd3f55c1a631258d69cf7a2def9de1400000000000000000000000000000010",
        ));
        let zero = Scalar32::zero();
        let expected = Scalar32(hexbytes32(
            "0100000010000000100000001000000000000000000000000000000000000000",
        ));
        assert_eq!(s.cmov(&zero, 0x11), expected);
    }

    #[test]
    fn cmov_vector_0xf9() {
        let s = Scalar32(hexbytes32(
            "edd3f55c1a631258d69cf7a2def9de1400000000000000000000000000000010",
        ));
        let zero = Scalar32::zero();
        let expected = Scalar32(hexbytes32(
            "e900000018000000d0000000d800000000000000000000000000000000000000",
        ));
        assert_eq!(s.cmov(&zero, 0xF9), expected);
    }

    #[test]
    fn reduce_small_value_is_identity() {
        let mut input = [0u8; 64];
        input[0] = 5;
        let reduced = reduce_wide(&input);
        let mut expect = [0u8; 32];
        expect[0] = 5;
        assert_eq!(reduced, expect);
    }

    #[test]
    fn reduce_is_less_than_l() {
        let input = [0xffu8; 64];
        let reduced = reduce_wide(&input);
        assert!(cmp(&limbs_from_le_bytes(&reduced), &L_LIMBS) == std::cmp::Ordering::Less);
    }
}
