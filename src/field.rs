//! Prime-field arithmetic modulo p = 2^255 - 19.
//!
//! Ten signed 32-bit limbs in the alternating 2^26/2^25 radix used by the
//! ref10 lineage of Ed25519 implementations (limbs 0,2,4,6,8 hold values up
//! to ~2^26; limbs 1,3,5,7,9 hold values up to ~2^25). This layout avoids
//! 128-bit products during multiplication (partial products fit in i64) and
//! is the layout that reproduces BoringSSL's field arithmetic bit-for-bit
//! when carried consistently.

use subtle::{Choice, ConditionallySelectable};

/// An element of GF(p), p = 2^255 - 19, stored as ten limbs.
#[derive(Clone, Copy, Debug)]
pub struct FieldElement(pub [i32; 10]);

const BITS: [u32; 10] = [26, 25, 26, 25, 26, 25, 26, 25, 26, 25];

impl FieldElement {
    pub const ZERO: FieldElement = FieldElement([0; 10]);
    pub const ONE: FieldElement = FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

    /// d = -121665/121666 mod p, the edwards25519 curve parameter.
    pub fn d() -> FieldElement {
        FieldElement([
            -10913610, 13857413, -15372611, 6949391, 114729, -8787816, -6275908, -3247719,
            -18696448, -12055116,
        ])
    }

    /// 2*d mod p.
    pub fn d2() -> FieldElement {
        FieldElement([
            -21827239, -5839606, -30745221, 13897642, 229458, 15447954, -14758279, -6477814,
            9444199, -14006042,
        ])
    }

    /// sqrt(-1) mod p, used during point decompression.
    pub fn sqrt_m1() -> FieldElement {
        FieldElement([
            -32595792, -7943725, 9377950, 3500415, 12389472, -272473, -25146209, -2599037,
            -15763755, 22460232,
        ])
    }

    /// Decodes ten little-endian limbs from a 32-byte canonical encoding,
    /// clearing the reserved sign bit (bit 255 / the high bit of byte 31).
    pub fn from_bytes(s: &[u8; 32]) -> FieldElement {
        let load_3 = |b: &[u8]| -> i64 { (b[0] as i64) | ((b[1] as i64) << 8) | ((b[2] as i64) << 16) };
        let load_4 = |b: &[u8]| -> i64 {
            (b[0] as i64) | ((b[1] as i64) << 8) | ((b[2] as i64) << 16) | ((b[3] as i64) << 24)
        };

        let mut h = [0i64; 10];
        h[0] = load_4(&s[0..4]);
        h[1] = load_3(&s[4..7]) << 6;
        h[2] = load_3(&s[7..10]) << 5;
        h[3] = load_3(&s[10..13]) << 3;
        h[4] = load_3(&s[13..16]) << 2;
        h[5] = load_4(&s[16..20]);
        h[6] = load_3(&s[20..23]) << 7;
        h[7] = load_3(&s[23..26]) << 5;
        h[8] = load_3(&s[26..29]) << 4;
        h[9] = (load_3(&s[29..32]) & 0x7f_ffff) << 2;

        let mut fe = [0i32; 10];
        carry_chain(&mut h);
        for i in 0..10 {
            fe[i] = h[i] as i32;
        }
        FieldElement(fe)
    }

    /// Encodes to the canonical 32-byte little-endian form (bit 255 clear;
    /// callers doing point compression OR in the sign bit separately).
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut h = [0i64; 10];
        for i in 0..10 {
            h[i] = self.0[i] as i64;
        }

        // Fully reduce mod p: carry once, then conditionally subtract p.
        carry_chain(&mut h);

        let mut q = (19 * h[9] + (1 << 24)) >> 25;
        q = (h[0] + q) >> 26;
        q = (h[1] + q) >> 25;
        q = (h[2] + q) >> 26;
        q = (h[3] + q) >> 25;
        q = (h[4] + q) >> 26;
        q = (h[5] + q) >> 25;
        q = (h[6] + q) >> 26;
        q = (h[7] + q) >> 25;
        q = (h[8] + q) >> 26;
        q = (h[9] + q) >> 25;

        h[0] += 19 * q;

        let mut carry = [0i64; 10];
        carry[0] = h[0] >> 26;
        h[1] += carry[0];
        h[0] -= carry[0] << 26;
        carry[1] = h[1] >> 25;
        h[2] += carry[1];
        h[1] -= carry[1] << 25;
        carry[2] = h[2] >> 26;
        h[3] += carry[2];
        h[2] -= carry[2] << 26;
        carry[3] = h[3] >> 25;
        h[4] += carry[3];
        h[3] -= carry[3] << 25;
        carry[4] = h[4] >> 26;
        h[5] += carry[4];
        h[4] -= carry[4] << 26;
        carry[5] = h[5] >> 25;
        h[6] += carry[5];
        h[5] -= carry[5] << 25;
        carry[6] = h[6] >> 26;
        h[7] += carry[6];
        h[6] -= carry[6] << 26;
        carry[7] = h[7] >> 25;
        h[8] += carry[7];
        h[7] -= carry[7] << 25;
        carry[8] = h[8] >> 26;
        h[9] += carry[8];
        h[8] -= carry[8] << 26;
        carry[9] = h[9] >> 25;
        h[9] -= carry[9] << 25;

        let mut s = [0u8; 32];
        store_limbs(&mut s, &h);
        s
    }

    pub fn add(&self, b: &FieldElement) -> FieldElement {
        let mut out = [0i32; 10];
        for i in 0..10 {
            out[i] = self.0[i] + b.0[i];
        }
        FieldElement(out)
    }

    pub fn sub(&self, b: &FieldElement) -> FieldElement {
        let mut out = [0i32; 10];
        for i in 0..10 {
            out[i] = self.0[i] - b.0[i];
        }
        FieldElement(out).carry()
    }

    pub fn neg(&self) -> FieldElement {
        FieldElement::ZERO.sub(self)
    }

    /// Schoolbook ten-by-ten multiplication with 64-bit partial products and
    /// the p = 2^255 - 19 reduction (2^255 = 19 mod p).
    pub fn mul(&self, b: &FieldElement) -> FieldElement {
        let f = &self.0;
        let g = &b.0;

        let f1_2 = 2 * f[1] as i64;
        let f3_2 = 2 * f[3] as i64;
        let f5_2 = 2 * f[5] as i64;
        let f7_2 = 2 * f[7] as i64;
        let f9_2 = 2 * f[9] as i64;

        let g0 = g[0] as i64;
        let g1 = g[1] as i64;
        let g2 = g[2] as i64;
        let g3 = g[3] as i64;
        let g4 = g[4] as i64;
        let g5 = g[5] as i64;
        let g6 = g[6] as i64;
        let g7 = g[7] as i64;
        let g8 = g[8] as i64;
        let g9 = g[9] as i64;

        let g1_19 = 19 * g1;
        let g2_19 = 19 * g2;
        let g3_19 = 19 * g3;
        let g4_19 = 19 * g4;
        let g5_19 = 19 * g5;
        let g6_19 = 19 * g6;
        let g7_19 = 19 * g7;
        let g8_19 = 19 * g8;
        let g9_19 = 19 * g9;

        let f0 = f[0] as i64;
        let f1 = f[1] as i64;
        let f2 = f[2] as i64;
        let f3 = f[3] as i64;
        let f4 = f[4] as i64;
        let f5 = f[5] as i64;
        let f6 = f[6] as i64;
        let f7 = f[7] as i64;
        let f8 = f[8] as i64;
        let f9 = f[9] as i64;

        let mut h = [0i64; 10];
        h[0] = f0 * g0
            + f1_2 * g9_19
            + f2 * g8_19
            + f3_2 * g7_19
            + f4 * g6_19
            + f5_2 * g5_19
            + f6 * g4_19
            + f7_2 * g3_19
            + f8 * g2_19
            + f9_2 * g1_19;
        h[1] = f0 * g1 + f1 * g0 + f2 * g9_19 + f3 * g8_19 + f4 * g7_19 + f5 * g6_19 + f6 * g5_19
            + f7 * g4_19
            + f8 * g3_19
            + f9 * g2_19;
        h[2] = f0 * g2
            + f1_2 * g1
            + f2 * g0
            + f3_2 * g9_19
            + f4 * g8_19
            + f5_2 * g7_19
            + f6 * g6_19
            + f7_2 * g5_19
            + f8 * g4_19
            + f9_2 * g3_19;
        h[3] = f0 * g3 + f1 * g2 + f2 * g1 + f3 * g0 + f4 * g9_19 + f5 * g8_19 + f6 * g7_19
            + f7 * g6_19
            + f8 * g5_19
            + f9 * g4_19;
        h[4] = f0 * g4
            + f1_2 * g3
            + f2 * g2
            + f3_2 * g1
            + f4 * g0
            + f5_2 * g9_19
            + f6 * g8_19
            + f7_2 * g7_19
            + f8 * g6_19
            + f9_2 * g5_19;
        h[5] = f0 * g5 + f1 * g4 + f2 * g3 + f3 * g2 + f4 * g1 + f5 * g0 + f6 * g9_19 + f7 * g8_19
            + f8 * g7_19
            + f9 * g6_19;
        h[6] = f0 * g6
            + f1_2 * g5
            + f2 * g4
            + f3_2 * g3
            + f4 * g2
            + f5_2 * g1
            + f6 * g0
            + f7_2 * g9_19
            + f8 * g8_19
            + f9_2 * g7_19;
        h[7] = f0 * g7 + f1 * g6 + f2 * g5 + f3 * g4 + f4 * g3 + f5 * g2 + f6 * g1 + f7 * g0
            + f8 * g9_19
            + f9 * g8_19;
        h[8] = f0 * g8
            + f1_2 * g7
            + f2 * g6
            + f3_2 * g5
            + f4 * g4
            + f5_2 * g3
            + f6 * g2
            + f7_2 * g1
            + f8 * g0
            + f9_2 * g9_19;
        h[9] = f0 * g9 + f1 * g8 + f2 * g7 + f3 * g6 + f4 * g5 + f5 * g4 + f6 * g3 + f7 * g2
            + f8 * g1
            + f9 * g0;

        reduce64(h)
    }

    /// Squaring, exploiting a=b symmetry to share partial products.
    pub fn square(&self) -> FieldElement {
        self.square_inner(false)
    }

    /// Computes 2*a^2 sharing the squaring carry chain.
    pub fn square_and_double(&self) -> FieldElement {
        self.square_inner(true)
    }

    fn square_inner(&self, double: bool) -> FieldElement {
        let f = &self.0;
        let f0 = f[0] as i64;
        let f1 = f[1] as i64;
        let f2 = f[2] as i64;
        let f3 = f[3] as i64;
        let f4 = f[4] as i64;
        let f5 = f[5] as i64;
        let f6 = f[6] as i64;
        let f7 = f[7] as i64;
        let f8 = f[8] as i64;
        let f9 = f[9] as i64;

        let f0_2 = 2 * f0;
        let f1_2 = 2 * f1;
        let f2_2 = 2 * f2;
        let f3_2 = 2 * f3;
        let f4_2 = 2 * f4;
        let f5_2 = 2 * f5;
        let f6_2 = 2 * f6;
        let f7_2 = 2 * f7;

        let f5_38 = 38 * f5;
        let f6_19 = 19 * f6;
        let f7_38 = 38 * f7;
        let f8_19 = 19 * f8;
        let f9_38 = 38 * f9;

        let mut h = [0i64; 10];
        h[0] = f0 * f0 + f1_2 * f9_38 + f2_2 * f8_19 + f3_2 * f7_38 + f4_2 * f6_19 + f5 * f5_38;
        h[1] = f0_2 * f1 + f2_2 * f9_38 + f3_2 * f8_19 + f4_2 * f7_38 + f5_2 * f6_19;
        h[2] = f0_2 * f2 + f1_2 * f1 + f3_2 * f9_38 + f4_2 * f8_19 + f5_2 * f7_38 + f6 * f6_19;
        h[3] = f0_2 * f3 + f1_2 * f2 + f4_2 * f9_38 + f5_2 * f8_19 + f6_2 * f7_38;
        h[4] = f0_2 * f4 + f1_2 * f3_2 + f2 * f2 + f5_2 * f9_38 + f6_2 * f8_19 + f7 * f7_38;
        h[5] = f0_2 * f5 + f1_2 * f4 + f2_2 * f3 + f6_2 * f9_38 + f7_2 * f8_19;
        h[6] = f0_2 * f6 + f1_2 * f5_2 + f2_2 * f4 + f3_2 * f3 + f7_2 * f9_38 + f8 * f8_19;
        h[7] = f0_2 * f7 + f1_2 * f6 + f2_2 * f5 + f3_2 * f4 + f8 * f9_38;
        h[8] = f0_2 * f8 + f1_2 * f7_2 + f2_2 * f6 + f3_2 * f5_2 + f4 * f4 + f9 * f9_38;
        h[9] = f0_2 * f9 + f1_2 * f8 + f2_2 * f7 + f3_2 * f6 + f4_2 * f5;

        if double {
            for limb in h.iter_mut() {
                *limb *= 2;
            }
        }

        reduce64(h)
    }

    /// Alternating 26/25-bit normalization across limbs, with the final
    /// wraparound carry folded back through limb 0 via the ×19 identity.
    pub fn carry(&self) -> FieldElement {
        let mut h = [0i64; 10];
        for i in 0..10 {
            h[i] = self.0[i] as i64;
        }
        carry_chain(&mut h);
        let mut out = [0i32; 10];
        for i in 0..10 {
            out[i] = h[i] as i32;
        }
        FieldElement(out)
    }

    /// Constant-time select: returns `a` if `choice` is false, `b` if true.
    pub fn cmov(a: &FieldElement, b: &FieldElement, choice: Choice) -> FieldElement {
        let mut out = [0i32; 10];
        for i in 0..10 {
            out[i] = i32::conditional_select(&a.0[i], &b.0[i], choice);
        }
        FieldElement(out)
    }

    /// `true` iff the canonical encoding is non-zero.
    pub fn is_nonzero(&self) -> bool {
        let bytes = self.to_bytes();
        bytes.iter().any(|&b| b != 0)
    }

    /// The LSB of the canonical encoding (byte 0's bit 0).
    pub fn is_negative(&self) -> bool {
        (self.to_bytes()[0] & 1) == 1
    }

    /// Fermat inversion a^(p-2), via the ref10 addition chain (254 squarings,
    /// 11 multiplications, exponent 2^255 - 21).
    pub fn invert(&self) -> FieldElement {
        let z1 = *self;

        let z2 = z1.square();
        let z8 = z2.square().square();
        let z9 = z1.mul(&z8);
        let z11 = z2.mul(&z9);
        let z22 = z11.square();
        let z_5_0 = z9.mul(&z22);

        let mut z_10_0 = z_5_0;
        for _ in 0..5 {
            z_10_0 = z_10_0.square();
        }
        let z_10_0 = z_10_0.mul(&z_5_0);

        let mut z_20_0 = z_10_0;
        for _ in 0..10 {
            z_20_0 = z_20_0.square();
        }
        let z_20_0 = z_20_0.mul(&z_10_0);

        let mut z_40_0 = z_20_0;
        for _ in 0..20 {
            z_40_0 = z_40_0.square();
        }
        let z_40_0 = z_40_0.mul(&z_20_0);

        let mut z_50_0 = z_40_0;
        for _ in 0..10 {
            z_50_0 = z_50_0.square();
        }
        let z_50_0 = z_50_0.mul(&z_10_0);

        let mut z_100_0 = z_50_0;
        for _ in 0..50 {
            z_100_0 = z_100_0.square();
        }
        let z_100_0 = z_100_0.mul(&z_50_0);

        let mut z_200_0 = z_100_0;
        for _ in 0..100 {
            z_200_0 = z_200_0.square();
        }
        let z_200_0 = z_200_0.mul(&z_100_0);

        let mut z_250_0 = z_200_0;
        for _ in 0..50 {
            z_250_0 = z_250_0.square();
        }
        let z_250_0 = z_250_0.mul(&z_50_0);

        let mut z_255_21 = z_250_0;
        for _ in 0..5 {
            z_255_21 = z_255_21.square();
        }
        z_255_21.mul(&z11)
    }

    /// a^((p-5)/8), via the 251-squaring/10-multiply addition chain. Used to
    /// compute square roots during point decompression.
    pub fn pow22523(&self) -> FieldElement {
        let z1 = *self;
        let z2 = z1.square();
        let z8 = z2.square().square();
        let z9 = z1.mul(&z8);
        let z11 = z2.mul(&z9);
        let z22 = z11.square();
        let z_5_0 = z9.mul(&z22);

        let mut z_10_0 = z_5_0;
        for _ in 0..5 {
            z_10_0 = z_10_0.square();
        }
        let z_10_0 = z_10_0.mul(&z_5_0);

        let mut z_20_0 = z_10_0;
        for _ in 0..10 {
            z_20_0 = z_20_0.square();
        }
        let z_20_0 = z_20_0.mul(&z_10_0);

        let mut z_40_0 = z_20_0;
        for _ in 0..20 {
            z_40_0 = z_40_0.square();
        }
        let z_40_0 = z_40_0.mul(&z_20_0);

        let mut z_50_0 = z_40_0;
        for _ in 0..10 {
            z_50_0 = z_50_0.square();
        }
        let z_50_0 = z_50_0.mul(&z_10_0);

        let mut z_100_0 = z_50_0;
        for _ in 0..50 {
            z_100_0 = z_100_0.square();
        }
        let z_100_0 = z_100_0.mul(&z_50_0);

        let mut z_200_0 = z_100_0;
        for _ in 0..100 {
            z_200_0 = z_200_0.square();
        }
        let z_200_0 = z_200_0.mul(&z_100_0);

        let mut z_250_0 = z_200_0;
        for _ in 0..50 {
            z_250_0 = z_250_0.square();
        }
        let z_250_0 = z_250_0.mul(&z_50_0);

        let mut z_252_2 = z_250_0;
        for _ in 0..2 {
            z_252_2 = z_252_2.square();
        }
        z_252_2.mul(&z1)
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        crate::util::ct_eq(&self.to_bytes(), &other.to_bytes())
    }
}
impl Eq for FieldElement {}

fn reduce64(mut h: [i64; 10]) -> FieldElement {
    carry_chain(&mut h);
    let mut out = [0i32; 10];
    for i in 0..10 {
        out[i] = h[i] as i32;
    }
    FieldElement(out)
}

/// The interleaved 26/25-bit carry chain shared by `mul`, `square`, `sub`,
/// and `carry`. Operates on i64 limbs so multiplication partial products
/// never overflow before normalization.
fn carry_chain(h: &mut [i64; 10]) {
    let mut c = [0i64; 10];

    c[0] = (h[0] + (1 << 25)) >> 26;
    h[1] += c[0];
    h[0] -= c[0] << 26;
    c[4] = (h[4] + (1 << 25)) >> 26;
    h[5] += c[4];
    h[4] -= c[4] << 26;

    c[1] = (h[1] + (1 << 24)) >> 25;
    h[2] += c[1];
    h[1] -= c[1] << 25;
    c[5] = (h[5] + (1 << 24)) >> 25;
    h[6] += c[5];
    h[5] -= c[5] << 25;

    c[2] = (h[2] + (1 << 25)) >> 26;
    h[3] += c[2];
    h[2] -= c[2] << 26;
    c[6] = (h[6] + (1 << 25)) >> 26;
    h[7] += c[6];
    h[6] -= c[6] << 26;

    c[3] = (h[3] + (1 << 24)) >> 25;
    h[4] += c[3];
    h[3] -= c[3] << 25;
    c[7] = (h[7] + (1 << 24)) >> 25;
    h[8] += c[7];
    h[7] -= c[7] << 25;

    c[4] = (h[4] + (1 << 25)) >> 26;
    h[5] += c[4];
    h[4] -= c[4] << 26;
    c[8] = (h[8] + (1 << 25)) >> 26;
    h[9] += c[8];
    h[8] -= c[8] << 26;

    c[9] = (h[9] + (1 << 24)) >> 25;
    h[0] += c[9] * 19;
    h[9] -= c[9] << 25;

    c[0] = (h[0] + (1 << 25)) >> 26;
    h[1] += c[0];
    h[0] -= c[0] << 26;
}

fn store_limbs(s: &mut [u8; 32], h: &[i64; 10]) {
    // Pack the fully-reduced limbs (each within its documented bit width)
    // back into 32 little-endian bytes at bit offsets 0,26,51,77,102,128,
    // 153,179,204,230 (cumulative sum of BITS).
    let mut acc: u128 = 0;
    let mut acc_bits: u32 = 0;
    let mut out_idx = 0usize;
    for i in 0..10 {
        acc |= (h[i] as u128 & ((1u128 << BITS[i]) - 1)) << acc_bits;
        acc_bits += BITS[i];
        while acc_bits >= 8 {
            s[out_idx] = (acc & 0xff) as u8;
            acc >>= 8;
            acc_bits -= 8;
            out_idx += 1;
        }
    }
    if acc_bits > 0 {
        s[out_idx] = (acc & 0xff) as u8;
    }
}
