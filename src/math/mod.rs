//! Big-integer helpers shared by parameter generation and signing
//!
//! All multi-precision values in this crate are [`BigUint`]s; this module
//! collects the conversions and modular arithmetic the DSA algorithms are
//! built from, plus uniform random sampling driven by the OS source.

use num_bigint_dig::{BigInt, BigUint, ModInverse};
use num_traits::{One, Zero};

use crate::error::{Error, Result};
use crate::random::RandomSource;

/// Number of bits needed to represent `n`, with `bitsize(0) = 0`
pub fn bitsize(n: &BigUint) -> usize {
    n.bits()
}

/// Octet string to non-negative integer, big-endian base 256 (empty maps to 0)
pub fn os2ip(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Integer to minimal big-endian octet string (zero maps to the empty string)
///
/// No leading zero bytes are produced; callers needing a fixed width must
/// pad via [`i2osp_fixed`].
pub fn i2osp(n: &BigUint) -> Vec<u8> {
    if n.is_zero() {
        Vec::new()
    } else {
        n.to_bytes_be()
    }
}

/// Integer to big-endian octet string, left-padded with zeros to `len` bytes
///
/// Values wider than `len` are returned at their natural width.
pub fn i2osp_fixed(n: &BigUint, len: usize) -> Vec<u8> {
    let bytes = i2osp(n);
    if bytes.len() >= len {
        return bytes;
    }
    let mut padded = vec![0u8; len - bytes.len()];
    padded.extend_from_slice(&bytes);
    padded
}

/// `base^exp mod modulus`, non-negative
///
/// The modulus must be nonzero; every modulus in this crate is a prime.
pub fn mod_exp(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// Multiplicative inverse of `a` modulo `n`, or `None` when `gcd(a, n) != 1`
pub fn mod_inverse(a: &BigUint, n: &BigUint) -> Option<BigUint> {
    let inv = a.mod_inverse(n)?;
    // Normalize the representative into [0, n) before dropping the sign.
    let n = BigInt::from(n.clone());
    (((inv % &n) + &n) % &n).to_biguint()
}

/// Greatest common divisor
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

/// Random integer with exactly `bits` bits (top bit forced), so the result
/// always satisfies `2^(bits-1) <= x < 2^bits`
pub fn makerandom(rng: &RandomSource, bits: usize) -> Result<BigUint> {
    if bits == 0 {
        return Ok(BigUint::zero());
    }
    let nbytes = (bits + 7) / 8;
    let excess = nbytes * 8 - bits;
    let mut buf = rng.bytes(nbytes)?;
    buf[0] &= 0xff >> excess;
    buf[0] |= 0x80 >> excess;
    Ok(BigUint::from_bytes_be(&buf))
}

/// Random integer uniform on `[0, max]`, by rejection sampling over
/// `bitsize(max)`-bit draws
pub fn makerandomrange(rng: &RandomSource, max: &BigUint) -> Result<BigUint> {
    if max.is_zero() {
        return Ok(BigUint::zero());
    }
    let bits = bitsize(max);
    let nbytes = (bits + 7) / 8;
    let excess = nbytes * 8 - bits;
    loop {
        let mut buf = rng.bytes(nbytes)?;
        buf[0] &= 0xff >> excess;
        let candidate = BigUint::from_bytes_be(&buf);
        if &candidate <= max {
            return Ok(candidate);
        }
    }
}

/// Parse an integer literal, decimal or `0x`-prefixed hexadecimal
pub fn parse_int(s: &str) -> Result<BigUint> {
    let t = s.trim();
    let (digits, radix) = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (t, 10),
    };
    if digits.is_empty() {
        return Err(Error::InvalidParameter(format!(
            "not an integer literal: {:?}",
            s
        )));
    }
    BigUint::parse_bytes(digits.as_bytes(), radix)
        .ok_or_else(|| Error::InvalidParameter(format!("not an integer literal: {:?}", s)))
}

/// True when `n` is odd
pub(crate) fn is_odd(n: &BigUint) -> bool {
    (n & BigUint::one()) == BigUint::one()
}
