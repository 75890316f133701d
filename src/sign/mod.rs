//! DSA signing and verification
//!
//! Implements the signature generation and verification contracts of
//! FIPS 186-4 Sections 4.6 and 4.7, including the digest-truncation rule
//! and the per-signature nonce loop that retries on `r = 0` or `s = 0`.
//! The per-message nonce `k` is freshly sampled for every signature and
//! never cached, logged or derived from the message; caching `r` or
//! `k^-1` across signatures is a nonce-reuse hazard and is deliberately
//! not offered.

use num_bigint_dig::BigUint;
use num_traits::Zero;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::key::{Components, Key, Signature};
use crate::math;
use crate::random::RandomSource;
use crate::standard::Standard;

/// What gets signed or verified
///
/// Exactly one of the two forms is supplied per call: a raw message,
/// hashed with the standard's digest, or a pre-computed digest used
/// verbatim.
#[derive(Clone, Copy, Debug)]
pub enum Input<'a> {
    /// Raw message bytes; hashed per [`Standard`] and subgroup size
    Message(&'a [u8]),
    /// Pre-computed digest, used as-is
    Digest(&'a [u8]),
}

impl Input<'_> {
    /// The truncated integer form `z` of the digest (FIPS 186-4 4.6).
    fn digest_value(&self, standard: Standard, n: usize) -> BigUint {
        let bytes = match self {
            Input::Message(message) => digest_message(standard, n, message),
            Input::Digest(digest) => digest.to_vec(),
        };
        truncate_digest(&bytes, n)
    }
}

/// Hash a message with the digest the standard prescribes.
///
/// FIPS 186-2 signs with SHA-1; FIPS 186-4 selects SHA-256 for subgroups
/// up to 256 bits and SHA-512 beyond.
fn digest_message(standard: Standard, n: usize, message: &[u8]) -> Vec<u8> {
    match standard {
        Standard::Fips186_2 => Sha1::digest(message).to_vec(),
        Standard::Fips186_4 if n <= 256 => Sha256::digest(message).to_vec(),
        Standard::Fips186_4 => Sha512::digest(message).to_vec(),
    }
}

/// Keep the leftmost `min(N, outlen)` bits of the digest.
fn truncate_digest(digest: &[u8], n: usize) -> BigUint {
    let outlen = digest.len() * 8;
    let z = math::os2ip(digest);
    if outlen > n {
        z >> (outlen - n)
    } else {
        z
    }
}

/// Uniform scalar in `[1, q - 1]`: a `bitsize(q)`-bit draw reduced mod q,
/// resampled on zero.
fn random_scalar(rng: &RandomSource, q: &BigUint) -> Result<BigUint> {
    loop {
        let x = math::makerandom(rng, math::bitsize(q))? % q;
        if !x.is_zero() {
            return Ok(x);
        }
    }
}

/// Derive a key pair `(x, y)` over freshly generated domain parameters.
pub(crate) fn derive_keypair(
    rng: &RandomSource,
    components: &Components,
) -> Result<(BigUint, BigUint)> {
    let x = random_scalar(rng, components.q())?;
    let y = math::mod_exp(components.g(), &x, components.p());
    Ok((x, y))
}

/// Sign per FIPS 186-4 Section 4.6.
///
/// Algorithm:
/// 1. z = the leftmost N bits of the digest
/// 2. Draw a fresh nonce k uniform in [1, q-1]
/// 3. r = (g^k mod p) mod q; if r = 0, go back to step 2
/// 4. s = k^-1 (z + x r) mod q; if s = 0, go back to step 2
/// 5. Return (r, s)
pub(crate) fn sign(
    rng: &RandomSource,
    key: &Key,
    input: Input<'_>,
    standard: Standard,
) -> Result<Signature> {
    let x = key.priv_key().ok_or(Error::MissingPrivateKey)?;
    let (p, q, g) = (key.p(), key.q(), key.g());
    let z = input.digest_value(standard, math::bitsize(q));

    loop {
        // Step 2: fresh per-signature nonce, scrubbed when it goes out of
        // scope.
        let k = Zeroizing::new(random_scalar(rng, q)?);

        // Step 3
        let r = math::mod_exp(g, &k, p) % q;
        if r.is_zero() {
            continue;
        }

        // Step 4
        let kinv = Zeroizing::new(
            math::mod_inverse(&k, q)
                .ok_or_else(|| Error::Internal("nonce has no inverse modulo q".to_string()))?,
        );
        let s = (&*kinv * ((&z + x * &r) % q)) % q;
        if s.is_zero() {
            continue;
        }

        if r.is_zero() || s.is_zero() {
            return Err(Error::Internal(
                "signing produced a zero component after the retry loop".to_string(),
            ));
        }
        return Ok(Signature::new(r, s));
    }
}

/// Verify per FIPS 186-4 Section 4.7.
///
/// Algorithm:
/// 1. Reject unless 0 < r < q and 0 < s < q
/// 2. w = s^-1 mod q
/// 3. u1 = z w mod q, u2 = r w mod q
/// 4. v = (g^u1 y^u2 mod p) mod q
/// 5. Accept iff v = r
///
/// A malformed signature is not an error: the result is simply `false`.
pub(crate) fn verify(
    key: &Key,
    signature: &Signature,
    input: Input<'_>,
    standard: Standard,
) -> Result<bool> {
    let (p, q, g, y) = (key.p(), key.q(), key.g(), key.pub_key());
    let (r, s) = (signature.r(), signature.s());

    // Step 1
    if r.is_zero() || r >= q || s.is_zero() || s >= q {
        return Ok(false);
    }

    // Step 2; a non-invertible s cannot belong to a valid signature.
    let w = match math::mod_inverse(s, q) {
        Some(w) => w,
        None => return Ok(false),
    };

    // Steps 3 and 4
    let z = input.digest_value(standard, math::bitsize(q));
    let u1 = (&z * &w) % q;
    let u2 = (r * &w) % q;
    let v = ((math::mod_exp(g, &u1, p) * math::mod_exp(y, &u2, p)) % p) % q;

    // Step 5, over fixed-width encodings
    let width = (math::bitsize(q) + 7) / 8;
    let v_bytes = math::i2osp_fixed(&v, width);
    let r_bytes = math::i2osp_fixed(r, width);
    Ok(bool::from(v_bytes.as_slice().ct_eq(r_bytes.as_slice())))
}
