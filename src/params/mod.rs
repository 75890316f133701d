//! DSA domain-parameter generation
//!
//! Implements the prime-generation procedures of FIPS 186-2 Appendix 2
//! (SHA-1, 160-bit subgroup) and FIPS 186-4 Appendix A.1.1.2 (SHA-2
//! family, selectable subgroup size): the seed-driven construction of `q`,
//! the counter-bounded search for `p`, and the derivation of a generator
//! of the order-`q` subgroup.
//!
//! Generation is CPU-bound and unbounded in expectation; callers that need
//! cancellation or progress reporting supply a [`ProgressHook`], which is
//! invoked once per candidate in each search loop.

use core::fmt;
use core::str::FromStr;
use std::ops::ControlFlow;

use num_bigint_dig::BigUint;
use num_traits::{One, Zero};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{Error, Result};
use crate::key::Components;
use crate::math;
use crate::primality::PrimalityOracle;
use crate::random::RandomSource;
use crate::standard::Standard;

/// Counter bound for the legacy p search
const LEGACY_COUNTER_BOUND: usize = 4096;

/// Miller-Rabin rounds for the legacy q and p regimens
const LEGACY_Q_ROUNDS: u32 = 19;
const LEGACY_P_ROUNDS: u32 = 3;

/// Which primes receive an unconditional proof during generation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Prove {
    /// Probable-prime regimen only
    #[default]
    None,
    /// Prove `p`
    P,
    /// Prove `q`
    Q,
    /// Prove both primes
    Both,
}

impl Prove {
    /// Build from a plain boolean flag
    pub fn from_flag(prove_both: bool) -> Self {
        if prove_both {
            Prove::Both
        } else {
            Prove::None
        }
    }

    pub(crate) fn proves_p(&self) -> bool {
        matches!(self, Prove::P | Prove::Both)
    }

    pub(crate) fn proves_q(&self) -> bool {
        matches!(self, Prove::Q | Prove::Both)
    }
}

impl FromStr for Prove {
    type Err = Error;

    /// `"P"` proves `p`, `"Q"` proves `q`; boolean-ish strings toggle both.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "P" | "p" => Ok(Prove::P),
            "Q" | "q" => Ok(Prove::Q),
            "" | "0" | "false" => Ok(Prove::None),
            "1" | "true" => Ok(Prove::Both),
            other => Err(Error::InvalidParameter(format!(
                "Prove must be \"P\", \"Q\" or a boolean, got {:?}",
                other
            ))),
        }
    }
}

/// Search loop a progress report refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Searching for the subgroup prime `q`
    Q,
    /// Searching for the modulus prime `p`
    P,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Q => f.write_str("q"),
            Phase::P => f.write_str("p"),
        }
    }
}

/// Progress hook invoked once per candidate in each search loop.
///
/// Returning `ControlFlow::Break(())` stops generation; the caller gets
/// [`Error::Cancelled`] and no partial state is left behind.
pub type ProgressHook<'a> = dyn FnMut(Phase, u64) -> ControlFlow<()> + 'a;

/// Options for domain-parameter generation
///
/// `size` is the bit length `L` of `p` and is the only required field;
/// everything else defaults per the selected standard. Defaults are
/// resolved in one place, and conflicting combinations are rejected
/// before any randomness is drawn.
#[derive(Clone, Debug, Default)]
pub struct KeygenOptions {
    /// Bit length `L` of `p`; at least 256
    pub size: usize,

    /// Bit length `N` of `q`.
    ///
    /// FIPS 186-2 fixes this at 160. FIPS 186-4 accepts `1..=512` and
    /// defaults to 256 when `size >= 2048`, else 160. `size` must be at
    /// least `N + 8`.
    pub qsize: Option<usize>,

    /// Optional starting seed.
    ///
    /// Silently discarded unless it is exactly 20 bytes (FIPS 186-2) or at
    /// least `N` bits (FIPS 186-4). Used for the first candidate only;
    /// if it does not lead to an accepted `q`, fresh seeds are drawn.
    pub seed: Option<Vec<u8>>,

    /// Standard override; `None` uses the engine's standard
    pub standard: Option<Standard>,

    /// Primality-proof selection
    pub prove: Prove,
}

impl KeygenOptions {
    pub fn new(size: usize) -> Self {
        KeygenOptions {
            size,
            ..Default::default()
        }
    }
}

/// Domain parameters plus the ancillary generation witness
///
/// `counter`, `h` and `seed` are not secret; they allow a verifier to
/// replay the generation procedure and confirm the parameters were derived
/// from the seed.
#[derive(Clone, Debug)]
pub struct GeneratedParams {
    /// The accepted `(p, q, g)` triple
    pub components: Components,
    /// Index at which `p` was accepted inside its search loop
    pub counter: usize,
    /// Scan base from which `g` was derived
    pub h: BigUint,
    /// The seed that produced the accepted `q`
    pub seed: Vec<u8>,
}

pub(crate) struct Resolved {
    pub l: usize,
    pub n: usize,
    pub standard: Standard,
    pub prove: Prove,
    pub seed: Option<Vec<u8>>,
}

/// Resolve option defaults and reject conflicting combinations.
pub(crate) fn resolve(opts: &KeygenOptions, default_standard: Standard) -> Result<Resolved> {
    let standard = opts.standard.unwrap_or(default_standard);

    if opts.size < 256 {
        return Err(Error::InvalidParameter(format!(
            "Size must be at least 256 bits, got {}",
            opts.size
        )));
    }

    let n = match standard {
        Standard::Fips186_2 => match opts.qsize {
            None | Some(160) => 160,
            Some(other) => {
                return Err(Error::InvalidParameter(format!(
                    "QSize must be 160 under FIPS 186-2, got {}",
                    other
                )));
            }
        },
        Standard::Fips186_4 => match opts.qsize {
            None => {
                if opts.size >= 2048 {
                    256
                } else {
                    160
                }
            }
            Some(q) if (1..=512).contains(&q) => q,
            Some(other) => {
                return Err(Error::InvalidParameter(format!(
                    "QSize must be between 1 and 512 under FIPS 186-4, got {}",
                    other
                )));
            }
        },
    };

    if opts.size < n + 8 {
        return Err(Error::InvalidParameter(format!(
            "Size must be at least QSize + 8 ({} + 8), got {}",
            n, opts.size
        )));
    }

    // Unusable caller seeds are discarded, not rejected; callers wanting a
    // hard failure on seed rejection layer that policy above the core.
    let seed = opts.seed.as_ref().and_then(|s| {
        let usable = match standard {
            Standard::Fips186_2 => s.len() == 20,
            Standard::Fips186_4 => s.len() * 8 >= n,
        };
        usable.then(|| s.clone())
    });

    Ok(Resolved {
        l: opts.size,
        n,
        standard,
        prove: opts.prove,
        seed,
    })
}

/// Generate domain parameters per the selected standard.
pub fn generate<'a>(
    rng: &'a RandomSource,
    oracle: &'a dyn PrimalityOracle,
    opts: &KeygenOptions,
    default_standard: Standard,
    progress: Option<&'a mut ProgressHook<'a>>,
) -> Result<GeneratedParams> {
    let resolved = resolve(opts, default_standard)?;
    let mut generator = Generator {
        rng,
        oracle,
        prove: resolved.prove,
        progress,
    };
    match resolved.standard {
        Standard::Fips186_2 => generator.fips186_2(resolved.l, resolved.seed),
        Standard::Fips186_4 => generator.fips186_4(resolved.l, resolved.n, resolved.seed),
    }
}

struct Generator<'a> {
    rng: &'a RandomSource,
    oracle: &'a dyn PrimalityOracle,
    prove: Prove,
    progress: Option<&'a mut ProgressHook<'a>>,
}

impl Generator<'_> {
    /// Report progress and honor cancellation.
    fn tick(&mut self, phase: Phase, iteration: u64) -> Result<()> {
        if let Some(hook) = self.progress.as_mut() {
            if let ControlFlow::Break(()) = hook(phase, iteration) {
                return Err(Error::Cancelled { phase });
            }
        }
        Ok(())
    }

    /// The primality regimen: an unconditional proof when requested for
    /// this prime, otherwise the cheap filter plus seed-coupled
    /// Miller-Rabin rounds.
    fn accept(&self, candidate: &BigUint, rounds: u32, entropy: &[u8], prove: bool) -> bool {
        if prove {
            self.oracle.is_provable_prime(candidate)
        } else {
            self.oracle.is_probable_prime(candidate)
                && self.oracle.miller_rabin_random(candidate, rounds, entropy)
        }
    }

    /// FIPS 186-2 Appendix 2: SHA-1 construction, N = 160.
    fn fips186_2(&mut self, l: usize, mut caller_seed: Option<Vec<u8>>) -> Result<GeneratedParams> {
        let blocks = (l + 159) / 160; // hash blocks per p candidate
        let p_test = BigUint::one() << (l - 1);
        let mut q_iteration = 0u64;

        loop {
            // Step 1: derive a q candidate from a fresh seed (the caller's
            // seed is tried once, then discarded).
            self.tick(Phase::Q, q_iteration)?;
            q_iteration += 1;

            let seed = match caller_seed.take() {
                Some(s) => s,
                None => self.rng.bytes(20)?,
            };
            let mut seedp1 = seed.clone();
            increment(&mut seedp1);

            // q = SHA1(seed) XOR SHA1(seed + 1), top and bottom bits forced
            // so the candidate is odd and exactly 160 bits wide.
            let mut md: [u8; 20] = Sha1::digest(&seed).into();
            let next: [u8; 20] = Sha1::digest(&seedp1).into();
            for (m, h) in md.iter_mut().zip(next.iter()) {
                *m ^= h;
            }
            md[0] |= 0x80;
            md[19] |= 0x01;
            let q = math::os2ip(&md);

            if !self.accept(&q, LEGACY_Q_ROUNDS, &seedp1, self.prove.proves_q()) {
                continue;
            }

            // Step 2: counter-bounded search for p in the hash stream
            // following the seed.
            let q2 = &q * 2u32;
            let mut counter = 0usize;
            let mut found = None;
            while counter < LEGACY_COUNTER_BOUND {
                self.tick(Phase::P, counter as u64)?;

                // W = V_0 + V_1 * 2^160 + ... (later hashes land in higher
                // positions), truncated to L-1 bits.
                let mut w = BigUint::zero();
                for j in 0..blocks {
                    increment(&mut seedp1);
                    let v = math::os2ip(&Sha1::digest(&seedp1));
                    w += v << (160 * j);
                }
                let w = w % &p_test;

                // X in [2^(L-1), 2^L); p = X + 1 - (X mod 2q) makes
                // p = 1 (mod 2q), so q divides p - 1.
                let x = &w + &p_test;
                let p = &x + 1u32 - (&x % &q2);

                if p >= p_test && self.accept(&p, LEGACY_P_ROUNDS, &seedp1, self.prove.proves_p())
                {
                    found = Some(p);
                    break;
                }
                counter += 1;
            }

            // Step 3: counter overflow restarts the whole procedure with a
            // fresh seed.
            if let Some(p) = found {
                let (g, h) = derive_generator(&p, &q);
                return Ok(GeneratedParams {
                    components: Components::new_unchecked(p, q, g),
                    counter,
                    h,
                    seed,
                });
            }
        }
    }

    /// FIPS 186-4 A.1.1.2: SHA-2 construction, selectable N.
    fn fips186_4(
        &mut self,
        l: usize,
        n: usize,
        mut caller_seed: Option<Vec<u8>>,
    ) -> Result<GeneratedParams> {
        let hash = HashWidth::for_qsize(n);
        let outlen = hash.outlen();
        let blocks = (l + outlen - 1) / outlen;
        // Width of the top hash block; keeps W below 2^(L-1).
        let b = l - 1 - (blocks - 1) * outlen;
        let top_mask = (BigUint::one() << b) - 1u32;
        let seedlen = (n + 7) / 8;
        let p_test = BigUint::one() << (l - 1);
        let q_test = BigUint::one() << (n - 1);
        // Round counts per FIPS 186-4 Table C.1.
        let nptests = if l <= 2048 { 3 } else { 2 };
        let nqtests = if n <= 160 { 19 } else { 27 };
        let counter_bound = 4 * l;
        let mut q_iteration = 0u64;

        loop {
            // Step 1: q = 2^(N-1) + U + 1 - (U mod 2), an odd N-bit
            // candidate derived from the hashed seed.
            self.tick(Phase::Q, q_iteration)?;
            q_iteration += 1;

            let seed = match caller_seed.take() {
                Some(s) => s,
                None => self.rng.bytes(seedlen)?,
            };
            let u = math::os2ip(&hash.digest(&seed)) % &q_test;
            let q = if math::is_odd(&u) {
                &q_test + &u
            } else {
                &q_test + &u + 1u32
            };

            if !self.accept(&q, nqtests, &seed, self.prove.proves_q()) {
                continue;
            }

            // Step 2: counter-bounded search for p, continuing the hash
            // stream from the accepted seed.
            let q2 = &q * 2u32;
            let mut seedp1 = seed.clone();
            let mut counter = 0usize;
            let mut found = None;
            while counter < counter_bound {
                self.tick(Phase::P, counter as u64)?;

                let mut w = BigUint::zero();
                for j in 0..blocks {
                    increment(&mut seedp1);
                    let mut v = math::os2ip(&hash.digest(&seedp1));
                    if j == blocks - 1 {
                        v = &v & &top_mask;
                    }
                    w += v << (outlen * j);
                }
                let w = w % &p_test;

                let x = &w + &p_test;
                let p = &x + 1u32 - (&x % &q2);

                if p >= p_test && self.accept(&p, nptests, &seedp1, self.prove.proves_p()) {
                    found = Some(p);
                    break;
                }
                counter += 1;
            }

            if let Some(p) = found {
                let (g, h) = derive_generator(&p, &q);
                return Ok(GeneratedParams {
                    components: Components::new_unchecked(p, q, g),
                    counter,
                    h,
                    seed,
                });
            }
        }
    }
}

/// Big-endian increment with carry wrap: `seed := seed + 1 mod 2^(8 len)`.
fn increment(seed: &mut [u8]) {
    for byte in seed.iter_mut().rev() {
        let (v, carry) = byte.overflowing_add(1);
        *byte = v;
        if !carry {
            break;
        }
    }
}

/// Unverifiable generator derivation (FIPS 186-4 A.2.1): scan
/// h = 2, 3, ... for the first g = h^((p-1)/q) mod p with g != 1.
fn derive_generator(p: &BigUint, q: &BigUint) -> (BigUint, BigUint) {
    let e = (p - 1u32) / q;
    let mut h = BigUint::from(2u32);
    loop {
        let g = math::mod_exp(&h, &e, p);
        if !g.is_one() {
            return (g, h);
        }
        h += 1u32;
    }
}

/// SHA-2 variant matched to the subgroup size
#[derive(Clone, Copy, Debug)]
enum HashWidth {
    Sha256,
    Sha384,
    Sha512,
}

impl HashWidth {
    fn for_qsize(n: usize) -> Self {
        if n <= 256 {
            HashWidth::Sha256
        } else if n <= 384 {
            HashWidth::Sha384
        } else {
            HashWidth::Sha512
        }
    }

    fn outlen(self) -> usize {
        match self {
            HashWidth::Sha256 => 256,
            HashWidth::Sha384 => 384,
            HashWidth::Sha512 => 512,
        }
    }

    fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashWidth::Sha256 => Sha256::digest(data).to_vec(),
            HashWidth::Sha384 => Sha384::digest(data).to_vec(),
            HashWidth::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests;
