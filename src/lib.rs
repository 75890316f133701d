//! # fips-dsa
//!
//! A Digital Signature Algorithm (DSA) library implementing the FIPS 186-2
//! and FIPS 186-4 standards: domain-parameter generation, key-pair
//! derivation, and sign/verify over arbitrary byte messages or
//! pre-computed digests.
//!
//! The legacy SHA-1 regime (FIPS 186-2, the default) is kept for
//! interoperability with systems still producing SHA-1 DSA signatures;
//! FIPS 186-4 selects the SHA-2 family and caller-chosen subgroup sizes.
//!
//! ## Usage
//!
//! ```no_run
//! use fips_dsa::{Dsa, Input, KeygenOptions, Standard};
//!
//! # fn main() -> fips_dsa::Result<()> {
//! let dsa = Dsa::with_standard(Standard::Fips186_4);
//! let generated = dsa.keygen(&KeygenOptions::new(2048))?;
//!
//! let signature = dsa.sign(&generated.key, Input::Message(b"attack at dawn"))?;
//! assert!(dsa.verify(&generated.key, &signature, Input::Message(b"attack at dawn"))?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module structure
//!
//! - [`params`]: the FIPS prime-generation procedures
//! - [`sign`]: the signing/verification state machine
//! - [`primality`]: the primality oracle behind parameter generation
//! - [`math`]: big-integer conversions and modular arithmetic
//! - [`random`]: the OS-backed randomness source
//!
//! The crate performs no I/O: no files, environment variables, network
//! access or persisted state. Key envelope formats (PEM, SSH2) are the
//! business of external codecs, which consume the integer accessors on
//! [`Key`] and [`Signature`].

pub mod error;
pub mod key;
pub mod math;
pub mod params;
pub mod primality;
pub mod random;
pub mod sign;
pub mod standard;

pub use error::{Error, Result};
pub use key::{Components, Key, Signature};
pub use params::{GeneratedParams, KeygenOptions, Phase, ProgressHook, Prove};
pub use primality::{MillerRabinOracle, PrimalityOracle};
pub use random::RandomSource;
pub use sign::Input;
pub use standard::Standard;

// Re-exported so callers can construct and inspect key material without
// naming the big-integer backend themselves.
pub use num_bigint_dig::BigUint;

/// A freshly generated key pair plus the generation witness
///
/// `counter`, `h` and `seed` are the ancillary values of the parameter
/// search (see [`GeneratedParams`]); they are not secret and allow the
/// generation to be audited or replayed.
#[derive(Clone, Debug)]
pub struct GeneratedKey {
    /// The new key pair, private half included
    pub key: Key,
    /// Index at which `p` was accepted inside its search loop
    pub counter: usize,
    /// Scan base from which `g` was derived
    pub h: BigUint,
    /// The seed that produced the accepted `q`
    pub seed: Vec<u8>,
}

/// DSA engine: a configured standard, a randomness handle, and a
/// primality oracle
///
/// Construction is cheap; the randomness handle points at the
/// process-wide OS source. Engines are immutable and safe to share
/// across threads.
pub struct Dsa {
    standard: Standard,
    rng: &'static RandomSource,
    oracle: Box<dyn PrimalityOracle + Send + Sync>,
}

impl Dsa {
    /// Engine under the default (legacy) standard
    pub fn new() -> Self {
        Dsa::with_standard(Standard::default())
    }

    /// Engine under an explicit standard
    pub fn with_standard(standard: Standard) -> Self {
        Dsa {
            standard,
            rng: RandomSource::global(),
            oracle: Box::new(MillerRabinOracle),
        }
    }

    /// Engine with a caller-supplied primality oracle (for example a
    /// certificate-producing prover backing the `Prove` options)
    pub fn with_oracle(standard: Standard, oracle: Box<dyn PrimalityOracle + Send + Sync>) -> Self {
        Dsa {
            standard,
            rng: RandomSource::global(),
            oracle,
        }
    }

    /// The engine's default standard
    pub fn standard(&self) -> Standard {
        self.standard
    }

    /// Generate domain parameters only, with the generation witness.
    pub fn generate_params(&self, opts: &KeygenOptions) -> Result<GeneratedParams> {
        params::generate(self.rng, self.oracle.as_ref(), opts, self.standard, None)
    }

    /// Generate a key pair: fresh domain parameters, then `priv_key`
    /// uniform in `[1, q-1]` and `pub_key = g^priv_key mod p`.
    pub fn keygen(&self, opts: &KeygenOptions) -> Result<GeneratedKey> {
        self.keygen_inner(opts, None)
    }

    /// [`Dsa::keygen`] with a progress hook.
    ///
    /// The hook is invoked once per candidate in each search loop and may
    /// cancel generation by returning `ControlFlow::Break(())`, which
    /// surfaces as [`Error::Cancelled`].
    pub fn keygen_with_progress<'a>(
        &'a self,
        opts: &KeygenOptions,
        hook: &'a mut ProgressHook<'a>,
    ) -> Result<GeneratedKey> {
        self.keygen_inner(opts, Some(hook))
    }

    fn keygen_inner<'a>(
        &'a self,
        opts: &KeygenOptions,
        hook: Option<&'a mut ProgressHook<'a>>,
    ) -> Result<GeneratedKey> {
        let generated =
            params::generate(self.rng, self.oracle.as_ref(), opts, self.standard, hook)?;
        let (priv_key, pub_key) = sign::derive_keypair(self.rng, &generated.components)?;
        Ok(GeneratedKey {
            key: Key::with_private(generated.components, pub_key, priv_key),
            counter: generated.counter,
            h: generated.h,
            seed: generated.seed,
        })
    }

    /// Sign a message or digest under the engine's standard.
    ///
    /// The key must carry its private half. A fresh nonce is drawn from
    /// the OS source for every call.
    pub fn sign(&self, key: &Key, input: Input<'_>) -> Result<Signature> {
        self.sign_with(key, input, self.standard)
    }

    /// [`Dsa::sign`] with a per-call standard override.
    pub fn sign_with(&self, key: &Key, input: Input<'_>, standard: Standard) -> Result<Signature> {
        sign::sign(self.rng, key, input, standard)
    }

    /// Verify a signature under the engine's standard.
    ///
    /// Returns `Ok(false)` for invalid or malformed signatures; `Err` is
    /// reserved for usage and randomness failures.
    pub fn verify(&self, key: &Key, signature: &Signature, input: Input<'_>) -> Result<bool> {
        self.verify_with(key, signature, input, self.standard)
    }

    /// [`Dsa::verify`] with a per-call standard override.
    pub fn verify_with(
        &self,
        key: &Key,
        signature: &Signature,
        input: Input<'_>,
        standard: Standard,
    ) -> Result<bool> {
        sign::verify(key, signature, input, standard)
    }
}

impl Default for Dsa {
    fn default() -> Self {
        Dsa::new()
    }
}
