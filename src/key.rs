//! DSA key material and signature values
//!
//! [`Components`] carries the shared domain parameters, [`Key`] adds the
//! public (and optionally private) halves of a key pair, and [`Signature`]
//! is the `(r, s)` pair produced by signing. All three are plain value
//! objects: immutable after construction, no shared mutable state, safe to
//! use from multiple threads. The integer fields are exposed through
//! accessors so external envelope codecs (PEM, SSH2) can read and populate
//! them.

use core::fmt;

use num_bigint_dig::BigUint;
use num_traits::{One, Zero};
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::math;
use crate::primality::PrimalityOracle;

/// DSA domain parameters `(p, q, g)` shared by any number of key pairs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Components {
    p: BigUint,
    q: BigUint,
    g: BigUint,
}

impl Components {
    /// Assemble domain parameters from externally supplied integers.
    ///
    /// Only structural bounds are checked here (`1 < g < p`, `1 < q < p`);
    /// callers holding values of unknown provenance should follow up with
    /// [`Components::validate`].
    pub fn from_components(p: BigUint, q: BigUint, g: BigUint) -> Result<Self> {
        if q <= BigUint::one() || q >= p {
            return Err(Error::InvalidKey(
                "q must satisfy 1 < q < p".to_string(),
            ));
        }
        if g <= BigUint::one() || g >= p {
            return Err(Error::InvalidKey(
                "g must satisfy 1 < g < p".to_string(),
            ));
        }
        Ok(Components { p, q, g })
    }

    pub(crate) fn new_unchecked(p: BigUint, q: BigUint, g: BigUint) -> Self {
        Components { p, q, g }
    }

    /// Prime modulus
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Prime divisor of `p - 1`
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// Generator of the order-`q` subgroup of `GF(p)`
    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// Re-check the domain-parameter invariants.
    ///
    /// Verifies that `p` and `q` are (probable) primes, that `q` divides
    /// `p - 1`, and that `g` generates the order-`q` subgroup. Intended for
    /// parameters read back from a key envelope.
    pub fn validate(&self, oracle: &dyn PrimalityOracle) -> Result<()> {
        if !oracle.is_probable_prime(&self.q) {
            return Err(Error::InvalidKey("q is not prime".to_string()));
        }
        if !oracle.is_probable_prime(&self.p) {
            return Err(Error::InvalidKey("p is not prime".to_string()));
        }
        if !((&self.p - 1u32) % &self.q).is_zero() {
            return Err(Error::InvalidKey(
                "q does not divide p - 1".to_string(),
            ));
        }
        if self.g <= BigUint::one() || self.g >= self.p {
            return Err(Error::InvalidKey(
                "g must satisfy 1 < g < p".to_string(),
            ));
        }
        if !math::mod_exp(&self.g, &self.q, &self.p).is_one() {
            return Err(Error::InvalidKey(
                "g does not have order q modulo p".to_string(),
            ));
        }
        Ok(())
    }
}

/// A DSA key: domain parameters plus the public key, and the private key
/// when this is a signing key
///
/// The private component is scrubbed from memory when the key is dropped.
#[derive(Clone)]
pub struct Key {
    components: Components,
    pub_key: BigUint,
    priv_key: Option<BigUint>,
}

impl Key {
    /// Public-only key, for verification workflows
    pub fn new(components: Components, pub_key: BigUint) -> Self {
        Key {
            components,
            pub_key,
            priv_key: None,
        }
    }

    /// Key pair with both halves present
    pub fn with_private(components: Components, pub_key: BigUint, priv_key: BigUint) -> Self {
        Key {
            components,
            pub_key,
            priv_key: Some(priv_key),
        }
    }

    /// Shared domain parameters
    pub fn components(&self) -> &Components {
        &self.components
    }

    /// Prime modulus
    pub fn p(&self) -> &BigUint {
        self.components.p()
    }

    /// Prime divisor of `p - 1`
    pub fn q(&self) -> &BigUint {
        self.components.q()
    }

    /// Subgroup generator
    pub fn g(&self) -> &BigUint {
        self.components.g()
    }

    /// Public key `y = g^x mod p`
    pub fn pub_key(&self) -> &BigUint {
        &self.pub_key
    }

    /// Private key `x`, when present
    pub fn priv_key(&self) -> Option<&BigUint> {
        self.priv_key.as_ref()
    }

    /// True when this key can sign
    pub fn has_private(&self) -> bool {
        self.priv_key.is_some()
    }

    /// Re-check key consistency.
    ///
    /// Validates the domain parameters, the public-key range, and (when
    /// the private half is present) that `0 < x < q` and
    /// `y = g^x mod p`. Intended for keys reconstructed from externally
    /// supplied integers.
    pub fn validate(&self, oracle: &dyn PrimalityOracle) -> Result<()> {
        self.components.validate(oracle)?;
        if self.pub_key.is_zero() || self.pub_key >= *self.p() {
            return Err(Error::InvalidKey(
                "public key out of range".to_string(),
            ));
        }
        if let Some(x) = &self.priv_key {
            if x.is_zero() || x >= self.q() {
                return Err(Error::InvalidKey(
                    "private key out of range".to_string(),
                ));
            }
            if math::mod_exp(self.g(), x, self.p()) != self.pub_key {
                return Err(Error::InvalidKey(
                    "public key does not match private key".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// Keep the private component out of debug output.
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("p", &self.components.p)
            .field("q", &self.components.q)
            .field("g", &self.components.g)
            .field("pub_key", &self.pub_key)
            .field("priv_key", &self.priv_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Zeroize for Key {
    fn zeroize(&mut self) {
        if let Some(x) = &mut self.priv_key {
            x.zeroize();
        }
        self.priv_key = None;
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// A DSA signature: the pair `(r, s)`, each in `[1, q - 1]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

impl Signature {
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Signature { r, s }
    }

    pub fn r(&self) -> &BigUint {
        &self.r
    }

    pub fn s(&self) -> &BigUint {
        &self.s
    }
}
