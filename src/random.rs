//! Operating-system randomness
//!
//! All entropy consumed by this crate flows through [`RandomSource`], a thin
//! handle over the kernel CSPRNG. The source is opened lazily on first use
//! and shared process-wide; it is never a userspace PRNG seeded once at
//! startup. The underlying OS call is thread-safe, so the handle needs no
//! internal locking.

use std::sync::OnceLock;

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{Error, Result};

/// Non-blocking cryptographic byte source backed by the OS
pub struct RandomSource {
    _opened: (),
}

static GLOBAL: OnceLock<RandomSource> = OnceLock::new();

impl RandomSource {
    /// The process-wide source, opened on first use
    pub fn global() -> &'static RandomSource {
        GLOBAL.get_or_init(|| RandomSource { _opened: () })
    }

    /// Fill `buf` with OS randomness
    ///
    /// Fails with [`Error::Rng`] when the OS source is unavailable or fails
    /// mid-call; the error is surfaced to the caller and never swallowed.
    pub fn fill(&self, buf: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| Error::Rng(format!("OS entropy source failed: {}", e)))
    }

    /// Return `n` bytes of OS randomness
    pub fn bytes(&self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.fill(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_requested_length() {
        let rng = RandomSource::global();
        assert_eq!(rng.bytes(0).unwrap().len(), 0);
        assert_eq!(rng.bytes(20).unwrap().len(), 20);
        assert_eq!(rng.bytes(257).unwrap().len(), 257);
    }

    #[test]
    fn successive_draws_differ() {
        let rng = RandomSource::global();
        let a = rng.bytes(32).unwrap();
        let b = rng.bytes(32).unwrap();
        assert_ne!(a, b);
    }
}
