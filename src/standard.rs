//! Standard selection for DSA operations
//!
//! Two generations of the Digital Signature Standard are supported:
//! FIPS 186-2 (the legacy SHA-1 regime with a fixed 160-bit subgroup) and
//! FIPS 186-4 (the SHA-2 regime with caller-selectable subgroup sizes).

use core::fmt;
use core::str::FromStr;

/// Which revision of the Digital Signature Standard governs an operation
///
/// The default is the legacy standard so that signatures remain
/// interoperable with systems still producing SHA-1 DSA signatures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Standard {
    /// FIPS 186-2: SHA-1, `N` fixed at 160 bits
    #[default]
    Fips186_2,

    /// FIPS 186-4: SHA-2 family, `N` selectable
    Fips186_4,
}

impl Standard {
    /// Parse a standard name.
    ///
    /// Any name containing `186-3` or `186-4` selects [`Standard::Fips186_4`];
    /// every other name (including `186-1` and `186-2`) selects the legacy
    /// standard. Parsing never fails.
    pub fn from_name(name: &str) -> Self {
        if name.contains("186-3") || name.contains("186-4") {
            Standard::Fips186_4
        } else {
            Standard::Fips186_2
        }
    }

    /// Canonical name of the standard
    pub fn name(&self) -> &'static str {
        match self {
            Standard::Fips186_2 => "FIPS 186-2",
            Standard::Fips186_4 => "FIPS 186-4",
        }
    }

    /// True for the SHA-2 regime
    pub fn is_fips186_4(&self) -> bool {
        matches!(self, Standard::Fips186_4)
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Standard {
    fn from(name: &str) -> Self {
        Standard::from_name(name)
    }
}

impl FromStr for Standard {
    type Err = core::convert::Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(Standard::from_name(name))
    }
}
