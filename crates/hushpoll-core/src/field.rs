//! Scalar field elements
//!
//! Commitments, nullifiers, membership roots and tree leaves are all
//! elements of the BN254 scalar field, stored in canonical
//! 32-byte big-endian form. Constructors reduce their input modulo the
//! field prime, so out-of-range values can never leak into comparisons
//! or hashes.

use core::fmt;
use num_bigint::BigUint;
use num_traits::Zero;
use once_cell::sync::Lazy;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The BN254 scalar field prime, in decimal.
pub const FIELD_MODULUS_DEC: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// Size of a canonical field-element encoding in bytes.
pub const FE_SIZE: usize = 32;

static MODULUS: Lazy<BigUint> = Lazy::new(|| {
    BigUint::parse_bytes(FIELD_MODULUS_DEC.as_bytes(), 10).expect("valid field modulus")
});

/// An element of the scalar field, canonical 32-byte big-endian.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fe([u8; FE_SIZE]);

impl Fe {
    /// The zero element; also the designated zero leaf of membership trees.
    pub const ZERO: Self = Self([0u8; FE_SIZE]);

    /// Reduce an arbitrary big-endian byte string into the field.
    pub fn from_bytes_mod_order(bytes: &[u8]) -> Self {
        let value = BigUint::from_bytes_be(bytes) % &*MODULUS;
        Self::from_biguint(value)
    }

    /// Lift a small integer into the field.
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; FE_SIZE];
        bytes[FE_SIZE - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Parse a decimal or 0x-prefixed hex string, reducing modulo the prime.
    pub fn parse(input: &str) -> Result<Self, FieldParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FieldParseError(input.to_string()));
        }
        let value = if let Some(hex_str) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            BigUint::parse_bytes(hex_str.as_bytes(), 16)
        } else {
            BigUint::parse_bytes(trimmed.as_bytes(), 10)
        };
        match value {
            Some(v) => Ok(Self::from_biguint(v % &*MODULUS)),
            None => Err(FieldParseError(input.to_string())),
        }
    }

    /// Canonical big-endian encoding, exactly 32 bytes.
    pub fn to_bytes(self) -> [u8; FE_SIZE] {
        self.0
    }

    /// Borrow the canonical encoding.
    pub fn as_bytes(&self) -> &[u8; FE_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; FE_SIZE]
    }

    /// Decimal rendering, as used by off-line proving toolchains.
    pub fn to_decimal(self) -> String {
        BigUint::from_bytes_be(&self.0).to_str_radix(10)
    }

    fn from_biguint(value: BigUint) -> Self {
        debug_assert!(value < *MODULUS);
        let mut bytes = [0u8; FE_SIZE];
        if !value.is_zero() {
            let be = value.to_bytes_be();
            bytes[FE_SIZE - be.len()..].copy_from_slice(&be);
        }
        Self(bytes)
    }
}

/// A string failed to parse as a field element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldParseError(pub String);

impl fmt::Display for FieldParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid field element: {:?}", self.0)
    }
}

impl std::error::Error for FieldParseError {}

impl fmt::Display for Fe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Fe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fe({})", self)
    }
}

impl std::str::FromStr for Fe {
    type Err = FieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for Fe {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl Serialize for Fe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fe {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Fe::parse(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_canonical() {
        assert!(Fe::ZERO.is_zero());
        assert_eq!(Fe::ZERO, Fe::from_u64(0));
        assert_eq!(Fe::ZERO.to_bytes(), [0u8; 32]);
    }

    #[test]
    fn test_from_u64_round_trip() {
        let fe = Fe::from_u64(0xDEAD_BEEF);
        let bytes = fe.to_bytes();
        assert_eq!(Fe::from_bytes_mod_order(&bytes), fe);
    }

    #[test]
    fn test_parse_decimal_and_hex_agree() {
        let dec = Fe::parse("255").unwrap();
        let hex = Fe::parse("0xff").unwrap();
        assert_eq!(dec, hex);
        assert_eq!(dec, Fe::from_u64(255));
    }

    #[test]
    fn test_parse_reduces_mod_order() {
        // The modulus itself reduces to zero.
        let fe = Fe::parse(FIELD_MODULUS_DEC).unwrap();
        assert!(fe.is_zero());
    }

    #[test]
    fn test_oversized_bytes_reduce() {
        let fe = Fe::from_bytes_mod_order(&[0xFF; 64]);
        assert!(!fe.is_zero());
        // Reducing the canonical encoding again is a no-op.
        assert_eq!(Fe::from_bytes_mod_order(&fe.to_bytes()), fe);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Fe::parse("").is_err());
        assert!(Fe::parse("0xzz").is_err());
        assert!(Fe::parse("12a4").is_err());
    }

    #[test]
    fn test_display_is_fixed_width_hex() {
        let rendered = Fe::from_u64(1).to_string();
        assert_eq!(rendered.len(), 2 + 64);
        assert!(rendered.ends_with('1'));
        assert_eq!(Fe::parse(&rendered).unwrap(), Fe::from_u64(1));
    }

    #[test]
    fn test_decimal_round_trip() {
        let fe = Fe::from_u64(123_456_789);
        assert_eq!(fe.to_decimal(), "123456789");
        assert_eq!(Fe::parse(&fe.to_decimal()).unwrap(), fe);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let fe = Fe::from_u64(42);
        let json = serde_json::to_string(&fe).unwrap();
        assert!(json.starts_with("\"0x"));
        let back: Fe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fe);
    }
}
