//! Account addresses as used by the wallet and the ledger contract.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const ADDRESS_LEN: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAddressError {
    #[error("address must start with 0x")]
    MissingPrefix,
    #[error("address must be {expected} hex digits, got {0}", expected = ADDRESS_LEN * 2)]
    InvalidLength(usize),
    #[error("address contains non-hex characters")]
    InvalidHex,
}

/// A 20-byte account address.
///
/// Parsing accepts `0x` followed by 40 hex digits in any case. Display is
/// always lowercase, so two spellings of one account compare equal.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Abbreviated form for cards and headers, e.g. `0x5b3...9f1c`.
    pub fn shortened(&self) -> String {
        let full = self.to_string();
        format!("{}...{}", &full[..5], &full[full.len() - 4..])
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(ParseAddressError::MissingPrefix)?;

        if digits.len() != ADDRESS_LEN * 2 {
            return Err(ParseAddressError::InvalidLength(digits.len()));
        }

        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| ParseAddressError::InvalidHex)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        let lower: Address = "0x5b38da6a701c568545dcfcb03fcb875f56beddc4".parse().unwrap();
        let mixed: Address = "0x5B38Da6a701c568545dCfcB03FcB875f56beddC4".parse().unwrap();
        assert_eq!(lower, mixed);
        assert_eq!(mixed.to_string(), "0x5b38da6a701c568545dcfcb03fcb875f56beddc4");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "5b38da6a701c568545dcfcb03fcb875f56beddc4".parse::<Address>(),
            Err(ParseAddressError::MissingPrefix)
        );
        assert_eq!(
            "0xABC".parse::<Address>(),
            Err(ParseAddressError::InvalidLength(3))
        );
        assert_eq!(
            "0xzz38da6a701c568545dcfcb03fcb875f56beddc4".parse::<Address>(),
            Err(ParseAddressError::InvalidHex)
        );
    }

    #[test]
    fn test_shortened() {
        let addr: Address = "0x5b38da6a701c568545dcfcb03fcb875f56beddc4".parse().unwrap();
        assert_eq!(addr.shortened(), "0x5b3...ddc4");
    }

    #[test]
    fn test_length_error_message() {
        let err = "0xABC".parse::<Address>().unwrap_err();
        assert_eq!(err.to_string(), "address must be 40 hex digits, got 3");
    }
}
