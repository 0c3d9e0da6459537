//! Provides a safe, exact type for representing ether amounts.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use thiserror::Error;

/// Number of fractional digits between one ether and one wei.
pub const ETHER_DECIMALS: usize = 18;

/// An error that can occur when parsing a string into an `EthAmount`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseEthAmountError {
    /// The string is not a plain decimal number (e.g., "abc", "1.2.3", "-1", "1e5").
    #[error("invalid ether amount format")]
    InvalidFormat,
    /// The string has more fractional digits than wei can represent.
    #[error("too many decimal places: ether supports at most 18")]
    TooManyDecimals,
}

/// An amount of ether.
///
/// Internally the amount is held as an unsigned big integer of wei (the
/// 18-decimal base unit used on chain), so values never pass through floating
/// point. The `Display` implementation renders the ether value with at least
/// one fractional digit, e.g. `1.0`, `1.5`, `0.000001`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EthAmount {
    wei: BigUint,
}

impl EthAmount {
    /// Creates an amount directly from its base unit.
    pub fn from_wei(wei: BigUint) -> Self {
        Self { wei }
    }

    /// Parses a decimal ether string into an exact amount.
    ///
    /// # Examples
    /// ```
    /// use api::eth_amount::EthAmount;
    ///
    /// let amount = EthAmount::from_ether_str("1.5").unwrap();
    /// assert_eq!(amount.wei().to_string(), "1500000000000000000");
    /// ```
    pub fn from_ether_str(s: &str) -> Result<Self, ParseEthAmountError> {
        let (major_str, minor_str) = s.split_once('.').unwrap_or((s, ""));

        if major_str.is_empty() && minor_str.is_empty() {
            return Err(ParseEthAmountError::InvalidFormat);
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(major_str) || !all_digits(minor_str) {
            return Err(ParseEthAmountError::InvalidFormat);
        }
        if minor_str.len() > ETHER_DECIMALS {
            return Err(ParseEthAmountError::TooManyDecimals);
        }

        let major_units = if major_str.is_empty() {
            BigUint::zero()
        } else {
            BigUint::from_str(major_str).map_err(|_| ParseEthAmountError::InvalidFormat)?
        };
        let padded_minor = format!("{:0<width$}", minor_str, width = ETHER_DECIMALS);
        let minor_units =
            BigUint::from_str(&padded_minor).map_err(|_| ParseEthAmountError::InvalidFormat)?;

        Ok(Self::from_wei(major_units * wei_per_ether() + minor_units))
    }

    /// Returns the raw amount in wei.
    pub fn wei(&self) -> &BigUint {
        &self.wei
    }

    /// Formats the amount with its unit (e.g., "1.5 ETH").
    pub fn to_string_with_unit(&self) -> String {
        format!("{} ETH", self)
    }
}

fn wei_per_ether() -> BigUint {
    BigUint::from(10u32).pow(ETHER_DECIMALS as u32)
}

impl FromStr for EthAmount {
    type Err = ParseEthAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ether_str(s)
    }
}

impl fmt::Display for EthAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let divisor = wei_per_ether();
        let major_units = &self.wei / &divisor;
        let minor_units = &self.wei % &divisor;

        let minor_str = format!("{:0>width$}", minor_units.to_string(), width = ETHER_DECIMALS);
        let minor_str = minor_str.trim_end_matches('0');

        if minor_str.is_empty() {
            write!(f, "{}.0", major_units)
        } else {
            write!(f, "{}.{}", major_units, minor_str)
        }
    }
}

impl Add for EthAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_wei(self.wei + rhs.wei)
    }
}

impl<'a> Sum<&'a EthAmount> for EthAmount {
    fn sum<I: Iterator<Item = &'a EthAmount>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, amount| {
            Self::from_wei(acc.wei + &amount.wei)
        })
    }
}
