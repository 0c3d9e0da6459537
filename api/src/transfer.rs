//! Transfer records as stored by the ledger contract and as displayed.

use std::collections::HashSet;

use chrono::DateTime;
use chrono::Utc;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use thiserror::Error;

use crate::address::Address;
use crate::eth_amount::EthAmount;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("transfer timestamp {0} is out of range")]
    TimestampOutOfRange(BigUint),
}

/// A transfer exactly as decoded from the contract's return data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransfer {
    pub sender: Address,
    pub receiver: Address,
    pub amount: BigUint,
    pub message: String,
    pub timestamp: BigUint,
    pub keyword: String,
}

/// A transfer ready for display: amount in ether, timestamp as a moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub sender: Address,
    pub receiver: Address,
    pub amount: EthAmount,
    pub message: String,
    pub keyword: String,
    pub timestamp: DateTime<Utc>,
}

impl Transfer {
    /// The recorded moment, e.g. `2023-11-14 22:13:20 UTC`.
    pub fn display_timestamp(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }

    /// Identifies the record independently of its position in the history.
    pub fn key(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.sender,
            self.receiver,
            self.timestamp.timestamp(),
            self.amount.wei()
        )
    }
}

impl TryFrom<RawTransfer> for Transfer {
    type Error = TransferError;

    fn try_from(raw: RawTransfer) -> Result<Self, Self::Error> {
        let timestamp = raw
            .timestamp
            .to_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| TransferError::TimestampOutOfRange(raw.timestamp.clone()))?;

        Ok(Self {
            sender: raw.sender,
            receiver: raw.receiver,
            amount: EthAmount::from_wei(raw.amount),
            message: raw.message,
            keyword: raw.keyword,
            timestamp,
        })
    }
}

/// Aggregates shown above the history grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferStats {
    pub count: usize,
    pub total: EthAmount,
    pub unique_recipients: usize,
}

impl TransferStats {
    pub fn from_transfers(transfers: &[Transfer]) -> Self {
        let recipients: HashSet<&Address> = transfers.iter().map(|t| &t.receiver).collect();
        Self {
            count: transfers.len(),
            total: transfers.iter().map(|t| &t.amount).sum(),
            unique_recipients: recipients.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(receiver: &str, amount: u64, timestamp: u64) -> RawTransfer {
        RawTransfer {
            sender: "0x00000000000000000000000000000000000000ab".parse().unwrap(),
            receiver: receiver.parse().unwrap(),
            amount: BigUint::from(amount),
            message: "hi".to_string(),
            timestamp: BigUint::from(timestamp),
            keyword: "wave".to_string(),
        }
    }

    #[test]
    fn test_raw_to_display() {
        let transfer = Transfer::try_from(raw(
            "0x00000000000000000000000000000000000000de",
            1_000_000_000_000_000_000,
            1_700_000_000,
        ))
        .unwrap();

        assert_eq!(transfer.amount.to_string(), "1.0");
        assert_eq!(transfer.message, "hi");
        assert_eq!(transfer.keyword, "wave");
        assert_eq!(transfer.display_timestamp(), "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn test_key_ignores_position() {
        let first = Transfer::try_from(raw("0x00000000000000000000000000000000000000de", 1, 1_700_000_000)).unwrap();
        let second = Transfer::try_from(raw("0x00000000000000000000000000000000000000de", 2, 1_700_000_000)).unwrap();
        let third = Transfer::try_from(raw("0x00000000000000000000000000000000000000ef", 1, 1_700_000_060)).unwrap();

        let before: Vec<String> = [&second, &first].iter().map(|t| t.key()).collect();
        let after: Vec<String> = [&third, &second, &first].iter().map(|t| t.key()).collect();

        assert_eq!(after[1..], before[..]);
        assert_ne!(first.key(), second.key());
        assert_ne!(after[0], after[1]);
    }

    #[test]
    fn test_timestamp_out_of_range() {
        let mut record = raw("0x00000000000000000000000000000000000000de", 1, 0);
        record.timestamp = BigUint::from(u128::MAX);
        assert!(matches!(
            Transfer::try_from(record),
            Err(TransferError::TimestampOutOfRange(_))
        ));
    }

    #[test]
    fn test_stats() {
        let transfers: Vec<Transfer> = [
            raw("0x00000000000000000000000000000000000000de", 500_000_000_000_000_000, 1),
            raw("0x00000000000000000000000000000000000000de", 250_000_000_000_000_000, 2),
            raw("0x00000000000000000000000000000000000000ef", 250_000_000_000_000_000, 3),
        ]
        .into_iter()
        .map(|r| Transfer::try_from(r).unwrap())
        .collect();

        let stats = TransferStats::from_transfers(&transfers);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total.to_string(), "1.0");
        assert_eq!(stats.unique_recipients, 2);
    }
}
