//! Traits for the injected wallet and the ledger contract behind it.
//!
//! The coordinator only sees these traits, so tests can swap in a fake and
//! targets can choose between a browser wallet and a JSON-RPC node.

use crate::address::Address;
use crate::error::ChainError;
use crate::eth_amount::EthAmount;
use crate::transfer::RawTransfer;

/// Arguments of the contract's `addToBlockChain` call.
///
/// `amount` is both the recorded amount and the value attached to the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTransfer {
    pub receiver: Address,
    pub amount: EthAmount,
    pub message: String,
    pub keyword: String,
}

/// Final status of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIs)]
pub enum TxStatus {
    Success,
    Reverted,
}

/// A submitted transaction that has not yet been confirmed.
pub trait PendingTransfer {
    fn tx_hash(&self) -> &str;

    /// Resolves once the transaction is included.
    async fn wait_for_confirmation(self) -> Result<TxStatus, ChainError>;
}

/// Account access through an injected wallet.
pub trait Wallet {
    /// Accounts already authorized for this site. Never prompts.
    async fn accounts(&self) -> Result<Vec<Address>, ChainError>;

    /// Asks the wallet to authorize accounts. May prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>, ChainError>;
}

/// The ledger contract.
pub trait Ledger {
    type Pending: PendingTransfer;

    /// Sends `addToBlockChain` with `call.amount` attached as value.
    async fn record_transfer(&self, call: &RecordTransfer) -> Result<Self::Pending, ChainError>;

    async fn all_transfers(&self) -> Result<Vec<RawTransfer>, ChainError>;

    async fn transfer_count(&self) -> Result<u64, ChainError>;
}
