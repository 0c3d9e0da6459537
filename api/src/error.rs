//! Errors raised while talking to a wallet, a node, or a web service.

use thiserror::Error;

use crate::abi::AbiError;

/// JSON-RPC error code a wallet returns when the user declines a request.
pub const USER_REJECTED_CODE: i64 = 4001;
/// JSON-RPC error code for a method the node does not implement.
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

#[derive(Error, Debug)]
pub enum ChainError {
    /// An error object returned by the wallet or node.
    #[error("{message}")]
    Rpc { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("no account available to sign the transaction")]
    NoSigner,
}

impl ChainError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == USER_REJECTED_CODE)
    }

    pub fn is_method_not_found(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == METHOD_NOT_FOUND_CODE)
    }
}
