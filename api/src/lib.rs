//! This crate contains the target-independent domain and workflow logic.

pub mod abi;
pub mod address;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod eth_amount;
pub mod eth_client;
pub mod gif_cache;
pub mod gif_providers;
pub mod ledger;
pub mod notification;
pub mod storage;
pub mod transfer;
pub mod transport;

pub type ApiError = anyhow::Error;
