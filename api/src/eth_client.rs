//! `Wallet` and `Ledger` over any EIP-1193 transport.

use std::time::Duration;

use dioxus_logger::tracing::debug;
use dioxus_logger::tracing::info;
use num_traits::ToPrimitive;
use serde_json::json;
use serde_json::Value;

use crate::abi::LedgerAbi;
use crate::address::Address;
use crate::clock;
use crate::config::AppConfig;
use crate::error::ChainError;
use crate::ledger::Ledger;
use crate::ledger::PendingTransfer;
use crate::ledger::RecordTransfer;
use crate::ledger::TxStatus;
use crate::ledger::Wallet;
use crate::transfer::RawTransfer;
use crate::transport::Eip1193;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Talks to the ledger contract through a wallet or node.
#[derive(Clone, Debug)]
pub struct EthClient<T> {
    transport: T,
    contract: Address,
    abi: LedgerAbi,
    poll_interval: Duration,
}

impl<T: Eip1193> EthClient<T> {
    pub fn new(transport: T, contract: Address, abi: LedgerAbi) -> Self {
        Self {
            transport,
            contract,
            abi,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn from_config(transport: T, config: &AppConfig) -> Self {
        Self::new(transport, config.contract_address, config.ledger_abi)
            .with_poll_interval(config.poll_interval)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Read-only contract call against the latest block.
    async fn call(&self, data: Vec<u8>) -> Result<Vec<u8>, ChainError> {
        let params = json!([
            { "to": self.contract.to_string(), "data": to_hex_data(&data) },
            "latest"
        ]);
        let result = self.transport.request("eth_call", params).await?;
        from_hex_data(&result)
    }
}

fn to_hex_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

fn from_hex_data(value: &Value) -> Result<Vec<u8>, ChainError> {
    let s = value
        .as_str()
        .ok_or_else(|| ChainError::UnexpectedResponse(format!("expected hex data, got {value}")))?;
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| ChainError::UnexpectedResponse(format!("bad hex data: {e}")))
}

fn parse_accounts(value: Value) -> Result<Vec<Address>, ChainError> {
    let accounts: Vec<String> = serde_json::from_value(value)?;
    accounts
        .iter()
        .map(|a| {
            a.parse()
                .map_err(|e| ChainError::UnexpectedResponse(format!("account {a:?}: {e}")))
        })
        .collect()
}

impl<T: Eip1193> Wallet for EthClient<T> {
    async fn accounts(&self) -> Result<Vec<Address>, ChainError> {
        parse_accounts(self.transport.request("eth_accounts", json!([])).await?)
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ChainError> {
        parse_accounts(self.transport.request("eth_requestAccounts", json!([])).await?)
    }
}

impl<T: Eip1193 + Clone> Ledger for EthClient<T> {
    type Pending = PendingTx<T>;

    async fn record_transfer(&self, call: &RecordTransfer) -> Result<Self::Pending, ChainError> {
        let from = self
            .accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(ChainError::NoSigner)?;

        let data = self.abi.encode_record_transfer(
            &call.receiver,
            call.amount.wei(),
            &call.message,
            &call.keyword,
        )?;

        let params = json!([{
            "from": from.to_string(),
            "to": self.contract.to_string(),
            "value": format!("{:#x}", call.amount.wei()),
            "data": to_hex_data(&data),
        }]);

        let result = self.transport.request("eth_sendTransaction", params).await?;
        let tx_hash = result
            .as_str()
            .ok_or_else(|| ChainError::UnexpectedResponse(format!("expected tx hash, got {result}")))?
            .to_string();

        info!("transfer submitted: {}", tx_hash);

        Ok(PendingTx {
            transport: self.transport.clone(),
            tx_hash,
            poll_interval: self.poll_interval,
        })
    }

    async fn all_transfers(&self) -> Result<Vec<RawTransfer>, ChainError> {
        let data = self.call(self.abi.encode_all_transfers()).await?;
        Ok(self.abi.decode_all_transfers(&data)?)
    }

    async fn transfer_count(&self) -> Result<u64, ChainError> {
        let data = self.call(self.abi.encode_transfer_count()).await?;
        let count = self.abi.decode_transfer_count(&data)?;
        count
            .to_u64()
            .ok_or_else(|| ChainError::UnexpectedResponse(format!("transfer count {count} too large")))
    }
}

/// A sent transaction, confirmed by polling for its receipt.
#[derive(Debug)]
pub struct PendingTx<T> {
    transport: T,
    tx_hash: String,
    poll_interval: Duration,
}

impl<T: Eip1193> PendingTransfer for PendingTx<T> {
    fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    async fn wait_for_confirmation(self) -> Result<TxStatus, ChainError> {
        loop {
            let receipt = self
                .transport
                .request("eth_getTransactionReceipt", json!([self.tx_hash]))
                .await?;

            if receipt.is_null() {
                debug!("no receipt yet for {}", self.tx_hash);
                clock::sleep(self.poll_interval).await;
                continue;
            }

            return match receipt.get("status").and_then(Value::as_str) {
                Some("0x1") => Ok(TxStatus::Success),
                Some(_) => Ok(TxStatus::Reverted),
                None => Err(ChainError::UnexpectedResponse(format!(
                    "receipt for {} has no status",
                    self.tx_hash
                ))),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use num_bigint::BigUint;

    use super::*;
    use crate::abi::ContractInterface;
    use crate::abi::DEFAULT_DESCRIPTOR;
    use crate::eth_amount::EthAmount;
    use crate::error::USER_REJECTED_CODE;

    const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
    const ACCOUNT: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
    const RECEIVER: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

    /// Answers requests from a script and records what was asked.
    #[derive(Clone, Default)]
    struct ScriptedTransport {
        replies: Rc<RefCell<VecDeque<Result<Value, ChainError>>>>,
        requests: Rc<RefCell<Vec<(String, Value)>>>,
    }

    impl ScriptedTransport {
        fn reply(&self, reply: Result<Value, ChainError>) -> &Self {
            self.replies.borrow_mut().push_back(reply);
            self
        }

        fn methods(&self) -> Vec<String> {
            self.requests.borrow().iter().map(|(m, _)| m.clone()).collect()
        }

        fn params(&self, index: usize) -> Value {
            self.requests.borrow()[index].1.clone()
        }
    }

    impl Eip1193 for ScriptedTransport {
        async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
            self.requests.borrow_mut().push((method.to_string(), params));
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ChainError::Transport(format!("unscripted {method}"))))
        }
    }

    fn client(transport: &ScriptedTransport) -> EthClient<ScriptedTransport> {
        let abi = LedgerAbi::from_interface(&ContractInterface::from_json(DEFAULT_DESCRIPTOR).unwrap())
            .unwrap();
        EthClient::new(transport.clone(), CONTRACT.parse().unwrap(), abi)
            .with_poll_interval(Duration::from_millis(10))
    }

    fn one_eth_call() -> RecordTransfer {
        RecordTransfer {
            receiver: RECEIVER.parse().unwrap(),
            amount: EthAmount::from_ether_str("1.5").unwrap(),
            message: "hi".to_string(),
            keyword: "wave".to_string(),
        }
    }

    #[tokio::test]
    async fn test_accounts() {
        let transport = ScriptedTransport::default();
        transport.reply(Ok(json!([ACCOUNT])));

        let accounts = client(&transport).accounts().await.unwrap();
        assert_eq!(accounts, vec![ACCOUNT.parse::<Address>().unwrap()]);
        assert_eq!(transport.methods(), vec!["eth_accounts"]);
    }

    #[tokio::test]
    async fn test_request_accounts_rejected() {
        let transport = ScriptedTransport::default();
        transport.reply(Err(ChainError::Rpc {
            code: USER_REJECTED_CODE,
            message: "User rejected the request.".to_string(),
        }));

        let err = client(&transport).request_accounts().await.unwrap_err();
        assert!(err.is_user_rejection());
        assert_eq!(transport.methods(), vec!["eth_requestAccounts"]);
    }

    #[tokio::test]
    async fn test_bad_account_is_unexpected() {
        let transport = ScriptedTransport::default();
        transport.reply(Ok(json!(["0xnope"])));
        assert!(matches!(
            client(&transport).accounts().await,
            Err(ChainError::UnexpectedResponse(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_transfer_and_confirm() {
        let transport = ScriptedTransport::default();
        transport
            .reply(Ok(json!([ACCOUNT])))
            .reply(Ok(json!("0xfeed")))
            .reply(Ok(Value::Null))
            .reply(Ok(json!({ "status": "0x1" })));

        let pending = client(&transport).record_transfer(&one_eth_call()).await.unwrap();
        assert_eq!(pending.tx_hash(), "0xfeed");
        assert_eq!(pending.wait_for_confirmation().await.unwrap(), TxStatus::Success);

        assert_eq!(
            transport.methods(),
            vec![
                "eth_accounts",
                "eth_sendTransaction",
                "eth_getTransactionReceipt",
                "eth_getTransactionReceipt"
            ]
        );

        let tx = &transport.params(1)[0];
        assert_eq!(tx["from"], ACCOUNT);
        assert_eq!(tx["to"], CONTRACT);
        assert_eq!(tx["value"], "0x14d1120d7b160000");
        let data = tx["data"].as_str().unwrap();
        let selector = crate::abi::selector("addToBlockChain(address,uint256,string,string)");
        assert!(data.starts_with(&format!("0x{}", hex::encode(selector))));
    }

    #[tokio::test]
    async fn test_reverted_receipt() {
        let transport = ScriptedTransport::default();
        transport
            .reply(Ok(json!([ACCOUNT])))
            .reply(Ok(json!("0xfeed")))
            .reply(Ok(json!({ "status": "0x0" })));

        let pending = client(&transport).record_transfer(&one_eth_call()).await.unwrap();
        assert!(pending.wait_for_confirmation().await.unwrap().is_reverted());
    }

    #[tokio::test]
    async fn test_record_transfer_without_account() {
        let transport = ScriptedTransport::default();
        transport.reply(Ok(json!([])));

        let result = client(&transport).record_transfer(&one_eth_call()).await;
        assert!(matches!(result, Err(ChainError::NoSigner)));
        assert_eq!(transport.methods(), vec!["eth_accounts"]);
    }

    #[tokio::test]
    async fn test_transfer_count() {
        let transport = ScriptedTransport::default();
        let mut word = vec![0u8; 32];
        word[31] = 3;
        transport.reply(Ok(json!(to_hex_data(&word))));

        let count = client(&transport).transfer_count().await.unwrap();
        assert_eq!(count, 3);

        let call = transport.params(0);
        assert_eq!(call[1], "latest");
        let selector = crate::abi::selector("getTransactionCount()");
        assert_eq!(call[0]["data"], to_hex_data(&selector));
    }

    #[tokio::test]
    async fn test_transfer_count_too_large() {
        let transport = ScriptedTransport::default();
        let big = BigUint::from(u64::MAX) + 1u32;
        let mut word = vec![0u8; 32];
        let bytes = big.to_bytes_be();
        word[32 - bytes.len()..].copy_from_slice(&bytes);
        transport.reply(Ok(json!(to_hex_data(&word))));

        assert!(matches!(
            client(&transport).transfer_count().await,
            Err(ChainError::UnexpectedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_all_transfers_empty() {
        let transport = ScriptedTransport::default();
        let mut data = vec![0u8; 64];
        data[31] = 0x20;
        transport.reply(Ok(json!(to_hex_data(&data))));

        assert!(client(&transport).all_transfers().await.unwrap().is_empty());
    }

    #[test]
    fn test_hex_data() {
        assert_eq!(from_hex_data(&json!("0x0102")).unwrap(), vec![1, 2]);
        assert_eq!(from_hex_data(&json!("0x")).unwrap(), Vec::<u8>::new());
        assert!(from_hex_data(&json!(12)).is_err());
        assert!(from_hex_data(&json!("0xzz")).is_err());
    }
}
