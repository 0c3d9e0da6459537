//! EIP-1193 style request transports.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::ChainError;

/// Anything that answers `request({ method, params })` the way an injected
/// browser wallet does.
pub trait Eip1193 {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError>;
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize, Debug)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize, Debug)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    fn into_result(self) -> Result<Value, ChainError> {
        match self.error {
            Some(e) => Err(ChainError::Rpc {
                code: e.code,
                message: e.message,
            }),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// JSON-RPC 2.0 over HTTP, for nodes with unlocked accounts such as a
/// local development chain.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
    next_id: Arc<AtomicU64>,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let body = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_response(&body)
    }
}

impl Eip1193 for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        self.call(method, params).await
    }
}

fn parse_response(body: &str) -> Result<Value, ChainError> {
    serde_json::from_str::<JsonRpcResponse>(body)?.into_result()
}

/// Serves `eth_requestAccounts` from `eth_accounts` when the node does not
/// implement it. Plain nodes have no account prompt; their account list is
/// already authorized.
#[derive(Clone, Debug)]
pub struct AccountsFallback<T> {
    inner: T,
}

impl<T> AccountsFallback<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: Eip1193> Eip1193 for AccountsFallback<T> {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        match self.inner.request(method, params.clone()).await {
            Err(e) if method == "eth_requestAccounts" && e.is_method_not_found() => {
                dioxus_logger::tracing::debug!("node lacks eth_requestAccounts, using eth_accounts");
                self.inner.request("eth_accounts", params).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::METHOD_NOT_FOUND_CODE;
    use crate::error::USER_REJECTED_CODE;
    use serde_json::json;

    /// Answers `eth_accounts` and fails `eth_requestAccounts` with `reject_code`.
    struct PlainNode {
        reject_code: i64,
        methods: RefCell<Vec<String>>,
    }

    impl PlainNode {
        fn new(reject_code: i64) -> Self {
            Self {
                reject_code,
                methods: RefCell::new(Vec::new()),
            }
        }
    }

    impl Eip1193 for PlainNode {
        async fn request(&self, method: &str, _params: Value) -> Result<Value, ChainError> {
            self.methods.borrow_mut().push(method.to_string());
            match method {
                "eth_accounts" => Ok(json!(["0x5b38da6a701c568545dcfcb03fcb875f56beddc4"])),
                _ => Err(ChainError::Rpc {
                    code: self.reject_code,
                    message: "nope".to_string(),
                }),
            }
        }
    }

    #[test]
    fn test_request_envelope() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "eth_accounts",
            params: json!([]),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"jsonrpc": "2.0", "id": 7, "method": "eth_accounts", "params": []})
        );
    }

    #[test]
    fn test_result_response() {
        let value = parse_response(r#"{"jsonrpc":"2.0","id":1,"result":["0xab"]}"#).unwrap();
        assert_eq!(value, json!(["0xab"]));
    }

    #[test]
    fn test_null_result_response() {
        let value = parse_response(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_error_response_maps_to_rpc_error() {
        let err = parse_response(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}"#,
        )
        .unwrap_err();
        assert!(err.is_method_not_found());
        assert_eq!(err.to_string(), "Method not found");
    }

    #[tokio::test]
    async fn test_request_accounts_falls_back_on_method_not_found() {
        let transport = AccountsFallback::new(PlainNode::new(METHOD_NOT_FOUND_CODE));

        let accounts = transport.request("eth_requestAccounts", json!([])).await.unwrap();

        assert_eq!(accounts, json!(["0x5b38da6a701c568545dcfcb03fcb875f56beddc4"]));
        assert_eq!(
            *transport.inner.methods.borrow(),
            vec!["eth_requestAccounts", "eth_accounts"]
        );
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let transport = AccountsFallback::new(PlainNode::new(USER_REJECTED_CODE));

        let err = transport.request("eth_requestAccounts", json!([])).await.unwrap_err();

        assert!(err.is_user_rejection());
        assert_eq!(*transport.inner.methods.borrow(), vec!["eth_requestAccounts"]);
    }

    #[tokio::test]
    async fn test_other_methods_pass_through() {
        let transport = AccountsFallback::new(PlainNode::new(METHOD_NOT_FOUND_CODE));

        let err = transport.request("eth_chainId", json!([])).await.unwrap_err();

        assert!(err.is_method_not_found());
        assert_eq!(*transport.inner.methods.borrow(), vec!["eth_chainId"]);
    }

    #[test]
    fn test_malformed_response() {
        assert!(matches!(parse_response("not json"), Err(ChainError::Json(_))));
    }
}
