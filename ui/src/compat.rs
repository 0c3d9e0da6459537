// Re-export the public API from the appropriate module
#[cfg(target_arch = "wasm32")]
pub use wasm32::*;

#[cfg(not(target_arch = "wasm32"))]
pub use non_wasm32::*;

#[cfg(target_arch = "wasm32")]
pub mod wasm32 {
    use std::time::Duration;

    use api::config::AppConfig;
    use api::error::ChainError;
    use api::storage::KeyValueStore;
    use api::storage::StorageError;
    use api::transport::Eip1193;
    use js_sys::Function;
    use js_sys::Object;
    use js_sys::Promise;
    use js_sys::Reflect;
    use js_sys::JSON;
    use serde_json::Value;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::Window;

    pub type Provider = InjectedProvider;
    pub type Store = LocalStore;

    pub async fn sleep(duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }

    pub async fn clipboard_set(text: String) -> bool {
        match web_sys::window().map(|win: Window| win.navigator().clipboard()) {
            Some(clipboard) => {
                let promise = clipboard.write_text(&text);
                JsFuture::from(promise).await.is_ok()
            }
            _ => false,
        }
    }

    /// Blocking browser alert.
    pub async fn alert(message: String) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(&message);
        }
    }

    /// The wallet injected into the page as `window.ethereum`.
    #[derive(Clone, Debug)]
    pub struct InjectedProvider {
        ethereum: JsValue,
    }

    impl InjectedProvider {
        pub fn detect() -> Option<Self> {
            let window = web_sys::window()?;
            let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
            if ethereum.is_undefined() || ethereum.is_null() {
                return None;
            }
            Some(Self { ethereum })
        }
    }

    /// Wallets reject with `{ code, message }` objects or plain `Error`s.
    fn js_error(value: JsValue) -> ChainError {
        let field = |name: &str| Reflect::get(&value, &JsValue::from_str(name)).ok();
        let code = field("code").and_then(|c| c.as_f64());
        let message = field("message").and_then(|m| m.as_string());

        match (code, message) {
            (Some(code), Some(message)) => ChainError::Rpc {
                code: code as i64,
                message,
            },
            (None, Some(message)) => ChainError::Transport(message),
            _ => ChainError::Transport(value.as_string().unwrap_or_else(|| format!("{value:?}"))),
        }
    }

    impl Eip1193 for InjectedProvider {
        async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
            let args = Object::new();
            let params = JSON::parse(&params.to_string()).map_err(js_error)?;
            Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method))
                .map_err(js_error)?;
            Reflect::set(&args, &JsValue::from_str("params"), &params).map_err(js_error)?;

            let request: Function = Reflect::get(&self.ethereum, &JsValue::from_str("request"))
                .map_err(js_error)?
                .dyn_into()
                .map_err(|_| ChainError::Transport("ethereum.request is not a function".to_string()))?;
            let promise: Promise = request
                .call1(&self.ethereum, &args)
                .map_err(js_error)?
                .dyn_into()
                .map_err(|_| ChainError::Transport("ethereum.request did not return a promise".to_string()))?;

            let result = JsFuture::from(promise).await.map_err(js_error)?;
            if result.is_undefined() || result.is_null() {
                return Ok(Value::Null);
            }
            let json: String = JSON::stringify(&result).map_err(js_error)?.into();
            Ok(serde_json::from_str(&json)?)
        }
    }

    pub fn detect_provider(_config: &AppConfig) -> Option<Provider> {
        InjectedProvider::detect()
    }

    /// The browser's `localStorage` for this origin.
    pub struct LocalStore {
        storage: Option<web_sys::Storage>,
    }

    impl KeyValueStore for LocalStore {
        fn get(&self, key: &str) -> Option<String> {
            self.storage.as_ref()?.get_item(key).ok().flatten()
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            let storage = self
                .storage
                .as_ref()
                .ok_or_else(|| StorageError::Unavailable("localStorage".to_string()))?;
            storage
                .set_item(key, value)
                .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
        }
    }

    pub fn open_store() -> Store {
        LocalStore {
            storage: web_sys::window().and_then(|w| w.local_storage().ok().flatten()),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod non_wasm32 {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use api::config::AppConfig;
    use api::storage::KeyValueStore;
    use api::storage::StorageError;
    use api::transport::AccountsFallback;
    use api::transport::HttpTransport;
    use dioxus_clipboard::prelude::*;

    pub type Provider = AccountsFallback<HttpTransport>;
    pub type Store = FileStore;

    const APP_DIR: &str = "ledger-dapp";
    const STORE_FILE: &str = "storage.json";

    pub async fn sleep(duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    pub async fn clipboard_set(text: String) -> bool {
        let mut clipboard = use_clipboard();
        clipboard.set(text).is_ok()
    }

    pub async fn alert(message: String) {
        rfd::AsyncMessageDialog::new()
            .set_level(rfd::MessageLevel::Warning)
            .set_title("Ledger")
            .set_description(message)
            .show()
            .await;
    }

    /// Native builds sign through a JSON-RPC node with unlocked accounts.
    pub fn detect_provider(config: &AppConfig) -> Option<Provider> {
        Some(AccountsFallback::new(HttpTransport::new(config.rpc_url.as_str())))
    }

    /// A JSON object on disk in the platform data directory.
    pub struct FileStore {
        path: Option<PathBuf>,
        values: RefCell<HashMap<String, String>>,
    }

    impl FileStore {
        pub fn open(path: Option<PathBuf>) -> Self {
            let values = path
                .as_ref()
                .and_then(|p| std::fs::read_to_string(p).ok())
                .and_then(|json| match serde_json::from_str(&json) {
                    Ok(values) => Some(values),
                    Err(e) => {
                        dioxus_logger::tracing::warn!("ignoring unreadable store file: {}", e);
                        None
                    }
                })
                .unwrap_or_default();

            Self {
                path,
                values: RefCell::new(values),
            }
        }

        fn persist(&self) -> Result<(), StorageError> {
            let Some(path) = &self.path else {
                return Err(StorageError::Unavailable("no data directory".to_string()));
            };
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let json = serde_json::to_string_pretty(&*self.values.borrow())?;
            std::fs::write(path, json)?;
            Ok(())
        }
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> Option<String> {
            self.values.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            self.persist()
        }
    }

    pub fn open_store() -> Store {
        FileStore::open(dirs::data_dir().map(|dir| dir.join(APP_DIR).join(STORE_FILE)))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use api::storage::TRANSFER_COUNT_KEY;

        #[test]
        fn test_file_store_persists() {
            let path = std::env::temp_dir()
                .join(format!("ledger-store-{}", std::process::id()))
                .join(STORE_FILE);

            let store = FileStore::open(Some(path.clone()));
            assert_eq!(store.get(TRANSFER_COUNT_KEY), None);
            store.set(TRANSFER_COUNT_KEY, "5").unwrap();

            let reopened = FileStore::open(Some(path.clone()));
            assert_eq!(reopened.get(TRANSFER_COUNT_KEY).as_deref(), Some("5"));

            std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
        }

        #[test]
        fn test_file_store_without_directory() {
            let store = FileStore::open(None);
            assert!(store.set(TRANSFER_COUNT_KEY, "1").is_err());
            assert_eq!(store.get(TRANSFER_COUNT_KEY).as_deref(), Some("1"));
        }
    }
}
