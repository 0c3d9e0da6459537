use std::ops::Deref;
use std::rc::Rc;

use api::config::AppConfig;
use api::coordinator::TransactionCoordinator;
use api::eth_client::EthClient;
use api::gif_cache::GifCache;
use api::gif_providers::giphy::Giphy;
use api::ApiError;

use crate::compat;

pub type AppWallet = EthClient<compat::Provider>;
pub type Coordinator = TransactionCoordinator<AppWallet, compat::Store>;

pub struct AppStateData {
    pub config: AppConfig,
    pub coordinator: Coordinator,
    /// `None` when no image search key is configured.
    pub gifs: Option<GifCache<Giphy>>,
}

/// The stable, non-reactive application state shared through context.
#[derive(Clone)]
pub struct AppState(Rc<AppStateData>);

impl Deref for AppState {
    type Target = AppStateData;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for AppState {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let wallet = compat::detect_provider(&config)
            .map(|provider| EthClient::from_config(provider, &config));
        if wallet.is_none() {
            dioxus_logger::tracing::warn!("no injected wallet found");
        }

        let gifs = config
            .giphy_api_key
            .as_deref()
            .map(|key| GifCache::new(Giphy::new(key)));

        Self(Rc::new(AppStateData {
            coordinator: TransactionCoordinator::new(wallet, compat::open_store()),
            gifs,
            config,
        }))
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(AppConfig::from_env()?))
    }
}
