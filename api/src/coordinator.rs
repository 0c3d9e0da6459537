//! The transfer workflow: wallet connection, the send form, submission and
//! history refresh.
//!
//! `TransactionCoordinator` owns all workflow state and publishes an
//! immutable `CoordinatorState` snapshot after every change. Presentation
//! subscribes to the snapshots and calls back into the operations; it never
//! mutates state directly.
//!
//! Operations run one at a time and retry nothing. Failures of the send
//! workflow surface as an inline error plus a transient notification; history
//! and counter failures are only logged.

use dioxus_logger::tracing::debug;
use dioxus_logger::tracing::error;
use dioxus_logger::tracing::info;
use dioxus_logger::tracing::warn;
use thiserror::Error;
use tokio::sync::watch;
use web_time::Instant;

use crate::address::Address;
use crate::address::ParseAddressError;
use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::error::ChainError;
use crate::eth_amount::EthAmount;
use crate::eth_amount::ParseEthAmountError;
use crate::ledger::Ledger;
use crate::ledger::PendingTransfer;
use crate::ledger::RecordTransfer;
use crate::ledger::TxStatus;
use crate::ledger::Wallet;
use crate::notification::Notification;
use crate::notification::Toast;
use crate::storage::cached_transfer_count;
use crate::storage::KeyValueStore;
use crate::storage::TRANSFER_COUNT_KEY;
use crate::transfer::Transfer;
use crate::transfer::TransferError;
use crate::transfer::TransferStats;

pub const PROCESSING_MESSAGE: &str = "Processing your transaction...";
pub const FAILURE_MESSAGE: &str = "Transaction failed. Please try again.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("Please fill in all fields")]
    MissingField,
    #[error("Amount must be greater than 0")]
    NonPositiveAmount,
}

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("Please install MetaMask.")]
    WalletNotFound,
    #[error("A transaction is already being processed")]
    Busy,
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Amount(#[from] ParseEthAmountError),
    #[error("Invalid receiver address: {0}")]
    Address(#[from] ParseAddressError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Record(#[from] TransferError),
    #[error("Transaction was reverted")]
    Reverted,
}

/// One input of the send form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter, strum::IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum DraftField {
    Receiver,
    Amount,
    Keyword,
    Message,
}

/// The send form as typed, not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    pub receiver: String,
    pub amount: String,
    pub keyword: String,
    pub message: String,
}

impl FormDraft {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Receiver => &self.receiver,
            DraftField::Amount => &self.amount,
            DraftField::Keyword => &self.keyword,
            DraftField::Message => &self.message,
        }
    }

    fn get_mut(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::Receiver => &mut self.receiver,
            DraftField::Amount => &mut self.amount,
            DraftField::Keyword => &mut self.keyword,
            DraftField::Message => &mut self.message,
        }
    }

    /// Local checks made before the ledger is contacted.
    ///
    /// The amount only has to read as a positive number here; the exact
    /// conversion to wei happens when the transfer is built.
    pub fn validate(&self) -> Result<(), DraftError> {
        let fields = [&self.receiver, &self.amount, &self.keyword, &self.message];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(DraftError::MissingField);
        }
        match self.amount.trim().parse::<f64>() {
            Ok(amount) if amount > 0.0 => Ok(()),
            _ => Err(DraftError::NonPositiveAmount),
        }
    }
}

/// Everything presentation needs, as of the latest change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorState {
    pub current_account: Option<Address>,
    pub draft: FormDraft,
    /// In ledger order, oldest first.
    pub transfers: Vec<Transfer>,
    pub transfer_count: u64,
    pub is_loading: bool,
    pub inline_error: Option<String>,
    pub notification: Option<Toast>,
    pub last_tx_hash: Option<String>,
}

impl CoordinatorState {
    pub fn is_connected(&self) -> bool {
        self.current_account.is_some()
    }

    /// The current notification, unless it has expired by `now`.
    pub fn visible_notification(&self, now: Instant) -> Option<&Notification> {
        self.notification
            .as_ref()
            .filter(|toast| toast.is_visible(now))
            .map(|toast| &toast.notification)
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &Transfer> {
        self.transfers.iter().rev()
    }

    pub fn stats(&self) -> TransferStats {
        TransferStats::from_transfers(&self.transfers)
    }
}

pub struct TransactionCoordinator<W, S, C = SystemClock> {
    wallet: Option<W>,
    store: S,
    clock: C,
    state: watch::Sender<CoordinatorState>,
}

impl<W, S> TransactionCoordinator<W, S>
where
    W: Wallet + Ledger,
    S: KeyValueStore,
{
    pub fn new(wallet: Option<W>, store: S) -> Self {
        Self::with_clock(wallet, store, SystemClock)
    }
}

impl<W, S, C> TransactionCoordinator<W, S, C>
where
    W: Wallet + Ledger,
    S: KeyValueStore,
    C: Clock,
{
    /// `wallet` is `None` when no wallet was injected.
    pub fn with_clock(wallet: Option<W>, store: S, clock: C) -> Self {
        let initial = CoordinatorState {
            transfer_count: cached_transfer_count(&store),
            ..Default::default()
        };
        let (state, _) = watch::channel(initial);
        Self {
            wallet,
            store,
            clock,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> CoordinatorState {
        self.state.borrow().clone()
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    fn update(&self, f: impl FnOnce(&mut CoordinatorState)) {
        self.state.send_modify(f);
    }

    /// Shows `notification`, replacing whatever was shown before.
    fn notify(&self, notification: Notification) {
        let toast = Toast::new(notification, self.clock.now());
        self.update(|s| s.notification = Some(toast));
    }

    pub fn dismiss_notification(&self) {
        self.update(|s| s.notification = None);
    }

    /// Drops the notification once it has been visible for its full lifetime.
    pub fn clear_expired_notification(&self) {
        let now = self.clock.now();
        let expired = matches!(&self.state.borrow().notification, Some(t) if !t.is_visible(now));
        if expired {
            self.dismiss_notification();
        }
    }

    fn wallet(&self) -> Result<&W, CoordinatorError> {
        self.wallet.as_ref().ok_or(CoordinatorError::WalletNotFound)
    }

    /// Asks the wallet for accounts, prompting the user if needed.
    ///
    /// A rejected or empty request leaves the account unset and is only
    /// logged. The only error is a missing wallet.
    pub async fn connect(&self) -> Result<(), CoordinatorError> {
        let wallet = self.wallet()?;
        match wallet.request_accounts().await {
            Ok(accounts) => self.adopt_accounts(accounts).await,
            Err(e) => warn!("account request failed: {}", e),
        }
        Ok(())
    }

    /// Startup check for accounts the wallet already authorized. Never prompts.
    pub async fn check_connection(&self) -> Result<(), CoordinatorError> {
        let wallet = self.wallet()?;
        match wallet.accounts().await {
            Ok(accounts) => self.adopt_accounts(accounts).await,
            Err(e) => warn!("account check failed: {}", e),
        }
        Ok(())
    }

    async fn adopt_accounts(&self, accounts: Vec<Address>) {
        let Some(account) = accounts.into_iter().next() else {
            info!("no authorized accounts found");
            return;
        };
        info!("connected account {}", account);
        self.update(|s| s.current_account = Some(account));
        self.refresh_history().await;
        self.sync_transfer_count().await;
    }

    pub fn update_draft_field(&self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        self.update(|s| {
            *s.draft.get_mut(field) = value;
            s.inline_error = None;
        });
    }

    /// Validates the form, records the transfer on the ledger and waits for
    /// it to be confirmed.
    ///
    /// On success the form is cleared and history is refreshed. On failure
    /// the form is kept, the message is set as the inline error and a
    /// failure notification is shown.
    pub async fn submit(&self) -> Result<(), CoordinatorError> {
        if self.state.borrow().is_loading {
            return Err(CoordinatorError::Busy);
        }

        let wallet = match self.wallet() {
            Ok(wallet) => wallet,
            Err(e) => {
                self.update(|s| s.inline_error = Some(e.to_string()));
                return Err(e);
            }
        };

        let draft = self.state.borrow().draft.clone();
        if let Err(e) = draft.validate() {
            self.update(|s| s.inline_error = Some(e.to_string()));
            return Err(e.into());
        }

        self.update(|s| {
            s.is_loading = true;
            s.inline_error = None;
        });
        self.notify(Notification::info(PROCESSING_MESSAGE));

        let result = match self.send_and_confirm(wallet, &draft).await {
            Ok(amount) => {
                info!("transfer of {} confirmed", amount.to_string_with_unit());
                self.notify(Notification::success(format!(
                    "Transaction completed successfully! {} transferred.",
                    amount.to_string_with_unit()
                )));
                self.sync_transfer_count().await;
                self.refresh_history().await;
                self.update(|s| s.draft = FormDraft::default());
                Ok(())
            }
            Err(e) => {
                error!("transfer failed: {}", e);
                self.update(|s| s.inline_error = Some(e.to_string()));
                self.notify(Notification::error(FAILURE_MESSAGE));
                Err(e)
            }
        };

        self.update(|s| s.is_loading = false);
        result
    }

    async fn send_and_confirm(
        &self,
        wallet: &W,
        draft: &FormDraft,
    ) -> Result<EthAmount, CoordinatorError> {
        let amount = EthAmount::from_ether_str(draft.amount.trim())?;
        let receiver: Address = draft.receiver.trim().parse()?;

        let call = RecordTransfer {
            receiver,
            amount: amount.clone(),
            message: draft.message.clone(),
            keyword: draft.keyword.clone(),
        };

        let pending = wallet.record_transfer(&call).await?;
        let tx_hash = pending.tx_hash().to_string();
        self.update(|s| s.last_tx_hash = Some(tx_hash));

        match pending.wait_for_confirmation().await? {
            TxStatus::Success => Ok(amount),
            TxStatus::Reverted => Err(CoordinatorError::Reverted),
        }
    }

    /// Replaces the transfer list with the ledger's. Does nothing without a
    /// connected account; failures leave the previous list in place.
    pub async fn refresh_history(&self) {
        let Some(wallet) = self.wallet.as_ref() else {
            debug!("history refresh skipped: no wallet");
            return;
        };
        if !self.state.borrow().is_connected() {
            debug!("history refresh skipped: no connected account");
            return;
        }

        let transfers = match wallet.all_transfers().await {
            Ok(raw) => raw
                .into_iter()
                .map(Transfer::try_from)
                .collect::<Result<Vec<_>, _>>(),
            Err(e) => {
                warn!("failed to fetch transfers: {}", e);
                return;
            }
        };

        match transfers {
            Ok(transfers) => {
                debug!("loaded {} transfers", transfers.len());
                self.update(|s| s.transfers = transfers);
            }
            Err(e) => warn!("failed to read transfers: {}", e),
        }
    }

    /// Re-reads the ledger's transfer count and caches it in the store.
    async fn sync_transfer_count(&self) {
        let Some(wallet) = self.wallet.as_ref() else {
            return;
        };
        match wallet.transfer_count().await {
            Ok(count) => {
                if let Err(e) = self.store.set(TRANSFER_COUNT_KEY, &count.to_string()) {
                    warn!("failed to cache transfer count: {}", e);
                }
                self.update(|s| s.transfer_count = count);
            }
            Err(e) => warn!("failed to read transfer count: {}", e),
        }
    }
}
