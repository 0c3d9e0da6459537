use api::coordinator::CoordinatorError;
use api::coordinator::CoordinatorState;
use api::coordinator::DraftField;
use dioxus::prelude::*;
use dioxus_logger::tracing::debug;
use dioxus_logger::tracing::info;

use crate::app_state::AppState;
use crate::compat;

/// Mirrors every coordinator snapshot into a signal.
///
/// The coordinator is the only writer; components read the signal and call
/// back through [`CoordinatorActions`].
pub fn use_coordinator_state(app_state: AppState) -> Signal<CoordinatorState> {
    let mut state = use_signal(|| app_state.coordinator.state());

    use_future(move || {
        let app_state = app_state.clone();
        async move {
            let mut snapshots = app_state.coordinator.subscribe();
            loop {
                let snapshot = snapshots.borrow_and_update().clone();
                if *state.peek() != snapshot {
                    state.set(snapshot);
                }
                if snapshots.changed().await.is_err() {
                    break;
                }
            }
        }
    });

    state
}

/// Fire-and-forget entry points into the coordinator for event handlers.
#[derive(Clone, PartialEq)]
pub struct CoordinatorActions {
    app_state: AppState,
}

impl CoordinatorActions {
    pub fn connect(&self) {
        let app_state = self.app_state.clone();
        spawn(async move {
            if let Err(e) = app_state.coordinator.connect().await {
                report(e).await;
            }
        });
    }

    /// Picks up an already authorized account without prompting.
    pub fn check_connection(&self) {
        let app_state = self.app_state.clone();
        spawn(async move {
            if let Err(e) = app_state.coordinator.check_connection().await {
                info!("skipping startup account check: {}", e);
            }
        });
    }

    pub fn submit(&self) {
        let app_state = self.app_state.clone();
        spawn(async move {
            if let Err(e) = app_state.coordinator.submit().await {
                report(e).await;
            }
        });
    }

    pub fn set_field(&self, field: DraftField, value: String) {
        self.app_state.coordinator.update_draft_field(field, value);
    }

    pub fn dismiss_notification(&self) {
        self.app_state.coordinator.dismiss_notification();
    }

    pub fn clear_expired_notification(&self) {
        self.app_state.coordinator.clear_expired_notification();
    }
}

/// Errors already shown inline or as a notification are only logged here.
async fn report(error: CoordinatorError) {
    match error {
        CoordinatorError::WalletNotFound => compat::alert(error.to_string()).await,
        CoordinatorError::Busy => debug!("ignored: {}", error),
        other => debug!("operation failed: {}", other),
    }
}

pub fn use_coordinator() -> CoordinatorActions {
    CoordinatorActions {
        app_state: use_context::<AppState>(),
    }
}
