//! Defines the mutable, reactive state for the application's UI.

use api::coordinator::CoordinatorState;
use api::transfer::Transfer;
use dioxus::prelude::*;

/// A reactive state provided as a Dioxus context for mutable UI data.
///
/// The coordinator owns the workflow state; `coordinator` is a read-only
/// mirror of its latest snapshot. Purely visual state lives here as well.
#[derive(Clone, Copy)]
pub struct AppStateMut {
    pub coordinator: Signal<CoordinatorState>,
    /// The transfer shown in the detail modal, if any.
    pub selected_transfer: Signal<Option<Transfer>>,
}
