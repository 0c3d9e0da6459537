use dioxus::prelude::*;

use crate::app_state_mut::AppStateMut;
use crate::compat;
use crate::hooks::use_coordinator::use_coordinator;
use crate::AppState;

/// The transient notification in the top right corner.
///
/// Hides itself once the notification expires; a newer notification
/// replaces the current one and restarts the timer.
#[component]
pub fn Toast() -> Element {
    let app_state = use_context::<AppState>();
    let app_state_mut = use_context::<AppStateMut>();
    let actions = use_coordinator();

    let toast = use_memo(move || app_state_mut.coordinator.read().notification.clone());

    let timer_actions = actions.clone();
    use_effect(move || {
        if let Some(toast) = toast() {
            let remaining = toast.remaining(app_state.coordinator.now());
            let actions = timer_actions.clone();
            spawn(async move {
                compat::sleep(remaining).await;
                actions.clear_expired_notification();
            });
        }
    });

    let Some(toast) = toast() else {
        return rsx! {};
    };
    let notification = toast.notification;

    rsx! {
        aside {
            class: "toast toast-{notification.severity}",
            role: "status",
            span { "{notification.message}" }
            a {
                href: "#",
                "aria-label": "Dismiss",
                class: "toast-close",
                onclick: move |evt| {
                    evt.prevent_default();
                    actions.dismiss_notification();
                },
                "×"
            }
        }
    }
}
