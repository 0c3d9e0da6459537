use dioxus::prelude::*;

use crate::components::pico::Button;
use crate::components::pico::ButtonType;

/// Placeholder shown where a list has nothing to render yet. The retry
/// button only appears when `on_retry` is set.
#[component]
pub fn EmptyState(
    title: String,
    #[props(optional)] hint: Option<String>,
    #[props(default = "Refresh".to_string())]
    retry_label: String,
    #[props(optional)] on_retry: Option<EventHandler<()>>,
) -> Element {
    rsx! {
        article {
            class: "empty-state",
            h4 { "{title}" }
            if let Some(hint) = hint {
                p { "{hint}" }
            }
            if let Some(on_retry) = on_retry {
                Button {
                    button_type: ButtonType::Secondary,
                    outline: true,
                    on_click: move |_| on_retry.call(()),
                    "{retry_label}"
                }
            }
        }
    }
}
