use api::address::Address as AccountAddress;
use dioxus::prelude::*;

use crate::components::pico::CopyButton;
use crate::AppState;

#[derive(Props, PartialEq, Clone)]
pub struct AddressProps {
    pub address: AccountAddress,
    /// Shows a copy button next to the abbreviated address.
    #[props(default = false)]
    pub copyable: bool,
}

/// An abbreviated account address linking to the block explorer.
#[component]
pub fn Address(props: AddressProps) -> Element {
    let app_state = use_context::<AppState>();
    let href = app_state.config.explorer_address_url(&props.address);
    let full = props.address.to_string();

    rsx! {
        span {
            class: "address",
            a {
                href: "{href}",
                target: "_blank",
                rel: "noreferrer",
                title: "{full}",
                code { "{props.address.shortened()}" }
            }
            if props.copyable {
                CopyButton { text_to_copy: full.clone() }
            }
        }
    }
}
