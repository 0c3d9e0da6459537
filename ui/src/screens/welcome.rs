use api::coordinator::DraftField;
use api::coordinator::PROCESSING_MESSAGE;
use dioxus::prelude::*;
use strum::IntoEnumIterator;

use crate::app_state_mut::AppStateMut;
use crate::components::address::Address;
use crate::components::pico::Button;
use crate::components::pico::Card;
use crate::components::pico::Grid;
use crate::components::pico::Input;
use crate::components::pico::Loader;
use crate::hooks::use_coordinator::use_coordinator;
use crate::AppState;

fn label(field: DraftField) -> &'static str {
    match field {
        DraftField::Receiver => "Address To",
        DraftField::Amount => "Amount (ETH)",
        DraftField::Keyword => "Keyword (Gif)",
        DraftField::Message => "Enter Message",
    }
}

/// Amounts are free text; the coordinator validates them, so the browser
/// must not reject precise values against a `step`.
fn input_mode(field: DraftField) -> Option<&'static str> {
    match field {
        DraftField::Amount => Some("decimal"),
        _ => None,
    }
}

fn placeholder(field: DraftField) -> &'static str {
    match field {
        DraftField::Receiver => "0x...",
        DraftField::Amount => "0.01",
        DraftField::Keyword => "celebrate",
        DraftField::Message => "Thanks for lunch!",
    }
}

/// Connect button, current account and the send form.
#[allow(non_snake_case)]
#[component]
pub fn WelcomeScreen() -> Element {
    let app_state = use_context::<AppState>();
    let app_state_mut = use_context::<AppStateMut>();
    let actions = use_coordinator();

    let state = app_state_mut.coordinator.read().clone();
    let busy = state.is_loading;

    let connect_actions = actions.clone();
    let submit_actions = actions.clone();

    rsx! {
        Grid {
            Card {
                h2 { "Send crypto across the world" }
                p { "Explore the crypto world. Buy and sell cryptocurrencies easily." }
                match state.current_account {
                    Some(account) => rsx! {
                        p {
                            "Connected as "
                            Address { address: account, copyable: true }
                        }
                    },
                    None => rsx! {
                        Button {
                            on_click: move |_| connect_actions.connect(),
                            "Connect Wallet"
                        }
                    },
                }
                if let Some(tx_hash) = &state.last_tx_hash {
                    p {
                        small {
                            "Last transaction: "
                            a {
                                href: "{app_state.config.explorer_tx_url(tx_hash)}",
                                target: "_blank",
                                rel: "noreferrer",
                                code { "{tx_hash}" }
                            }
                        }
                    }
                }
                if state.transfer_count > 0 {
                    p {
                        small { "{state.transfer_count} transfers recorded on the ledger" }
                    }
                }
            }
            Card {
                form {
                    novalidate: true,
                    onsubmit: move |evt| {
                        evt.prevent_default();
                        submit_actions.submit();
                    },
                    for (field, name) in DraftField::iter().map(|f| (f, <&'static str>::from(f))) {
                        Input {
                            key: "{name}",
                            label: label(field).to_string(),
                            name: name.to_string(),
                            value: state.draft.get(field).to_string(),
                            input_mode: input_mode(field).map(str::to_string),
                            placeholder: placeholder(field).to_string(),
                            disabled: busy,
                            on_input: {
                                let actions = actions.clone();
                                move |value: String| actions.set_field(field, value)
                            },
                        }
                    }
                    if let Some(error) = &state.inline_error {
                        p {
                            role: "alert",
                            class: "inline-error",
                            "{error}"
                        }
                    }
                    if busy {
                        Loader { label: PROCESSING_MESSAGE.to_string() }
                    } else {
                        Button { "Send now" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use api::eth_amount::EthAmount;

    use super::*;

    #[test]
    fn test_amount_field_accepts_any_precision() {
        assert_eq!(input_mode(DraftField::Amount), Some("decimal"));
        assert_eq!(input_mode(DraftField::Receiver), None);

        // finer than a 0.0001 step, still a valid amount
        let amount: EthAmount = "0.00005".parse().unwrap();
        assert_eq!(amount.to_string(), "0.00005");
    }
}
