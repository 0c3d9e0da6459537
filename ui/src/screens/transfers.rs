use api::address::Address;
use api::eth_amount::EthAmount;
use api::transfer::Transfer;
use chrono::DateTime;
use dioxus::prelude::*;

use crate::app_state_mut::AppStateMut;
use crate::components::empty_state::EmptyState;
use crate::components::pico::Card;
use crate::components::pico::Grid;
use crate::components::transfer_card::TransferCard;
use crate::components::transfer_details::TransferDetails;
use crate::hooks::use_coordinator::use_coordinator;

/// (sender, receiver, amount, message, keyword, unix seconds)
const SAMPLES: [(&str, &str, &str, &str, &str, i64); 3] = [
    (
        "0xcf8e569a97c423952ddff902375c7c76549a6a90",
        "0x8aa395ab97837576af9cd6946c79024ef1acfdbe",
        "0.01",
        "Happy birthday!",
        "birthday",
        1_700_000_000,
    ),
    (
        "0x8aa395ab97837576af9cd6946c79024ef1acfdbe",
        "0xcf8e569a97c423952ddff902375c7c76549a6a90",
        "0.5",
        "Thanks for lunch",
        "pizza",
        1_700_086_400,
    ),
    (
        "0x5b38da6a701c568545dcfcb03fcb875f56beddc4",
        "0xab8483f64d9c6d1ecf9b849ae677dd3315835cb2",
        "1.25",
        "Rent, finally",
        "money",
        1_700_172_800,
    ),
];

/// What the grid looks like before a wallet is connected.
fn sample_transfers() -> Vec<Transfer> {
    SAMPLES
        .iter()
        .filter_map(|(sender, receiver, amount, message, keyword, secs)| {
            Some(Transfer {
                sender: sender.parse::<Address>().ok()?,
                receiver: receiver.parse::<Address>().ok()?,
                amount: amount.parse::<EthAmount>().ok()?,
                message: message.to_string(),
                keyword: keyword.to_string(),
                timestamp: DateTime::from_timestamp(*secs, 0)?,
            })
        })
        .collect()
}

#[component]
fn Stat(label: String, value: String) -> Element {
    rsx! {
        Card {
            small { "{label}" }
            h3 { style: "margin: 0;", "{value}" }
        }
    }
}

/// Transfer history, newest first.
#[allow(non_snake_case)]
#[component]
pub fn TransfersScreen() -> Element {
    let app_state_mut = use_context::<AppStateMut>();
    let actions = use_coordinator();

    let state = app_state_mut.coordinator.read().clone();
    let connected = state.is_connected();
    let transfers: Vec<Transfer> = if connected {
        state.newest_first().cloned().collect()
    } else {
        sample_transfers()
    };

    rsx! {
        TransferDetails {}
        if connected {
            h2 { "Latest Transactions" }
        } else {
            h2 { "Connect your account to see the latest transactions" }
        }

        if connected && !transfers.is_empty() {
            {
                let stats = state.stats();
                rsx! {
                    Grid {
                        Stat { label: "Total Transfers".to_string(), value: stats.count.to_string() }
                        Stat { label: "Total ETH".to_string(), value: stats.total.to_string_with_unit() }
                        Stat { label: "Unique Recipients".to_string(), value: stats.unique_recipients.to_string() }
                    }
                }
            }
        }

        if connected && transfers.is_empty() {
            EmptyState {
                title: "No transactions yet".to_string(),
                hint: "Transfers you record on the ledger will show up here.".to_string(),
                on_retry: move |_| actions.check_connection(),
            }
        } else {
            div {
                class: "transfer-grid",
                for transfer in transfers {
                    TransferCard { key: "{transfer.key()}", transfer }
                }
            }
        }
    }
}
