use api::transfer::Transfer;
use dioxus::prelude::*;

use crate::app_state_mut::AppStateMut;
use crate::components::address::Address;
use crate::components::pico::Modal;
use crate::components::transfer_card::use_keyword_image;

/// Full details of the selected transfer, if one is selected.
#[component]
pub fn TransferDetails() -> Element {
    let mut app_state_mut = use_context::<AppStateMut>();
    let Some(transfer) = app_state_mut.selected_transfer.read().clone() else {
        return rsx! {};
    };

    rsx! {
        Modal {
            title: "Transfer".to_string(),
            on_close: move |_| app_state_mut.selected_transfer.set(None),
            TransferDetailsBody { key: "{transfer.sender}-{transfer.timestamp}", transfer }
        }
    }
}

#[component]
fn TransferDetailsBody(transfer: Transfer) -> Element {
    let image = use_keyword_image(transfer.keyword.clone());

    rsx! {
        if let Some(src) = &*image.read() {
            img { src: "{src}", alt: "{transfer.keyword}", style: "width: 100%;" }
        }
        table {
            tbody {
                tr { th { "From" } td { Address { address: transfer.sender, copyable: true } } }
                tr { th { "To" } td { Address { address: transfer.receiver, copyable: true } } }
                tr { th { "Amount" } td { "{transfer.amount.to_string_with_unit()}" } }
                tr { th { "Keyword" } td { "{transfer.keyword}" } }
                tr { th { "Message" } td { "{transfer.message}" } }
                tr { th { "Recorded" } td { "{transfer.display_timestamp()}" } }
            }
        }
    }
}
