use api::transfer::Transfer;
use dioxus::prelude::*;

use crate::app_state_mut::AppStateMut;
use crate::components::address::Address;
use crate::AppState;

const PLACEHOLDER_IMAGE: Asset = asset!("/assets/transfer-placeholder.svg");

/// The image shown for `keyword`, or the placeholder when none is found.
pub fn use_keyword_image(keyword: String) -> Resource<String> {
    let app_state = use_context::<AppState>();
    use_resource(use_reactive!(|keyword| {
        let app_state = app_state.clone();
        async move {
            let fallback = PLACEHOLDER_IMAGE.to_string();
            match &app_state.gifs {
                Some(gifs) => gifs.lookup(&keyword, &fallback).await,
                None => fallback,
            }
        }
    }))
}

/// One transfer in the history grid. Clicking it opens the details modal.
#[component]
pub fn TransferCard(transfer: Transfer) -> Element {
    let mut app_state_mut = use_context::<AppStateMut>();
    let image = use_keyword_image(transfer.keyword.clone());
    let selected = transfer.clone();

    rsx! {
        article {
            class: "transfer-card",
            onclick: move |_| app_state_mut.selected_transfer.set(Some(selected.clone())),
            match &*image.read() {
                Some(src) => rsx! {
                    img { src: "{src}", alt: "{transfer.keyword}", loading: "lazy" }
                },
                None => rsx! {
                    div { class: "image-placeholder", "aria-busy": "true" }
                },
            }
            dl {
                dt { "From" }
                dd { Address { address: transfer.sender } }
                dt { "To" }
                dd { Address { address: transfer.receiver } }
                dt { "Amount" }
                dd { "{transfer.amount.to_string_with_unit()}" }
                if !transfer.message.is_empty() {
                    dt { "Message" }
                    dd { "{transfer.message}" }
                }
            }
            footer {
                small { "{transfer.display_timestamp()}" }
            }
        }
    }
}
