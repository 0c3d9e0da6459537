//! Shared building blocks for the screens.
pub mod address;
pub mod empty_state;
pub mod notification;
pub mod pico;
pub mod transfer_card;
pub mod transfer_details;
