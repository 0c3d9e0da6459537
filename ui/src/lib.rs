// The client-side Dioxus application logic.

use dioxus::prelude::*;

mod app_state;
mod app_state_mut;
pub mod compat;
mod components;
pub mod hooks;
mod screens;

use app_state::AppState;
use app_state_mut::AppStateMut;
use components::address::Address;
use components::notification::Toast;
use components::pico::Button;
use components::pico::ButtonType;
use components::pico::Card;
use components::pico::Container;
use hooks::use_coordinator::use_coordinator;
use hooks::use_coordinator::use_coordinator_state;
use screens::transfers::TransfersScreen;
use screens::welcome::WelcomeScreen;

const PICO_CSS: &str = "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.cyan.min.css";

/// Enum to represent the different screens in our application.
#[derive(Clone, Copy, PartialEq, Default)]
enum Screen {
    #[default]
    Send,
    Transfers,
}

impl Screen {
    /// Helper to get the display name for each screen.
    fn name(&self) -> &'static str {
        match self {
            Screen::Send => "Send",
            Screen::Transfers => "Transactions",
        }
    }
}

/// A list of all available screens for easy iteration.
const ALL_SCREENS: [Screen; 2] = [Screen::Send, Screen::Transfers];

/// The desktop navigation tabs component.
#[component]
fn Tabs(active_screen: Signal<Screen>) -> Element {
    rsx! {
        nav {
            class: "tab-menu",
            ul {
                for screen in ALL_SCREENS {
                    li {
                        a {
                            href: "#",
                            class: if active_screen() == screen { "active-tab" } else { "" },
                            "aria-current": if active_screen() == screen { "page" } else { "false" },
                            onclick: move |event| {
                                event.prevent_default();
                                active_screen.set(screen);
                            },
                            "{screen.name()}"
                        }
                    }
                }
            }
        }
    }
}

/// The mobile "hamburger" dropdown menu component.
#[component]
fn HamburgerMenu(active_screen: Signal<Screen>) -> Element {
    let mut is_open = use_signal(|| false);

    rsx! {
        div {
            class: "hamburger-menu-container",
            Button {
                button_type: ButtonType::Secondary,
                outline: true,
                on_click: move |_| is_open.toggle(),
                "≡"
            }
            if is_open() {
                div {
                    class: "menu-backdrop",
                    onclick: move |_| is_open.set(false),
                }
                article {
                    class: "custom-dropdown-menu",
                    for screen in ALL_SCREENS {
                        a {
                            class: if active_screen() == screen { "custom-dropdown-item active-tab" } else { "custom-dropdown-item" },
                            href: "#",
                            onclick: move |event| {
                                event.prevent_default();
                                active_screen.set(screen);
                                is_open.set(false);
                            },
                            "{screen.name()}"
                        }
                    }
                }
            }
        }
    }
}

//=============================================================================
// MAIN APPLICATION COMPONENT (Client-side)
//=============================================================================

#[allow(non_snake_case)]
pub fn App() -> Element {
    let responsive_css = r#"
    * { box-sizing: border-box; }

    header nav { align-items: center; }

    /* --- NAVIGATION TABS --- */
    .tab-menu a.active-tab {
        color: var(--pico-primary) !important;
        border-bottom: 3px solid var(--pico-primary);
    }
    .tab-menu a:not(.active-tab) {
        color: var(--pico-muted-color);
        border-bottom: 3px solid transparent;
    }

    /* --- MOBILE MENU --- */
    .hamburger-menu-container { display: none; position: relative; }
    .menu-backdrop { position: fixed; inset: 0; z-index: 10; }
    .custom-dropdown-menu {
        position: absolute; right: 0; z-index: 11;
        min-width: 12rem; padding: 0.5rem 0;
    }
    .custom-dropdown-item { display: block; padding: 0.5rem 1rem; }
    .custom-dropdown-item.active-tab {
        color: var(--pico-primary);
        font-weight: bold;
        border-left: 4px solid var(--pico-primary);
        padding-left: calc(1rem - 4px);
    }
    @media (max-width: 768px) {
        .tab-menu { display: none; }
        .hamburger-menu-container { display: block; }
    }

    /* --- TRANSFERS --- */
    .transfer-grid {
        display: grid;
        grid-template-columns: repeat(auto-fill, minmax(18rem, 1fr));
        gap: 1rem;
    }
    .transfer-card { cursor: pointer; margin: 0; }
    .transfer-card img, .transfer-card .image-placeholder {
        width: 100%; height: 10rem; object-fit: cover;
        border-radius: var(--pico-border-radius);
    }
    .transfer-card dl { display: grid; grid-template-columns: auto 1fr; gap: 0.25rem 1rem; }
    .transfer-card dd { margin: 0; overflow-wrap: anywhere; }
    .address { display: inline-flex; gap: 0.5rem; align-items: center; }
    .inline-error { color: var(--pico-del-color); }
    .empty-state {
        text-align: center;
        color: var(--pico-muted-color);
        border: 2px dashed var(--pico-card-border-color);
        box-shadow: none;
    }
    .empty-state p { max-width: 25rem; margin: 0 auto 1.5rem; }

    /* --- TOAST --- */
    .toast {
        position: fixed; top: 1rem; right: 1rem; z-index: 20;
        display: flex; gap: 1rem; align-items: center;
        padding: 0.75rem 1rem;
        border-radius: var(--pico-border-radius);
        background: var(--pico-card-background-color);
        box-shadow: var(--pico-card-box-shadow);
        border-left: 4px solid var(--pico-muted-border-color);
    }
    .toast-info { border-left-color: var(--pico-primary); }
    .toast-success { border-left-color: var(--pico-ins-color); }
    .toast-error { border-left-color: var(--pico-del-color); }
    .toast-close { text-decoration: none; }
"#;

    rsx! {
        document::Meta {
            name: "viewport",
            content: "width=device-width, initial-scale=1.0",
        }
        document::Stylesheet {
            href: "{PICO_CSS}",
        }
        style {
            "{responsive_css}"
        }
        AppBody {}
    }
}

#[component]
fn AppBody() -> Element {
    // configuration is read once; a bad value stops the app before any wallet call
    let app_state = use_hook(|| AppState::from_env().map_err(|e| e.to_string()));

    match app_state {
        Ok(app_state) => rsx! {
            LoadedApp { app_state }
        },
        Err(e) => rsx! {
            Container {
                Card {
                    h3 { "Configuration error" }
                    p { "{e}" }
                }
            }
        },
    }
}

/// This component holds the main app logic and only runs once configuration is loaded.
#[component]
fn LoadedApp(app_state: AppState) -> Element {
    // Provide the stable, non-reactive AppState.
    use_context_provider(|| app_state.clone());

    let coordinator_signal = use_coordinator_state(app_state.clone());
    let selected_transfer_signal = use_signal(|| None);

    // Provide the mutable state by passing the already created signals.
    use_context_provider(|| AppStateMut {
        coordinator: coordinator_signal,
        selected_transfer: selected_transfer_signal,
    });

    // picks up an account the wallet already authorized, without prompting
    let actions = use_coordinator();
    use_hook(move || actions.check_connection());

    let active_screen = use_signal(Screen::default);
    use_context_provider(|| active_screen);

    let current_account = coordinator_signal.read().current_account;

    rsx! {
        Toast {}
        Container {
            header {
                nav {
                    ul {
                        li {
                            strong { "Keyword Transfers" }
                        }
                    }
                    ul {
                        li {
                            Tabs { active_screen }
                        }
                        if let Some(account) = current_account {
                            li {
                                Address { address: account }
                            }
                        }
                        li {
                            HamburgerMenu { active_screen }
                        }
                    }
                }
            }
            div {
                class: "content",
                match active_screen() {
                    Screen::Send => rsx! {
                        WelcomeScreen {}
                    },
                    Screen::Transfers => rsx! {
                        TransfersScreen {}
                    },
                }
            }
        }
    }
}
