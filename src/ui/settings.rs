/// Settings popup: API key, sender name, cache reset

use crate::bridge::{self, BridgeRequest, BridgeResponse};
use crate::settings::Settings;
use crate::storage::ChromeStore;
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum PageState {
    Loading,
    Idle,
    Saving,
    Saved,
    CacheCleared,
    Error(String),
}

#[function_component(SettingsPage)]
pub fn settings_page() -> Html {
    let state = use_state(|| PageState::Loading);
    let api_key = use_state(String::new);
    let sender_name = use_state(String::new);

    // Load saved settings on mount
    {
        let state = state.clone();
        let api_key = api_key.clone();
        let sender_name = sender_name.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match Settings::load(&ChromeStore::sync()).await {
                    Ok(settings) => {
                        api_key.set(settings.voila_norbert_key);
                        sender_name.set(settings.sender_name);
                        state.set(PageState::Idle);
                    }
                    Err(e) => {
                        state.set(PageState::Error(format!("Failed to load settings: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    let on_api_key_input = {
        let api_key = api_key.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                api_key.set(input.value());
            }
        })
    };

    let on_sender_name_input = {
        let sender_name = sender_name.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                sender_name.set(input.value());
            }
        })
    };

    let on_save = {
        let state = state.clone();
        let api_key = api_key.clone();
        let sender_name = sender_name.clone();

        Callback::from(move |_| {
            let state = state.clone();
            let settings = Settings {
                voila_norbert_key: (*api_key).trim().to_string(),
                sender_name: (*sender_name).trim().to_string(),
            };

            state.set(PageState::Saving);

            spawn_local(async move {
                match settings.save(&ChromeStore::sync()).await {
                    Ok(_) => {
                        log::info!("Settings saved");
                        state.set(PageState::Saved);
                    }
                    Err(e) => {
                        state.set(PageState::Error(format!("Failed to save: {}", e)));
                    }
                }
            });
        })
    };

    let on_clear_cache = {
        let state = state.clone();

        Callback::from(move |_| {
            let state = state.clone();

            spawn_local(async move {
                match bridge::send(&BridgeRequest::ClearCache).await {
                    Ok(BridgeResponse::Error { error }) => {
                        state.set(PageState::Error(format!("Failed to clear cache: {}", error)));
                    }
                    Ok(_) => state.set(PageState::CacheCleared),
                    Err(e) => {
                        state.set(PageState::Error(format!("Failed to clear cache: {:?}", e)));
                    }
                }
            });
        })
    };

    let is_busy = matches!(*state, PageState::Loading | PageState::Saving);

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Email Founder Settings"}</h1>

            // Status display
            {match &*state {
                PageState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                PageState::Saved => html! {
                    <Alert r#type={AlertType::Success} title={"Settings saved!"} inline={true}>
                    </Alert>
                },
                PageState::CacheCleared => html! {
                    <Alert r#type={AlertType::Info} title={"Email cache cleared"} inline={true}>
                    </Alert>
                },
                PageState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                PageState::Idle | PageState::Saving => html! {}
            }}

            <div class="flex-column-gap">
                <label>{"Voila Norbert API key"}</label>
                <input
                    id="voilaNorbertKey"
                    type="password"
                    value={(*api_key).clone()}
                    oninput={on_api_key_input}
                    class="settings-input"
                />

                <label>{"Your name (signs the email)"}</label>
                <input
                    id="senderName"
                    type="text"
                    value={(*sender_name).clone()}
                    oninput={on_sender_name_input}
                    class="settings-input"
                />

                <Button onclick={on_save} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                    {"Save"}
                </Button>
                <Button onclick={on_clear_cache} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                    {"Clear email cache"}
                </Button>
            </div>
        </div>
    }
}
