/// Popup UI for the Storyblok quick manager

use crate::api::HttpApi;
use crate::browser::{ChromeBrowser, SyncStorage};
use crate::config::Config;
use crate::session::{ListState, Session, SessionAction, SessionManager, View};
use crate::story::{Device, StoryFilter};
use crate::ui::components::{LoadingStories, StatusBar, StoryItem, StoryListMessage};
use gloo_timers::callback::Timeout;
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

type PopupManager = SessionManager<HttpApi, SyncStorage, ChromeBrowser>;

fn new_manager() -> PopupManager {
    let config = Config::default();
    SessionManager::new(HttpApi::new(config.clone()), SyncStorage, ChromeBrowser, config)
}

/// Feeds workflow actions into the session reducer
fn dispatch_fn(session: &UseReducerHandle<Session>) -> impl Fn(SessionAction) + 'static {
    let dispatcher = session.dispatcher();
    move |action| dispatcher.dispatch(action)
}

#[function_component(App)]
pub fn app() -> Html {
    let session = use_reducer(Session::default);
    let manager = use_memo((), |_| new_manager());
    let token_input = use_state(String::new);
    let space_input = use_state(String::new);
    let preview_device = use_state(|| Device::Desktop);

    // Restore stored credentials on mount
    {
        let manager = manager.clone();
        let dispatch = dispatch_fn(&session);
        use_effect_with((), move |_| {
            spawn_local(async move {
                manager.restore(&dispatch).await;
            });
            || ()
        });
    }

    // Auto-hide the status bar; a newer message restarts the timer
    {
        let status_id = session.status.as_ref().map(|status| status.id);
        let dispatch = dispatch_fn(&session);
        let delay_ms = manager.config().status_dismiss_ms;
        use_effect_with(status_id, move |id| {
            let timeout = id.map(|id| {
                Timeout::new(delay_ms, move || dispatch(SessionAction::ClearStatus(id)))
            });
            move || drop(timeout)
        });
    }

    // Coming back to the form: prefill the space, never the token
    {
        let token_input = token_input.clone();
        let space_input = space_input.clone();
        use_effect_with(
            (session.view, session.prefill_space.clone()),
            move |(view, prefill)| {
                if *view == View::Setup {
                    token_input.set(String::new());
                    if !prefill.is_empty() {
                        space_input.set(prefill.clone());
                    }
                }
                || ()
            },
        );
    }

    let on_token_input = {
        let token_input = token_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                token_input.set(input.value());
            }
        })
    };

    let on_space_input = {
        let space_input = space_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                space_input.set(input.value());
            }
        })
    };

    let on_connect = {
        let manager = manager.clone();
        let session = session.clone();
        let token_input = token_input.clone();
        let space_input = space_input.clone();

        Callback::from(move |_: ()| {
            let manager = manager.clone();
            let dispatch = dispatch_fn(&session);
            let token = (*token_input).clone();
            let space = (*space_input).clone();

            spawn_local(async move {
                let _ = manager.connect(&token, &space, &dispatch).await;
            });
        })
    };

    let on_enter = {
        let on_connect = on_connect.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                on_connect.emit(());
            }
        })
    };

    let on_refresh = {
        let manager = manager.clone();
        let session = session.clone();

        Callback::from(move |_: MouseEvent| {
            let Some(credentials) = session.credentials.clone() else {
                return;
            };
            let manager = manager.clone();
            let dispatch = dispatch_fn(&session);

            spawn_local(async move {
                manager.refresh(&credentials, &dispatch).await;
            });
        })
    };

    let on_new_story = {
        let manager = manager.clone();
        let session = session.clone();

        Callback::from(move |_: MouseEvent| {
            let Some(credentials) = session.credentials.clone() else {
                return;
            };
            let manager = manager.clone();
            let dispatch = dispatch_fn(&session);

            spawn_local(async move {
                manager.create_new_story(&credentials, &dispatch).await;
            });
        })
    };

    let on_open_space = {
        let manager = manager.clone();
        let session = session.clone();

        Callback::from(move |_: MouseEvent| {
            let Some(credentials) = session.credentials.clone() else {
                return;
            };
            let manager = manager.clone();
            let dispatch = dispatch_fn(&session);

            spawn_local(async move {
                manager.open_space(&credentials, &dispatch).await;
            });
        })
    };

    let on_filter = {
        let session = session.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                match select.value().parse::<StoryFilter>() {
                    Ok(filter) => session.dispatch(SessionAction::Filter(filter)),
                    Err(e) => log::warn!("{}", e),
                }
            }
        })
    };

    let on_device = {
        let preview_device = preview_device.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                if let Ok(device) = select.value().parse::<Device>() {
                    preview_device.set(device);
                }
            }
        })
    };

    let on_edit = {
        let manager = manager.clone();
        let session = session.clone();

        Callback::from(move |story_id: u64| {
            let Some(credentials) = session.credentials.clone() else {
                return;
            };
            let manager = manager.clone();
            let dispatch = dispatch_fn(&session);

            spawn_local(async move {
                manager.edit_story(&credentials, story_id, &dispatch).await;
            });
        })
    };

    let on_preview = {
        let manager = manager.clone();
        let session = session.clone();

        Callback::from(move |full_slug: String| {
            let manager = manager.clone();
            let dispatch = dispatch_fn(&session);

            spawn_local(async move {
                manager.preview_story(&full_slug, &dispatch).await;
            });
        })
    };

    let on_copy = {
        let manager = manager.clone();
        let session = session.clone();

        Callback::from(move |full_slug: String| {
            let manager = manager.clone();
            let dispatch = dispatch_fn(&session);

            spawn_local(async move {
                manager.copy_story_url(&full_slug, &dispatch).await;
            });
        })
    };

    let on_preview_in_page = {
        let manager = manager.clone();
        let session = session.clone();
        let preview_device = preview_device.clone();

        Callback::from(move |full_slug: String| {
            let Some(credentials) = session.credentials.clone() else {
                return;
            };
            let manager = manager.clone();
            let dispatch = dispatch_fn(&session);
            let device = *preview_device;

            spawn_local(async move {
                manager
                    .preview_in_page(&credentials, &full_slug, device, &dispatch)
                    .await;
            });
        })
    };

    let on_settings = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| session.dispatch(SessionAction::ShowSettings))
    };

    let on_disconnect = {
        let manager = manager.clone();
        let session = session.clone();

        Callback::from(move |_: MouseEvent| {
            let manager = manager.clone();
            let dispatch = dispatch_fn(&session);

            spawn_local(async move {
                manager.disconnect(&dispatch).await;
            });
        })
    };

    let story_list = match &session.list {
        ListState::Loading => html! { <LoadingStories /> },
        ListState::Empty => html! {
            <StoryListMessage
                icon="📝"
                title="No stories found"
                message="Create your first story in Storyblok to get started!"
            />
        },
        ListState::Error(message) => html! {
            <StoryListMessage icon="❌" title="Error Loading Stories" message={message.clone()}>
                <Button onclick={on_refresh.clone()} variant={ButtonVariant::Secondary}>
                    {"Try Again"}
                </Button>
            </StoryListMessage>
        },
        ListState::Loaded => {
            let visible = session.visible_stories();
            if visible.is_empty() {
                html! {
                    <StoryListMessage
                        icon="🔍"
                        title="No matching stories"
                        message="No loaded story matches this filter."
                    />
                }
            } else {
                html! {
                    <div class="stories-list">
                        {for visible.into_iter().map(|story| html! {
                            <StoryItem
                                key={story.id.to_string()}
                                story={story.clone()}
                                on_edit={on_edit.clone()}
                                on_preview={on_preview.clone()}
                                on_copy={on_copy.clone()}
                                on_preview_in_page={on_preview_in_page.clone()}
                            />
                        })}
                    </div>
                }
            }
        }
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Storyblok Quick Manager"}</h1>

            <StatusBar status={session.status.clone()} />

            if session.view == View::Setup {
                <div class="setup-section flex-column-gap">
                    <label>{"Preview access token"}</label>
                    <input
                        id="access-token"
                        type="password"
                        class="text-input"
                        placeholder="Your preview token"
                        value={(*token_input).clone()}
                        oninput={on_token_input}
                        onkeypress={on_enter.clone()}
                    />
                    <label>{"Space ID"}</label>
                    <input
                        id="space-id"
                        type="text"
                        class="text-input"
                        placeholder="e.g. 123456"
                        value={(*space_input).clone()}
                        oninput={on_space_input}
                        onkeypress={on_enter}
                    />
                    <Button onclick={on_connect.reform(|_: MouseEvent| ())} variant={ButtonVariant::Primary} block={true}>
                        {"Connect"}
                    </Button>
                </div>
            } else {
                <div class="content-section">
                    <div class="space-header">
                        <span class="space-name">{session.space_label.clone()}</span>
                        <span class="story-count">{session.stories.len()}</span>
                    </div>

                    <div class="toolbar">
                        <Button onclick={on_refresh} variant={ButtonVariant::Secondary}>{"🔄 Refresh"}</Button>
                        <Button onclick={on_new_story} variant={ButtonVariant::Secondary}>{"➕ New Story"}</Button>
                        <Button onclick={on_open_space} variant={ButtonVariant::Secondary}>{"🚀 Open Space"}</Button>
                    </div>

                    <div class="toolbar">
                        <select class="filter-select" onchange={on_filter}>
                            <option value={StoryFilter::All.as_str()} selected={session.filter == StoryFilter::All}>{"All stories"}</option>
                            <option value={StoryFilter::Published.as_str()} selected={session.filter == StoryFilter::Published}>{"Published"}</option>
                            <option value={StoryFilter::Draft.as_str()} selected={session.filter == StoryFilter::Draft}>{"Drafts"}</option>
                        </select>
                        <select class="device-select" onchange={on_device} title="In-page preview size">
                            {for Device::ALL.iter().map(|device| html! {
                                <option value={device.as_str()} selected={*device == *preview_device}>
                                    {format!("{} {}", device.icon(), device.label())}
                                </option>
                            })}
                        </select>
                    </div>

                    <div class="stories-container">
                        {story_list}
                    </div>

                    <div class="bottom-actions">
                        <Button onclick={on_settings} variant={ButtonVariant::Link}>{"⚙️ Settings"}</Button>
                        <Button onclick={on_disconnect} variant={ButtonVariant::Link}>{"🔌 Disconnect"}</Button>
                    </div>
                </div>
            }

            <p class="footer-popup">
                {"Storyblok Quick Manager v0.1.0"}
            </p>
        </div>
    }
}
