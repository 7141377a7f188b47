/// Reusable UI components

use crate::session::{StatusKind, StatusMessage};
use crate::story::Story;
use patternfly_yew::prelude::*;
use wasm_bindgen::JsValue;
use yew::prelude::*;

/// Date part of an API timestamp in the browser's locale
fn format_updated(timestamp: &str) -> String {
    let date = js_sys::Date::new(&JsValue::from_str(timestamp));
    if date.get_time().is_nan() {
        return timestamp.split('T').next().unwrap_or(timestamp).to_string();
    }
    String::from(date.to_locale_date_string("default", &JsValue::UNDEFINED))
}

#[derive(Properties, PartialEq)]
pub struct StoryItemProps {
    pub story: Story,
    pub on_edit: Callback<u64>,
    pub on_preview: Callback<String>,
    pub on_copy: Callback<String>,
    pub on_preview_in_page: Callback<String>,
}

#[function_component(StoryItem)]
pub fn story_item(props: &StoryItemProps) -> Html {
    let story = &props.story;
    let status_class = if story.is_published() { "story-status published" } else { "story-status draft" };

    let on_edit = {
        let id = story.id;
        props.on_edit.reform(move |_: MouseEvent| id)
    };
    let full_slug_action = |callback: &Callback<String>| {
        let full_slug = story.full_slug.clone();
        callback.reform(move |_: MouseEvent| full_slug.clone())
    };
    // The content API looks stories up by full slug too
    let on_preview = full_slug_action(&props.on_preview);
    let on_copy = full_slug_action(&props.on_copy);
    let on_preview_in_page = full_slug_action(&props.on_preview_in_page);

    html! {
        <div class="story-item">
            <div class="story-info">
                <div class="story-title" title={story.display_name().to_string()}>
                    {story.display_name()}
                </div>
                <div class="story-meta">
                    <span class={status_class}>{story.status_label()}</span>
                    <span>{"•"}</span>
                    <span>{format!("Updated {}", format_updated(&story.updated_at))}</span>
                </div>
            </div>
            <div class="story-actions">
                <button class="story-action-btn" onclick={on_edit} title="Edit Story">{"✏️"}</button>
                <button class="story-action-btn" onclick={on_preview} title="Preview Story">{"👁️"}</button>
                <button class="story-action-btn" onclick={on_copy} title="Copy URL">{"🔗"}</button>
                <button class="story-action-btn" onclick={on_preview_in_page} title="Preview on this page">{"🪟"}</button>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusBarProps {
    pub status: Option<StatusMessage>,
}

#[function_component(StatusBar)]
pub fn status_bar(props: &StatusBarProps) -> Html {
    match &props.status {
        Some(status) => {
            let alert_type = match status.kind {
                StatusKind::Success => AlertType::Success,
                StatusKind::Error => AlertType::Danger,
            };
            html! {
                <div class="status-bar">
                    <Alert r#type={alert_type} title={status.text.clone()} inline={true}>
                    </Alert>
                </div>
            }
        }
        None => html! {},
    }
}

#[derive(Properties, PartialEq)]
pub struct StoryListMessageProps {
    pub icon: AttrValue,
    pub title: AttrValue,
    pub message: AttrValue,
    #[prop_or_default]
    pub children: Children,
}

#[function_component(StoryListMessage)]
pub fn story_list_message(props: &StoryListMessageProps) -> Html {
    html! {
        <div class="empty-state">
            <div class="empty-state-icon">{props.icon.clone()}</div>
            <p><strong>{props.title.clone()}</strong></p>
            <p>{props.message.clone()}</p>
            {props.children.clone()}
        </div>
    }
}

#[function_component(LoadingStories)]
pub fn loading_stories() -> Html {
    html! {
        <div class="loading-state">
            <Spinner />
            <p class="loading-text">{"Loading your stories..."}</p>
        </div>
    }
}
