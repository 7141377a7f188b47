/// In-page preview: message routing, story resolution and the modal state machine

use crate::api::{ApiError, CmsApi};
use crate::config::Config;
use crate::links::visual_editor_url;
use crate::story::{Device, Story, Version};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use thiserror::Error;

pub const OPEN_PREVIEW_ACTION: &str = "openPreview";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreviewError {
    #[error("Invalid preview request: {0}")]
    InvalidRequest(String),
    #[error("Story \"{slug}\" not found. Check if the story exists and slug is correct.")]
    StoryNotFound { slug: String },
    #[error("{0}")]
    Api(ApiError),
    #[error("Could not display preview: {0}")]
    Surface(String),
}

/// Payload of an `openPreview` message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub access_token: String,
    pub space_id: String,
    pub story_slug: String,
    pub device: Device,
}

impl PreviewRequest {
    pub fn validate(&self) -> Result<(), PreviewError> {
        let missing: Vec<&str> = [
            ("accessToken", &self.access_token),
            ("spaceId", &self.space_id),
            ("storySlug", &self.story_slug),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PreviewError::InvalidRequest(format!("missing {}", missing.join(", "))))
        }
    }
}

/// Message sent from the popup to the content script
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewMessage<'a> {
    pub action: &'static str,
    #[serde(flatten)]
    pub request: &'a PreviewRequest,
}

impl<'a> PreviewMessage<'a> {
    pub fn open(request: &'a PreviewRequest) -> Self {
        PreviewMessage {
            action: OPEN_PREVIEW_ACTION,
            request,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub success: bool,
    pub message: String,
}

impl PreviewResponse {
    pub fn opened() -> Self {
        PreviewResponse {
            success: true,
            message: "Preview modal opened".to_string(),
        }
    }

    pub fn unknown_action() -> Self {
        PreviewResponse {
            success: false,
            message: "Unknown action".to_string(),
        }
    }

    pub fn rejected(error: &PreviewError) -> Self {
        PreviewResponse {
            success: false,
            message: error.to_string(),
        }
    }
}

/// Pick the preview request out of an incoming runtime message.
/// Anything that is not an `openPreview` message gets a response right away.
pub fn route_message(message: serde_json::Value) -> Result<PreviewRequest, PreviewResponse> {
    let action = message.get("action").and_then(|a| a.as_str()).unwrap_or_default();
    if action != OPEN_PREVIEW_ACTION {
        log::info!("Ignoring message with unknown action {:?}", action);
        return Err(PreviewResponse::unknown_action());
    }

    let request: PreviewRequest = serde_json::from_value(message)
        .map_err(|e| PreviewResponse::rejected(&PreviewError::InvalidRequest(e.to_string())))?;
    request
        .validate()
        .map_err(|e| PreviewResponse::rejected(&e))?;

    Ok(request)
}

/// Fetch the draft version of a story, falling back to the published one
/// when the draft request is answered with a non-success status.
pub async fn resolve_story<A: CmsApi>(api: &A, token: &str, slug: &str) -> Result<Story, PreviewError> {
    match api.fetch_story(token, slug, Version::Draft).await {
        Ok(story) => return Ok(story),
        Err(e) if e.is_status() => {
            log::info!("Draft of {} not available ({}), trying published", slug, e);
        }
        Err(e) => return Err(PreviewError::Api(e)),
    }

    match api.fetch_story(token, slug, Version::Published).await {
        Ok(story) => Ok(story),
        Err(e) if e.is_status() => {
            log::error!("Story fetch failed for {}: {}", slug, e);
            Err(PreviewError::StoryNotFound {
                slug: slug.to_string(),
            })
        }
        Err(e) => Err(PreviewError::Api(e)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Everything the surface needs to draw the modal
#[derive(Debug, Clone, PartialEq)]
pub struct ModalView {
    pub title: String,
    pub device: Device,
    pub embed_url: String,
    pub embed_delay_ms: u32,
}

/// User interaction coming back from a displayed modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    Close,
    SwitchDevice(Device),
}

/// Where the modal and notifications are drawn
pub trait PreviewSurface {
    fn mount(&mut self, view: &ModalView) -> Result<(), PreviewError>;

    /// Swap layout class and label of the mounted modal
    fn set_device(&mut self, device: Device);

    /// Remove the mounted modal, if any
    fn unmount(&mut self);

    fn notify(&mut self, message: &str, kind: NotificationKind);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewState {
    Idle,
    Loading { slug: String },
    Displayed { story_id: u64, device: Device },
}

/// Owns the single preview modal of a page
pub struct PreviewBridge<S: PreviewSurface> {
    surface: S,
    state: PreviewState,
    config: Config,
}

impl<S: PreviewSurface> PreviewBridge<S> {
    pub fn new(surface: S, config: Config) -> Self {
        PreviewBridge {
            surface,
            state: PreviewState::Idle,
            config,
        }
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Tear down any displayed modal and start loading
    pub fn begin(&mut self, request: &PreviewRequest) {
        self.surface.unmount();
        self.state = PreviewState::Loading {
            slug: request.story_slug.clone(),
        };
    }

    /// Show the resolved story, or report the failure and go back to idle
    pub fn complete(&mut self, request: &PreviewRequest, result: Result<Story, PreviewError>) {
        let story = match result {
            Ok(story) => story,
            Err(e) => return self.fail(e),
        };

        // Requests are not cancelled, so a slower one may finish after a newer
        // modal is up; only one stays.
        self.surface.unmount();

        let view = ModalView {
            title: format!("📖 {}", story.display_name()),
            device: request.device,
            embed_url: visual_editor_url(
                &self.config,
                &request.space_id,
                story.id,
                &request.access_token,
            ),
            embed_delay_ms: self.config.embed_delay_ms,
        };

        match self.surface.mount(&view) {
            Ok(()) => {
                log::info!("Preview displayed for story {} ({})", story.id, request.device);
                self.state = PreviewState::Displayed {
                    story_id: story.id,
                    device: request.device,
                };
            }
            Err(e) => {
                self.surface.unmount();
                self.state = PreviewState::Idle;
                self.fail(e);
            }
        }
    }

    fn fail(&mut self, error: PreviewError) {
        log::error!("Preview error: {}", error);
        self.surface
            .notify(&format!("Error: {}", error), NotificationKind::Error);
        if !matches!(self.state, PreviewState::Displayed { .. }) {
            self.state = PreviewState::Idle;
        }
    }

    pub fn handle_event(&mut self, event: ModalEvent) {
        match event {
            ModalEvent::Close => self.close(),
            ModalEvent::SwitchDevice(device) => self.switch_device(device),
        }
    }

    pub fn switch_device(&mut self, device: Device) {
        if let PreviewState::Displayed { device: current, .. } = &mut self.state {
            *current = device;
            self.surface.set_device(device);
        }
    }

    pub fn close(&mut self) {
        if matches!(self.state, PreviewState::Displayed { .. }) {
            log::debug!("Closing preview modal");
        }
        self.surface.unmount();
        self.state = PreviewState::Idle;
    }
}

/// Full open-preview flow. The bridge is only borrowed between awaits, so
/// modal events can be handled while the story is being fetched.
pub async fn open_preview<A: CmsApi, S: PreviewSurface>(
    bridge: &RefCell<PreviewBridge<S>>,
    api: &A,
    request: PreviewRequest,
) {
    log::info!(
        "Opening preview for {} on {} (token length {})",
        request.story_slug,
        request.device,
        request.access_token.len()
    );

    bridge.borrow_mut().begin(&request);
    let result = resolve_story(api, &request.access_token, &request.story_slug).await;
    bridge.borrow_mut().complete(&request, result);
}
