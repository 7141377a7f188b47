/// Content script: draws the preview modal into the host page

use crate::api::HttpApi;
use crate::config::Config;
use crate::preview::{
    ModalEvent, ModalView, NotificationKind, PreviewBridge, PreviewError, PreviewResponse,
    PreviewSurface, open_preview, route_message,
};
use crate::story::Device;
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, EventTarget, HtmlIFrameElement, KeyboardEvent};

// Import JS bridge functions
#[wasm_bindgen(module = "/content.js")]
extern "C" {
    fn addMessageListener(handler: &Closure<dyn FnMut(JsValue) -> JsValue>);
}

const MODAL_ID: &str = "storyblok-preview-modal";
const STYLE_ID: &str = "storyblok-preview-styles";
const NOTIFICATION_CLASS: &str = "storyblok-preview-notification";

const MODAL_TEMPLATE: &str = r#"
<div class="preview-backdrop">
    <div class="preview-container">
        <div class="preview-header">
            <div class="preview-info">
                <h3></h3>
                <span class="device-label"></span>
            </div>
            <div class="preview-controls">
                <button class="device-switch" data-device="mobile">📱</button>
                <button class="device-switch" data-device="tablet">🖥️</button>
                <button class="device-switch" data-device="desktop">💻</button>
                <button class="close-btn">✕</button>
            </div>
        </div>
        <div class="preview-content">
            <div class="loading-message">Loading preview...</div>
            <iframe src="about:blank" frameborder="0"></iframe>
        </div>
    </div>
</div>
"#;

const MODAL_STYLES: &str = r#"
#storyblok-preview-modal {
    position: fixed; top: 0; left: 0; width: 100%; height: 100%;
    z-index: 2147483647;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
}
#storyblok-preview-modal .preview-backdrop {
    background: rgba(0, 0, 0, 0.9); width: 100%; height: 100%; box-sizing: border-box;
    display: flex; align-items: center; justify-content: center; padding: 20px;
}
#storyblok-preview-modal .preview-container {
    background: white; border-radius: 12px; overflow: hidden;
    box-shadow: 0 20px 40px rgba(0, 0, 0, 0.5); transition: all 0.3s ease;
}
#storyblok-preview-modal .preview-container.mobile { width: 375px; height: 667px; }
#storyblok-preview-modal .preview-container.tablet { width: 768px; height: 1024px; max-height: 80vh; }
#storyblok-preview-modal .preview-container.desktop { width: 90vw; height: 80vh; max-width: 1200px; }
#storyblok-preview-modal .preview-header {
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white;
    padding: 15px 20px; display: flex; justify-content: space-between; align-items: center;
}
#storyblok-preview-modal .preview-info h3 { margin: 0 0 5px 0; font-size: 16px; font-weight: 600; }
#storyblok-preview-modal .device-label { font-size: 12px; opacity: 0.8; }
#storyblok-preview-modal .preview-controls { display: flex; gap: 8px; align-items: center; }
#storyblok-preview-modal .device-switch,
#storyblok-preview-modal .close-btn {
    background: rgba(255, 255, 255, 0.2); border: none; color: white; padding: 8px 10px;
    border-radius: 6px; cursor: pointer; font-size: 14px; transition: background 0.2s;
}
#storyblok-preview-modal .device-switch:hover,
#storyblok-preview-modal .close-btn:hover { background: rgba(255, 255, 255, 0.3); }
#storyblok-preview-modal .preview-content { height: calc(100% - 70px); position: relative; }
#storyblok-preview-modal .loading-message {
    position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%);
    font-size: 16px; color: #666; z-index: 10;
}
#storyblok-preview-modal iframe { width: 100%; height: 100%; border: none; background: white; }
@media (max-width: 768px) {
    #storyblok-preview-modal .preview-container.desktop,
    #storyblok-preview-modal .preview-container.tablet { width: 95vw; height: 80vh; }
}
"#;

fn dom_error(e: JsValue) -> PreviewError {
    PreviewError::Surface(format!("{:?}", e))
}

fn query(root: &Element, selector: &str) -> Result<Element, PreviewError> {
    root.query_selector(selector)
        .map_err(dom_error)?
        .ok_or_else(|| PreviewError::Surface(format!("missing {}", selector)))
}

fn container_class(device: Device) -> String {
    format!("preview-container {}", device)
}

/// An event listener that unregisters itself when dropped
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn new(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, PreviewError> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(dom_error)?;

        Ok(Listener {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// A mounted modal. Dropping it removes the markup, the listeners and the pending embed timer.
struct ModalHandle {
    root: Element,
    container: Element,
    label: Element,
    _listeners: Vec<Listener>,
    _embed_timer: Timeout,
}

impl Drop for ModalHandle {
    fn drop(&mut self) {
        self.root.remove();
    }
}

/// `PreviewSurface` backed by the host page's document
pub struct DomSurface {
    document: Document,
    events: Rc<dyn Fn(ModalEvent)>,
    modal: Option<ModalHandle>,
    notification_dismiss_ms: u32,
}

impl DomSurface {
    pub fn new(document: Document, events: Rc<dyn Fn(ModalEvent)>, notification_dismiss_ms: u32) -> Self {
        DomSurface {
            document,
            events,
            modal: None,
            notification_dismiss_ms,
        }
    }

    fn ensure_styles(&self) -> Result<(), PreviewError> {
        if self.document.get_element_by_id(STYLE_ID).is_some() {
            return Ok(());
        }

        let style = self.document.create_element("style").map_err(dom_error)?;
        style.set_id(STYLE_ID);
        style.set_text_content(Some(MODAL_STYLES));

        let head = self
            .document
            .head()
            .ok_or_else(|| PreviewError::Surface("document has no head".to_string()))?;
        head.append_child(&style).map_err(dom_error)?;
        Ok(())
    }

    fn build(&self, view: &ModalView) -> Result<ModalHandle, PreviewError> {
        let body = self
            .document
            .body()
            .ok_or_else(|| PreviewError::Surface("document has no body".to_string()))?;

        let root = self.document.create_element("div").map_err(dom_error)?;
        root.set_id(MODAL_ID);
        root.set_inner_html(MODAL_TEMPLATE);

        query(&root, ".preview-info h3")?.set_text_content(Some(view.title.as_str()));
        let container = query(&root, ".preview-container")?;
        container.set_class_name(&container_class(view.device));
        let label = query(&root, ".device-label")?;
        label.set_text_content(Some(view.device.label().as_str()));

        let iframe: HtmlIFrameElement = query(&root, "iframe")?
            .dyn_into()
            .map_err(|_| PreviewError::Surface("iframe has unexpected type".to_string()))?;
        let loading = query(&root, ".loading-message")?;

        let mut listeners = Vec::new();

        let close_btn = query(&root, ".close-btn")?;
        let events = self.events.clone();
        listeners.push(Listener::new(&close_btn, "click", move |_| events(ModalEvent::Close))?);

        for device in Device::ALL {
            let button = query(&root, &format!("[data-device=\"{}\"]", device))?;
            let events = self.events.clone();
            listeners.push(Listener::new(&button, "click", move |_| {
                events(ModalEvent::SwitchDevice(device))
            })?);
        }

        // Only clicks on the backdrop itself dismiss, not clicks inside the modal
        let backdrop = query(&root, ".preview-backdrop")?;
        let events = self.events.clone();
        listeners.push(Listener::new(&backdrop, "click", move |event: Event| {
            if event.target() == event.current_target() {
                events(ModalEvent::Close);
            }
        })?);

        let events = self.events.clone();
        listeners.push(Listener::new(&self.document, "keydown", move |event: Event| {
            let is_escape = event
                .dyn_ref::<KeyboardEvent>()
                .map(|key| key.key() == "Escape")
                .unwrap_or(false);
            if is_escape {
                events(ModalEvent::Close);
            }
        })?);

        let frame = iframe.clone();
        listeners.push(Listener::new(&iframe, "load", move |_| {
            if !frame.src().starts_with("about:") {
                let _ = loading.set_attribute("style", "display: none");
            }
        })?);

        // Setting the target after first layout avoids a blank flash
        let embed_url = view.embed_url.clone();
        let embed_timer = Timeout::new(view.embed_delay_ms, move || {
            log::debug!("Loading visual editor into preview frame");
            iframe.set_src(&embed_url);
        });

        body.append_child(&root).map_err(dom_error)?;

        Ok(ModalHandle {
            root,
            container,
            label,
            _listeners: listeners,
            _embed_timer: embed_timer,
        })
    }
}

impl PreviewSurface for DomSurface {
    fn mount(&mut self, view: &ModalView) -> Result<(), PreviewError> {
        self.unmount();
        self.ensure_styles()?;
        self.modal = Some(self.build(view)?);
        Ok(())
    }

    fn set_device(&mut self, device: Device) {
        if let Some(modal) = &self.modal {
            modal.container.set_class_name(&container_class(device));
            modal.label.set_text_content(Some(device.label().as_str()));
        }
    }

    fn unmount(&mut self) {
        self.modal = None;
        // A modal left behind by an earlier injection of this script
        if let Some(stale) = self.document.get_element_by_id(MODAL_ID) {
            stale.remove();
        }
    }

    fn notify(&mut self, message: &str, kind: NotificationKind) {
        let (background, color, border) = match kind {
            NotificationKind::Error => ("#f8d7da", "#721c24", "#f5c6cb"),
            NotificationKind::Success => ("#d4edda", "#155724", "#c3e6cb"),
        };

        let Some(body) = self.document.body() else {
            log::error!("Cannot show notification without a body: {}", message);
            return;
        };

        let notification = match self.document.create_element("div") {
            Ok(element) => element,
            Err(e) => {
                log::error!("Failed to create notification: {:?}", e);
                return;
            }
        };

        let style = format!(
            "position: fixed; top: 20px; right: 20px; background: {}; color: {}; border: 1px solid {}; \
             padding: 15px 20px; border-radius: 8px; box-shadow: 0 4px 12px rgba(0, 0, 0, 0.15); \
             z-index: 2147483647; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; \
             font-size: 14px; max-width: 350px; font-weight: 500;",
            background, color, border
        );
        notification.set_class_name(NOTIFICATION_CLASS);
        let _ = notification.set_attribute("style", &style);
        notification.set_text_content(Some(message));

        if let Err(e) = body.append_child(&notification) {
            log::error!("Failed to show notification: {:?}", e);
            return;
        }

        Timeout::new(self.notification_dismiss_ms, move || notification.remove()).forget();
    }
}

type DomBridge = RefCell<PreviewBridge<DomSurface>>;

/// Wire the preview bridge to `chrome.runtime.onMessage`
pub fn install(config: Config) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("content script has no document"))?;

    let api = Rc::new(HttpApi::new(config.clone()));
    let bridge: Rc<DomBridge> = Rc::new_cyclic(|weak: &Weak<DomBridge>| {
        let weak = weak.clone();
        // Deferred so a listener is never dropped while it is running
        let events: Rc<dyn Fn(ModalEvent)> = Rc::new(move |event| {
            let weak = weak.clone();
            spawn_local(async move {
                if let Some(bridge) = weak.upgrade() {
                    bridge.borrow_mut().handle_event(event);
                }
            });
        });
        let surface = DomSurface::new(document, events, config.notification_dismiss_ms);
        RefCell::new(PreviewBridge::new(surface, config))
    });

    let handler = Closure::wrap(Box::new(move |message: JsValue| -> JsValue {
        let response = match serde_wasm_bindgen::from_value::<serde_json::Value>(message) {
            Ok(value) => match route_message(value) {
                Ok(request) => {
                    let bridge = bridge.clone();
                    let api = api.clone();
                    spawn_local(async move {
                        open_preview(&*bridge, &*api, request).await;
                    });
                    PreviewResponse::opened()
                }
                Err(response) => response,
            },
            Err(e) => PreviewResponse::rejected(&PreviewError::InvalidRequest(e.to_string())),
        };

        serde_wasm_bindgen::to_value(&response).unwrap_or(JsValue::NULL)
    }) as Box<dyn FnMut(JsValue) -> JsValue>);

    addMessageListener(&handler);
    // Lives as long as the page
    handler.forget();

    log::info!("Preview content script ready");
    Ok(())
}
