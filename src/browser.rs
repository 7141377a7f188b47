/// Chrome extension APIs used by the popup

use crate::credentials::{Credentials, SPACE_KEY, StoredCredentials, TOKEN_KEY};
use crate::preview::{PreviewMessage, PreviewRequest, PreviewResponse};
use crate::session::{Browser, BrowserError, CredentialStore, StorageError};
use gloo_timers::callback::Timeout;
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSyncStorage(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncStorage(items: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn clearSyncStorage() -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn writeClipboard(text: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendToActiveTab(message: JsValue) -> Result<JsValue, JsValue>;
}

/// Credentials in `chrome.storage.sync`
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncStorage;

impl CredentialStore for SyncStorage {
    async fn load(&self) -> Result<Option<Credentials>, StorageError> {
        let keys = serde_wasm_bindgen::to_value(&[TOKEN_KEY, SPACE_KEY])
            .map_err(|e| StorageError(format!("Failed to serialize keys: {:?}", e)))?;

        let stored_js = getSyncStorage(keys)
            .await
            .map_err(|e| StorageError(format!("Failed to get storage: {:?}", e)))?;

        if stored_js.is_null() || stored_js.is_undefined() {
            return Ok(None);
        }

        let stored: StoredCredentials = serde_wasm_bindgen::from_value(stored_js)
            .map_err(|e| StorageError(format!("Failed to parse storage: {:?}", e)))?;
        Ok(stored.into_credentials())
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), StorageError> {
        let items = serde_wasm_bindgen::to_value(credentials)
            .map_err(|e| StorageError(format!("Failed to serialize credentials: {:?}", e)))?;

        setSyncStorage(items)
            .await
            .map_err(|e| StorageError(format!("Failed to save storage: {:?}", e)))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        clearSyncStorage()
            .await
            .map_err(|e| StorageError(format!("Failed to clear storage: {:?}", e)))
    }
}

/// Tabs, clipboard and messaging from the popup window
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeBrowser;

impl Browser for ChromeBrowser {
    async fn open_tab(&self, url: &str) -> Result<(), BrowserError> {
        createTab(url)
            .await
            .map_err(|e| BrowserError(format!("Failed to open tab: {:?}", e)))
    }

    fn close_popup(&self, delay_ms: u32) {
        let close = || {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.close() {
                    log::warn!("Failed to close popup: {:?}", e);
                }
            }
        };

        if delay_ms == 0 {
            close();
        } else {
            Timeout::new(delay_ms, close).forget();
        }
    }

    async fn copy_text(&self, text: &str) -> Result<(), BrowserError> {
        writeClipboard(text)
            .await
            .map_err(|e| BrowserError(format!("Failed to write clipboard: {:?}", e)))
    }

    async fn send_preview(&self, request: &PreviewRequest) -> Result<PreviewResponse, BrowserError> {
        // Flattened fields serialize as a map; it has to reach the tab as a plain object
        let message = PreviewMessage::open(request)
            .serialize(&Serializer::json_compatible())
            .map_err(|e| BrowserError(format!("Failed to serialize message: {:?}", e)))?;

        let response_js = sendToActiveTab(message)
            .await
            .map_err(|e| BrowserError(format!("Failed to reach content script: {:?}", e)))?;

        serde_wasm_bindgen::from_value(response_js)
            .map_err(|e| BrowserError(format!("Failed to parse response: {:?}", e)))
    }
}
