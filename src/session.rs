/// Popup session: credentials, story list and quick actions

use crate::api::{ApiError, CmsApi, StoryQuery};
use crate::config::Config;
use crate::credentials::{CredentialError, Credentials};
use crate::links;
use crate::preview::{PreviewRequest, PreviewResponse};
use crate::story::{Device, Story, StoryFilter, fallback_space_label, filter_stories};
use std::rc::Rc;
use thiserror::Error;
use yew::functional::Reducible;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

#[derive(Debug, Clone, PartialEq, Error)]
#[error("browser error: {0}")]
pub struct BrowserError(pub String);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error("Connection failed. Please check your credentials.")]
    InvalidCredentials(ApiError),
    #[error("Could not save credentials: {0}")]
    Storage(StorageError),
}

/// Persistent home of the two credential fields
#[allow(async_fn_in_trait)]
pub trait CredentialStore {
    async fn load(&self) -> Result<Option<Credentials>, StorageError>;

    async fn save(&self, credentials: &Credentials) -> Result<(), StorageError>;

    /// Wipe everything the extension stored
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Tab, clipboard and messaging side effects of the popup
#[allow(async_fn_in_trait)]
pub trait Browser {
    async fn open_tab(&self, url: &str) -> Result<(), BrowserError>;

    fn close_popup(&self, delay_ms: u32);

    async fn copy_text(&self, text: &str) -> Result<(), BrowserError>;

    /// Ask the active tab's content script to show the preview modal
    async fn send_preview(&self, request: &PreviewRequest) -> Result<PreviewResponse, BrowserError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Setup,
    Content,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ListState {
    #[default]
    Loading,
    Loaded,
    Empty,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub id: u32,
    pub text: String,
    pub kind: StatusKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    ShowSetup,
    /// Credentials are valid and stored
    Connected(Credentials),
    ShowSettings,
    SpaceLabel(String),
    StoriesLoading,
    StoriesLoaded(Vec<Story>),
    StoriesFailed(String),
    Filter(StoryFilter),
    Disconnected,
    Status(StatusKind, String),
    /// Hide the status message with this id, if it is still the current one
    ClearStatus(u32),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub view: View,
    pub credentials: Option<Credentials>,
    pub space_label: String,
    pub stories: Vec<Story>,
    pub list: ListState,
    pub filter: StoryFilter,
    pub status: Option<StatusMessage>,
    /// Space id shown in the setup form when coming back from settings
    pub prefill_space: String,
    status_seq: u32,
}

impl Session {
    pub fn apply(&mut self, action: SessionAction) {
        match action {
            SessionAction::ShowSetup => {
                self.view = View::Setup;
            }
            SessionAction::Connected(credentials) => {
                self.space_label = fallback_space_label(&credentials.space_id);
                self.credentials = Some(credentials);
                self.view = View::Content;
            }
            SessionAction::ShowSettings => {
                self.prefill_space = self
                    .credentials
                    .as_ref()
                    .map(|c| c.space_id.clone())
                    .unwrap_or_default();
                self.view = View::Setup;
            }
            SessionAction::SpaceLabel(label) => {
                self.space_label = label;
            }
            SessionAction::StoriesLoading => {
                self.list = ListState::Loading;
            }
            SessionAction::StoriesLoaded(stories) => {
                self.list = if stories.is_empty() {
                    ListState::Empty
                } else {
                    ListState::Loaded
                };
                self.stories = stories;
            }
            SessionAction::StoriesFailed(message) => {
                self.list = ListState::Error(message);
            }
            SessionAction::Filter(filter) => {
                self.filter = filter;
            }
            SessionAction::Disconnected => {
                let status = self.status.take();
                let status_seq = self.status_seq;
                *self = Session {
                    status,
                    status_seq,
                    ..Session::default()
                };
            }
            SessionAction::Status(kind, text) => {
                self.status_seq += 1;
                self.status = Some(StatusMessage {
                    id: self.status_seq,
                    text,
                    kind,
                });
            }
            SessionAction::ClearStatus(id) => {
                if self.status.as_ref().map(|s| s.id) == Some(id) {
                    self.status = None;
                }
            }
        }
    }

    /// Stories matching the current filter, in load order
    pub fn visible_stories(&self) -> Vec<&Story> {
        filter_stories(&self.stories, self.filter)
    }
}

impl Reducible for Session {
    type Action = SessionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

fn success(text: impl Into<String>) -> SessionAction {
    SessionAction::Status(StatusKind::Success, text.into())
}

fn failure(text: impl Into<String>) -> SessionAction {
    SessionAction::Status(StatusKind::Error, text.into())
}

/// Runs popup workflows against the CMS and the browser.
/// State changes are reported through `dispatch` as they happen.
pub struct SessionManager<A, S, B> {
    api: A,
    store: S,
    browser: B,
    config: Config,
}

impl<A: CmsApi, S: CredentialStore, B: Browser> SessionManager<A, S, B> {
    pub fn new(api: A, store: S, browser: B, config: Config) -> Self {
        SessionManager {
            api,
            store,
            browser,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pick up stored credentials when the popup opens
    pub async fn restore(&self, dispatch: &dyn Fn(SessionAction)) {
        match self.store.load().await {
            Ok(Some(credentials)) => {
                dispatch(SessionAction::Connected(credentials.clone()));
                self.load_space_info(&credentials, dispatch).await;
                let _ = self.load_stories(&credentials, dispatch).await;
            }
            Ok(None) => dispatch(SessionAction::ShowSetup),
            Err(e) => {
                log::error!("Error loading credentials: {}", e);
                dispatch(SessionAction::ShowSetup);
            }
        }
    }

    /// Validate credentials with one small list request, then store them and load the space
    pub async fn connect(
        &self,
        token: &str,
        space_id: &str,
        dispatch: &dyn Fn(SessionAction),
    ) -> Result<Credentials, ConnectError> {
        match self.try_connect(token, space_id, dispatch).await {
            Ok(credentials) => {
                self.load_space_info(&credentials, dispatch).await;
                let _ = self.load_stories(&credentials, dispatch).await;
                dispatch(success("Connected successfully!"));
                Ok(credentials)
            }
            Err(e) => {
                dispatch(failure(e.to_string()));
                Err(e)
            }
        }
    }

    async fn try_connect(
        &self,
        token: &str,
        space_id: &str,
        dispatch: &dyn Fn(SessionAction),
    ) -> Result<Credentials, ConnectError> {
        let credentials = Credentials::from_input(token, space_id)?;

        dispatch(success("Connecting to Storyblok..."));

        self.api
            .list_stories(&credentials.access_token, &StoryQuery::validation(&self.config))
            .await
            .map_err(|e| {
                log::error!("Connection error: {}", e);
                ConnectError::InvalidCredentials(e)
            })?;

        self.store.save(&credentials).await.map_err(|e| {
            log::error!("Error saving credentials: {}", e);
            ConnectError::Storage(e)
        })?;

        log::info!("Connected to space {}", credentials.space_id);
        dispatch(SessionAction::Connected(credentials.clone()));
        Ok(credentials)
    }

    /// Best effort: any failure falls back to a generic label
    pub async fn load_space_info(&self, credentials: &Credentials, dispatch: &dyn Fn(SessionAction)) {
        let label = match self.api.fetch_space(&credentials.access_token).await {
            Ok(space) => space
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| fallback_space_label(&credentials.space_id)),
            Err(e) => {
                log::warn!("Error loading space info: {}", e);
                fallback_space_label(&credentials.space_id)
            }
        };

        dispatch(SessionAction::SpaceLabel(label));
    }

    /// Replace the story list with the most recently updated stories
    pub async fn load_stories(
        &self,
        credentials: &Credentials,
        dispatch: &dyn Fn(SessionAction),
    ) -> Result<usize, ApiError> {
        dispatch(SessionAction::StoriesLoading);

        match self
            .api
            .list_stories(&credentials.access_token, &StoryQuery::recent(&self.config))
            .await
        {
            Ok(stories) => {
                let count = stories.len();
                log::debug!("Loaded {} stories", count);
                dispatch(SessionAction::StoriesLoaded(stories));
                Ok(count)
            }
            Err(e) => {
                log::error!("Error loading stories: {}", e);
                dispatch(SessionAction::StoriesFailed(
                    "Failed to load stories. Please check your connection.".to_string(),
                ));
                Err(e)
            }
        }
    }

    pub async fn refresh(&self, credentials: &Credentials, dispatch: &dyn Fn(SessionAction)) {
        dispatch(success("Refreshing stories..."));
        match self.load_stories(credentials, dispatch).await {
            Ok(_) => dispatch(success("Stories refreshed!")),
            Err(_) => dispatch(failure("Failed to refresh stories")),
        }
    }

    /// Wipe storage and in-memory state. Always ends on the setup view.
    pub async fn disconnect(&self, dispatch: &dyn Fn(SessionAction)) {
        let result = self.store.clear().await;
        dispatch(SessionAction::Disconnected);

        match result {
            Ok(()) => dispatch(success("Disconnected successfully")),
            Err(e) => {
                log::error!("Error disconnecting: {}", e);
                dispatch(failure("Error during disconnect"));
            }
        }
    }

    async fn open_and_close(&self, url: &str, close_delay_ms: u32, dispatch: &dyn Fn(SessionAction)) -> bool {
        match self.browser.open_tab(url).await {
            Ok(()) => {
                self.browser.close_popup(close_delay_ms);
                true
            }
            Err(e) => {
                log::error!("Error opening {}: {}", url, e);
                dispatch(failure("Could not open a new tab"));
                false
            }
        }
    }

    pub async fn edit_story(&self, credentials: &Credentials, story_id: u64, dispatch: &dyn Fn(SessionAction)) {
        let url = links::edit_story_url(&self.config, &credentials.space_id, story_id);
        self.open_and_close(&url, 0, dispatch).await;
    }

    pub async fn create_new_story(&self, credentials: &Credentials, dispatch: &dyn Fn(SessionAction)) {
        let url = links::new_story_url(&self.config, &credentials.space_id);
        self.open_and_close(&url, 0, dispatch).await;
    }

    pub async fn open_space(&self, credentials: &Credentials, dispatch: &dyn Fn(SessionAction)) {
        let url = links::space_dashboard_url(&self.config, &credentials.space_id);
        if self
            .open_and_close(&url, self.config.open_space_close_delay_ms, dispatch)
            .await
        {
            dispatch(success("Opening your Storyblok space..."));
        }
    }

    pub async fn preview_story(&self, full_slug: &str, dispatch: &dyn Fn(SessionAction)) {
        let url = links::public_preview_url(&self.config, full_slug);
        self.open_and_close(&url, 0, dispatch).await;
    }

    pub async fn copy_story_url(&self, full_slug: &str, dispatch: &dyn Fn(SessionAction)) {
        let url = links::public_preview_url(&self.config, full_slug);

        match self.browser.copy_text(&url).await {
            Ok(()) => {
                dispatch(success(format!("✅ URL copied for: {}", full_slug)));
                self.browser.close_popup(self.config.copy_close_delay_ms);
            }
            Err(e) => {
                log::error!("Error copying URL: {}", e);
                dispatch(failure("Failed to copy URL"));
            }
        }
    }

    /// Open the preview modal on the page in the active tab
    pub async fn preview_in_page(
        &self,
        credentials: &Credentials,
        story_slug: &str,
        device: Device,
        dispatch: &dyn Fn(SessionAction),
    ) {
        let request = PreviewRequest {
            access_token: credentials.access_token.clone(),
            space_id: credentials.space_id.clone(),
            story_slug: story_slug.to_string(),
            device,
        };

        match self.browser.send_preview(&request).await {
            Ok(response) if response.success => {
                log::info!("Preview bridge: {}", response.message);
                self.browser.close_popup(0);
            }
            Ok(response) => {
                dispatch(failure(format!("Preview unavailable: {}", response.message)));
            }
            Err(e) => {
                log::error!("Error sending preview request: {}", e);
                dispatch(failure("Preview unavailable on this page. Try reloading the tab."));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{Space, Version, create_test_story};
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeApi {
        reject_token: bool,
        fail_stories: bool,
        fail_space: bool,
        space_name: Option<String>,
        stories: Vec<Story>,
        list_calls: RefCell<Vec<StoryQuery>>,
        space_calls: RefCell<usize>,
    }

    impl CmsApi for FakeApi {
        async fn list_stories(&self, _token: &str, query: &StoryQuery) -> Result<Vec<Story>, ApiError> {
            self.list_calls.borrow_mut().push(query.clone());
            let is_validation = query.sort_by.is_none();
            if self.reject_token || (!is_validation && self.fail_stories) {
                return Err(ApiError::Status {
                    status: 401,
                    body: String::new(),
                });
            }
            Ok(self.stories.iter().take(query.per_page as usize).cloned().collect())
        }

        async fn fetch_story(&self, _token: &str, slug: &str, _version: Version) -> Result<Story, ApiError> {
            Ok(create_test_story(1, slug, None))
        }

        async fn fetch_space(&self, _token: &str) -> Result<Space, ApiError> {
            *self.space_calls.borrow_mut() += 1;
            if self.fail_space {
                return Err(ApiError::Network("offline".to_string()));
            }
            Ok(Space {
                id: Some(999),
                name: self.space_name.clone(),
            })
        }
    }

    #[derive(Default)]
    struct FakeStore {
        saved: RefCell<Option<Credentials>>,
        fail_clear: bool,
        fail_load: bool,
        writes: RefCell<usize>,
    }

    impl CredentialStore for FakeStore {
        async fn load(&self) -> Result<Option<Credentials>, StorageError> {
            if self.fail_load {
                return Err(StorageError("quota".to_string()));
            }
            Ok(self.saved.borrow().clone())
        }

        async fn save(&self, credentials: &Credentials) -> Result<(), StorageError> {
            *self.writes.borrow_mut() += 1;
            *self.saved.borrow_mut() = Some(credentials.clone());
            Ok(())
        }

        async fn clear(&self) -> Result<(), StorageError> {
            *self.writes.borrow_mut() += 1;
            if self.fail_clear {
                return Err(StorageError("unavailable".to_string()));
            }
            *self.saved.borrow_mut() = None;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeBrowser {
        opened: RefCell<Vec<String>>,
        closes: RefCell<Vec<u32>>,
        copied: RefCell<Vec<String>>,
        previews: RefCell<Vec<PreviewRequest>>,
        fail_copy: bool,
        preview_response: Option<PreviewResponse>,
    }

    impl Browser for FakeBrowser {
        async fn open_tab(&self, url: &str) -> Result<(), BrowserError> {
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }

        fn close_popup(&self, delay_ms: u32) {
            self.closes.borrow_mut().push(delay_ms);
        }

        async fn copy_text(&self, text: &str) -> Result<(), BrowserError> {
            if self.fail_copy {
                return Err(BrowserError("denied".to_string()));
            }
            self.copied.borrow_mut().push(text.to_string());
            Ok(())
        }

        async fn send_preview(&self, request: &PreviewRequest) -> Result<PreviewResponse, BrowserError> {
            self.previews.borrow_mut().push(request.clone());
            self.preview_response
                .clone()
                .ok_or_else(|| BrowserError("Could not establish connection".to_string()))
        }
    }

    type TestManager = SessionManager<FakeApi, FakeStore, FakeBrowser>;

    fn manager(api: FakeApi, store: FakeStore, browser: FakeBrowser) -> TestManager {
        SessionManager::new(api, store, browser, Config::default())
    }

    fn connected_session(credentials: &Credentials) -> RefCell<Session> {
        let mut session = Session::default();
        session.apply(SessionAction::Connected(credentials.clone()));
        RefCell::new(session)
    }

    fn creds() -> Credentials {
        Credentials::from_input("tok123", "999").unwrap()
    }

    fn last_status(session: &RefCell<Session>) -> Option<String> {
        session.borrow().status.as_ref().map(|s| s.text.clone())
    }

    #[test]
    fn test_connect_success() {
        let api = FakeApi {
            stories: vec![create_test_story(1, "a", None), create_test_story(2, "b", Some("2024-01-01"))],
            space_name: Some("Marketing".to_string()),
            ..Default::default()
        };
        let mgr = manager(api, FakeStore::default(), FakeBrowser::default());
        let session = RefCell::new(Session::default());

        let result = block_on(mgr.connect("tok123", "999", &|a| session.borrow_mut().apply(a)));

        assert_eq!(result, Ok(creds()));
        assert_eq!(*mgr.store.saved.borrow(), Some(creds()));
        let session = session.into_inner();
        assert_eq!(session.view, View::Content);
        assert_eq!(session.space_label, "Marketing");
        assert_eq!(session.stories.len(), 2);
        assert_eq!(session.list, ListState::Loaded);
        assert_eq!(session.status.unwrap().text, "Connected successfully!");

        // one validation request, then exactly one story load
        let calls = mgr.api.list_calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].per_page, 1);
        assert_eq!(calls[0].sort_by, None);
        assert_eq!(calls[1].per_page, 20);
        assert_eq!(calls[1].sort_by.as_deref(), Some("updated_at:desc"));
    }

    #[test]
    fn test_connect_blank_fields_skip_network() {
        let mgr = manager(FakeApi::default(), FakeStore::default(), FakeBrowser::default());

        for (token, space) in [("", "999"), ("tok", "   "), (" \t", "\n")] {
            let session = RefCell::new(Session::default());

            let result = block_on(mgr.connect(token, space, &|a| session.borrow_mut().apply(a)));

            assert_eq!(result, Err(ConnectError::Credentials(CredentialError::MissingFields)));
            assert_eq!(last_status(&session).as_deref(), Some("Please fill in both fields"));
            assert_eq!(session.borrow().view, View::Setup);
        }
        assert!(mgr.api.list_calls.borrow().is_empty());
        assert_eq!(*mgr.store.writes.borrow(), 0);
    }

    #[test]
    fn test_connect_rejected_keeps_prior_state() {
        let api = FakeApi {
            reject_token: true,
            ..Default::default()
        };
        let store = FakeStore::default();
        *store.saved.borrow_mut() = Some(Credentials::from_input("old", "1").unwrap());
        let mgr = manager(api, store, FakeBrowser::default());
        let session = RefCell::new(Session::default());

        let result = block_on(mgr.connect("bad", "999", &|a| session.borrow_mut().apply(a)));

        assert!(matches!(result, Err(ConnectError::InvalidCredentials(_))));
        assert_eq!(mgr.store.saved.borrow().as_ref().unwrap().access_token, "old");
        assert_eq!(mgr.api.list_calls.borrow().len(), 1);
        assert_eq!(*mgr.api.space_calls.borrow(), 0);
        assert_eq!(session.borrow().view, View::Setup);
        assert_eq!(
            last_status(&session).as_deref(),
            Some("Connection failed. Please check your credentials.")
        );
    }

    #[test]
    fn test_space_info_failure_does_not_block_stories() {
        let api = FakeApi {
            fail_space: true,
            stories: vec![create_test_story(1, "a", None)],
            ..Default::default()
        };
        let mgr = manager(api, FakeStore::default(), FakeBrowser::default());
        let session = RefCell::new(Session::default());

        block_on(mgr.connect("tok123", "999", &|a| session.borrow_mut().apply(a))).unwrap();

        let session = session.into_inner();
        assert_eq!(session.space_label, "Space 999");
        assert_eq!(session.stories.len(), 1);
    }

    #[test]
    fn test_space_without_name_uses_fallback() {
        let mgr = manager(FakeApi::default(), FakeStore::default(), FakeBrowser::default());
        let session = connected_session(&creds());

        block_on(mgr.load_space_info(&creds(), &|a| session.borrow_mut().apply(a)));

        assert_eq!(session.borrow().space_label, "Space 999");
    }

    #[test]
    fn test_load_stories_empty_and_error() {
        let mgr = manager(FakeApi::default(), FakeStore::default(), FakeBrowser::default());
        let session = connected_session(&creds());

        let count = block_on(mgr.load_stories(&creds(), &|a| session.borrow_mut().apply(a)));

        assert_eq!(count, Ok(0));
        assert_eq!(session.borrow().list, ListState::Empty);

        let failing = manager(
            FakeApi {
                fail_stories: true,
                ..Default::default()
            },
            FakeStore::default(),
            FakeBrowser::default(),
        );
        assert!(block_on(failing.load_stories(&creds(), &|a| session.borrow_mut().apply(a))).is_err());
        assert!(matches!(session.borrow().list, ListState::Error(_)));
    }

    #[test]
    fn test_refresh_failure_reports_error_status() {
        let mgr = manager(
            FakeApi {
                fail_stories: true,
                ..Default::default()
            },
            FakeStore::default(),
            FakeBrowser::default(),
        );
        let session = connected_session(&creds());

        block_on(mgr.refresh(&creds(), &|a| session.borrow_mut().apply(a)));

        let session = session.borrow();
        assert!(matches!(session.list, ListState::Error(_)));
        let status = session.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "Failed to refresh stories");
    }

    #[test]
    fn test_load_stories_replaces_list() {
        let mgr = manager(
            FakeApi {
                stories: vec![create_test_story(9, "new", None)],
                ..Default::default()
            },
            FakeStore::default(),
            FakeBrowser::default(),
        );
        let session = connected_session(&creds());
        session
            .borrow_mut()
            .apply(SessionAction::StoriesLoaded(vec![create_test_story(1, "old", None)]));

        block_on(mgr.load_stories(&creds(), &|a| session.borrow_mut().apply(a))).unwrap();

        let ids: Vec<u64> = session.borrow().stories.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![9]);
    }

    #[test]
    fn test_restore_with_stored_credentials() {
        let store = FakeStore::default();
        *store.saved.borrow_mut() = Some(creds());
        let mgr = manager(FakeApi::default(), store, FakeBrowser::default());
        let session = RefCell::new(Session::default());

        block_on(mgr.restore(&|a| session.borrow_mut().apply(a)));

        assert_eq!(session.borrow().view, View::Content);
        assert_eq!(*mgr.api.space_calls.borrow(), 1);
        assert_eq!(mgr.api.list_calls.borrow().len(), 1);
    }

    #[test]
    fn test_restore_failure_shows_setup() {
        let store = FakeStore {
            fail_load: true,
            ..Default::default()
        };
        let mgr = manager(FakeApi::default(), store, FakeBrowser::default());
        let session = RefCell::new(Session::default());

        block_on(mgr.restore(&|a| session.borrow_mut().apply(a)));

        assert_eq!(session.borrow().view, View::Setup);
        assert!(mgr.api.list_calls.borrow().is_empty());
    }

    #[test]
    fn test_disconnect_clears_everything() {
        let store = FakeStore::default();
        *store.saved.borrow_mut() = Some(creds());
        let mgr = manager(FakeApi::default(), store, FakeBrowser::default());
        let session = connected_session(&creds());
        session
            .borrow_mut()
            .apply(SessionAction::StoriesLoaded(vec![create_test_story(1, "a", None)]));

        block_on(mgr.disconnect(&|a| session.borrow_mut().apply(a)));

        assert_eq!(*mgr.store.saved.borrow(), None);
        let session = session.into_inner();
        assert_eq!(session.view, View::Setup);
        assert_eq!(session.credentials, None);
        assert!(session.stories.is_empty());
        assert_eq!(session.status.unwrap().text, "Disconnected successfully");
    }

    #[test]
    fn test_disconnect_from_setup_view() {
        let mgr = manager(FakeApi::default(), FakeStore::default(), FakeBrowser::default());
        let session = RefCell::new(Session::default());

        block_on(mgr.disconnect(&|a| session.borrow_mut().apply(a)));

        assert_eq!(*mgr.store.saved.borrow(), None);
        assert_eq!(session.borrow().view, View::Setup);
    }

    #[test]
    fn test_disconnect_storage_failure_still_resets() {
        let store = FakeStore {
            fail_clear: true,
            ..Default::default()
        };
        let mgr = manager(FakeApi::default(), store, FakeBrowser::default());
        let session = connected_session(&creds());

        block_on(mgr.disconnect(&|a| session.borrow_mut().apply(a)));

        assert_eq!(session.borrow().view, View::Setup);
        assert_eq!(session.borrow().credentials, None);
        assert_eq!(last_status(&session).as_deref(), Some("Error during disconnect"));
    }

    #[test]
    fn test_quick_actions_open_one_tab_and_close() {
        let mgr = manager(FakeApi::default(), FakeStore::default(), FakeBrowser::default());
        let noop = |_: SessionAction| {};

        block_on(mgr.edit_story(&creds(), 42, &noop));
        block_on(mgr.create_new_story(&creds(), &noop));
        block_on(mgr.preview_story("blog/post", &noop));

        assert_eq!(
            *mgr.browser.opened.borrow(),
            vec![
                "https://app.storyblok.com/#!/me/spaces/999/stories/0/0/42".to_string(),
                "https://app.storyblok.com/#!/me/spaces/999/stories/new".to_string(),
                format!("{}/blog/post", mgr.config().preview_origin),
            ]
        );
        assert_eq!(*mgr.browser.closes.borrow(), vec![0, 0, 0]);
    }

    #[test]
    fn test_open_space_closes_after_delay() {
        let mgr = manager(FakeApi::default(), FakeStore::default(), FakeBrowser::default());
        let session = connected_session(&creds());

        block_on(mgr.open_space(&creds(), &|a| session.borrow_mut().apply(a)));

        assert_eq!(
            *mgr.browser.opened.borrow(),
            vec!["https://app.storyblok.com/#/me/spaces/999".to_string()]
        );
        assert_eq!(*mgr.browser.closes.borrow(), vec![1000]);
        assert_eq!(last_status(&session).as_deref(), Some("Opening your Storyblok space..."));
    }

    #[test]
    fn test_copy_story_url() {
        let mgr = manager(FakeApi::default(), FakeStore::default(), FakeBrowser::default());
        let session = connected_session(&creds());

        block_on(mgr.copy_story_url("blog/post", &|a| session.borrow_mut().apply(a)));

        assert_eq!(
            *mgr.browser.copied.borrow(),
            vec![format!("{}/blog/post", mgr.config().preview_origin)]
        );
        assert_eq!(*mgr.browser.closes.borrow(), vec![1500]);
        assert_eq!(last_status(&session).as_deref(), Some("✅ URL copied for: blog/post"));
    }

    #[test]
    fn test_copy_failure_keeps_popup_open() {
        let browser = FakeBrowser {
            fail_copy: true,
            ..Default::default()
        };
        let mgr = manager(FakeApi::default(), FakeStore::default(), browser);
        let session = connected_session(&creds());

        block_on(mgr.copy_story_url("blog/post", &|a| session.borrow_mut().apply(a)));

        assert!(mgr.browser.closes.borrow().is_empty());
        assert_eq!(last_status(&session).as_deref(), Some("Failed to copy URL"));
    }

    #[test]
    fn test_preview_in_page_sends_identifiers_only() {
        let browser = FakeBrowser {
            preview_response: Some(PreviewResponse::opened()),
            ..Default::default()
        };
        let mgr = manager(FakeApi::default(), FakeStore::default(), browser);

        block_on(mgr.preview_in_page(&creds(), "blog/post", Device::Tablet, &|_| {}));

        let previews = mgr.browser.previews.borrow();
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].access_token, "tok123");
        assert_eq!(previews[0].space_id, "999");
        assert_eq!(previews[0].story_slug, "blog/post");
        assert_eq!(previews[0].device, Device::Tablet);
        assert_eq!(*mgr.browser.closes.borrow(), vec![0]);
    }

    #[test]
    fn test_preview_in_page_without_content_script() {
        let mgr = manager(FakeApi::default(), FakeStore::default(), FakeBrowser::default());
        let session = connected_session(&creds());

        block_on(mgr.preview_in_page(&creds(), "home", Device::Mobile, &|a| session.borrow_mut().apply(a)));

        assert!(mgr.browser.closes.borrow().is_empty());
        assert_eq!(session.borrow().status.as_ref().unwrap().kind, StatusKind::Error);
    }

    #[test]
    fn test_status_clear_only_matches_current() {
        let mut session = Session::default();
        session.apply(SessionAction::Status(StatusKind::Success, "first".to_string()));
        let first_id = session.status.as_ref().unwrap().id;
        session.apply(SessionAction::Status(StatusKind::Success, "second".to_string()));

        session.apply(SessionAction::ClearStatus(first_id));
        assert_eq!(session.status.as_ref().unwrap().text, "second");

        let second_id = session.status.as_ref().unwrap().id;
        session.apply(SessionAction::ClearStatus(second_id));
        assert_eq!(session.status, None);
    }

    #[test]
    fn test_settings_prefills_space() {
        let mut session = Session::default();
        session.apply(SessionAction::Connected(creds()));

        session.apply(SessionAction::ShowSettings);

        assert_eq!(session.view, View::Setup);
        assert_eq!(session.prefill_space, "999");
        assert_eq!(session.credentials, Some(creds()));
    }

    #[test]
    fn test_visible_stories_follow_filter() {
        let mut session = Session::default();
        session.apply(SessionAction::StoriesLoaded(vec![
            create_test_story(1, "a", None),
            create_test_story(2, "b", Some("2024-01-01")),
            create_test_story(3, "c", None),
        ]));

        session.apply(SessionAction::Filter(StoryFilter::Draft));
        let ids: Vec<u64> = session.visible_stories().iter().map(|s| s.id).collect();

        assert_eq!(ids, vec![1, 3]);
        assert_eq!(session.stories.len(), 3);
    }

    #[test]
    fn test_reducer_returns_new_state() {
        let state = Rc::new(Session::default());

        let next = state.clone().reduce(SessionAction::Filter(StoryFilter::Published));

        assert_eq!(state.filter, StoryFilter::All);
        assert_eq!(next.filter, StoryFilter::Published);
    }
}
