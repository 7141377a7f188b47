/// Navigation URLs into the CMS app and the public preview site
///
/// The app routes on the URL fragment, so paths are built as plain strings and
/// must match the app's own routes exactly (note `#!/` for stories and `#/` for
/// the space dashboard).

use crate::config::Config;

pub fn edit_story_url(config: &Config, space_id: &str, story_id: u64) -> String {
    format!(
        "{}/#!/me/spaces/{}/stories/0/0/{}",
        config.app_base, space_id, story_id
    )
}

pub fn new_story_url(config: &Config, space_id: &str) -> String {
    format!("{}/#!/me/spaces/{}/stories/new", config.app_base, space_id)
}

pub fn space_dashboard_url(config: &Config, space_id: &str) -> String {
    format!("{}/#/me/spaces/{}", config.app_base, space_id)
}

/// Public site URL for a story's full slug
pub fn public_preview_url(config: &Config, full_slug: &str) -> String {
    format!(
        "{}/{}",
        config.preview_origin,
        full_slug.trim_start_matches('/')
    )
}

/// Visual editor URL embedded by the in-page preview
pub fn visual_editor_url(config: &Config, space_id: &str, story_id: u64, token: &str) -> String {
    format!(
        "{}?tab=visual_editor&token={}",
        edit_story_url(config, space_id, story_id),
        token
    )
}
