/// Extension configuration: CMS endpoints, page sizes and timer durations

const DEFAULT_PREVIEW_ORIGIN: &str = "https://spatial-story.netlify.app";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base of the CMS content delivery API
    pub api_base: String,
    /// Base of the CMS web app (editor, dashboards)
    pub app_base: String,
    /// Public site that renders published stories
    pub preview_origin: String,
    pub validation_page_size: u32,
    pub story_page_size: u32,
    pub story_sort: String,
    pub status_dismiss_ms: u32,
    pub notification_dismiss_ms: u32,
    pub embed_delay_ms: u32,
    pub copy_close_delay_ms: u32,
    pub open_space_close_delay_ms: u32,
}

impl Config {
    pub fn new() -> Self {
        Config {
            api_base: "https://api.storyblok.com/v2/cdn".to_string(),
            app_base: "https://app.storyblok.com".to_string(),
            preview_origin: option_env!("STORYBLOK_PREVIEW_ORIGIN")
                .unwrap_or(DEFAULT_PREVIEW_ORIGIN)
                .trim_end_matches('/')
                .to_string(),
            validation_page_size: 1,
            story_page_size: 20,
            story_sort: "updated_at:desc".to_string(),
            status_dismiss_ms: 3000,
            notification_dismiss_ms: 6000,
            embed_delay_ms: 100,
            copy_close_delay_ms: 1500,
            open_space_close_delay_ms: 1000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let config = Config::default();

        assert_eq!(config.api_base, "https://api.storyblok.com/v2/cdn");
        assert_eq!(config.app_base, "https://app.storyblok.com");
        assert!(!config.preview_origin.ends_with('/'));
    }

    #[test]
    fn test_default_limits() {
        let config = Config::default();

        assert_eq!(config.validation_page_size, 1);
        assert_eq!(config.story_page_size, 20);
        assert_eq!(config.story_sort, "updated_at:desc");
    }
}
