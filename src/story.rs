/// Data structures for stories and spaces, plus list filtering
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A story as returned by the content delivery API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Story {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub slug: String,
    pub full_slug: String,
    #[serde(default)]
    pub published_at: Option<String>,
    pub updated_at: String,
}

impl Story {
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    /// Name for headings; falls back to the slug for unnamed stories
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.slug,
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_published() { "Published" } else { "Draft" }
    }
}

/// Space metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Space {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Label shown for a space whose metadata could not be loaded
pub fn fallback_space_label(space_id: &str) -> String {
    format!("Space {}", space_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoryFilter {
    #[default]
    All,
    Published,
    Draft,
}

impl StoryFilter {
    pub fn matches(&self, story: &Story) -> bool {
        match self {
            StoryFilter::All => true,
            StoryFilter::Published => story.is_published(),
            StoryFilter::Draft => !story.is_published(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoryFilter::All => "all",
            StoryFilter::Published => "published",
            StoryFilter::Draft => "draft",
        }
    }
}

impl FromStr for StoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StoryFilter::All),
            "published" => Ok(StoryFilter::Published),
            "draft" => Ok(StoryFilter::Draft),
            other => Err(format!("unknown filter: {}", other)),
        }
    }
}

/// Order-preserving view of the stories that match `filter`
pub fn filter_stories<'a>(stories: &'a [Story], filter: StoryFilter) -> Vec<&'a Story> {
    stories.iter().filter(|story| filter.matches(story)).collect()
}

/// Content version requested from the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Draft,
    Published,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Draft => "draft",
            Version::Published => "published",
        }
    }
}

/// Preview viewport size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl Device {
    pub const ALL: [Device; 3] = [Device::Mobile, Device::Tablet, Device::Desktop];

    /// CSS class used by the preview container
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Mobile => "mobile",
            Device::Tablet => "tablet",
            Device::Desktop => "desktop",
        }
    }

    pub fn label(&self) -> String {
        match self {
            Device::Mobile => "Mobile Preview",
            Device::Tablet => "Tablet Preview",
            Device::Desktop => "Desktop Preview",
        }
        .to_string()
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Device::Mobile => "📱",
            Device::Tablet => "🖥️",
            Device::Desktop => "💻",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile" => Ok(Device::Mobile),
            "tablet" => Ok(Device::Tablet),
            "desktop" => Ok(Device::Desktop),
            other => Err(format!("unknown device: {}", other)),
        }
    }
}

#[cfg(test)]
pub(crate) fn create_test_story(id: u64, slug: &str, published_at: Option<&str>) -> Story {
    Story {
        id,
        name: Some(format!("Story {}", id)),
        slug: slug.to_string(),
        full_slug: format!("blog/{}", slug),
        published_at: published_at.map(|s| s.to_string()),
        updated_at: "2024-02-01T10:00:00.000Z".to_string(),
    }
}
