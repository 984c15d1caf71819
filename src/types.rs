//! Core types for acquired search results and session context.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The bucket a search result belongs to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Ordinary web pages and articles.
    #[default]
    Web,
    /// Posts from social networks.
    Social,
    /// Video pages and their descriptions.
    Video,
    /// Content flagged as trending or viral by the backend.
    Trending,
}

impl Category {
    /// Every category, in reporting order.
    pub const ALL: [Category; 4] = [Self::Web, Self::Social, Self::Video, Self::Trending];

    /// Returns the lowercase name used in reports and serialised output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Social => "social",
            Self::Video => "video",
            Self::Trending => "trending",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single result returned by a search backend.
///
/// Only the five text fields count towards content size and topical
/// relevance; see [`ResultItem::content_size`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Source URL. Used as the deduplication key.
    pub identity: String,
    /// Which bucket the backend placed this result in.
    #[serde(default)]
    pub category: Category,
    /// Provider or source name (e.g. `"google"`, `"instagram"`).
    #[serde(default = "unknown_origin")]
    pub origin: String,
    /// Engagement score reported by the platform, 0 to 10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

fn unknown_origin() -> String {
    "unknown".to_owned()
}

impl ResultItem {
    /// Create a result with no text and no platform score.
    pub fn new(identity: impl Into<String>, category: Category, origin: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            category,
            origin: origin.into(),
            platform_score: None,
            title: None,
            snippet: None,
            body: None,
            description: None,
            caption: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_platform_score(mut self, score: f64) -> Self {
        self.platform_score = Some(score);
        self
    }

    /// The text fields in their fixed measurement order:
    /// title, snippet, body, description, caption.
    pub fn text_fields(&self) -> [Option<&str>; 5] {
        [
            self.title.as_deref(),
            self.snippet.as_deref(),
            self.body.as_deref(),
            self.description.as_deref(),
            self.caption.as_deref(),
        ]
    }

    /// Content size of this item: the sum of the character lengths of its
    /// text fields. Absent and empty fields contribute zero.
    ///
    /// Every size figure in the crate is built from this function.
    pub fn content_size(&self) -> usize {
        self.text_fields()
            .into_iter()
            .flatten()
            .map(|text| text.chars().count())
            .sum()
    }

    /// All non-empty text fields joined by single spaces.
    pub fn combined_text(&self) -> String {
        self.text_fields()
            .into_iter()
            .flatten()
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Platform score, treating an absent score as zero.
    pub fn engagement(&self) -> f64 {
        self.platform_score.unwrap_or(0.0)
    }
}

/// Context shared by every round of one acquisition session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Identifier scoping one result set and budget.
    pub session_id: String,
    /// The query issued in the base round; also the session subject.
    pub base_query: String,
    /// Free-form attributes such as `segment` and `product`.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>, base_query: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            base_query: base_query.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Create a context with a random UUID v4 session identifier.
    pub fn with_generated_id(base_query: impl Into<String>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), base_query)
    }

    /// Add or replace an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns a trimmed, non-empty attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}
