use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Publisher of an article as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceRef {
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// NewsAPI sends explicit `null` for fields it has no value for.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// An article exactly as the provider returned it, before it joins a
/// snapshot generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawArticle {
    pub author: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub published_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source: SourceRef,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    pub url_to_image: Option<String>,
}

/// A headline inside a snapshot generation.
///
/// `key` is the article's position in the batch it was fetched in. It is
/// unique within one generation only: every refresh hands out `"0"`, `"1"`,
/// ... again, so keys (and pin state) from an earlier generation do not
/// carry over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub key: String,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_at: String,
    pub source: SourceRef,
    pub url: String,
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
}

impl Article {
    /// Tag a raw record with its generation key. Fresh articles are never pinned.
    pub fn from_raw(position: usize, raw: RawArticle) -> Self {
        Self {
            key: position.to_string(),
            author: raw.author,
            title: raw.title,
            description: raw.description,
            content: raw.content,
            published_at: raw.published_at,
            source: raw.source,
            url: raw.url,
            url_to_image: raw.url_to_image,
            is_pinned: false,
        }
    }

    /// Tag a whole batch, keeping the provider's order.
    pub fn generation(batch: Vec<RawArticle>) -> Vec<Self> {
        batch
            .into_iter()
            .enumerate()
            .map(|(position, raw)| Self::from_raw(position, raw))
            .collect()
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }

    /// `published_at` as `YYYY-MM-DD HH:MM:SS`, or the raw string when it is
    /// not RFC 3339.
    pub fn display_published(&self) -> String {
        DateTime::parse_from_rfc3339(&self.published_at)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|_| self.published_at.clone())
    }

    /// Byline shown under the title: `author • date`, or just the date.
    pub fn byline(&self) -> String {
        match self.author.as_deref().filter(|a| !a.is_empty()) {
            Some(author) => format!("{} • {}", author, self.display_published()),
            None => self.display_published(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_raw(title: &str) -> RawArticle {
    RawArticle {
        author: Some("Desk".into()),
        title: title.into(),
        description: Some(format!("About {}", title)),
        content: None,
        published_at: "2024-03-01T12:30:00Z".into(),
        source: SourceRef {
            id: None,
            name: "Wire".into(),
        },
        url: format!("https://news.example.com/{}", title),
        url_to_image: None,
    }
}
