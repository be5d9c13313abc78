use chrono::{DateTime, FixedOffset};

use crate::html::html_to_text;
use crate::util::date::parse_date;
use crate::util::{Error, Result};

use super::Post;

/// One feed item, reduced to what a link card needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedEntry {
  pub link: String,
  pub title: String,
  pub published_at: Option<DateTime<FixedOffset>>,
  pub raw_date: Option<String>,
  /// Full HTML body (`content:encoded` / Atom `content`)
  pub content: Option<String>,
  /// Short body (`description` / Atom `summary`)
  pub summary: Option<String>,
  pub enclosure: Option<Enclosure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enclosure {
  pub url: String,
  pub mime_type: Option<String>,
}

impl Enclosure {
  pub fn is_image(&self) -> bool {
    self
      .mime_type
      .as_deref()
      .is_some_and(|t| t.starts_with("image/"))
  }
}

impl FeedEntry {
  pub fn effective_date(&self) -> Option<DateTime<FixedOffset>> {
    self
      .published_at
      .or_else(|| self.raw_date.as_deref().and_then(parse_date))
  }

  /// Epoch millis of [`Self::effective_date`]; undated entries count as
  /// the epoch itself.
  pub fn timestamp_millis(&self) -> i64 {
    self
      .effective_date()
      .map(|d| d.timestamp_millis())
      .unwrap_or(0)
  }

  /// Plain-text teaser, taken from the summary if it has any text and
  /// from the full content otherwise.
  pub fn snippet(&self) -> Option<String> {
    [self.summary.as_deref(), self.content.as_deref()]
      .into_iter()
      .flatten()
      .map(html_to_text)
      .find(|text| !text.is_empty())
  }

  /// HTML bodies in the order they should be searched for images.
  pub fn bodies(&self) -> impl Iterator<Item = &str> {
    [self.content.as_deref(), self.summary.as_deref()]
      .into_iter()
      .flatten()
  }
}

impl TryFrom<Post> for FeedEntry {
  type Error = Error;

  fn try_from(post: Post) -> Result<Self> {
    let link = post
      .link()
      .ok_or(Error::FeedParse("missing link"))?
      .trim()
      .to_string();
    if link.is_empty() {
      return Err(Error::FeedParse("empty link"));
    }

    Ok(FeedEntry {
      title: post.title().unwrap_or_default().trim().to_string(),
      published_at: post.normalized_date(),
      raw_date: post.raw_date().map(|s| s.trim().to_string()),
      content: post.content().map(str::to_string),
      summary: post.summary().map(str::to_string),
      enclosure: post.enclosure(),
      link,
    })
  }
}
