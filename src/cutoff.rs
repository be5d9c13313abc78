use std::fmt;

use chrono::DateTime;
use tracing::{debug, info};

use crate::social::SocialPlatform;
use crate::util::{Error, Result};

/// Posts requested per history page. Reposts show up in the same
/// listing as the account's own posts.
pub const HISTORY_PAGE_SIZE: usize = 10;

/// Pages to walk before giving up on finding an own post.
pub const MAX_HISTORY_PAGES: usize = 50;

/// Epoch millis of the newest post already on the account. Entries at or
/// before it count as published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cutoff(i64);

impl Cutoff {
  pub const ZERO: Cutoff = Cutoff(0);

  pub fn from_millis(millis: i64) -> Self {
    Self(millis)
  }

  pub fn millis(&self) -> i64 {
    self.0
  }

  pub fn is_before(&self, millis: i64) -> bool {
    millis > self.0
  }
}

impl fmt::Display for Cutoff {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match DateTime::from_timestamp_millis(self.0) {
      Some(date) if self.0 != 0 => write!(f, "{}", date.to_rfc3339()),
      _ => write!(f, "{}ms", self.0),
    }
  }
}

/// Look up the creation time of the account's most recent own post,
/// paging past reposts. Zero only when the history holds no own post at
/// all. Lookup errors propagate, and so does a history too long to
/// decide: guessing a cutoff would repost the feed.
pub async fn resolve_cutoff(platform: &dyn SocialPlatform) -> Result<Cutoff> {
  let mut cursor: Option<String> = None;
  let mut seen = 0;

  for _ in 0..MAX_HISTORY_PAGES {
    let page = platform
      .recent_posts(HISTORY_PAGE_SIZE, cursor.as_deref())
      .await?;
    seen += page.posts.len();

    if let Some(latest) = page.posts.iter().find(|post| !post.is_repost) {
      debug!(
        uri = %latest.uri,
        created_at = %latest.created_at,
        indexed_at = ?latest.indexed_at,
        skipped = seen - page.posts.len(),
        "latest post"
      );
      return Ok(Cutoff(latest.created_at.timestamp_millis()));
    }

    match page.cursor {
      Some(next) => cursor = Some(next),
      None => {
        info!(seen, "no previous posts found, every entry is new");
        return Ok(Cutoff::ZERO);
      }
    }
  }

  Err(Error::Message(format!(
    "no own post among the latest {seen} history items, refusing to guess a cutoff"
  )))
}
