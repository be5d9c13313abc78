use chrono::{DateTime, FixedOffset, Utc};

use crate::feed::FeedEntry;
use crate::social::{
  BlobRef, EXTERNAL_EMBED, Embed, External, POST_COLLECTION, PostRecord,
};
use crate::util::date::to_record_timestamp;

/// A link card post for one feed entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundPost {
  pub uri: String,
  pub title: String,
  pub description: String,
  pub thumbnail: Option<BlobRef>,
  pub created_at: DateTime<FixedOffset>,
}

pub fn compose(entry: &FeedEntry, thumbnail: Option<BlobRef>) -> OutboundPost {
  compose_at(entry, thumbnail, Utc::now().fixed_offset())
}

/// Like [`compose`], with `now` standing in for undated entries.
pub fn compose_at(
  entry: &FeedEntry,
  thumbnail: Option<BlobRef>,
  now: DateTime<FixedOffset>,
) -> OutboundPost {
  let title = if entry.title.trim().is_empty() {
    entry.link.clone()
  } else {
    entry.title.clone()
  };

  OutboundPost {
    uri: entry.link.clone(),
    title,
    description: entry.snippet().unwrap_or_default(),
    thumbnail,
    created_at: entry.effective_date().unwrap_or(now),
  }
}

impl OutboundPost {
  pub fn to_record(&self) -> PostRecord {
    PostRecord {
      kind: POST_COLLECTION,
      text: String::new(),
      embed: Some(Embed {
        kind: EXTERNAL_EMBED,
        external: External {
          uri: self.uri.clone(),
          title: self.title.clone(),
          description: self.description.clone(),
          thumb: self.thumbnail.clone(),
        },
      }),
      created_at: to_record_timestamp(&self.created_at),
    }
  }
}
