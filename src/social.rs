pub mod bsky;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::util::Result;

pub const POST_COLLECTION: &str = "app.bsky.feed.post";
pub const EXTERNAL_EMBED: &str = "app.bsky.embed.external";

/// The capabilities a run needs from the destination network.
#[async_trait::async_trait]
pub trait SocialPlatform: Send + Sync {
  async fn authenticate(&mut self, identifier: &str, secret: &str)
  -> Result<()>;

  /// One page of the authenticated account's history, newest first.
  /// Pass the cursor of the previous page to continue past it.
  async fn recent_posts(
    &self,
    limit: usize,
    cursor: Option<&str>,
  ) -> Result<HistoryPage>;

  async fn upload_blob(&self, bytes: Vec<u8>, mime_type: &str)
  -> Result<BlobRef>;

  async fn submit_post(&self, record: &PostRecord) -> Result<PostRef>;
}

pub type BoxedPlatform = Box<dyn SocialPlatform>;

#[derive(Debug, Clone, PartialEq)]
pub struct RecentPost {
  pub uri: String,
  /// `createdAt` from the post record itself
  pub created_at: DateTime<FixedOffset>,
  /// When the app view indexed the post; informational only
  pub indexed_at: Option<DateTime<FixedOffset>>,
  pub is_repost: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryPage {
  pub posts: Vec<RecentPost>,
  /// `None` once the history is exhausted
  pub cursor: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CidLink {
  #[serde(rename = "$link")]
  pub link: String,
}

/// Blob object returned by an upload. It is opaque to us and goes back
/// into the embed unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlobRef {
  #[serde(rename = "$type")]
  pub kind: String,
  #[serde(rename = "ref")]
  pub cid: CidLink,
  pub mime_type: String,
  pub size: u64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
  #[serde(rename = "$type")]
  pub kind: &'static str,
  pub text: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub embed: Option<Embed>,
  pub created_at: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Embed {
  #[serde(rename = "$type")]
  pub kind: &'static str,
  pub external: External,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct External {
  pub uri: String,
  pub title: String,
  pub description: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub thumb: Option<BlobRef>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PostRef {
  pub uri: String,
}
