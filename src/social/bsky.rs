use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use super::{
  BlobRef, HistoryPage, PostRecord, PostRef, RecentPost, SocialPlatform,
};
use crate::util::date::parse_date;
use crate::util::{Error, Result};

pub const DEFAULT_SERVICE: &str = "https://bsky.social";

const CREATE_SESSION: &str = "com.atproto.server.createSession";
const GET_AUTHOR_FEED: &str = "app.bsky.feed.getAuthorFeed";
const UPLOAD_BLOB: &str = "com.atproto.repo.uploadBlob";
const CREATE_RECORD: &str = "com.atproto.repo.createRecord";

/// AT Protocol client speaking XRPC over HTTP to a PDS.
pub struct BskyClient {
  service: Url,
  client: reqwest::Client,
  session: Option<Session>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct Session {
  access_jwt: String,
  did: String,
  handle: String,
}

#[derive(Deserialize, Debug, Default)]
struct XrpcErrorBody {
  error: Option<String>,
  message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct AuthorFeed {
  feed: Vec<FeedViewPost>,
  #[serde(default)]
  cursor: Option<String>,
}

#[derive(Deserialize, Debug)]
struct FeedViewPost {
  post: PostView,
  #[serde(default)]
  reason: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PostView {
  uri: String,
  record: RecordView,
  indexed_at: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RecordView {
  created_at: String,
}

#[derive(Deserialize, Debug)]
struct UploadedBlob {
  blob: BlobRef,
}

#[derive(Serialize)]
struct CreateRecord<'a> {
  repo: &'a str,
  collection: &'static str,
  record: &'a PostRecord,
}

impl BskyClient {
  pub fn new(service: Url, client: reqwest::Client) -> Self {
    Self {
      service,
      client,
      session: None,
    }
  }

  fn xrpc_url(&self, method: &str) -> Result<Url> {
    Ok(self.service.join(&format!("/xrpc/{method}"))?)
  }

  fn session(&self) -> Result<&Session> {
    self
      .session
      .as_ref()
      .ok_or_else(|| Error::Message("not authenticated".into()))
  }

  async fn check(
    method: &'static str,
    resp: reqwest::Response,
  ) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }

    let body: XrpcErrorBody = resp.json().await.unwrap_or_default();
    let message = match (body.error, body.message) {
      (Some(error), Some(message)) => format!("{error}: {message}"),
      (Some(text), None) | (None, Some(text)) => text,
      (None, None) => status.to_string(),
    };

    Err(Error::Xrpc {
      method,
      status,
      message,
    })
  }
}

#[async_trait::async_trait]
impl SocialPlatform for BskyClient {
  async fn authenticate(
    &mut self,
    identifier: &str,
    secret: &str,
  ) -> Result<()> {
    let resp = self
      .client
      .post(self.xrpc_url(CREATE_SESSION)?)
      .json(&json!({ "identifier": identifier, "password": secret }))
      .send()
      .await?;
    let session: Session = Self::check(CREATE_SESSION, resp).await?.json().await?;

    info!(handle = %session.handle, did = %session.did, "authenticated");
    self.session = Some(session);
    Ok(())
  }

  async fn recent_posts(
    &self,
    limit: usize,
    cursor: Option<&str>,
  ) -> Result<HistoryPage> {
    let session = self.session()?;
    let limit = limit.to_string();
    let mut query =
      vec![("actor", session.did.as_str()), ("limit", limit.as_str())];
    if let Some(cursor) = cursor {
      query.push(("cursor", cursor));
    }

    let resp = self
      .client
      .get(self.xrpc_url(GET_AUTHOR_FEED)?)
      .query(&query)
      .bearer_auth(&session.access_jwt)
      .send()
      .await?;
    let feed: AuthorFeed = Self::check(GET_AUTHOR_FEED, resp).await?.json().await?;

    let posts = feed
      .feed
      .into_iter()
      .map(|item| -> Result<RecentPost> {
        let created_at =
          parse_date(&item.post.record.created_at).ok_or_else(|| {
            Error::Message(format!(
              "post {} has an unreadable createdAt {:?}",
              item.post.uri, item.post.record.created_at
            ))
          })?;
        Ok(RecentPost {
          created_at,
          indexed_at: item.post.indexed_at.as_deref().and_then(parse_date),
          is_repost: item.reason.is_some(),
          uri: item.post.uri,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    // an empty page ends the history even if a cursor came back
    let cursor = feed.cursor.filter(|_| !posts.is_empty());
    Ok(HistoryPage { posts, cursor })
  }

  async fn upload_blob(
    &self,
    bytes: Vec<u8>,
    mime_type: &str,
  ) -> Result<BlobRef> {
    let session = self.session()?;
    let size = bytes.len();
    let resp = self
      .client
      .post(self.xrpc_url(UPLOAD_BLOB)?)
      .bearer_auth(&session.access_jwt)
      .header(reqwest::header::CONTENT_TYPE, mime_type)
      .body(bytes)
      .send()
      .await?;
    let uploaded: UploadedBlob = Self::check(UPLOAD_BLOB, resp).await?.json().await?;

    debug!(size, mime_type, cid = %uploaded.blob.cid.link, "uploaded blob");
    Ok(uploaded.blob)
  }

  async fn submit_post(&self, record: &PostRecord) -> Result<PostRef> {
    let session = self.session()?;
    let body = CreateRecord {
      repo: &session.did,
      collection: super::POST_COLLECTION,
      record,
    };
    let resp = self
      .client
      .post(self.xrpc_url(CREATE_RECORD)?)
      .bearer_auth(&session.access_jwt)
      .json(&body)
      .send()
      .await?;

    Ok(Self::check(CREATE_RECORD, resp).await?.json().await?)
  }
}
