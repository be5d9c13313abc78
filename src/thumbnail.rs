mod extract;
pub mod ladder;

use tracing::{debug, info, warn};
use url::Url;

use crate::client::Client;
use crate::util::{Error, Result};

pub use extract::candidate_url;
pub use ladder::LadderPolicy;

/// Upper bound for an uploaded thumbnail, imposed by the destination's
/// blob limit for link card images.
pub const MAX_THUMB_BYTES: usize = 1_000_000;

const REENCODED_MIME: &str = "image/jpeg";

/// A fetched image before any size handling.
#[derive(Debug)]
pub struct CandidateImage {
  pub url: Url,
  pub raw_bytes: Vec<u8>,
  pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
  pub bytes: Vec<u8>,
  pub mime_type: String,
}

impl CandidateImage {
  /// Use the payload untouched, labelled with its declared type or,
  /// failing that, whatever the bytes look like.
  fn into_thumbnail(self) -> Thumbnail {
    let mime_type = self
      .mime_type
      .or_else(|| {
        image::guess_format(&self.raw_bytes)
          .ok()
          .map(|format| format.to_mime_type().to_string())
      })
      .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());

    Thumbnail {
      bytes: self.raw_bytes,
      mime_type,
    }
  }
}

pub struct ThumbnailEncoder {
  client: Client,
  policy: LadderPolicy,
}

impl ThumbnailEncoder {
  pub fn new(client: Client, policy: LadderPolicy) -> Self {
    Self { client, policy }
  }

  /// Fetch `url` and return a thumbnail within the ceiling. Every
  /// failure is logged and ends in `None`; a missing thumbnail never
  /// stops a post.
  pub async fn encode(&self, url: &str) -> Option<Thumbnail> {
    match self.try_encode(url).await {
      Ok(thumbnail) => thumbnail,
      Err(e) => {
        warn!(url, "dropping thumbnail: {}", e);
        None
      }
    }
  }

  async fn fetch(&self, url: &str) -> Result<Option<CandidateImage>> {
    let url = Url::parse(url)?;
    let resp = self.client.get(&url).await?;

    if !resp.status().is_success() {
      warn!(url = %url, status = %resp.status(), "thumbnail fetch failed");
      return Ok(None);
    }

    let mime_type = resp.content_type().map(|m| m.essence_str().to_string());
    Ok(Some(CandidateImage {
      url: resp.url().clone(),
      mime_type,
      raw_bytes: resp.into_body(),
    }))
  }

  async fn try_encode(&self, url: &str) -> Result<Option<Thumbnail>> {
    let Some(candidate) = self.fetch(url).await? else {
      return Ok(None);
    };

    let size = candidate.raw_bytes.len();
    if size <= self.policy.ceiling {
      debug!(url, size, "thumbnail fits, using original");
      return Ok(Some(candidate.into_thumbnail()));
    }

    info!(
      url = %candidate.url,
      size,
      ceiling = self.policy.ceiling,
      "thumbnail too large, re-encoding"
    );
    let policy = self.policy;
    let fitted = tokio::task::spawn_blocking(move || {
      ladder::shrink(&candidate.raw_bytes, &policy)
    })
    .await
    .map_err(|e| Error::Message(format!("thumbnail task panicked: {e}")))??;

    match fitted {
      Some(fitted) => {
        info!(
          url,
          size = fitted.bytes.len(),
          width = fitted.width,
          quality = fitted.quality,
          probes = fitted.probes,
          "thumbnail re-encoded"
        );
        Ok(Some(Thumbnail {
          bytes: fitted.bytes,
          mime_type: REENCODED_MIME.to_string(),
        }))
      }
      None => {
        warn!(url, size, "could not fit thumbnail under the ceiling");
        Ok(None)
      }
    }
  }
}
