use http::StatusCode;
use tracing::{info, warn};

use crate::client::Client;
use crate::compose::compose;
use crate::config::{RunConfig, Settings};
use crate::cutoff::resolve_cutoff;
use crate::error::{into_http, log_failure};
use crate::feed::FeedEntry;
use crate::selector::select_new_entries;
use crate::social::bsky::BskyClient;
use crate::social::{BlobRef, BoxedPlatform};
use crate::thumbnail::{LadderPolicy, ThumbnailEncoder, candidate_url};
use crate::util::Result;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
  pub fetched: usize,
  pub selected: usize,
  pub posted: usize,
  pub with_thumbnail: usize,
}

/// One run: fetch the feed, find what is new since the last post and
/// publish it, oldest first, one entry at a time.
pub struct Publisher {
  config: RunConfig,
  client: Client,
  platform: BoxedPlatform,
  thumbnails: ThumbnailEncoder,
}

impl Publisher {
  pub fn new(config: RunConfig, platform: BoxedPlatform) -> Result<Self> {
    let client = config.client.build()?;
    let thumbnails =
      ThumbnailEncoder::new(client.clone(), LadderPolicy::default());

    Ok(Self {
      config,
      client,
      platform,
      thumbnails,
    })
  }

  pub async fn run(&mut self) -> Result<RunReport> {
    let feed_url = &self.config.feed_url;
    let entries = self.client.fetch_feed(feed_url).await?.into_entries();
    info!(url = %feed_url, entries = entries.len(), "fetched feed");

    let mut report = RunReport {
      fetched: entries.len(),
      ..Default::default()
    };

    self
      .platform
      .authenticate(&self.config.identifier, &self.config.secret)
      .await?;
    let cutoff = resolve_cutoff(&*self.platform).await?;
    info!(%cutoff, "resolved cutoff");

    let selected = select_new_entries(entries, cutoff);
    report.selected = selected.len();
    if selected.is_empty() {
      info!("No new RSS items to post");
      return Ok(report);
    }

    for entry in &selected {
      let has_thumbnail = self.publish_entry(entry).await?;
      if !self.config.dry_run {
        report.posted += 1;
      }
      if has_thumbnail {
        report.with_thumbnail += 1;
      }
    }

    Ok(report)
  }

  /// Publish one entry. Returns whether it went out with a thumbnail.
  async fn publish_entry(&self, entry: &FeedEntry) -> Result<bool> {
    let thumbnail = self.thumbnail_for(entry).await;
    let post = compose(entry, thumbnail);
    let has_thumbnail = post.thumbnail.is_some();

    if self.config.dry_run {
      info!(
        link = %post.uri,
        title = %post.title,
        created_at = %post.created_at,
        "dry run, not posting"
      );
      return Ok(has_thumbnail);
    }

    let posted = self.platform.submit_post(&post.to_record()).await?;
    info!(
      link = %post.uri,
      created_at = %post.created_at,
      thumbnail = has_thumbnail,
      uri = %posted.uri,
      "posted entry"
    );
    Ok(has_thumbnail)
  }

  async fn thumbnail_for(&self, entry: &FeedEntry) -> Option<BlobRef> {
    let url = candidate_url(entry)?;
    let thumbnail = self.thumbnails.encode(&url).await?;

    if self.config.dry_run {
      info!(
        url,
        size = thumbnail.bytes.len(),
        mime_type = %thumbnail.mime_type,
        "dry run, not uploading thumbnail"
      );
      return None;
    }

    match self
      .platform
      .upload_blob(thumbnail.bytes, &thumbnail.mime_type)
      .await
    {
      Ok(blob) => Some(blob),
      Err(e) => {
        warn!(url, "thumbnail upload failed: {}", e);
        None
      }
    }
  }
}

/// The invocation contract: no input, a status code and a short body.
pub async fn invoke(settings: &Settings) -> (StatusCode, String) {
  invoke_with(settings, |config| {
    let client = config.client.build_reqwest()?;
    Ok(Box::new(BskyClient::new(config.service_url.clone(), client)))
  })
  .await
}

pub async fn invoke_with<F>(
  settings: &Settings,
  make_platform: F,
) -> (StatusCode, String)
where
  F: FnOnce(&RunConfig) -> Result<BoxedPlatform>,
{
  let outcome = run_once(settings, make_platform).await;
  match &outcome {
    Ok(report) => info!(?report, "run finished"),
    Err(e) => log_failure(e),
  }
  into_http(outcome.map(|_| ()))
}

async fn run_once<F>(settings: &Settings, make_platform: F) -> Result<RunReport>
where
  F: FnOnce(&RunConfig) -> Result<BoxedPlatform>,
{
  let config = settings.validate()?;
  let platform = make_platform(&config)?;
  Publisher::new(config, platform)?.run().await
}
