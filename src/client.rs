mod response;

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::feed::Feed;
use crate::util::Result;

pub use self::response::Response;

#[derive(Debug, Clone)]
pub struct ClientConfig {
  user_agent: Option<String>,
  timeout: Duration,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      user_agent: None,
      timeout: default_timeout(),
    }
  }
}

impl ClientConfig {
  pub fn new(user_agent: Option<String>, timeout: Duration) -> Self {
    Self {
      user_agent,
      timeout,
    }
  }

  pub fn timeout(&self) -> Duration {
    self.timeout
  }

  fn to_builder(&self) -> reqwest::ClientBuilder {
    let mut builder = reqwest::Client::builder();

    if let Some(user_agent) = &self.user_agent {
      builder = builder.user_agent(user_agent);
    } else {
      builder = builder.user_agent(crate::util::USER_AGENT);
    }

    builder.timeout(self.timeout)
  }

  pub fn build_reqwest(&self) -> Result<reqwest::Client> {
    Ok(self.to_builder().build()?)
  }

  pub fn build(&self) -> Result<Client> {
    Ok(Client::new(self.build_reqwest()?))
  }
}

/// Plain GET client shared by the feed fetch and the thumbnail fetch.
#[derive(Clone)]
pub struct Client {
  client: reqwest::Client,
}

impl Client {
  fn new(client: reqwest::Client) -> Self {
    Self { client }
  }

  pub async fn get(&self, url: &Url) -> Result<Response> {
    let resp = self.client.get(url.clone()).send().await?;
    Response::from_reqwest_resp(resp).await
  }

  pub async fn fetch_feed(&self, url: &Url) -> Result<Feed> {
    let resp = self.get(url).await?.error_for_status()?;
    debug!(
      url = %url,
      bytes = resp.body().len(),
      content_type = ?resp.header("content-type"),
      "fetched feed"
    );
    Feed::from_xml_content(resp.body())
  }
}

fn default_timeout() -> Duration {
  Duration::from_secs(10)
}
