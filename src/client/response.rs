use mime::Mime;
use reqwest::header::HeaderMap;
use url::Url;

use crate::util::{Error, Result};

/// A fully buffered response. Feeds and thumbnails are small enough to
/// hold in memory, and the thumbnail path needs the byte length before
/// deciding whether to re-encode.
pub struct Response {
  url: Url,
  status: reqwest::StatusCode,
  headers: HeaderMap,
  body: Vec<u8>,
}

impl Response {
  pub async fn from_reqwest_resp(resp: reqwest::Response) -> Result<Self> {
    let status = resp.status();
    let headers = resp.headers().clone();
    let url = resp.url().clone();
    let body = resp.bytes().await?.to_vec();

    Ok(Self {
      url,
      status,
      headers,
      body,
    })
  }

  pub fn error_for_status(self) -> Result<Self> {
    let status = self.status;
    if status.is_client_error() || status.is_server_error() {
      return Err(Error::HttpStatus(status, self.url));
    }

    Ok(self)
  }

  pub fn header(&self, name: &str) -> Option<&str> {
    self.headers.get(name).and_then(|v| v.to_str().ok())
  }

  pub fn content_type(&self) -> Option<Mime> {
    self.header("content-type").and_then(|v| v.parse().ok())
  }

  pub fn url(&self) -> &Url {
    &self.url
  }

  pub fn status(&self) -> reqwest::StatusCode {
    self.status
  }

  pub fn body(&self) -> &[u8] {
    &self.body
  }

  pub fn into_body(self) -> Vec<u8> {
    self.body
  }
}
