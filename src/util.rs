pub mod date;

pub const USER_AGENT: &str =
  concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Missing {0} environment variable")]
  Missing(&'static str),

  #[error("Invalid URL in {0}: {1}")]
  InvalidUrl(&'static str, url::ParseError),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("RSS feed error: {0}")]
  Rss(#[from] rss::Error),

  #[error("Atom feed error: {0}")]
  Atom(#[from] atom_syndication::Error),

  #[error("Invalid URL {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("Feed parsing error: {0}")]
  FeedParse(&'static str),

  #[error("HTTP request failed: {0}")]
  Reqwest(#[from] reqwest::Error),

  #[error("HTTP status error {0} (url: {1})")]
  HttpStatus(reqwest::StatusCode, url::Url),

  #[error("{method} failed with status {status}: {message}")]
  Xrpc {
    method: &'static str,
    status: reqwest::StatusCode,
    message: String,
  },

  #[error("Image error: {0}")]
  Image(#[from] image::ImageError),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("{0}")]
  Config(#[from] ConfigError),

  #[error("{0}")]
  Message(String),
}
