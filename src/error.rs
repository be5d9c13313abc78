use http::StatusCode;

pub use anyhow::Result;

use crate::util::Error;

pub const SUCCESS_MESSAGE: &str = "RSS processed successfully";

/// Map the outcome of a run to the status and body of the invocation
/// contract. Detail stays in the log; the body only carries the message.
pub fn into_http(outcome: crate::util::Result<()>) -> (StatusCode, String) {
  match outcome {
    Ok(()) => (StatusCode::OK, SUCCESS_MESSAGE.to_string()),
    Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}")),
  }
}

pub fn log_failure(e: &Error) {
  let mut source = std::error::Error::source(e);
  let mut chain = Vec::new();
  while let Some(cause) = source {
    chain.push(cause.to_string());
    source = cause.source();
  }
  tracing::error!(error = %e, causes = ?chain, "run failed");
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::util::ConfigError;

  #[test]
  fn test_into_http() {
    assert_eq!(
      into_http(Ok(())),
      (StatusCode::OK, "RSS processed successfully".to_string())
    );

    let err = Error::Config(ConfigError::Missing("RSS_FEED_URL"));
    assert_eq!(
      into_http(Err(err)),
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Error: Missing RSS_FEED_URL environment variable".to_string()
      )
    );
  }
}
