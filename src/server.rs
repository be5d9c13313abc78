use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use clap::Parser;
use http::StatusCode;
use tracing::info;

use crate::config::Settings;
use crate::error::Result;
use crate::pipeline;

#[derive(Parser)]
pub struct ServerConfig {
  #[clap(long, short, default_value = "127.0.0.1:4080")]
  bind: String,
  #[clap(flatten)]
  settings: Settings,
}

pub async fn serve(server_config: ServerConfig) -> Result<()> {
  // refuse to start with settings every run would reject
  server_config.settings.validate()?;

  info!("listening on {}", server_config.bind);
  let listener = tokio::net::TcpListener::bind(&server_config.bind).await?;
  let app = router(Arc::new(server_config.settings));

  info!("starting server");
  Ok(axum::serve(listener, app).await?)
}

pub fn router(settings: Arc<Settings>) -> Router {
  Router::new()
    .route("/", get(run_handler).post(run_handler))
    .route("/health", get(|| async { "ok" }))
    .fallback(|| async { (StatusCode::NOT_FOUND, "Endpoint not found") })
    .layer(Extension(settings))
}

async fn run_handler(
  Extension(settings): Extension<Arc<Settings>>,
) -> (StatusCode, String) {
  pipeline::invoke(&settings).await
}

#[cfg(test)]
mod test {
  use axum::body::{Body, to_bytes};
  use tower::ServiceExt;

  use super::*;

  async fn call(method: &str, uri: &str) -> (StatusCode, String) {
    let app = router(Arc::new(Settings::default()));
    let req = http::Request::builder()
      .method(method)
      .uri(uri)
      .body(Body::empty())
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
  }

  #[tokio::test]
  async fn test_health() {
    assert_eq!(call("GET", "/health").await, (StatusCode::OK, "ok".into()));
  }

  #[tokio::test]
  async fn test_run_reports_config_error() {
    for method in ["GET", "POST"] {
      let (status, body) = call(method, "/").await;
      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
      assert_eq!(body, "Error: Missing RSS_FEED_URL environment variable");
    }
  }

  #[tokio::test]
  async fn test_unknown_path() {
    let (status, _) = call("GET", "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
