use std::time::Duration;

use clap::Args;
use clap::builder::BoolishValueParser;
use url::Url;

use crate::client::ClientConfig;
use crate::social::bsky::DEFAULT_SERVICE;
use crate::util::{ConfigError, Result};

/// Process settings. Every flag can also come from the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct Settings {
  /// Feed to republish
  #[clap(long, env = "RSS_FEED_URL")]
  feed_url: Option<String>,

  /// AT Protocol service (PDS) to log in to
  #[clap(long, env = "BLUESKY_SERVICE_URL")]
  service_url: Option<String>,

  /// Account handle or email
  #[clap(long, env = "BLUESKY_USERNAME")]
  username: Option<String>,

  /// Account password (an app password is recommended)
  #[clap(long, env = "BLUESKY_PASSWORD", hide_env_values = true)]
  password: Option<String>,

  /// Timeout for every HTTP request (e.g. "10s", "1m")
  #[clap(long, env = "FETCH_TIMEOUT", value_parser = parse_duration)]
  timeout: Option<Duration>,

  /// User agent for feed and image requests
  #[clap(long, env = "FETCH_USER_AGENT")]
  user_agent: Option<String>,

  /// Log what would be posted without uploading or posting anything
  #[clap(long, env = "DRY_RUN", value_parser = BoolishValueParser::new())]
  dry_run: bool,
}

/// Settings after validation; everything a run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
  pub feed_url: Url,
  pub service_url: Url,
  pub identifier: String,
  pub secret: String,
  pub client: ClientConfig,
  pub dry_run: bool,
}

impl Settings {
  pub fn validate(&self) -> Result<RunConfig, ConfigError> {
    let feed_url = required("RSS_FEED_URL", &self.feed_url)?;
    let feed_url = Url::parse(feed_url)
      .map_err(|e| ConfigError::InvalidUrl("RSS_FEED_URL", e))?;

    let service_url = match non_blank(&self.service_url) {
      Some(url) => url,
      None => DEFAULT_SERVICE,
    };
    let service_url = Url::parse(service_url)
      .map_err(|e| ConfigError::InvalidUrl("BLUESKY_SERVICE_URL", e))?;

    let identifier = required("BLUESKY_USERNAME", &self.username)?;
    let secret = required("BLUESKY_PASSWORD", &self.password)?;

    let timeout = self
      .timeout
      .unwrap_or_else(|| ClientConfig::default().timeout());
    let user_agent = non_blank(&self.user_agent).map(String::from);
    let client = ClientConfig::new(user_agent, timeout);

    Ok(RunConfig {
      feed_url,
      service_url,
      identifier: identifier.to_string(),
      secret: secret.to_string(),
      client,
      dry_run: self.dry_run,
    })
  }
}

#[cfg(test)]
impl Settings {
  pub fn for_test(feed_url: &str) -> Self {
    Self {
      feed_url: Some(feed_url.to_string()),
      username: Some("me.example".into()),
      password: Some("pw".into()),
      ..Default::default()
    }
  }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(
  name: &'static str,
  value: &'a Option<String>,
) -> Result<&'a str, ConfigError> {
  non_blank(value).ok_or(ConfigError::Missing(name))
}

fn parse_duration(s: &str) -> Result<Duration, String> {
  duration_str::parse(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod test {
  use clap::{CommandFactory, FromArgMatches, Parser};

  use super::*;

  #[derive(Parser)]
  struct TestCli {
    #[clap(flatten)]
    settings: Settings,
  }

  fn parse(args: &[&str]) -> Settings {
    let argv = std::iter::once("feed2sky").chain(args.iter().copied());
    TestCli::try_parse_from(argv).unwrap().settings
  }

  const COMPLETE: &[&str] = &[
    "--feed-url",
    "https://example.com/feed.xml",
    "--username",
    "me.example",
    "--password",
    "hunter2",
  ];

  #[test]
  fn test_defaults() {
    let config = parse(COMPLETE).validate().unwrap();
    assert_eq!(config.feed_url.as_str(), "https://example.com/feed.xml");
    assert_eq!(config.service_url.as_str(), "https://bsky.social/");
    assert_eq!(config.identifier, "me.example");
    assert_eq!(config.secret, "hunter2");
    assert_eq!(config.client.timeout(), Duration::from_secs(10));
    assert!(!config.dry_run);
  }

  #[test]
  fn test_overrides() {
    let mut args = COMPLETE.to_vec();
    args.extend([
      "--service-url",
      "https://pds.example.net",
      "--timeout",
      "30s",
      "--dry-run",
    ]);
    let config = parse(&args).validate().unwrap();
    assert_eq!(config.service_url.as_str(), "https://pds.example.net/");
    assert_eq!(config.client.timeout(), Duration::from_secs(30));
    assert!(config.dry_run);
  }

  #[test]
  fn test_dry_run_accepts_boolish_values() {
    // environment values go through the same parser as defaults
    let parse_dry_run = |value: &'static str| {
      let matches = TestCli::command()
        .mut_arg("dry_run", |arg| arg.default_value(value))
        .try_get_matches_from(["feed2sky"])
        .unwrap();
      TestCli::from_arg_matches(&matches).unwrap().settings.dry_run
    };

    for value in ["1", "yes", "on", "true"] {
      assert!(parse_dry_run(value), "{value}");
    }
    for value in ["0", "no", "off", "false"] {
      assert!(!parse_dry_run(value), "{value}");
    }
    assert!(parse(&["--dry-run"]).dry_run);
  }

  #[test]
  fn test_missing_feed_url() {
    let settings = Settings {
      username: Some("me".into()),
      password: Some("pw".into()),
      ..Default::default()
    };
    let err = settings.validate().unwrap_err();
    assert!(matches!(err, ConfigError::Missing("RSS_FEED_URL")));
    assert_eq!(err.to_string(), "Missing RSS_FEED_URL environment variable");
  }

  #[test]
  fn test_blank_values_count_as_missing() {
    let settings = Settings {
      feed_url: Some("https://example.com/feed.xml".into()),
      username: Some("me".into()),
      password: Some("   ".into()),
      ..Default::default()
    };
    assert!(matches!(
      settings.validate(),
      Err(ConfigError::Missing("BLUESKY_PASSWORD"))
    ));
  }

  #[test]
  fn test_invalid_feed_url() {
    let settings = Settings {
      feed_url: Some("not a url".into()),
      ..Default::default()
    };
    assert!(matches!(
      settings.validate(),
      Err(ConfigError::InvalidUrl("RSS_FEED_URL", _))
    ));
  }
}
