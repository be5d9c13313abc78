mod entry;
mod extension;

use chrono::{DateTime, FixedOffset};
use tracing::warn;

use crate::util::Result;

use extension::ExtensionExt;

pub use entry::{Enclosure, FeedEntry};

#[derive(Clone, Debug, PartialEq)]
pub enum Feed {
  Rss(rss::Channel),
  Atom(atom_syndication::Feed),
}

impl Feed {
  pub fn from_rss_content(content: &[u8]) -> Result<Self> {
    let cursor = std::io::Cursor::new(content);
    let channel = rss::Channel::read_from(cursor)?;
    Ok(Feed::Rss(channel))
  }

  pub fn from_atom_content(content: &[u8]) -> Result<Self> {
    let cursor = std::io::Cursor::new(content);
    let feed = atom_syndication::Feed::read_from(cursor)?;
    Ok(Feed::Atom(feed))
  }

  pub fn from_xml_content(content: &[u8]) -> Result<Self> {
    Feed::from_rss_content(content)
      .or_else(|_| Feed::from_atom_content(content))
  }

  pub fn take_posts(&mut self) -> Vec<Post> {
    match self {
      Feed::Rss(channel) => {
        let posts = channel.items.split_off(0);
        posts.into_iter().map(Post::Rss).collect()
      }
      Feed::Atom(feed) => {
        let posts = feed.entries.split_off(0);
        posts.into_iter().map(Post::Atom).collect()
      }
    }
  }

  /// Normalize every item into a [`FeedEntry`], keeping document order.
  /// Items without a link cannot become a link card and are dropped.
  pub fn into_entries(mut self) -> Vec<FeedEntry> {
    self
      .take_posts()
      .into_iter()
      .filter_map(|post| match FeedEntry::try_from(post) {
        Ok(entry) => Some(entry),
        Err(e) => {
          warn!("skipping feed item: {}", e);
          None
        }
      })
      .collect()
  }
}

#[derive(Clone, Debug)]
pub enum Post {
  Rss(rss::Item),
  Atom(atom_syndication::Entry),
}

enum PostField {
  Title,
  Link,
}

impl Post {
  fn get_field(&self, field: PostField) -> Option<&str> {
    match (self, field) {
      (Post::Rss(item), PostField::Title) => item.title.as_deref(),
      (Post::Rss(item), PostField::Link) => item.link.as_deref(),
      (Post::Atom(item), PostField::Title) => Some(&item.title.value),
      (Post::Atom(item), PostField::Link) => item
        .links
        .iter()
        .find(|l| l.rel == "alternate")
        .or_else(|| item.links.first())
        .map(|v| v.href.as_str()),
    }
  }

  /// The date as the feed format defines it: `pubDate` (or `dc:date`)
  /// in RSS, `published` (or `updated`) in Atom.
  pub fn normalized_date(&self) -> Option<DateTime<FixedOffset>> {
    match self {
      Post::Rss(item) => item
        .pub_date
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc2822(s.trim()).ok())
        .or_else(|| {
          item
            .dublin_core_ext
            .as_ref()
            .and_then(|dc| dc.dates.first())
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        }),
      Post::Atom(item) => Some(item.published.unwrap_or(item.updated)),
    }
  }

  /// The unparsed publish date, for feeds whose dates are not quite
  /// RFC 2822. Atom dates are always typed, so there is none.
  pub fn raw_date(&self) -> Option<&str> {
    match self {
      Post::Rss(item) => item.pub_date.as_deref(),
      Post::Atom(_) => None,
    }
  }

  pub fn content(&self) -> Option<&str> {
    match self {
      Post::Rss(item) => item.content.as_deref(),
      Post::Atom(item) => item.content.as_ref().and_then(|c| c.value.as_deref()),
    }
  }

  pub fn summary(&self) -> Option<&str> {
    match self {
      Post::Rss(item) => item.description.as_deref(),
      Post::Atom(item) => item.summary.as_ref().map(|s| s.value.as_str()),
    }
  }

  /// The native enclosure of the item, falling back to the first
  /// `media:content` element.
  pub fn enclosure(&self) -> Option<Enclosure> {
    let native = match self {
      Post::Rss(item) => item.enclosure.as_ref().map(|e| Enclosure {
        url: e.url.clone(),
        mime_type: non_empty(&e.mime_type),
      }),
      Post::Atom(item) => item
        .links
        .iter()
        .find(|l| l.rel == "enclosure")
        .map(|l| Enclosure {
          url: l.href.clone(),
          mime_type: l.mime_type.as_deref().and_then(non_empty),
        }),
    };

    native.or_else(|| self.media_content())
  }

  fn media_content(&self) -> Option<Enclosure> {
    let tags = match self {
      Post::Rss(item) => item.extensions.tags_with_names(&["media:content"]),
      Post::Atom(item) => item.extensions.tags_with_names(&["media:content"]),
    };

    tags.into_iter().find_map(|tag| {
      let url = tag.attrs.get("url")?;
      let mime_type = tag.attrs.get("type").and_then(|t| non_empty(t));
      let is_image = tag.attrs.get("medium").is_some_and(|m| m == "image");
      let mime_type = match mime_type {
        None if is_image => Some("image/*".to_string()),
        other => other,
      };
      Some(Enclosure {
        url: url.clone(),
        mime_type,
      })
    })
  }
}

macro_rules! impl_post_accessors {
  ($($key:ident => $field:ident);*) => {
    impl Post {
      $(
      pub fn $key(&self) -> Option<&str> {
        self.get_field(PostField::$field)
      }
      )*
    }
  };
}

impl_post_accessors! {
  title => Title;
  link => Link
}

fn non_empty(s: &str) -> Option<String> {
  let s = s.trim();
  (!s.is_empty()).then(|| s.to_string())
}
