use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

/// PNG of deterministic noise. Noise compresses badly in every format,
/// which makes the byte size predictable from the pixel count.
pub fn noise_png(width: u32, height: u32) -> Vec<u8> {
  let mut state: u32 = 0x2545_f491;
  let mut next = move || {
    state ^= state << 13;
    state ^= state >> 17;
    state ^= state << 5;
    state
  };

  let img = RgbImage::from_fn(width, height, |_, _| {
    let v = next().to_le_bytes();
    Rgb([v[0], v[1], v[2]])
  });

  let mut buf = Vec::new();
  img
    .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
    .expect("failed to encode png");
  buf
}

pub struct Item<'a> {
  pub title: &'a str,
  pub link: &'a str,
  pub pub_date: Option<&'a str>,
  pub description: Option<&'a str>,
  pub enclosure: Option<(&'a str, &'a str)>,
}

impl<'a> Item<'a> {
  pub fn new(title: &'a str, link: &'a str, pub_date: &'a str) -> Self {
    Self {
      title,
      link,
      pub_date: Some(pub_date),
      description: None,
      enclosure: None,
    }
  }
}

/// Minimal RSS 2.0 document with the given items.
pub fn rss_feed(items: &[Item]) -> String {
  let mut xml = String::from(
    r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Test</title><link>https://example.com</link><description>Test feed</description>"#,
  );

  for item in items {
    xml.push_str("<item>");
    xml.push_str(&format!("<title>{}</title>", item.title));
    xml.push_str(&format!("<link>{}</link>", item.link));
    if let Some(date) = item.pub_date {
      xml.push_str(&format!("<pubDate>{date}</pubDate>"));
    }
    if let Some(description) = item.description {
      xml.push_str(&format!(
        "<description><![CDATA[{description}]]></description>"
      ));
    }
    if let Some((url, mime)) = item.enclosure {
      xml.push_str(&format!(
        r#"<enclosure url="{url}" length="0" type="{mime}"/>"#
      ));
    }
    xml.push_str("</item>");
  }

  xml.push_str("</channel></rss>");
  xml
}
