use crate::feed::FeedEntry;
use crate::html::first_image_src;

/// Where the thumbnail of an entry comes from: an image enclosure if
/// there is one, otherwise the first `<img>` of the content, then of
/// the summary.
pub fn candidate_url(entry: &FeedEntry) -> Option<String> {
  if let Some(enclosure) = entry.enclosure.as_ref().filter(|e| e.is_image()) {
    return Some(enclosure.url.clone());
  }

  entry
    .bodies()
    .find_map(|body| first_image_src(body, Some(&entry.link)))
}
