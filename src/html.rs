use scraper::{Html, Selector};
use url::Url;

lazy_static::lazy_static! {
  static ref IMG_SRC: Selector =
    Selector::parse("img[src]").expect("bad selector");
}

/// The `src` of the first `<img>` in an HTML fragment. Relative values
/// are resolved against `base` when it is given and parses.
pub fn first_image_src(html: &str, base: Option<&str>) -> Option<String> {
  let fragment = Html::parse_fragment(html);
  let src = fragment
    .select(&IMG_SRC)
    .filter_map(|img| img.value().attr("src"))
    .map(str::trim)
    .find(|src| !src.is_empty())?;

  let resolved = base
    .and_then(|base| Url::parse(base).ok())
    .and_then(|base| base.join(src).ok())
    .map(String::from);

  Some(resolved.unwrap_or_else(|| src.to_string()))
}

/// Text content of an HTML fragment with whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
  let fragment = Html::parse_fragment(html);
  let text: Vec<&str> = fragment.root_element().text().collect();
  text.concat().split_whitespace().collect::<Vec<_>>().join(" ")
}
