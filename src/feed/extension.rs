use std::collections::BTreeMap;

pub struct TagRef<'a> {
  pub name: &'a String,
  pub attrs: &'a BTreeMap<String, String>,
}

/// Flattened, read-only view over the extension elements of an item.
/// Names keep their namespace prefix, e.g. `media:content`.
pub trait ExtensionExt {
  fn tags(&self) -> Vec<TagRef<'_>>;

  fn tags_with_names(&self, names: &[&str]) -> Vec<TagRef<'_>> {
    self
      .tags()
      .into_iter()
      .filter(|tag| names.contains(&tag.name.as_str()))
      .collect()
  }
}

macro_rules! impl_extension_ext {
  ($ty:ty) => {
    impl ExtensionExt for $ty {
      fn tags(&self) -> Vec<TagRef<'_>> {
        let tag = TagRef {
          name: &self.name,
          attrs: &self.attrs,
        };

        let mut tags = vec![tag];
        for children in self.children.values() {
          tags.extend(children.iter().flat_map(|ext| ext.tags()));
        }
        tags
      }
    }
  };
}

// Same shape, different crates.
impl_extension_ext!(atom_syndication::extension::Extension);
impl_extension_ext!(rss::extension::Extension);

impl<T> ExtensionExt for BTreeMap<String, BTreeMap<String, Vec<T>>>
where
  T: ExtensionExt,
{
  fn tags(&self) -> Vec<TagRef<'_>> {
    self
      .values()
      .flat_map(|children| {
        children
          .values()
          .flat_map(|exts| exts.iter().flat_map(|ext| ext.tags()))
      })
      .collect()
  }
}
