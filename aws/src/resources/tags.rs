//! Tag map helpers shared by taggable resources

use crate::api::Tag;
use std::collections::BTreeMap;

pub fn tags_from(tags: &[Tag]) -> BTreeMap<String, String> {
    tags.iter()
        .map(|t| (t.key.clone(), t.value.clone()))
        .collect()
}

pub fn tags_to(tags: &BTreeMap<String, String>) -> Vec<Tag> {
    tags.iter().map(|(k, v)| Tag::new(k, v)).collect()
}

/// Tags to remove and tags to create to get from `old` to `new`.
///
/// A changed value shows up in both: the old pair is removed and the new one
/// created.
pub fn diff_tags(
    old: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
) -> (Vec<Tag>, Vec<Tag>) {
    let remove = old
        .iter()
        .filter(|(k, v)| new.get(*k) != Some(*v))
        .map(|(k, v)| Tag::new(k, v))
        .collect();
    let create = new
        .iter()
        .filter(|(k, v)| old.get(*k) != Some(*v))
        .map(|(k, v)| Tag::new(k, v))
        .collect();
    (remove, create)
}
