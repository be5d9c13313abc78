use crate::cutoff::Cutoff;
use crate::feed::FeedEntry;

/// Entries strictly newer than `cutoff`, oldest first. A zero cutoff
/// means nothing was posted yet and selects every entry, undated ones
/// included; undated entries count as the epoch and sort first.
pub fn select_new_entries(
  entries: Vec<FeedEntry>,
  cutoff: Cutoff,
) -> Vec<FeedEntry> {
  let mut selected: Vec<(i64, FeedEntry)> = entries
    .into_iter()
    .map(|entry| (entry.timestamp_millis(), entry))
    .filter(|(ts, _)| cutoff == Cutoff::ZERO || cutoff.is_before(*ts))
    .collect();

  // stable, so entries sharing a timestamp keep feed order
  selected.sort_by_key(|(ts, _)| *ts);
  selected.into_iter().map(|(_, entry)| entry).collect()
}
