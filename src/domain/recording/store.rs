//! In-memory recording store

use std::path::Path;

use crate::domain::error::StoreError;

use super::Recording;

/// Ordered collection of recordings, newest capture first.
///
/// Unique by location. The ordering is re-established after every append;
/// renames never move an entry.
#[derive(Debug, Default)]
pub struct RecordingStore {
    recordings: Vec<Recording>,
}

impl RecordingStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            recordings: Vec::new(),
        }
    }

    /// All recordings, sorted by capture date descending
    pub fn recordings(&self) -> &[Recording] {
        &self.recordings
    }

    /// Number of recordings
    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    /// True when the store holds no recordings
    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    /// Index of the recording stored at `location`
    pub fn position_of(&self, location: &Path) -> Option<usize> {
        self.recordings
            .iter()
            .position(|r| r.location() == location)
    }

    /// Check whether a recording with this location exists
    pub fn contains(&self, location: &Path) -> bool {
        self.position_of(location).is_some()
    }

    /// Add a recording and re-sort.
    ///
    /// The new entry is placed first before the stable sort, so among equal
    /// capture dates the latest insertion wins the top spot.
    pub fn append(&mut self, recording: Recording) -> Result<(), StoreError> {
        if self.contains(recording.location()) {
            return Err(StoreError::DuplicateLocation(
                recording.location().to_string_lossy().to_string(),
            ));
        }

        self.recordings.insert(0, recording);
        self.recordings
            .sort_by(|a, b| b.capture_date().cmp(&a.capture_date()));
        Ok(())
    }

    /// Remove the recording stored at `location`
    pub fn remove(&mut self, location: &Path) -> Result<Recording, StoreError> {
        let index = self
            .position_of(location)
            .ok_or_else(|| StoreError::NotFound(location.to_string_lossy().to_string()))?;
        Ok(self.recordings.remove(index))
    }

    /// Change the title of the recording at `index`.
    /// Blank titles are rejected; surrounding whitespace is trimmed.
    pub fn rename(&mut self, index: usize, title: &str) -> Result<(), StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let len = self.recordings.len();
        let recording = self
            .recordings
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        recording.set_title(title.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::Duration;
    use chrono::{Local, TimeZone};
    use std::path::PathBuf;

    fn rec(name: &str, minute: u32) -> Recording {
        let date = Local.with_ymd_and_hms(2023, 3, 14, 10, minute, 0).unwrap();
        Recording::new(
            name,
            date,
            Duration::from_secs(1),
            PathBuf::from(format!("/tmp/{}", name)),
        )
    }

    fn is_sorted_descending(store: &RecordingStore) -> bool {
        store
            .recordings()
            .windows(2)
            .all(|w| w[0].capture_date() >= w[1].capture_date())
    }

    #[test]
    fn new_store_is_empty() {
        let store = RecordingStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn append_keeps_newest_first() {
        let mut store = RecordingStore::new();
        store.append(rec("b", 20)).unwrap();
        store.append(rec("a", 10)).unwrap();
        store.append(rec("c", 30)).unwrap();

        let titles: Vec<&str> = store.recordings().iter().map(|r| r.title()).collect();
        assert_eq!(titles, vec!["c", "b", "a"]);
    }

    #[test]
    fn sorted_after_every_append_in_mixed_sequence() {
        let mut store = RecordingStore::new();
        let minutes = [5, 50, 1, 33, 33, 12, 59, 0];

        for (i, minute) in minutes.iter().enumerate() {
            store.append(rec(&format!("r{}", i), *minute)).unwrap();
            assert!(is_sorted_descending(&store));

            if i % 3 == 2 {
                store.rename(0, "renamed").unwrap();
                assert!(is_sorted_descending(&store));
            }
        }

        store.remove(Path::new("/tmp/r3")).unwrap();
        assert!(is_sorted_descending(&store));
        assert_eq!(store.len(), minutes.len() - 1);
    }

    #[test]
    fn equal_dates_put_latest_insertion_first() {
        let mut store = RecordingStore::new();
        store.append(rec("first", 10)).unwrap();
        store.append(rec("second", 10)).unwrap();
        assert_eq!(store.recordings()[0].title(), "second");
    }

    #[test]
    fn append_rejects_duplicate_location() {
        let mut store = RecordingStore::new();
        store.append(rec("a", 10)).unwrap();

        let err = store.append(rec("a", 11)).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateLocation(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_existing() {
        let mut store = RecordingStore::new();
        store.append(rec("a", 10)).unwrap();
        store.append(rec("b", 11)).unwrap();

        let removed = store.remove(Path::new("/tmp/a")).unwrap();
        assert_eq!(removed.title(), "a");
        assert_eq!(store.len(), 1);
        assert!(!store.contains(Path::new("/tmp/a")));
    }

    #[test]
    fn remove_missing_does_not_mutate() {
        let mut store = RecordingStore::new();
        store.append(rec("a", 10)).unwrap();

        let err = store.remove(Path::new("/tmp/missing")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn rename_changes_only_title() {
        let mut store = RecordingStore::new();
        store.append(rec("a", 10)).unwrap();
        store.append(rec("b", 20)).unwrap();
        let before = store.recordings()[1].clone();

        store.rename(1, "  Shopping list  ").unwrap();

        let after = &store.recordings()[1];
        assert_eq!(after.title(), "Shopping list");
        assert_eq!(after.capture_date(), before.capture_date());
        assert_eq!(after.duration(), before.duration());
        assert_eq!(after.location(), before.location());
        assert_eq!(store.recordings()[0].title(), "b");
    }

    #[test]
    fn rename_out_of_range() {
        let mut store = RecordingStore::new();
        let err = store.rename(0, "x").unwrap_err();
        assert!(matches!(
            err,
            StoreError::IndexOutOfRange { index: 0, len: 0 }
        ));
    }

    #[test]
    fn rename_rejects_blank_title() {
        let mut store = RecordingStore::new();
        store.append(rec("a", 10)).unwrap();

        assert!(matches!(store.rename(0, "   "), Err(StoreError::EmptyTitle)));
        assert_eq!(store.recordings()[0].title(), "a");
    }
}
