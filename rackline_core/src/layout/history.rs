//! # Undo/Redo History
//!
//! A linear list of [`HistoryEntry`] values with a cursor. Recording a new
//! entry discards everything after the cursor, so redo is lost on a fresh
//! edit. The list is capped; the oldest entry is evicted first.
//!
//! ```text
//! record(e3) with cursor at e1:   [e0, e1, e2]  ->  [e0, e1, e3]
//!                                       ^                  ^
//! ```

use serde::Serialize;

use crate::errors::{CalcError, CalcResult};
use crate::layout::model::{Connection, LayoutSnapshot, Module};

/// Default history cap
pub const MAX_HISTORY_ENTRIES: usize = 50;

/// One restorable editor state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub snapshot: LayoutSnapshot,
    pub selected_module_id: Option<String>,
    /// Unsaved-changes flag when the entry was recorded. Restoring an entry
    /// recomputes the flag against the latest save instead.
    pub has_changes: bool,
    /// Canonical JSON of `snapshot`
    #[serde(skip)]
    fingerprint: String,
}

impl HistoryEntry {
    pub fn new(
        snapshot: LayoutSnapshot,
        selected_module_id: Option<String>,
        has_changes: bool,
    ) -> CalcResult<Self> {
        let fingerprint = snapshot.fingerprint()?;
        Ok(HistoryEntry {
            snapshot,
            selected_module_id,
            has_changes,
            fingerprint,
        })
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn modules(&self) -> &[Module] {
        &self.snapshot.modules
    }

    pub fn connections(&self) -> &[Connection] {
        &self.snapshot.connections
    }
}

/// Bounded linear history with a cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
    max_entries: usize,
}

impl History {
    /// History holding only `initial`. A cap of zero is treated as one.
    pub fn new(initial: HistoryEntry, max_entries: usize) -> Self {
        History {
            entries: vec![initial],
            index: 0,
            max_entries: max_entries.max(1),
        }
    }

    /// Entry under the cursor.
    pub fn current(&self) -> CalcResult<&HistoryEntry> {
        self.entries.get(self.index).ok_or_else(|| {
            CalcError::history(format!(
                "no entry at index {} (history holds {})",
                self.index,
                self.entries.len()
            ))
        })
    }

    /// Append `entry` unless its snapshot matches the current entry.
    ///
    /// Returns `Ok(false)` when nothing was recorded.
    pub fn record(&mut self, entry: HistoryEntry) -> CalcResult<bool> {
        if self.current()?.fingerprint == entry.fingerprint {
            return Ok(false);
        }

        self.entries.truncate(self.index + 1);
        self.entries.push(entry);
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
        self.index = self.entries.len() - 1;
        Ok(true)
    }

    /// Step back. `Ok(None)` at the oldest entry.
    pub fn undo(&mut self) -> CalcResult<Option<&HistoryEntry>> {
        if self.index == 0 {
            return Ok(None);
        }
        let target = self.index - 1;
        self.entry_at(target)?;
        self.index = target;
        self.current().map(Some)
    }

    /// Step forward. `Ok(None)` at the newest entry.
    pub fn redo(&mut self) -> CalcResult<Option<&HistoryEntry>> {
        if self.index + 1 >= self.entries.len() {
            return Ok(None);
        }
        let target = self.index + 1;
        self.entry_at(target)?;
        self.index = target;
        self.current().map(Some)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Discard everything and start over from `entry`.
    pub fn reset(&mut self, entry: HistoryEntry) {
        self.entries.clear();
        self.entries.push(entry);
        self.index = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    fn entry_at(&self, index: usize) -> CalcResult<&HistoryEntry> {
        self.entries
            .get(index)
            .ok_or_else(|| CalcError::history(format!("no entry at index {index}")))
    }

    #[cfg(test)]
    pub(crate) fn corrupt_index(&mut self, index: usize) {
        self.index = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with(ids: &[&str]) -> HistoryEntry {
        let modules = ids.iter().map(|id| Module::new("rack").with_id(*id)).collect();
        HistoryEntry::new(LayoutSnapshot::new(modules, vec![]), None, true).unwrap()
    }

    #[test]
    fn test_identical_snapshot_not_recorded() {
        let mut history = History::new(entry_with(&[]), MAX_HISTORY_ENTRIES);
        assert!(history.record(entry_with(&["a"])).unwrap());
        assert!(!history.record(entry_with(&["a"])).unwrap());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_undo_redo_walk() {
        let mut history = History::new(entry_with(&[]), MAX_HISTORY_ENTRIES);
        history.record(entry_with(&["a"])).unwrap();
        history.record(entry_with(&["a", "b"])).unwrap();

        assert_eq!(history.undo().unwrap().unwrap().modules().len(), 1);
        assert_eq!(history.undo().unwrap().unwrap().modules().len(), 0);
        assert!(history.undo().unwrap().is_none());
        assert!(!history.can_undo());

        assert_eq!(history.redo().unwrap().unwrap().modules().len(), 1);
        assert_eq!(history.redo().unwrap().unwrap().modules().len(), 2);
        assert!(history.redo().unwrap().is_none());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_record_after_undo_truncates_future() {
        let mut history = History::new(entry_with(&[]), MAX_HISTORY_ENTRIES);
        history.record(entry_with(&["a"])).unwrap();
        history.record(entry_with(&["a", "b"])).unwrap();
        history.undo().unwrap();

        history.record(entry_with(&["a", "c"])).unwrap();
        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
        assert_eq!(history.current().unwrap().modules()[1].id, "c");
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut history = History::new(entry_with(&[]), 3);
        for id in ["a", "b", "c", "d"] {
            history.record(entry_with(&[id])).unwrap();
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);

        history.undo().unwrap();
        let oldest = history.undo().unwrap().unwrap();
        assert_eq!(oldest.modules()[0].id, "b");
        assert!(!history.can_undo());
    }

    #[test]
    fn test_default_cap() {
        let mut history = History::new(entry_with(&[]), MAX_HISTORY_ENTRIES);
        for i in 0..60 {
            let id = format!("m{i}");
            history.record(entry_with(&[id.as_str()])).unwrap();
        }
        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
    }

    #[test]
    fn test_zero_cap_keeps_one_entry() {
        let mut history = History::new(entry_with(&[]), 0);
        history.record(entry_with(&["a"])).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.current().unwrap().modules()[0].id, "a");
    }

    #[test]
    fn test_missing_entry_is_history_error() {
        let mut history = History::new(entry_with(&[]), MAX_HISTORY_ENTRIES);
        history.corrupt_index(7);
        let err = history.current().unwrap_err();
        assert_eq!(err.error_code(), "HISTORY_ERROR");
        assert!(history.record(entry_with(&["a"])).is_err());

        history.reset(entry_with(&["a"]));
        assert_eq!(history.len(), 1);
        assert!(history.current().is_ok());
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = entry_with(&["a"]);
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["modules"].is_array());
        assert_eq!(json["hasChanges"], true);
        assert!(json.get("fingerprint").is_none());
    }
}
