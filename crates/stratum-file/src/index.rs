use crate::IndexEntry;

use serde::{Deserialize, Serialize};
use stratum_core::Result;

/// Every entry of one model plus the identity allocator.
///
/// The change counter is not persisted. It gates [`flush`] so that an index
/// with no structural change since the last write is never rewritten.
///
/// [`flush`]: crate::FileIndexer::flush
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    #[serde(default)]
    pub last_id: i64,

    #[serde(default)]
    pub entries: Vec<IndexEntry>,

    #[serde(skip)]
    change_count: u64,
}

impl Index {
    pub fn from_json(contents: &[u8]) -> Result<Index> {
        let mut index: Index = serde_json::from_slice(contents)?;
        let highest = index.entries.iter().map(IndexEntry::id).max().unwrap_or(0);
        index.last_id = index.last_id.max(highest);
        index.link();
        Ok(index)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Allocates the next identity. Counts as a change.
    pub fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.change_count += 1;
        self.last_id
    }

    pub fn change_count(&self) -> u64 {
        self.change_count
    }

    pub fn increment_change_count(&mut self) {
        self.change_count += 1;
    }

    pub fn reset_change_count(&mut self) {
        self.change_count = 0;
    }

    pub fn by_id(&self, id: i64) -> Option<&IndexEntry> {
        if id <= 0 {
            return None;
        }
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Rebuilds parent, child and group links across all entries.
    pub fn link(&mut self) {
        for entry in &mut self.entries {
            entry.unlink();
        }

        let links: Vec<(usize, i64, i64, i64)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, entry.id(), entry.parent_id(), entry.group_id()))
            .collect();

        for (i, id, parent_id, group_id) in links {
            if parent_id > 0 {
                if let Some(parent) = self.position(parent_id) {
                    self.entries[i].parent = Some(parent_id);
                    self.entries[parent].children.push(id);
                }
            }
            if group_id > 0 {
                if let Some(group) = self.position(group_id) {
                    self.entries[group].contains.push(id);
                }
            }
        }
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }
}
