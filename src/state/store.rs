/// The FileEntry store: the ordered list of added files and their settings.
///
/// Entries are only ever appended, patched, or cleared all at once after a
/// successful submission. There is no per-file delete and no reordering.

use super::data::{EntryId, FileEntry, GlobalSettings, LoadedFile, SettingsPatch};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct FileStore {
    entries: Vec<FileEntry>,
    next_id: u64,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append files with default settings, in input order.
    /// Returns the ids assigned to the new entries.
    pub fn add_files(&mut self, files: Vec<LoadedFile>) -> Vec<EntryId> {
        let mut ids = Vec::with_capacity(files.len());
        for file in files {
            let id = EntryId(self.next_id);
            self.next_id += 1;
            self.entries.push(FileEntry::new(id, file));
            ids.push(id);
        }
        ids
    }

    /// Replace only the listed fields on the entry at `index`
    pub fn update_entry(&mut self, index: usize, patch: &SettingsPatch) -> Result<(), StoreError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        entry.apply(patch);
        Ok(())
    }

    /// Same as `update_entry`, addressed by identity
    pub fn update_by_id(&mut self, id: EntryId, patch: &SettingsPatch) -> Result<(), StoreError> {
        let index = self.position(id).ok_or(StoreError::UnknownEntry(id))?;
        self.update_entry(index, patch)
    }

    /// Overwrite color/paper/orientation on every entry
    pub fn apply_global(&mut self, settings: &GlobalSettings) {
        for entry in &mut self.entries {
            entry.apply_global(settings);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&FileEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn get_index(&self, index: usize) -> Option<&FileEntry> {
        self.entries.get(index)
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }
}
