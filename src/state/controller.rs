/// The controller owns every piece of UI state: the file store, the
/// selection, pagination, the settings editor, the global defaults and the
/// preview resolver.
///
/// Each user action is one method here. Methods that may need the network
/// return the request for the shell to run; results come back through
/// `conversion_finished` / `submit_finished`.

use super::cache::ConvertedCache;
use super::data::{EntryId, FileEntry, GlobalSettings, LoadedFile, SettingsPatch};
use super::editor::{Commit, SettingsEditor};
use super::preview::{ConversionOutcome, ConversionRequest, DisplayTransform, PreviewResolver, PreviewState};
use super::selection::Pagination;
use super::store::FileStore;
use crate::error::{ServiceError, StoreError};
use crate::service::BatchRequest;

#[derive(Debug)]
pub struct Controller {
    store: FileStore,
    selection: Option<EntryId>,
    pagination: Pagination,
    editor: SettingsEditor,
    global: GlobalSettings,
    preview: PreviewResolver,
    cache: ConvertedCache,
    submitting: bool,
}

impl Controller {
    pub fn new(cache: ConvertedCache, page_size: usize) -> Self {
        Self {
            store: FileStore::new(),
            selection: None,
            pagination: Pagination::new(page_size),
            editor: SettingsEditor::default(),
            global: GlobalSettings::default(),
            preview: PreviewResolver::default(),
            cache,
            submitting: false,
        }
    }

    // ========== Store ==========

    /// Append loaded files. If nothing was selected, the first new file is
    /// selected, which may start a conversion.
    pub fn add_files(&mut self, files: Vec<LoadedFile>) -> Option<ConversionRequest> {
        let ids = self.store.add_files(files);
        self.pagination.clamp(self.store.len());

        if self.selection.is_none() {
            if let Some(&first) = ids.first() {
                return self.select(first);
            }
        }
        None
    }

    pub fn update_entry(&mut self, index: usize, patch: &SettingsPatch) -> Result<(), StoreError> {
        self.store.update_entry(index, patch)
    }

    /// Save new global defaults and push them onto every file
    pub fn apply_global(&mut self, settings: GlobalSettings) {
        self.global = settings;
        self.store.apply_global(&settings);
    }

    /// Empty the store and reset selection, paging and preview
    pub fn clear(&mut self) {
        self.store.clear();
        self.selection = None;
        self.editor.cancel();
        self.pagination.clamp(0);
        self.preview.reset();
    }

    pub fn entries(&self) -> &[FileEntry] {
        self.store.entries()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn entry(&self, id: EntryId) -> Option<&FileEntry> {
        self.store.get(id)
    }

    /// "1 item", "3 items"
    pub fn item_count_label(&self) -> String {
        let count = self.store.len();
        if count == 1 {
            "1 item".to_string()
        } else {
            format!("{} items", count)
        }
    }

    // ========== Selection / Pagination ==========

    /// Make `id` the active preview target
    pub fn select(&mut self, id: EntryId) -> Option<ConversionRequest> {
        let index = self.store.position(id)?;
        self.selection = Some(id);
        self.pagination.show_index(index, self.store.len());
        self.preview.resolve(self.store.get(id), &self.cache)
    }

    pub fn selected_id(&self) -> Option<EntryId> {
        self.selection
    }

    /// Always read from the store, so edits are visible immediately
    pub fn selected_entry(&self) -> Option<&FileEntry> {
        self.selection.and_then(|id| self.store.get(id))
    }

    pub fn next_page(&mut self) -> bool {
        self.pagination.next(self.store.len())
    }

    pub fn previous_page(&mut self) -> bool {
        self.pagination.previous()
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Entries on the visible page, with their store index
    pub fn visible_entries(&self) -> impl Iterator<Item = (usize, &FileEntry)> {
        let range = self.pagination.visible_range(self.store.len());
        let start = range.start;
        self.store.entries()[range]
            .iter()
            .enumerate()
            .map(move |(offset, entry)| (start + offset, entry))
    }

    // ========== Settings Editor ==========

    pub fn open_file_settings(&mut self, id: EntryId) {
        if let Some(entry) = self.store.get(id) {
            self.editor.open_file(entry);
        }
    }

    pub fn open_global_settings(&mut self) {
        self.editor.open_global(&self.global);
    }

    pub fn editor(&self) -> &SettingsEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut SettingsEditor {
        &mut self.editor
    }

    /// Commit the editor buffer through the matching store path
    pub fn save_settings(&mut self) -> Result<(), StoreError> {
        match self.editor.save() {
            Some(Commit::Global(settings)) => {
                tracing::info!("Applying global settings to {} files", self.store.len());
                self.apply_global(settings);
                Ok(())
            }
            Some(Commit::File { id, patch }) => self.store.update_by_id(id, &patch),
            None => Ok(()),
        }
    }

    pub fn cancel_settings(&mut self) {
        self.editor.cancel();
    }

    pub fn global_settings(&self) -> &GlobalSettings {
        &self.global
    }

    // ========== Preview ==========

    pub fn preview_state(&self) -> &PreviewState {
        self.preview.state()
    }

    pub fn display_transform(&self) -> Option<DisplayTransform> {
        self.selected_entry().map(DisplayTransform::for_entry)
    }

    pub fn conversion_finished(&mut self, outcome: ConversionOutcome) -> bool {
        self.preview.finish(outcome, &self.cache)
    }

    pub fn retry_preview(&mut self) -> Option<ConversionRequest> {
        let id = self.selection?;
        let entry = self.store.get(id)?;
        self.preview.retry(entry)
    }

    // ========== Submission ==========

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Snapshot the whole store as one batch. None if empty or already sending.
    pub fn begin_submit(&mut self) -> Option<BatchRequest> {
        if self.submitting || self.store.is_empty() {
            return None;
        }
        self.submitting = true;
        Some(BatchRequest::from_entries(self.store.entries()))
    }

    /// On success the store is cleared; on failure it is left as it was
    pub fn submit_finished(&mut self, result: &Result<(), ServiceError>) {
        self.submitting = false;
        match result {
            Ok(()) => {
                tracing::info!("Batch of {} files submitted", self.store.len());
                self.clear();
            }
            Err(e) => tracing::error!("Batch submission failed: {}", e),
        }
    }
}
