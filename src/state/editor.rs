/// Settings editor: a transient buffer for one file's settings or the
/// global defaults.
///
/// Nothing reaches the store until `save()`. `cancel()` throws the buffer
/// away and leaves the store untouched.

use super::data::{
    ColorMode, EntryId, FileEntry, GlobalSettings, Orientation, PageType, Quantity, SettingsPatch,
};

/// What the open editor is editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Global,
    File(EntryId),
}

/// Values being edited. `quantity` is only present in file mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorBuffer {
    pub color: ColorMode,
    pub page_type: PageType,
    pub orientation: Orientation,
    pub quantity: Option<Quantity>,
}

/// Result of saving the editor, applied by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Global(GlobalSettings),
    File { id: EntryId, patch: SettingsPatch },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsEditor {
    #[default]
    Closed,
    Open {
        mode: EditorMode,
        buffer: EditorBuffer,
    },
}

impl SettingsEditor {
    /// Open for one file, seeded with its current settings
    pub fn open_file(&mut self, entry: &FileEntry) {
        *self = SettingsEditor::Open {
            mode: EditorMode::File(entry.id),
            buffer: EditorBuffer {
                color: entry.color,
                page_type: entry.page_type,
                orientation: entry.orientation,
                quantity: Some(entry.quantity),
            },
        };
    }

    /// Open for the global defaults (no quantity)
    pub fn open_global(&mut self, defaults: &GlobalSettings) {
        *self = SettingsEditor::Open {
            mode: EditorMode::Global,
            buffer: EditorBuffer {
                color: defaults.color,
                page_type: defaults.page_type,
                orientation: defaults.orientation,
                quantity: None,
            },
        };
    }

    pub fn is_open(&self) -> bool {
        matches!(self, SettingsEditor::Open { .. })
    }

    pub fn mode(&self) -> Option<EditorMode> {
        match self {
            SettingsEditor::Open { mode, .. } => Some(*mode),
            SettingsEditor::Closed => None,
        }
    }

    pub fn buffer(&self) -> Option<&EditorBuffer> {
        match self {
            SettingsEditor::Open { buffer, .. } => Some(buffer),
            SettingsEditor::Closed => None,
        }
    }

    fn buffer_mut(&mut self) -> Option<&mut EditorBuffer> {
        match self {
            SettingsEditor::Open { buffer, .. } => Some(buffer),
            SettingsEditor::Closed => None,
        }
    }

    pub fn set_color(&mut self, color: ColorMode) {
        if let Some(buffer) = self.buffer_mut() {
            buffer.color = color;
        }
    }

    pub fn set_page_type(&mut self, page_type: PageType) {
        if let Some(buffer) = self.buffer_mut() {
            buffer.page_type = page_type;
        }
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if let Some(buffer) = self.buffer_mut() {
            buffer.orientation = orientation;
        }
    }

    pub fn increment_quantity(&mut self) {
        if let Some(quantity) = self.buffer_mut().and_then(|b| b.quantity.as_mut()) {
            *quantity = quantity.increment();
        }
    }

    pub fn decrement_quantity(&mut self) {
        if let Some(quantity) = self.buffer_mut().and_then(|b| b.quantity.as_mut()) {
            *quantity = quantity.decrement();
        }
    }

    /// Close and return the buffer as a commit for the store
    pub fn save(&mut self) -> Option<Commit> {
        let commit = match *self {
            SettingsEditor::Closed => None,
            SettingsEditor::Open { mode: EditorMode::Global, buffer } => {
                Some(Commit::Global(GlobalSettings {
                    color: buffer.color,
                    page_type: buffer.page_type,
                    orientation: buffer.orientation,
                }))
            }
            SettingsEditor::Open { mode: EditorMode::File(id), buffer } => Some(Commit::File {
                id,
                patch: SettingsPatch {
                    color: Some(buffer.color),
                    page_type: Some(buffer.page_type),
                    orientation: Some(buffer.orientation),
                    quantity: buffer.quantity.map(|q| q.get()),
                },
            }),
        };
        *self = SettingsEditor::Closed;
        commit
    }

    /// Close without committing anything
    pub fn cancel(&mut self) {
        *self = SettingsEditor::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::sample_file;

    fn entry() -> FileEntry {
        let mut entry = FileEntry::new(EntryId(7), sample_file("a.pdf", "application/pdf", b"x"));
        entry.quantity = Quantity::new(3);
        entry.orientation = Orientation::Landscape;
        entry
    }

    #[test]
    fn test_open_file_seeds_buffer() {
        let mut editor = SettingsEditor::default();
        editor.open_file(&entry());

        assert_eq!(editor.mode(), Some(EditorMode::File(EntryId(7))));
        let buffer = editor.buffer().unwrap();
        assert_eq!(buffer.quantity, Some(Quantity::new(3)));
        assert_eq!(buffer.orientation, Orientation::Landscape);
    }

    #[test]
    fn test_open_global_has_no_quantity() {
        let mut editor = SettingsEditor::default();
        editor.open_global(&GlobalSettings::default());
        assert_eq!(editor.buffer().unwrap().quantity, None);

        // Quantity buttons do nothing in global mode
        editor.increment_quantity();
        assert_eq!(editor.buffer().unwrap().quantity, None);
    }

    #[test]
    fn test_quantity_buttons_clamp_at_one() {
        let mut editor = SettingsEditor::default();
        editor.open_file(&entry());
        for _ in 0..10 {
            editor.decrement_quantity();
        }
        assert_eq!(editor.buffer().unwrap().quantity, Some(Quantity::new(1)));
        editor.increment_quantity();
        assert_eq!(editor.buffer().unwrap().quantity, Some(Quantity::new(2)));
    }

    #[test]
    fn test_save_produces_file_commit_and_closes() {
        let mut editor = SettingsEditor::default();
        editor.open_file(&entry());
        editor.set_color(ColorMode::Bw);

        let commit = editor.save().unwrap();
        assert!(!editor.is_open());
        match commit {
            Commit::File { id, patch } => {
                assert_eq!(id, EntryId(7));
                assert_eq!(patch.color, Some(ColorMode::Bw));
                assert_eq!(patch.quantity, Some(3));
            }
            other => panic!("unexpected commit {:?}", other),
        }
    }

    #[test]
    fn test_save_produces_global_commit() {
        let mut editor = SettingsEditor::default();
        editor.open_global(&GlobalSettings::default());
        editor.set_page_type(PageType::Letter);

        assert_eq!(
            editor.save(),
            Some(Commit::Global(GlobalSettings {
                page_type: PageType::Letter,
                ..GlobalSettings::default()
            }))
        );
    }

    #[test]
    fn test_cancel_discards_buffer() {
        let mut editor = SettingsEditor::default();
        editor.open_file(&entry());
        editor.set_color(ColorMode::Bw);
        editor.cancel();

        assert!(!editor.is_open());
        assert_eq!(editor.save(), None);
    }

    #[test]
    fn test_setters_ignored_when_closed() {
        let mut editor = SettingsEditor::default();
        editor.set_color(ColorMode::Bw);
        assert_eq!(editor, SettingsEditor::Closed);
    }
}
