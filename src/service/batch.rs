/// Batch submission payload.
///
/// The upload service expects, per file index `i` in store order:
/// `files` (the file), `color_<i>`, `quantity_<i>`, `pageType_<i>`.

use crate::state::data::{FileEntry, FilePayload};

/// One multipart field
#[derive(Debug, Clone, PartialEq)]
pub enum BatchField {
    File { name: &'static str, payload: FilePayload },
    Text { name: String, value: String },
}

impl BatchField {
    pub fn name(&self) -> &str {
        match self {
            BatchField::File { name, .. } => name,
            BatchField::Text { name, .. } => name,
        }
    }
}

/// Snapshot of one file as it will be sent
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub payload: FilePayload,
    pub color: &'static str,
    pub quantity: u32,
    pub page_type: &'static str,
}

/// The whole store, serialized for one upload request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchRequest {
    items: Vec<BatchItem>,
}

impl BatchRequest {
    pub fn from_entries(entries: &[FileEntry]) -> Self {
        let items = entries
            .iter()
            .map(|entry| BatchItem {
                payload: entry.payload.clone(),
                color: entry.color.as_wire(),
                quantity: entry.quantity.get(),
                page_type: entry.page_type.as_wire(),
            })
            .collect();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Fields in the order they are appended to the form
    pub fn fields(&self) -> Vec<BatchField> {
        let mut fields = Vec::with_capacity(self.items.len() * 4);
        for (index, item) in self.items.iter().enumerate() {
            fields.push(BatchField::File {
                name: "files",
                payload: item.payload.clone(),
            });
            fields.push(BatchField::Text {
                name: format!("color_{}", index),
                value: item.color.to_string(),
            });
            fields.push(BatchField::Text {
                name: format!("quantity_{}", index),
                value: item.quantity.to_string(),
            });
            fields.push(BatchField::Text {
                name: format!("pageType_{}", index),
                value: item.page_type.to_string(),
            });
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{sample_file, ColorMode, EntryId, PageType, Quantity};

    #[test]
    fn test_fields_are_named_and_ordered_per_index() {
        let mut first = FileEntry::new(EntryId(0), sample_file("a.pdf", "application/pdf", b"a"));
        first.color = ColorMode::Bw;
        first.quantity = Quantity::new(3);
        let mut second = FileEntry::new(EntryId(1), sample_file("b.png", "image/png", b"b"));
        second.page_type = PageType::Letter;

        let batch = BatchRequest::from_entries(&[first, second]);
        let fields = batch.fields();
        let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec![
                "files", "color_0", "quantity_0", "pageType_0",
                "files", "color_1", "quantity_1", "pageType_1",
            ]
        );

        assert_eq!(fields[1], BatchField::Text { name: "color_0".into(), value: "bw".into() });
        assert_eq!(fields[2], BatchField::Text { name: "quantity_0".into(), value: "3".into() });
        assert_eq!(fields[7], BatchField::Text { name: "pageType_1".into(), value: "Letter".into() });
        match &fields[4] {
            BatchField::File { payload, .. } => assert_eq!(payload.name, "b.png"),
            other => panic!("expected file field, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_batch() {
        let batch = BatchRequest::from_entries(&[]);
        assert!(batch.is_empty());
        assert!(batch.fields().is_empty());
    }
}
