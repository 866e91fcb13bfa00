/// State management module
///
/// - `data.rs` - file entries, print settings and payloads
/// - `store.rs` - ordered collection of entries
/// - `selection.rs` - pagination over the store
/// - `editor.rs` - settings editor with save / cancel
/// - `preview.rs` - preview resolution and stale-result guard
/// - `cache.rs` - SQLite cache of converted previews
/// - `controller.rs` - single owner tying the above together

pub mod cache;
pub mod controller;
pub mod data;
pub mod editor;
pub mod preview;
pub mod selection;
pub mod store;
