/// Views
///
/// - `file_list.rs` - paged file list with per-file settings buttons
/// - `preview.rs` - preview panel and display-only transforms
/// - `settings_modal.rs` - settings editor overlay

pub mod file_list;
pub mod preview;
pub mod settings_modal;
